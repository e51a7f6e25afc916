#![warn(missing_docs)]
//! Client window synchronization.
//!
//! A [`ClientContainer`] keeps a shadow of what one client's open window
//! displays, turns divergence from the authoritative inventories into slot
//! updates, and predicts the client's own speculative redraws for shift-click,
//! drag and double-click gestures. Inventory rules stay behind
//! [`InteractionBehavior`].

mod behavior;
mod cell;
mod container;
mod dispatch;
mod error;
pub mod flags;
pub mod gesture;
mod id;
mod index;
mod part;
mod player;
mod property;
mod queue;
mod shadow;

pub use behavior::{BehaviorError, ClickContext, InteractionBehavior, NoopBehavior, SlotRef};
pub use cell::{CellIndex, ClientSlot, DirtyState};
pub use container::{ClientContainer, WindowLayout};
pub use dispatch::{decode_click, ClickAction, MouseButton};
pub use error::WindowError;
pub use flags::{compile_slot_flags, SlotFlags};
pub use id::{ContainerIdAllocator, CONTAINER_IDS};
pub use index::{ClientTarget, PartKind, SlotIndexMap};
pub use part::ContainerPart;
pub use player::{ClientPlayer, GameMode};
pub use property::PropertyTracker;
pub use queue::{DrainedChanges, PendingChange};
pub use shadow::ContainerShadow;
