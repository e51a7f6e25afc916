#![warn(missing_docs)]
//! Authoritative container session host.
//!
//! Wires a [`mdcontainer_window::ClientContainer`] to the wire protocol: inbound
//! frames are decoded, verified, rate limited and dispatched; outbound slot
//! updates are batched once per tick.

mod behavior;
mod config;
mod session;

pub use behavior::BasicClickBehavior;
pub use config::{SessionConfig, DEFAULT_SESSION_CONFIG_PATH};
pub use session::{encode_frames, ContainerSession};
