//! Client gesture state and shadow prediction.
//!
//! Gestures never move items. They decide which cells the client has
//! probably redrawn on its own, so the next flush corrects them.

mod double_click;
mod drag;
mod shift;

pub use double_click::{DoubleClickState, MergeOutcome, PendingDoubleClick};
pub use drag::{decode_drag_byte, DragFinish, DragMode, DragState, DragStep};
pub use shift::predict_shift_click;
