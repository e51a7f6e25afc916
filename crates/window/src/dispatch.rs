//! Decoding of raw `(mode, button)` click pairs into gestures.

use crate::gesture::{decode_drag_byte, DragMode, DragStep};
use crate::index::ClientTarget;
use mdcontainer_inventory::HOTBAR_SIZE;

/// Mouse button of a click or of a single-slot drag replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Secondary button.
    Right,
}

/// A decoded click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    /// Plain click, on a slot or outside the window.
    Click {
        /// Where the click landed.
        target: ClientTarget,
        /// Which button.
        button: MouseButton,
    },
    /// Shift-click.
    ShiftClick {
        /// Global slot index.
        slot: usize,
        /// Which button.
        button: MouseButton,
    },
    /// Number key swap with a hotbar slot.
    NumberKey {
        /// Global slot index.
        slot: usize,
        /// 0-based hotbar column.
        hotbar: u8,
    },
    /// Middle click (creative clone).
    MiddleClick {
        /// Global slot index.
        slot: usize,
    },
    /// Drop key, or a drop-mode click outside the window.
    Drop {
        /// Where the drop was requested.
        target: ClientTarget,
        /// Control held: drop the whole stack.
        full_stack: bool,
    },
    /// One step of a drag gesture.
    Drag {
        /// Drag mode.
        mode: DragMode,
        /// Start, add or finish.
        step: DragStep,
        /// Slot for add steps.
        target: ClientTarget,
    },
    /// Double click completion.
    DoubleClick {
        /// Global slot index.
        slot: usize,
    },
}

impl ClickAction {
    /// Short name for log fields.
    pub fn name(&self) -> &'static str {
        match self {
            ClickAction::Click { .. } => "click",
            ClickAction::ShiftClick { .. } => "shift_click",
            ClickAction::NumberKey { .. } => "number_key",
            ClickAction::MiddleClick { .. } => "middle_click",
            ClickAction::Drop { .. } => "drop",
            ClickAction::Drag { .. } => "drag",
            ClickAction::DoubleClick { .. } => "double_click",
        }
    }
}

/// Decode a click. `None` for pairs outside the protocol's table.
pub fn decode_click(mode: u8, button: u8, target: ClientTarget) -> Option<ClickAction> {
    use ClientTarget::Slot;

    let mouse = match button {
        0 => Some(MouseButton::Left),
        1 => Some(MouseButton::Right),
        _ => None,
    };

    match (mode, target) {
        (0, target) => mouse.map(|button| ClickAction::Click { target, button }),
        (1, Slot(slot)) => mouse.map(|button| ClickAction::ShiftClick { slot, button }),
        (2, Slot(slot)) if usize::from(button) < HOTBAR_SIZE => Some(ClickAction::NumberKey {
            slot,
            hotbar: button,
        }),
        (3, Slot(slot)) if button == 2 => Some(ClickAction::MiddleClick { slot }),
        (4, target) if button <= 1 => Some(ClickAction::Drop {
            target,
            full_stack: button == 1,
        }),
        (5, target) => {
            decode_drag_byte(button).map(|(mode, step)| ClickAction::Drag { mode, step, target })
        }
        (6, Slot(slot)) if button == 0 => Some(ClickAction::DoubleClick { slot }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLOT: ClientTarget = ClientTarget::Slot(3);

    #[test]
    fn decodes_the_click_table() {
        assert_eq!(
            decode_click(0, 1, SLOT),
            Some(ClickAction::Click {
                target: SLOT,
                button: MouseButton::Right
            })
        );
        assert_eq!(
            decode_click(1, 0, SLOT),
            Some(ClickAction::ShiftClick {
                slot: 3,
                button: MouseButton::Left
            })
        );
        assert_eq!(
            decode_click(2, 8, SLOT),
            Some(ClickAction::NumberKey { slot: 3, hotbar: 8 })
        );
        assert_eq!(decode_click(3, 2, SLOT), Some(ClickAction::MiddleClick { slot: 3 }));
        assert_eq!(
            decode_click(4, 1, ClientTarget::Outside),
            Some(ClickAction::Drop {
                target: ClientTarget::Outside,
                full_stack: true
            })
        );
        assert_eq!(
            decode_click(5, 0b0101, SLOT),
            Some(ClickAction::Drag {
                mode: DragMode::Right,
                step: DragStep::AddSlot,
                target: SLOT
            })
        );
        assert_eq!(decode_click(6, 0, SLOT), Some(ClickAction::DoubleClick { slot: 3 }));
    }

    #[test]
    fn rejects_pairs_outside_the_table() {
        assert_eq!(decode_click(0, 2, SLOT), None);
        assert_eq!(decode_click(1, 0, ClientTarget::Outside), None);
        assert_eq!(decode_click(2, 9, SLOT), None);
        assert_eq!(decode_click(3, 0, SLOT), None);
        assert_eq!(decode_click(4, 2, SLOT), None);
        assert_eq!(decode_click(5, 0b1100, SLOT), None);
        assert_eq!(decode_click(5, 0b0011, SLOT), None);
        assert_eq!(decode_click(6, 1, SLOT), None);
        assert_eq!(decode_click(7, 0, SLOT), None);
    }
}
