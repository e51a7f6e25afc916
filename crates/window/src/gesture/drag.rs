use crate::cell::CellIndex;
use crate::dispatch::MouseButton;
use crate::shadow::ContainerShadow;
use tracing::debug;

/// Which button a drag distributes with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragMode {
    /// Split evenly.
    Left,
    /// One item per slot.
    Right,
    /// Creative full stacks.
    Middle,
}

impl DragMode {
    fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(DragMode::Left),
            1 => Some(DragMode::Right),
            2 => Some(DragMode::Middle),
            _ => None,
        }
    }

    /// Button a single-slot drag replays as. Middle drags have none.
    pub fn click_button(self) -> Option<MouseButton> {
        match self {
            DragMode::Left => Some(MouseButton::Left),
            DragMode::Right => Some(MouseButton::Right),
            DragMode::Middle => None,
        }
    }
}

/// Phase carried in the low bits of a drag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragStep {
    /// Button pressed.
    Start,
    /// Pointer crossed a slot.
    AddSlot,
    /// Button released.
    Finish,
}

/// Split a drag byte into mode (`byte >> 2`) and step (`byte & 3`).
pub fn decode_drag_byte(byte: u8) -> Option<(DragMode, DragStep)> {
    let mode = DragMode::from_bits(byte >> 2)?;
    let step = match byte & 0x3 {
        0 => DragStep::Start,
        1 => DragStep::AddSlot,
        2 => DragStep::Finish,
        _ => return None,
    };
    Some((mode, step))
}

/// What a finished drag resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragFinish {
    /// No slots, a middle drag over one slot, or a mismatched finish.
    Nothing,
    /// Exactly one slot: replay as a plain click.
    Click {
        /// Global slot index.
        slot: usize,
        /// Replay button.
        button: MouseButton,
    },
    /// Several slots: hand them to the behavior.
    Distribute {
        /// Accumulated slots in the order they were crossed.
        slots: Vec<usize>,
        /// Drag mode.
        mode: DragMode,
    },
}

/// Active drag, if any, and the slots it crossed.
#[derive(Debug, Default)]
pub struct DragState {
    active: Option<DragMode>,
    slots: Vec<usize>,
}

impl DragState {
    /// Whether a drag is in progress.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Mode of the drag in progress.
    pub fn mode(&self) -> Option<DragMode> {
        self.active
    }

    /// Slots accumulated so far.
    pub fn slots(&self) -> &[usize] {
        &self.slots
    }

    /// Begin a drag. A drag in a different mode is abandoned first; a repeated
    /// start in the active mode keeps the slots gathered so far.
    pub fn start(&mut self, shadow: &mut ContainerShadow, mode: DragMode) {
        if let Some(previous) = self.active.filter(|&previous| previous != mode) {
            debug!(?previous, ?mode, "drag restarted in another mode, resetting");
            self.reset(shadow);
        }
        self.active = Some(mode);
    }

    /// Add a crossed slot. Slots from a different or inactive drag are
    /// only force-updated.
    pub fn add_slot(&mut self, shadow: &mut ContainerShadow, mode: DragMode, slot: usize) {
        if self.active != Some(mode) {
            debug!(slot, ?mode, active = ?self.active, "stray drag slot");
            shadow.queue_slot_change(CellIndex::Slot(slot));
            return;
        }
        if !self.slots.contains(&slot) {
            self.slots.push(slot);
        }
    }

    /// Release the button. Always leaves the state inactive.
    pub fn finish(&mut self, shadow: &mut ContainerShadow, mode: DragMode) -> DragFinish {
        if self.active != Some(mode) {
            debug!(?mode, active = ?self.active, "mismatched drag finish");
            self.reset(shadow);
            return DragFinish::Nothing;
        }

        let outcome = match self.slots.as_slice() {
            [] => DragFinish::Nothing,
            [slot] => match mode.click_button() {
                Some(button) => DragFinish::Click {
                    slot: *slot,
                    button,
                },
                None => DragFinish::Nothing,
            },
            slots => DragFinish::Distribute {
                slots: slots.to_vec(),
                mode,
            },
        };
        self.reset(shadow);
        outcome
    }

    /// Force-update every accumulated slot and the cursor, then go inactive.
    pub fn reset(&mut self, shadow: &mut ContainerShadow) {
        for &slot in &self.slots {
            shadow.queue_slot_change(CellIndex::Slot(slot));
        }
        shadow.queue_slot_change_safely(CellIndex::Cursor);
        self.slots.clear();
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::DirtyState;
    use crate::flags::{compile_slot_flags, SlotFlags};

    fn shadow() -> ContainerShadow {
        ContainerShadow::new(compile_slot_flags(&[SlotFlags::empty(); 4]).into())
    }

    #[test]
    fn drag_byte_layout() {
        assert_eq!(decode_drag_byte(0), Some((DragMode::Left, DragStep::Start)));
        assert_eq!(decode_drag_byte(5), Some((DragMode::Right, DragStep::AddSlot)));
        assert_eq!(decode_drag_byte(10), Some((DragMode::Middle, DragStep::Finish)));
        assert_eq!(decode_drag_byte(3), None);
        assert_eq!(decode_drag_byte(12), None);
    }

    #[test]
    fn accumulates_unique_slots_in_order() {
        let mut shadow = shadow();
        let mut drag = DragState::default();
        drag.start(&mut shadow, DragMode::Left);
        for slot in [3, 1, 3, 7] {
            drag.add_slot(&mut shadow, DragMode::Left, slot);
        }
        assert_eq!(drag.slots(), &[3, 1, 7]);

        assert_eq!(
            drag.finish(&mut shadow, DragMode::Left),
            DragFinish::Distribute {
                slots: vec![3, 1, 7],
                mode: DragMode::Left
            }
        );
        assert!(!drag.is_active());
        assert_eq!(
            shadow.dirty_slots(),
            vec![
                (1, DirtyState::Dirty),
                (3, DirtyState::Dirty),
                (7, DirtyState::Dirty)
            ]
        );
        assert_eq!(shadow.dirty_state(CellIndex::Cursor), DirtyState::Dirty);
    }

    #[test]
    fn single_slot_replays_as_click_except_middle() {
        let mut shadow = shadow();
        let mut drag = DragState::default();
        drag.start(&mut shadow, DragMode::Right);
        drag.add_slot(&mut shadow, DragMode::Right, 9);
        assert_eq!(
            drag.finish(&mut shadow, DragMode::Right),
            DragFinish::Click {
                slot: 9,
                button: MouseButton::Right
            }
        );

        drag.start(&mut shadow, DragMode::Middle);
        drag.add_slot(&mut shadow, DragMode::Middle, 9);
        assert_eq!(drag.finish(&mut shadow, DragMode::Middle), DragFinish::Nothing);
    }

    #[test]
    fn stray_slots_only_force_update() {
        let mut shadow = shadow();
        let mut drag = DragState::default();
        drag.add_slot(&mut shadow, DragMode::Left, 2);
        assert!(!drag.is_active());
        assert_eq!(shadow.dirty_state(CellIndex::Slot(2)), DirtyState::Dirty);

        drag.start(&mut shadow, DragMode::Left);
        drag.add_slot(&mut shadow, DragMode::Right, 5);
        assert!(drag.slots().is_empty());
        assert_eq!(shadow.dirty_state(CellIndex::Slot(5)), DirtyState::Dirty);
    }

    #[test]
    fn restarting_resets_previous_drag() {
        let mut shadow = shadow();
        let mut drag = DragState::default();
        drag.start(&mut shadow, DragMode::Left);
        drag.add_slot(&mut shadow, DragMode::Left, 4);
        drag.start(&mut shadow, DragMode::Right);

        assert_eq!(drag.mode(), Some(DragMode::Right));
        assert!(drag.slots().is_empty());
        assert_eq!(shadow.dirty_state(CellIndex::Slot(4)), DirtyState::Dirty);
    }

    #[test]
    fn repeated_start_in_same_mode_keeps_slots() {
        let mut shadow = shadow();
        let mut drag = DragState::default();
        drag.start(&mut shadow, DragMode::Left);
        drag.add_slot(&mut shadow, DragMode::Left, 1);
        drag.add_slot(&mut shadow, DragMode::Left, 2);
        drag.start(&mut shadow, DragMode::Left);
        drag.add_slot(&mut shadow, DragMode::Left, 3);

        assert_eq!(
            drag.finish(&mut shadow, DragMode::Left),
            DragFinish::Distribute {
                slots: vec![1, 2, 3],
                mode: DragMode::Left
            }
        );
    }

    #[test]
    fn mismatched_finish_resets() {
        let mut shadow = shadow();
        let mut drag = DragState::default();
        drag.start(&mut shadow, DragMode::Left);
        drag.add_slot(&mut shadow, DragMode::Left, 4);
        drag.add_slot(&mut shadow, DragMode::Left, 5);
        assert_eq!(drag.finish(&mut shadow, DragMode::Right), DragFinish::Nothing);
        assert!(!drag.is_active());
    }
}
