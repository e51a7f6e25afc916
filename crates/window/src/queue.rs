//! Dirty marking and draining.
//!
//! Marking only records *that* a cell must be re-sent and whether the update
//! may go through the slot's alias. Items are read when the queue is drained,
//! so bound cells always ship their backing slot's current contents.

use crate::cell::{CellIndex, DirtyState};
use crate::shadow::ContainerShadow;
use mdcontainer_core::ItemStack;
use mdcontainer_inventory::InventorySlot;
use std::sync::Arc;

/// One drained slot update, still in global index space.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingChange {
    /// Global slot index.
    pub index: usize,
    /// Whether the update may be retargeted to the slot's alias.
    pub silent: bool,
    /// Item read from the cell at drain time.
    pub item: Option<ItemStack>,
}

/// Everything a drain produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrainedChanges {
    /// Dirty visible slots in index order.
    pub slots: Vec<PendingChange>,
    /// Cursor item, when the cursor was dirty.
    pub cursor: Option<Option<ItemStack>>,
}

impl DrainedChanges {
    /// Whether nothing was dirty.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty() && self.cursor.is_none()
    }
}

impl ContainerShadow {
    fn dirty_mut(&mut self, index: CellIndex) -> &mut DirtyState {
        match index {
            CellIndex::Cursor => &mut self.cursor_dirty,
            CellIndex::Slot(i) => {
                self.check(i);
                self.populate();
                &mut self.dirty[i]
            }
        }
    }

    /// Mark for a visible update.
    pub fn queue_slot_change(&mut self, index: CellIndex) {
        *self.dirty_mut(index) = DirtyState::Dirty;
    }

    /// Mark for an update that may go through the slot's alias.
    pub fn queue_silent_slot_change(&mut self, index: CellIndex) {
        *self.dirty_mut(index) = DirtyState::DirtySilent;
    }

    /// Mark for a visible update unless already dirty.
    pub fn queue_slot_change_safely(&mut self, index: CellIndex) {
        let state = self.dirty_mut(index);
        if !state.is_dirty() {
            *state = DirtyState::Dirty;
        }
    }

    /// Mark silent unless already dirty. Never downgrades a visible mark.
    pub fn queue_silent_slot_change_safely(&mut self, index: CellIndex) {
        let state = self.dirty_mut(index);
        if !state.is_dirty() {
            *state = DirtyState::DirtySilent;
        }
    }

    /// Turn tracker notifications from backing slots into silent marks.
    ///
    /// Every cell backed by a changed slot is marked, including cells that
    /// share one backing.
    pub fn poll_trackers(&mut self) {
        if !self.is_tracking() {
            return;
        }
        let tracker = self.tracker();
        let changed: Vec<Arc<InventorySlot>> = self
            .backings()
            .filter(|slot| slot.take_change(tracker))
            .cloned()
            .collect();
        if changed.is_empty() {
            return;
        }

        for index in 0..self.cells.len() {
            if changed.iter().any(|slot| self.cells[index].is_backed_by(slot)) {
                self.queue_silent_slot_change_safely(CellIndex::Slot(index));
            }
        }
        if changed.iter().any(|slot| self.cursor.is_backed_by(slot)) {
            self.queue_slot_change_safely(CellIndex::Cursor);
        }
    }

    /// Read every dirty cell and return it to clean.
    pub fn drain_changes(&mut self) -> DrainedChanges {
        let mut slots = Vec::new();
        for (index, state) in self.dirty.iter_mut().enumerate() {
            if state.is_dirty() {
                slots.push(PendingChange {
                    index,
                    silent: *state == DirtyState::DirtySilent,
                    item: self.cells[index].item(),
                });
                *state = DirtyState::Clean;
            }
        }

        let cursor = if self.cursor_dirty.is_dirty() {
            self.cursor_dirty = DirtyState::Clean;
            Some(self.cursor.item())
        } else {
            None
        };

        DrainedChanges { slots, cursor }
    }

    /// Drop every pending mark without reading anything.
    pub fn clear_dirty(&mut self) {
        self.dirty.fill(DirtyState::Clean);
        self.cursor_dirty = DirtyState::Clean;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{compile_slot_flags, SlotFlags};

    fn shadow() -> ContainerShadow {
        ContainerShadow::new(compile_slot_flags(&[SlotFlags::empty(); 4]).into())
    }

    #[test]
    fn safe_silent_mark_never_downgrades() {
        let mut shadow = shadow();
        shadow.queue_slot_change(CellIndex::Slot(2));
        shadow.queue_silent_slot_change_safely(CellIndex::Slot(2));
        assert_eq!(shadow.dirty_state(CellIndex::Slot(2)), DirtyState::Dirty);

        shadow.queue_silent_slot_change_safely(CellIndex::Slot(3));
        shadow.queue_slot_change_safely(CellIndex::Slot(3));
        assert_eq!(shadow.dirty_state(CellIndex::Slot(3)), DirtyState::DirtySilent);
    }

    #[test]
    fn unsafe_marks_overwrite() {
        let mut shadow = shadow();
        shadow.queue_slot_change(CellIndex::Slot(0));
        shadow.queue_silent_slot_change(CellIndex::Slot(0));
        assert_eq!(shadow.dirty_state(CellIndex::Slot(0)), DirtyState::DirtySilent);
    }

    #[test]
    fn drain_reads_current_backing_and_cleans() {
        let mut shadow = shadow();
        let slot = Arc::new(InventorySlot::new());
        shadow.bind(1, Arc::clone(&slot));
        slot.set(Some(ItemStack::new(2, 5)));

        let drained = shadow.drain_changes();
        assert_eq!(
            drained.slots,
            vec![PendingChange {
                index: 1,
                silent: true,
                item: Some(ItemStack::new(2, 5)),
            }]
        );
        assert!(drained.cursor.is_none());
        assert!(shadow.drain_changes().is_empty());
    }

    #[test]
    fn cursor_drains_after_slots() {
        let mut shadow = shadow();
        shadow.queue_slot_change(CellIndex::Cursor);
        let drained = shadow.drain_changes();
        assert!(drained.slots.is_empty());
        assert_eq!(drained.cursor, Some(None));
    }

    #[test]
    fn tracker_notifications_mark_every_sharing_cell() {
        let mut shadow = shadow();
        let slot = Arc::new(InventorySlot::new());
        shadow.bind(0, Arc::clone(&slot));
        shadow.bind(5, Arc::clone(&slot));
        shadow.start_tracking();
        shadow.drain_changes();

        slot.set(Some(ItemStack::new(1, 1)));
        shadow.poll_trackers();
        assert_eq!(
            shadow.dirty_slots(),
            vec![(0, DirtyState::DirtySilent), (5, DirtyState::DirtySilent)]
        );
    }

    #[test]
    fn untracked_shadows_ignore_notifications() {
        let mut shadow = shadow();
        let slot = Arc::new(InventorySlot::new());
        shadow.bind(0, Arc::clone(&slot));
        shadow.drain_changes();

        slot.set(Some(ItemStack::new(1, 1)));
        shadow.poll_trackers();
        assert!(shadow.dirty_slots().is_empty());
    }

    #[test]
    fn clear_dirty_drops_marks() {
        let mut shadow = shadow();
        shadow.queue_slot_change(CellIndex::Slot(7));
        shadow.queue_slot_change(CellIndex::Cursor);
        shadow.clear_dirty();
        assert!(shadow.drain_changes().is_empty());
    }
}
