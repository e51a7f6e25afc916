//! Server-side shadow of what a client window displays.
//!
//! One cell per visible slot plus the cursor. Cells are created lazily on the
//! first mutation, so a window that is built and dropped without being shown
//! never allocates them.

use crate::cell::{CellIndex, ClientSlot, DirtyState};
use crate::flags::SlotFlags;
use mdcontainer_core::ItemStack;
use mdcontainer_inventory::{InventorySlot, TrackerId, MAIN_INVENTORY_SIZE};
use std::iter;
use std::mem;
use std::sync::Arc;

static EMPTY_CELL: ClientSlot = ClientSlot::Empty;

/// Shadow cells, their dirty states and their tracker subscriptions.
#[derive(Debug)]
pub struct ContainerShadow {
    flags: Arc<[SlotFlags]>,
    pub(crate) cells: Vec<ClientSlot>,
    pub(crate) dirty: Vec<DirtyState>,
    pub(crate) cursor: ClientSlot,
    pub(crate) cursor_dirty: DirtyState,
    tracker: TrackerId,
    tracking: bool,
}

impl ContainerShadow {
    /// Shadow over a compiled flags table (top slots + the 36-slot player block).
    pub fn new(flags: Arc<[SlotFlags]>) -> Self {
        assert!(
            flags.len() >= MAIN_INVENTORY_SIZE,
            "flags table must include the {MAIN_INVENTORY_SIZE}-slot player block"
        );
        Self {
            flags,
            cells: Vec::new(),
            dirty: Vec::new(),
            cursor: ClientSlot::Empty,
            cursor_dirty: DirtyState::Clean,
            tracker: TrackerId::allocate(),
            tracking: false,
        }
    }

    /// Number of visible slots.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Always false: the player block is always visible.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of custom (top) slots.
    pub fn top_len(&self) -> usize {
        self.len() - MAIN_INVENTORY_SIZE
    }

    /// The compiled flags table.
    pub fn flags(&self) -> &[SlotFlags] {
        &self.flags
    }

    /// Flags of one visible slot.
    pub fn flag(&self, index: usize) -> SlotFlags {
        self.check(index);
        self.flags[index]
    }

    /// Tracker id this shadow subscribes with.
    pub fn tracker(&self) -> TrackerId {
        self.tracker
    }

    /// Whether backing slots currently carry this shadow's tracker.
    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// Whether the cell array has been created.
    pub fn is_populated(&self) -> bool {
        !self.cells.is_empty()
    }

    /// Create the cell array if it does not exist yet.
    pub fn populate(&mut self) {
        if self.cells.is_empty() {
            let len = self.len();
            self.cells = vec![ClientSlot::Empty; len];
            self.dirty = vec![DirtyState::Clean; len];
        }
    }

    /// Cell at `index`. Never touches dirty state.
    pub fn cell(&self, index: CellIndex) -> &ClientSlot {
        match index {
            CellIndex::Cursor => &self.cursor,
            CellIndex::Slot(i) => {
                self.check(i);
                self.cells.get(i).unwrap_or(&EMPTY_CELL)
            }
        }
    }

    /// Item the client should display at `index`.
    pub fn item(&self, index: CellIndex) -> Option<ItemStack> {
        self.cell(index).item()
    }

    /// Pending delivery state of `index`.
    pub fn dirty_state(&self, index: CellIndex) -> DirtyState {
        match index {
            CellIndex::Cursor => self.cursor_dirty,
            CellIndex::Slot(i) => {
                self.check(i);
                self.dirty.get(i).copied().unwrap_or_default()
            }
        }
    }

    /// Every visible slot with a pending update, in index order.
    pub fn dirty_slots(&self) -> Vec<(usize, DirtyState)> {
        self.dirty
            .iter()
            .enumerate()
            .filter(|(_, state)| state.is_dirty())
            .map(|(index, state)| (index, *state))
            .collect()
    }

    /// Show a real inventory slot at `index`.
    pub fn bind(&mut self, index: usize, slot: Arc<InventorySlot>) {
        self.install(CellIndex::Slot(index), ClientSlot::Bound(slot));
        self.queue_silent_slot_change_safely(CellIndex::Slot(index));
    }

    /// Show a server-side button icon at `index`.
    pub fn bind_button(&mut self, index: usize, item: Option<ItemStack>) {
        self.install(CellIndex::Slot(index), ClientSlot::Button(item));
        self.queue_silent_slot_change_safely(CellIndex::Slot(index));
    }

    /// Clear `index` to the empty placeholder and correct the client.
    pub fn unbind(&mut self, index: usize) {
        if !self.cell(CellIndex::Slot(index)).is_unbound() {
            self.install(CellIndex::Slot(index), ClientSlot::Empty);
        }
        self.queue_silent_slot_change_safely(CellIndex::Slot(index));
    }

    /// Back the cursor cell with a real slot.
    pub fn bind_cursor(&mut self, slot: Arc<InventorySlot>) {
        self.install(CellIndex::Cursor, ClientSlot::Bound(slot));
        self.queue_slot_change_safely(CellIndex::Cursor);
    }

    /// Change the icon of a button cell. Returns `false` if `index` is not a button.
    pub fn set_button_item(&mut self, index: usize, item: Option<ItemStack>) -> bool {
        self.populate();
        self.check(index);
        match &mut self.cells[index] {
            ClientSlot::Button(current) => {
                if *current != item {
                    *current = item;
                    self.queue_silent_slot_change_safely(CellIndex::Slot(index));
                }
                true
            }
            _ => false,
        }
    }

    /// Subscribe to every backing slot.
    pub fn start_tracking(&mut self) {
        if self.tracking {
            return;
        }
        self.tracking = true;
        let tracker = self.tracker;
        for slot in self.backings() {
            slot.add_tracker(tracker);
        }
    }

    /// Unsubscribe from every backing slot.
    pub fn stop_tracking(&mut self) {
        if !self.tracking {
            return;
        }
        let tracker = self.tracker;
        for slot in self.backings() {
            slot.remove_tracker(tracker);
        }
        self.tracking = false;
    }

    /// Detach from all backing slots and drop every cell.
    pub fn release(&mut self) {
        self.stop_tracking();
        self.cells.clear();
        self.dirty.clear();
        self.cursor = ClientSlot::Empty;
        self.cursor_dirty = DirtyState::Clean;
    }

    /// Whether any cell, the cursor included, is backed by `slot`.
    pub fn references(&self, slot: &Arc<InventorySlot>) -> bool {
        self.cells
            .iter()
            .chain(iter::once(&self.cursor))
            .any(|cell| cell.is_backed_by(slot))
    }

    pub(crate) fn backings(&self) -> impl Iterator<Item = &Arc<InventorySlot>> {
        self.cells
            .iter()
            .chain(iter::once(&self.cursor))
            .filter_map(ClientSlot::backing)
    }

    fn install(&mut self, index: CellIndex, cell: ClientSlot) -> ClientSlot {
        self.populate();
        if self.tracking {
            if let Some(slot) = cell.backing() {
                slot.add_tracker(self.tracker);
            }
        }

        let previous = match index {
            CellIndex::Cursor => mem::replace(&mut self.cursor, cell),
            CellIndex::Slot(i) => {
                self.check(i);
                mem::replace(&mut self.cells[i], cell)
            }
        };

        if self.tracking {
            if let Some(old) = previous.backing() {
                if !self.references(old) {
                    old.remove_tracker(self.tracker);
                }
            }
        }
        previous
    }

    pub(crate) fn check(&self, index: usize) {
        assert!(
            index < self.len(),
            "slot index {index} out of range (window has {} slots)",
            self.len()
        );
    }
}
