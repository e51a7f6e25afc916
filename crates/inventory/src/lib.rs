#![warn(missing_docs)]
//! Authoritative slot storage for player and container inventories.
//!
//! This crate only stores items and notifies subscribed trackers. It does not
//! decide what a click does; that belongs to the interaction behaviors wired
//! into each window.

mod slot;

pub use slot::{InventorySlot, TrackerId};

use mdcontainer_core::{ItemRegistry, ItemStack};
use std::sync::Arc;

/// Number of slots in the player's main inventory (27 storage + 9 hotbar).
pub const MAIN_INVENTORY_SIZE: usize = 36;

/// Number of hotbar columns.
pub const HOTBAR_SIZE: usize = 9;

/// A fixed-size run of shared slots (chests, dispensers, furnaces...).
#[derive(Debug, Clone)]
pub struct SlotInventory {
    slots: Vec<Arc<InventorySlot>>,
}

impl SlotInventory {
    /// Create an inventory of `size` empty slots.
    pub fn new(size: usize) -> Self {
        Self {
            slots: (0..size).map(|_| Arc::new(InventorySlot::new())).collect(),
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the inventory has no slots at all.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Shared handle to one slot.
    pub fn slot(&self, index: usize) -> Option<&Arc<InventorySlot>> {
        self.slots.get(index)
    }

    /// Iterate over all slot handles in index order.
    pub fn slots(&self) -> impl Iterator<Item = &Arc<InventorySlot>> {
        self.slots.iter()
    }

    /// Copy of the item at `index`.
    pub fn get(&self, index: usize) -> Option<ItemStack> {
        self.slots.get(index).and_then(|slot| slot.peek())
    }

    /// Set the item at `index`. Returns `false` when out of range.
    pub fn set(&self, index: usize, item: Option<ItemStack>) -> bool {
        match self.slots.get(index) {
            Some(slot) => {
                slot.set(item);
                true
            }
            None => false,
        }
    }

    /// Insert a stack, merging into similar stacks before using empty slots.
    /// Returns whatever did not fit.
    pub fn add_item(&self, mut stack: ItemStack, registry: &ItemRegistry) -> Option<ItemStack> {
        let max = registry.max_stack_size(&stack);

        for slot in &self.slots {
            let Some(mut existing) = slot.peek() else {
                continue;
            };
            if !existing.is_similar(&stack) || existing.count >= max {
                continue;
            }
            let moved = stack.count.min(max - existing.count);
            existing.count += moved;
            stack.count -= moved;
            slot.set(Some(existing));
            if stack.count == 0 {
                return None;
            }
        }

        for slot in &self.slots {
            if slot.is_empty() {
                let moved = stack.count.min(max);
                slot.set(Some(stack.with_count(moved)));
                stack.count -= moved;
                if stack.count == 0 {
                    return None;
                }
            }
        }

        Some(stack)
    }

    /// Total count of items similar to `probe`.
    pub fn count_similar(&self, probe: &ItemStack) -> u32 {
        self.slots
            .iter()
            .filter_map(|slot| slot.peek())
            .filter(|stack| stack.is_similar(probe))
            .map(|stack| stack.count)
            .sum()
    }
}

/// The player's own inventory: 36 main slots plus the cursor.
///
/// Storage order is hotbar first (0..9) then the three storage rows (9..36),
/// matching the client's player-inventory numbering used by alias updates.
/// Windows display the storage rows first and the hotbar last; use
/// [`PlayerInventory::window_slot`] to translate.
#[derive(Debug, Clone)]
pub struct PlayerInventory {
    main: SlotInventory,
    cursor: Arc<InventorySlot>,
}

impl PlayerInventory {
    /// Create an empty player inventory.
    pub fn new() -> Self {
        Self {
            main: SlotInventory::new(MAIN_INVENTORY_SIZE),
            cursor: Arc::new(InventorySlot::new()),
        }
    }

    /// The 36 main slots in storage order.
    pub fn main(&self) -> &SlotInventory {
        &self.main
    }

    /// The floating cursor stack.
    pub fn cursor(&self) -> &Arc<InventorySlot> {
        &self.cursor
    }

    /// Hotbar slot for 0-based `column`.
    pub fn hotbar(&self, column: usize) -> Option<&Arc<InventorySlot>> {
        if column >= HOTBAR_SIZE {
            return None;
        }
        self.main.slot(column)
    }

    /// Slot shown at `position` of a window's 36-slot bottom block
    /// (27 storage positions, then 9 hotbar positions).
    pub fn window_slot(&self, position: usize) -> Option<&Arc<InventorySlot>> {
        let storage_rows = MAIN_INVENTORY_SIZE - HOTBAR_SIZE;
        if position < storage_rows {
            self.main.slot(position + HOTBAR_SIZE)
        } else if position < MAIN_INVENTORY_SIZE {
            self.main.slot(position - storage_rows)
        } else {
            None
        }
    }
}

impl Default for PlayerInventory {
    fn default() -> Self {
        Self::new()
    }
}
