//! Shadow cells: what one client window position is backed by.

use mdcontainer_core::ItemStack;
use mdcontainer_inventory::InventorySlot;
use std::sync::Arc;

/// What a window position shows.
#[derive(Debug, Clone, Default)]
pub enum ClientSlot {
    /// Placeholder; always shows nothing.
    #[default]
    Empty,
    /// Mirrors a real inventory slot, read at flush time.
    Bound(Arc<InventorySlot>),
    /// Server-side icon that is not stored in any inventory.
    Button(Option<ItemStack>),
}

impl ClientSlot {
    /// Item the client should currently display.
    pub fn item(&self) -> Option<ItemStack> {
        match self {
            ClientSlot::Empty => None,
            ClientSlot::Bound(slot) => slot.peek(),
            ClientSlot::Button(item) => item.clone(),
        }
    }

    /// Backing inventory slot, for bound cells.
    pub fn backing(&self) -> Option<&Arc<InventorySlot>> {
        match self {
            ClientSlot::Bound(slot) => Some(slot),
            _ => None,
        }
    }

    /// Whether this is the empty placeholder.
    pub fn is_unbound(&self) -> bool {
        matches!(self, ClientSlot::Empty)
    }

    /// Whether this cell is backed by exactly `slot`.
    pub fn is_backed_by(&self, slot: &Arc<InventorySlot>) -> bool {
        self.backing().is_some_and(|own| Arc::ptr_eq(own, slot))
    }
}

/// Pending delivery state of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DirtyState {
    /// Client is believed to be in sync.
    #[default]
    Clean,
    /// Client must visibly replace the slot.
    Dirty,
    /// Client must be corrected, through the alias index when one exists.
    DirtySilent,
}

impl DirtyState {
    /// Whether an update is pending.
    pub fn is_dirty(self) -> bool {
        self != DirtyState::Clean
    }
}

/// Address of a shadow cell. The cursor lives outside the visible index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellIndex {
    /// Visible slot by global index.
    Slot(usize),
    /// The floating cursor stack.
    Cursor,
}
