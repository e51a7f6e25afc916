use crate::cell::CellIndex;
use crate::index::{PartKind, SlotIndexMap};
use crate::shadow::ContainerShadow;
use mdcontainer_core::ItemStack;
use mdcontainer_inventory::InventorySlot;
use std::sync::Arc;

/// Top or bottom half of a window, addressed with part-local indices.
///
/// Panics when a local index falls outside the part.
#[derive(Debug)]
pub struct ContainerPart<'a> {
    shadow: &'a mut ContainerShadow,
    index: &'a SlotIndexMap,
    kind: PartKind,
}

impl<'a> ContainerPart<'a> {
    pub(crate) fn new(shadow: &'a mut ContainerShadow, index: &'a SlotIndexMap, kind: PartKind) -> Self {
        Self {
            shadow,
            index,
            kind,
        }
    }

    /// Which part this view covers.
    pub fn kind(&self) -> PartKind {
        self.kind
    }

    /// Number of cells in the part.
    pub fn len(&self) -> usize {
        self.index.part_len(self.kind)
    }

    /// Whether the part has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Global index of `local`.
    pub fn global(&self, local: usize) -> usize {
        self.index.to_global(self.kind, local)
    }

    /// Back `local` with an inventory slot.
    pub fn bind(&mut self, local: usize, slot: Arc<InventorySlot>) {
        let global = self.global(local);
        self.shadow.bind(global, slot);
    }

    /// Turn `local` into a button showing `item`.
    pub fn bind_button(&mut self, local: usize, item: Option<ItemStack>) {
        let global = self.global(local);
        self.shadow.bind_button(global, item);
    }

    /// Change a button icon; `false` when `local` is not a button.
    pub fn set_button_item(&mut self, local: usize, item: Option<ItemStack>) -> bool {
        let global = self.global(local);
        self.shadow.set_button_item(global, item)
    }

    /// Detach `local`; it shows as empty.
    pub fn unbind(&mut self, local: usize) {
        let global = self.global(local);
        self.shadow.unbind(global);
    }

    /// Item the client should currently see at `local`.
    pub fn item(&self, local: usize) -> Option<ItemStack> {
        self.shadow.item(CellIndex::Slot(self.global(local)))
    }

    /// Resend `local` on the next flush.
    pub fn queue_slot_change(&mut self, local: usize) {
        let global = self.global(local);
        self.shadow.queue_slot_change(CellIndex::Slot(global));
    }

    /// Resend `local` through the silent alias on the next flush.
    pub fn queue_silent_slot_change(&mut self, local: usize) {
        let global = self.global(local);
        self.shadow.queue_silent_slot_change(CellIndex::Slot(global));
    }
}
