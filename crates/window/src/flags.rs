//! Per-slot role bits of a window.
//!
//! Every visible slot index carries one 32-bit word. The top (custom) part is
//! supplied by the window kind; the 36-slot player block is appended by
//! [`compile_slot_flags`].

use bitflags::bitflags;
use mdcontainer_inventory::{HOTBAR_SIZE, MAIN_INVENTORY_SIZE};

bitflags! {
    /// Role and capability bits of one window slot.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SlotFlags: u32 {
        /// Shift-insertion into this slot's run goes back to front.
        const REVERSE_SHIFT_INSERTION = 1 << 0;
        /// Shift-clicks never insert into this slot.
        const DISABLE_SHIFT_INSERTION = 1 << 1;
        /// Shift-insertion may be refused depending on the output (crafting results).
        const POSSIBLY_DISABLED_SHIFT_INSERTION = 1 << 2;
        /// Slot belongs to the standard 36-slot main inventory.
        const MAIN_INVENTORY = 1 << 3;
        /// 1-based hotbar column, 0 when the slot is not on the hotbar.
        const HOTBAR_MASK = 0xF << 4;
        /// Slot holds at most one item whatever the stack size.
        const ONE_ITEM = 1 << 8;
        /// Double-click merges never take from this slot.
        const IGNORE_DOUBLE_CLICK = 1 << 9;
        /// Explicit 1-based silent alias index, 0 when absent.
        const SILENT_ALIAS_MASK = 0xFF << 23;
    }
}

const HOTBAR_SHIFT: u32 = 4;
const SILENT_ALIAS_SHIFT: u32 = 23;

impl SlotFlags {
    /// 1-based hotbar column, if the slot is on the hotbar.
    pub fn hotbar_column(self) -> Option<u8> {
        let column = (self.bits() & Self::HOTBAR_MASK.bits()) >> HOTBAR_SHIFT;
        (column != 0).then_some(column as u8)
    }

    /// Copy with the hotbar column set (1..=9).
    pub fn with_hotbar_column(self, column: u8) -> Self {
        assert!(
            (1..=HOTBAR_SIZE as u8).contains(&column),
            "hotbar column {column} outside 1..={HOTBAR_SIZE}"
        );
        let bits = (self.bits() & !Self::HOTBAR_MASK.bits()) | (u32::from(column) << HOTBAR_SHIFT);
        Self::from_bits_retain(bits)
    }

    /// Explicit silent alias index (0-based), if one is encoded.
    pub fn explicit_alias(self) -> Option<u8> {
        let raw = (self.bits() & Self::SILENT_ALIAS_MASK.bits()) >> SILENT_ALIAS_SHIFT;
        (raw != 0).then(|| (raw - 1) as u8)
    }

    /// Copy with an explicit silent alias index (0..=254).
    pub fn with_silent_alias(self, alias: u8) -> Self {
        assert!(alias < u8::MAX, "silent alias {alias} does not fit the flag field");
        let bits = (self.bits() & !Self::SILENT_ALIAS_MASK.bits())
            | ((u32::from(alias) + 1) << SILENT_ALIAS_SHIFT);
        Self::from_bits_retain(bits)
    }

    /// Index a silent update for this slot is retargeted to.
    ///
    /// The hotbar column wins over the explicit field.
    pub fn silent_alias(self) -> Option<u8> {
        self.hotbar_column()
            .map(|column| column - 1)
            .or_else(|| self.explicit_alias())
    }

    /// Effective per-slot capacity for an item whose true maximum is `max_stack`.
    pub fn capacity(self, max_stack: u32) -> u32 {
        let slot_cap = if self.contains(Self::ONE_ITEM) { 1 } else { 64 };
        slot_cap.min(max_stack)
    }
}

/// Append the fixed player block to a window's top flags.
///
/// The 36 appended entries are main-inventory slots; the last nine carry
/// hotbar columns 1..=9 in order.
pub fn compile_slot_flags(top: &[SlotFlags]) -> Vec<SlotFlags> {
    let storage = MAIN_INVENTORY_SIZE - HOTBAR_SIZE;
    let mut flags = Vec::with_capacity(top.len() + MAIN_INVENTORY_SIZE);
    flags.extend_from_slice(top);
    for position in 0..MAIN_INVENTORY_SIZE {
        let mut slot = SlotFlags::MAIN_INVENTORY;
        if position >= storage {
            slot = slot.with_hotbar_column((position - storage + 1) as u8);
        }
        flags.push(slot);
    }
    flags
}
