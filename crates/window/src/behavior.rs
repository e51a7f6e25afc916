//! The boundary to inventory business rules.
//!
//! The engine only keeps the client's view honest. What a click actually does
//! to items is decided by an [`InteractionBehavior`], called once per gesture
//! after the shadow has been marked.

use crate::cell::{CellIndex, ClientSlot};
use crate::dispatch::MouseButton;
use crate::flags::SlotFlags;
use crate::gesture::{DragMode, MergeOutcome};
use crate::index::{PartKind, SlotIndexMap};
use crate::player::ClientPlayer;
use crate::shadow::ContainerShadow;
use mdcontainer_core::{ItemRegistry, ItemStack};
use mdcontainer_inventory::InventorySlot;
use std::sync::Arc;
use thiserror::Error;

/// Failure reported by an interaction behavior.
#[derive(Debug, Error)]
pub enum BehaviorError {
    /// The gesture is not allowed in this window.
    #[error("gesture rejected: {0}")]
    Rejected(String),
    /// The slot cannot take part in the gesture.
    #[error("slot {slot} unusable: {reason}")]
    Slot {
        /// Global slot index.
        slot: usize,
        /// What went wrong.
        reason: String,
    },
}

/// Read-only view of the window handed to behaviors.
#[derive(Debug, Clone, Copy)]
pub struct ClickContext<'a> {
    container_id: u8,
    player: Option<&'a ClientPlayer>,
    registry: &'a ItemRegistry,
    shadow: &'a ContainerShadow,
    index: &'a SlotIndexMap,
}

impl<'a> ClickContext<'a> {
    pub(crate) fn new(
        container_id: u8,
        player: Option<&'a ClientPlayer>,
        registry: &'a ItemRegistry,
        shadow: &'a ContainerShadow,
        index: &'a SlotIndexMap,
    ) -> Self {
        Self {
            container_id,
            player,
            registry,
            shadow,
            index,
        }
    }

    /// Wire id of the window.
    pub fn container_id(&self) -> u8 {
        self.container_id
    }

    /// Attached player, if any.
    pub fn player(&self) -> Option<&'a ClientPlayer> {
        self.player
    }

    /// Item descriptors for stack limits.
    pub fn registry(&self) -> &'a ItemRegistry {
        self.registry
    }

    /// The cursor cell.
    pub fn cursor(&self) -> &'a ClientSlot {
        self.shadow.cell(CellIndex::Cursor)
    }

    /// Number of visible slots.
    pub fn len(&self) -> usize {
        self.shadow.len()
    }

    /// Always false.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Semantic reference to a visible slot.
    pub fn slot(&self, index: usize) -> SlotRef<'a> {
        let (part, local) = self
            .index
            .to_local(index)
            .unwrap_or_else(|| panic!("slot {index} out of range"));
        SlotRef {
            index,
            part,
            local,
            flags: self.shadow.flag(index),
            cell: self.shadow.cell(CellIndex::Slot(index)),
        }
    }
}

/// A visible slot as seen by a behavior.
#[derive(Debug, Clone, Copy)]
pub struct SlotRef<'a> {
    /// Global index.
    pub index: usize,
    /// Part the slot belongs to.
    pub part: PartKind,
    /// Index within the part.
    pub local: usize,
    /// Compiled flags.
    pub flags: SlotFlags,
    /// Shadow cell.
    pub cell: &'a ClientSlot,
}

impl<'a> SlotRef<'a> {
    /// Item currently shown.
    pub fn item(&self) -> Option<ItemStack> {
        self.cell.item()
    }

    /// Backing inventory slot, for bound cells.
    pub fn backing(&self) -> Option<&'a Arc<InventorySlot>> {
        self.cell.backing()
    }
}

/// Inventory rules for one window kind. Every method defaults to doing nothing.
///
/// Errors and panics are caught by the container and logged; the shadow
/// corrections already queued for the gesture are still sent.
#[allow(unused_variables)]
pub trait InteractionBehavior: Send {
    /// Plain left or right click on a slot.
    fn click(
        &mut self,
        ctx: &ClickContext<'_>,
        slot: SlotRef<'_>,
        button: MouseButton,
    ) -> Result<(), BehaviorError> {
        Ok(())
    }

    /// Click outside the window area.
    fn click_outside(
        &mut self,
        ctx: &ClickContext<'_>,
        button: MouseButton,
    ) -> Result<(), BehaviorError> {
        Ok(())
    }

    /// Shift click; the engine has already predicted where the stack moves.
    fn shift_click(
        &mut self,
        ctx: &ClickContext<'_>,
        slot: SlotRef<'_>,
        button: MouseButton,
    ) -> Result<(), BehaviorError> {
        Ok(())
    }

    /// `merge` is the engine's prediction; the behavior computes the real result.
    fn double_click(
        &mut self,
        ctx: &ClickContext<'_>,
        slot: SlotRef<'_>,
        merge: &MergeOutcome,
    ) -> Result<(), BehaviorError> {
        Ok(())
    }

    /// Completed drag over `slots` in drag order.
    fn drag(
        &mut self,
        ctx: &ClickContext<'_>,
        slots: &[SlotRef<'_>],
        mode: DragMode,
    ) -> Result<(), BehaviorError> {
        Ok(())
    }

    /// `slot` is `None` for drops outside the window.
    fn drop_item(
        &mut self,
        ctx: &ClickContext<'_>,
        slot: Option<SlotRef<'_>>,
        full_stack: bool,
    ) -> Result<(), BehaviorError> {
        Ok(())
    }

    /// Swap `slot` with the hotbar slot picked by a number key.
    fn number_key(
        &mut self,
        ctx: &ClickContext<'_>,
        slot: SlotRef<'_>,
        hotbar: SlotRef<'_>,
    ) -> Result<(), BehaviorError> {
        Ok(())
    }

    /// Creative middle click on a slot.
    fn middle_click(
        &mut self,
        ctx: &ClickContext<'_>,
        slot: SlotRef<'_>,
    ) -> Result<(), BehaviorError> {
        Ok(())
    }

    /// Only called for creative players. `slot` is `None` outside the window.
    fn creative_click(
        &mut self,
        ctx: &ClickContext<'_>,
        slot: Option<SlotRef<'_>>,
        item: Option<&ItemStack>,
    ) -> Result<(), BehaviorError> {
        Ok(())
    }

    /// Pick block: the client asks for the item in `slot` to move to the hotbar.
    fn pick(&mut self, ctx: &ClickContext<'_>, slot: SlotRef<'_>) -> Result<(), BehaviorError> {
        Ok(())
    }
}

/// Behavior that accepts every gesture and changes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBehavior;

impl InteractionBehavior for NoopBehavior {}
