use crate::cell::CellIndex;
use crate::flags::SlotFlags;
use crate::shadow::ContainerShadow;
use mdcontainer_core::{ItemRegistry, ItemStack};

/// Item picked up by the first click of a possible double click.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDoubleClick {
    /// Slot the item came from.
    pub origin: usize,
    /// Snapshot of the item at the time of the first click.
    pub item: ItemStack,
}

/// Prediction of a double-click merge.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// Slot of the first click.
    pub origin: usize,
    /// Predicted cursor quantity, never above the item's true max stack size.
    pub quantity: u32,
    /// Slots expected to give up items, in visit order.
    pub absorbed: Vec<usize>,
}

/// At most one pending double-click candidate.
#[derive(Debug, Default)]
pub struct DoubleClickState {
    pending: Option<PendingDoubleClick>,
}

impl DoubleClickState {
    /// Remember the item under a plain click. Empty items clear the candidate.
    pub fn record(&mut self, origin: usize, item: Option<ItemStack>) {
        self.pending = item
            .filter(|stack| !stack.is_empty())
            .map(|item| PendingDoubleClick { origin, item });
    }

    /// Forget the candidate.
    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Current candidate.
    pub fn pending(&self) -> Option<&PendingDoubleClick> {
        self.pending.as_ref()
    }

    /// Complete a double click against the pending candidate.
    ///
    /// Partial stacks are gathered before full ones. Each absorbing slot is
    /// marked silent, the cursor safely. The candidate is consumed either way;
    /// `None` when there was none.
    pub fn complete(
        &mut self,
        shadow: &mut ContainerShadow,
        registry: &ItemRegistry,
    ) -> Option<MergeOutcome> {
        let PendingDoubleClick { origin, item } = self.pending.take()?;
        let max = registry.max_stack_size(&item);
        let mut quantity = item.count;
        let mut absorbed = Vec::new();

        for take_full in [false, true] {
            for index in 0..shadow.len() {
                if quantity >= max {
                    break;
                }
                if index == origin
                    || absorbed.contains(&index)
                    || shadow.flag(index).contains(SlotFlags::IGNORE_DOUBLE_CLICK)
                {
                    continue;
                }
                let Some(other) = shadow.item(CellIndex::Slot(index)) else {
                    continue;
                };
                if !other.is_similar(&item) || (other.count >= max) != take_full {
                    continue;
                }
                quantity += other.count.min(max - quantity);
                absorbed.push(index);
            }
        }

        for &index in &absorbed {
            shadow.queue_silent_slot_change_safely(CellIndex::Slot(index));
        }
        shadow.queue_slot_change_safely(CellIndex::Cursor);

        Some(MergeOutcome {
            origin,
            quantity,
            absorbed,
        })
    }
}
