//! Item stacks as seen by containers and the wire protocol.

use serde::{Deserialize, Serialize};

/// Item identifier referencing the [`crate::ItemRegistry`].
pub type ItemId = u16;

/// Stack size used for items without a registered descriptor.
pub const DEFAULT_MAX_STACK_SIZE: u32 = 64;

/// A stack of items occupying one slot.
///
/// A stack with `count == 0` is treated as empty everywhere; slots normally
/// store `None` instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    /// Item type identifier.
    pub item_id: ItemId,
    /// Number of items in this stack.
    pub count: u32,
    /// Opaque item metadata (damage, enchantments, custom names...).
    pub metadata: Option<Vec<u8>>,
}

impl ItemStack {
    /// Create a new item stack without metadata.
    pub fn new(item_id: ItemId, count: u32) -> Self {
        Self {
            item_id,
            count,
            metadata: None,
        }
    }

    /// Create an item stack carrying metadata.
    pub fn with_metadata(item_id: ItemId, count: u32, metadata: Vec<u8>) -> Self {
        Self {
            item_id,
            count,
            metadata: Some(metadata),
        }
    }

    /// Whether this stack holds no items.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Whether two stacks are the same kind of item and could share a slot.
    ///
    /// Quantity is ignored.
    pub fn is_similar(&self, other: &ItemStack) -> bool {
        self.item_id == other.item_id && self.metadata == other.metadata
    }

    /// Copy of this stack with a different quantity.
    pub fn with_count(&self, count: u32) -> Self {
        Self {
            item_id: self.item_id,
            count,
            metadata: self.metadata.clone(),
        }
    }

    /// Split `amount` items off into a new stack.
    pub fn split(&mut self, amount: u32) -> Option<ItemStack> {
        if amount == 0 || amount > self.count {
            return None;
        }
        self.count -= amount;
        Some(self.with_count(amount))
    }
}
