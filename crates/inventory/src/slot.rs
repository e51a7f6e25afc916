//! A single authoritative inventory slot with change-tracker subscriptions.
//!
//! Slots are shared between every container that displays them, so they live
//! behind an `Arc` and guard their own state. Containers never hold callbacks
//! into each other; instead each subscribed tracker gets a "changed" bit that
//! the slot sets on every mutation and the tracker drains when it flushes.

use mdcontainer_core::ItemStack;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TRACKER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a change tracker (one per container).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackerId(u64);

impl TrackerId {
    /// Allocate a process-unique tracker id.
    pub fn allocate() -> Self {
        Self(NEXT_TRACKER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value, for logging.
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct Subscription {
    tracker: TrackerId,
    changed: bool,
}

#[derive(Debug, Default)]
struct SlotState {
    item: Option<ItemStack>,
    subscriptions: Vec<Subscription>,
}

/// One authoritative inventory slot.
#[derive(Debug, Default)]
pub struct InventorySlot {
    state: Mutex<SlotState>,
}

impl InventorySlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot holding `item`.
    pub fn with_item(item: ItemStack) -> Self {
        let slot = Self::new();
        slot.state.lock().item = normalize(Some(item));
        slot
    }

    /// Copy of the current item.
    pub fn peek(&self) -> Option<ItemStack> {
        self.state.lock().item.clone()
    }

    /// Borrow the current item without copying it.
    pub fn with_raw_item<R>(&self, f: impl FnOnce(Option<&ItemStack>) -> R) -> R {
        let state = self.state.lock();
        f(state.item.as_ref())
    }

    /// Whether the slot holds nothing.
    pub fn is_empty(&self) -> bool {
        self.state.lock().item.is_none()
    }

    /// Replace the item. Every subscribed tracker is notified if the content changed.
    pub fn set(&self, item: Option<ItemStack>) {
        let item = normalize(item);
        let mut state = self.state.lock();
        if state.item == item {
            return;
        }
        state.item = item;
        for sub in &mut state.subscriptions {
            sub.changed = true;
        }
    }

    /// Remove and return the item.
    pub fn take(&self) -> Option<ItemStack> {
        let current = self.peek();
        self.set(None);
        current
    }

    /// Subscribe a tracker. Returns `false` if it was already subscribed.
    pub fn add_tracker(&self, tracker: TrackerId) -> bool {
        let mut state = self.state.lock();
        if state.subscriptions.iter().any(|s| s.tracker == tracker) {
            return false;
        }
        state.subscriptions.push(Subscription {
            tracker,
            changed: false,
        });
        true
    }

    /// Unsubscribe a tracker. Returns `false` if it was not subscribed.
    pub fn remove_tracker(&self, tracker: TrackerId) -> bool {
        let mut state = self.state.lock();
        let before = state.subscriptions.len();
        state.subscriptions.retain(|s| s.tracker != tracker);
        state.subscriptions.len() != before
    }

    /// Whether `tracker` is subscribed.
    pub fn has_tracker(&self, tracker: TrackerId) -> bool {
        self.state
            .lock()
            .subscriptions
            .iter()
            .any(|s| s.tracker == tracker)
    }

    /// Number of subscribed trackers.
    pub fn tracker_count(&self) -> usize {
        self.state.lock().subscriptions.len()
    }

    /// Consume the pending change notification for `tracker`.
    pub fn take_change(&self, tracker: TrackerId) -> bool {
        let mut state = self.state.lock();
        match state.subscriptions.iter_mut().find(|s| s.tracker == tracker) {
            Some(sub) => std::mem::replace(&mut sub.changed, false),
            None => false,
        }
    }
}

fn normalize(item: Option<ItemStack>) -> Option<ItemStack> {
    item.filter(|stack| !stack.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_count_stacks_read_as_empty() {
        let slot = InventorySlot::with_item(ItemStack::new(1, 0));
        assert!(slot.is_empty());
        slot.set(Some(ItemStack::new(1, 0)));
        assert_eq!(slot.peek(), None);
    }

    #[test]
    fn trackers_see_changes_once() {
        let slot = InventorySlot::new();
        let a = TrackerId::allocate();
        let b = TrackerId::allocate();
        assert!(slot.add_tracker(a));
        assert!(!slot.add_tracker(a));
        slot.add_tracker(b);

        slot.set(Some(ItemStack::new(3, 5)));
        assert!(slot.take_change(a));
        assert!(!slot.take_change(a));
        assert!(slot.take_change(b));
    }

    #[test]
    fn identical_writes_do_not_notify() {
        let slot = InventorySlot::with_item(ItemStack::new(3, 5));
        let t = TrackerId::allocate();
        slot.add_tracker(t);
        slot.set(Some(ItemStack::new(3, 5)));
        assert!(!slot.take_change(t));
    }

    #[test]
    fn removed_tracker_is_forgotten() {
        let slot = InventorySlot::new();
        let t = TrackerId::allocate();
        slot.add_tracker(t);
        assert!(slot.remove_tracker(t));
        assert!(!slot.remove_tracker(t));
        assert!(!slot.has_tracker(t));
        slot.set(Some(ItemStack::new(1, 1)));
        assert!(!slot.take_change(t));
        assert_eq!(slot.tracker_count(), 0);
    }

    #[test]
    fn raw_item_access_does_not_copy() {
        let slot = InventorySlot::with_item(ItemStack::new(8, 12));
        let count = slot.with_raw_item(|item| item.map(|s| s.count));
        assert_eq!(count, Some(12));
        assert_eq!(slot.take(), Some(ItemStack::new(8, 12)));
        assert!(slot.is_empty());
    }
}
