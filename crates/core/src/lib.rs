#![warn(missing_docs)]
//! Core item primitives shared across the workspace.

pub mod item;
pub mod registry;

pub use item::{ItemId, ItemStack, DEFAULT_MAX_STACK_SIZE};
pub use registry::{
    ItemDescriptor, ItemRegistry, RegistryError, RegistryKey, RegistryKeyError, DEFAULT_NAMESPACE,
};

/// Fixed tick type (20 TPS => 50 ms per tick).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct SimTick(pub u64);

impl SimTick {
    /// First tick of a session.
    pub const ZERO: Self = Self(0);

    /// Advance by `delta` ticks.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0 + delta)
    }
}
