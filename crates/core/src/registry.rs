//! Namespaced item keys and the item-type registry.
//!
//! The registry answers one question for the container layer: how many items
//! of a given type fit in a single slot. Every item type declares a default
//! maximum; server configuration may override it per key.

use crate::item::{ItemId, ItemStack, DEFAULT_MAX_STACK_SIZE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default namespace used when a key omits an explicit namespace.
pub const DEFAULT_NAMESPACE: &str = "mdm";

/// Error returned when parsing an invalid [`RegistryKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryKeyError {
    /// Input was empty or whitespace.
    #[error("registry key cannot be empty")]
    Empty,
    /// Namespace segment was empty, too long or had invalid characters.
    #[error("invalid registry key namespace {0:?} (allowed: a-z0-9_.-, max 64)")]
    Namespace(String),
    /// Path segment was empty, too long or had invalid characters.
    #[error("invalid registry key path {0:?} (allowed: a-z0-9_./-, max 128)")]
    Path(String),
}

/// Errors raised while building an [`ItemRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A key failed to parse.
    #[error(transparent)]
    Key(#[from] RegistryKeyError),
    /// Two descriptors share an id.
    #[error("item id {0} is already registered")]
    DuplicateId(ItemId),
    /// Two descriptors share a key.
    #[error("item key {0} is already registered")]
    DuplicateKey(RegistryKey),
    /// Override for a key nobody registered.
    #[error("unknown item key {0}")]
    UnknownKey(RegistryKey),
    /// Stack sizes must allow at least one item.
    #[error("max stack size for {0} must be at least 1")]
    ZeroStackSize(RegistryKey),
}

/// A namespaced key of the form `namespace:path`.
///
/// Ordering is lexical by `(namespace, path)` and is stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegistryKey {
    namespace: String,
    path: String,
}

impl RegistryKey {
    /// Parse `namespace:path` or a bare `path` in [`DEFAULT_NAMESPACE`].
    pub fn parse(input: &str) -> Result<Self, RegistryKeyError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(RegistryKeyError::Empty);
        }
        let (namespace, path) = input.split_once(':').unwrap_or((DEFAULT_NAMESPACE, input));
        let (namespace, path) = (namespace.trim(), path.trim());

        let ns_ok = !namespace.is_empty()
            && namespace.len() <= 64
            && namespace
                .chars()
                .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.'));
        if !ns_ok {
            return Err(RegistryKeyError::Namespace(namespace.to_string()));
        }
        let path_ok = !path.is_empty()
            && path.len() <= 128
            && path
                .chars()
                .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.' | '/'));
        if !path_ok {
            return Err(RegistryKeyError::Path(path.to_string()));
        }

        Ok(Self {
            namespace: namespace.to_string(),
            path: path.to_string(),
        })
    }

    /// Registry key namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Registry key path.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for RegistryKey {
    type Err = RegistryKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Static description of one item type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDescriptor {
    /// Numeric id used in item stacks and on the wire.
    pub id: ItemId,
    /// Stable key used by configuration.
    pub key: RegistryKey,
    /// Declared maximum stack size.
    pub max_stack_size: u32,
}

impl ItemDescriptor {
    /// Build a descriptor from a key string.
    pub fn new(id: ItemId, key: &str, max_stack_size: u32) -> Result<Self, RegistryError> {
        let key = RegistryKey::parse(key)?;
        if max_stack_size == 0 {
            return Err(RegistryError::ZeroStackSize(key));
        }
        Ok(Self {
            id,
            key,
            max_stack_size,
        })
    }
}

/// Item-type registry with per-type stack size overrides.
#[derive(Debug, Clone, Default)]
pub struct ItemRegistry {
    descriptors: BTreeMap<ItemId, ItemDescriptor>,
    by_key: BTreeMap<RegistryKey, ItemId>,
    overrides: BTreeMap<ItemId, u32>,
}

impl ItemRegistry {
    /// Create an empty registry. Unknown items stack to [`DEFAULT_MAX_STACK_SIZE`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the handful of item types the demo harness and tests use.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let defaults = [
            (1, "stone", 64),
            (2, "dirt", 64),
            (3, "oak_planks", 64),
            (256, "iron_shovel", 1),
            (267, "iron_sword", 1),
            (332, "snowball", 16),
            (368, "ender_pearl", 16),
            (264, "diamond", 64),
        ];
        for (id, key, max) in defaults {
            let registered =
                ItemDescriptor::new(id, key, max).and_then(|descriptor| registry.register(descriptor));
            debug_assert!(registered.is_ok(), "default item {key} rejected: {registered:?}");
        }
        registry
    }

    /// Register a new item type.
    pub fn register(&mut self, descriptor: ItemDescriptor) -> Result<(), RegistryError> {
        if self.descriptors.contains_key(&descriptor.id) {
            return Err(RegistryError::DuplicateId(descriptor.id));
        }
        if self.by_key.contains_key(&descriptor.key) {
            return Err(RegistryError::DuplicateKey(descriptor.key));
        }
        self.by_key.insert(descriptor.key.clone(), descriptor.id);
        self.descriptors.insert(descriptor.id, descriptor);
        Ok(())
    }

    /// Look up an item id by key.
    pub fn id_by_key(&self, key: &RegistryKey) -> Option<ItemId> {
        self.by_key.get(key).copied()
    }

    /// Look up the descriptor of an item id.
    pub fn descriptor(&self, id: ItemId) -> Option<&ItemDescriptor> {
        self.descriptors.get(&id)
    }

    /// Override the maximum stack size of a registered item type.
    pub fn set_max_stack_size(&mut self, key: &str, size: u32) -> Result<(), RegistryError> {
        let key = RegistryKey::parse(key)?;
        if size == 0 {
            return Err(RegistryError::ZeroStackSize(key));
        }
        let id = self
            .id_by_key(&key)
            .ok_or(RegistryError::UnknownKey(key))?;
        self.overrides.insert(id, size);
        Ok(())
    }

    /// True maximum stack size of an item id: override, else declared default.
    pub fn max_stack_size_of(&self, id: ItemId) -> u32 {
        if let Some(size) = self.overrides.get(&id) {
            return *size;
        }
        self.descriptors
            .get(&id)
            .map(|d| d.max_stack_size)
            .unwrap_or(DEFAULT_MAX_STACK_SIZE)
    }

    /// True maximum stack size for a stack's item type.
    pub fn max_stack_size(&self, stack: &ItemStack) -> u32 {
        self.max_stack_size_of(stack.item_id)
    }

    /// Number of registered item types.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether no item types are registered.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
