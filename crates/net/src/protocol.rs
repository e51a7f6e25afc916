//! Container message definitions for client-server communication.
//!
//! All messages use postcard serialization for compact binary encoding.
//! Slot indices are client-space indices; the server remaps them before they
//! touch any window state.

use mdcontainer_core::ItemStack;
use serde::{Deserialize, Serialize};

/// Protocol version for compatibility checking.
pub const PROTOCOL_VERSION: u16 = 1;

/// Protocol magic bytes identifying the container protocol.
pub const PROTOCOL_MAGIC: &[u8; 10] = b"MDCW\x00\x01\x00\x00\x00\x00";

/// Container id on the wire. Real windows use 1..=99; negative values are
/// reserved addresses.
pub type WireContainerId = i8;

/// Container id addressing the player's own inventory without touching the
/// open window. Silent (alias) slot updates are sent with this id.
pub const ALIAS_CONTAINER_ID: WireContainerId = -2;

/// Slot index clients send for clicks outside the window.
pub const OUTSIDE_WINDOW_SLOT: i16 = -1;

/// Legacy "outside window" index still sent by vanilla-style clients.
pub const LEGACY_OUTSIDE_WINDOW_SLOT: i16 = -999;

/// Maximum number of slots a single window may expose.
pub const MAX_WINDOW_SLOTS: usize = 256;

/// Maximum window title length (bytes).
pub const MAX_TITLE_LEN: usize = 64;

/// Maximum window kind identifier length (bytes).
pub const MAX_KIND_LEN: usize = 64;

/// Maximum opaque item metadata length (bytes).
pub const MAX_METADATA_LEN: usize = 2048;

/// Largest quantity a single stack may carry on the wire.
pub const MAX_STACK_COUNT: u32 = 127;

/// Window click as sent by the client.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClickEvent {
    /// Window the click targets.
    pub container_id: WireContainerId,
    /// Client-space slot index (negative for outside the window).
    pub slot_index: i16,
    /// Click mode (0..=6 are defined).
    pub mode: u8,
    /// Mouse button, hotbar key or packed drag byte, depending on `mode`.
    pub button: u8,
}

/// Creative-mode slot overwrite.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreativeClickEvent {
    /// Client-space slot index (negative for outside the window).
    pub slot_index: i16,
    /// Item the client placed.
    pub item: Option<ItemStack>,
}

/// Middle-click "pick" on a slot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PickEvent {
    /// Client-space slot index.
    pub slot_index: i16,
}

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ClientMessage {
    /// Window click.
    Click(ClickEvent),
    /// Creative inventory overwrite.
    CreativeClick(CreativeClickEvent),
    /// Pick block/item.
    Pick(PickEvent),
    /// Client closed a window.
    CloseWindow {
        /// Window being closed.
        container_id: WireContainerId,
    },
}

impl ClientMessage {
    /// Verify message limits and validity.
    ///
    /// This should be called on all received messages to prevent DoS attacks.
    /// Unknown click modes pass; the window ignores them with a warning.
    pub fn verify(&self) -> Result<(), &'static str> {
        if let ClientMessage::CreativeClick(CreativeClickEvent {
            item: Some(item), ..
        }) = self
        {
            verify_item(item)?;
        }
        Ok(())
    }
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ServerMessage {
    /// Open a window on the client.
    OpenWindow {
        /// Window id.
        container_id: WireContainerId,
        /// Window kind identifier (e.g. `mdm:chest`).
        kind: String,
        /// Display title.
        title: String,
        /// Number of custom (top) slots.
        slot_count: u16,
    },

    /// Every visible slot of a window, in client index order.
    FullInventorySnapshot {
        /// Window id.
        container_id: WireContainerId,
        /// Item per client slot index.
        items: Vec<Option<ItemStack>>,
    },

    /// Replace the item shown in one slot.
    SlotUpdate {
        /// Window id, or [`ALIAS_CONTAINER_ID`] for silent updates.
        container_id: WireContainerId,
        /// Client-space slot index (alias index for silent updates).
        slot_index: i16,
        /// New item.
        item: Option<ItemStack>,
    },

    /// Replace the floating cursor stack.
    CursorUpdate {
        /// New cursor item.
        item: Option<ItemStack>,
    },

    /// Window property change (furnace progress, enchantment seeds...).
    PropertyUpdate {
        /// Window id.
        container_id: WireContainerId,
        /// Property index.
        property: u16,
        /// New value.
        value: i32,
    },

    /// Close a window on the client.
    CloseWindow {
        /// Window id.
        container_id: WireContainerId,
    },
}

impl ServerMessage {
    /// Verify message limits and validity.
    pub fn verify(&self) -> Result<(), &'static str> {
        match self {
            ServerMessage::OpenWindow { kind, title, .. } => {
                if kind.len() > MAX_KIND_LEN {
                    return Err("Window kind too long");
                }
                if title.len() > MAX_TITLE_LEN {
                    return Err("Window title too long");
                }
            }
            ServerMessage::FullInventorySnapshot { items, .. } => {
                if items.len() > MAX_WINDOW_SLOTS {
                    return Err("Too many slots in snapshot");
                }
                for item in items.iter().flatten() {
                    verify_item(item)?;
                }
            }
            ServerMessage::SlotUpdate {
                item: Some(item), ..
            }
            | ServerMessage::CursorUpdate { item: Some(item) } => {
                verify_item(item)?;
            }
            _ => {}
        }
        Ok(())
    }
}

fn verify_item(item: &ItemStack) -> Result<(), &'static str> {
    if item.count > MAX_STACK_COUNT {
        return Err("Item count too large");
    }
    if item.metadata.as_ref().is_some_and(|m| m.len() > MAX_METADATA_LEN) {
        return Err("Item metadata too large");
    }
    Ok(())
}
