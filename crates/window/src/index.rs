//! Part-local, global and client slot index translation.
//!
//! Global (server) indices run over the top part first and the 36-slot player
//! block after it. Client indices are a bijection of the global ones, the
//! identity unless the window kind orders its slots differently on screen.

use crate::error::WindowError;
use mdcontainer_inventory::MAIN_INVENTORY_SIZE;
use mdcontainer_net::{LEGACY_OUTSIDE_WINDOW_SLOT, MAX_WINDOW_SLOTS, OUTSIDE_WINDOW_SLOT};

/// Which half of a window a slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartKind {
    /// The window's own inventory.
    Top,
    /// The player's main inventory and hotbar.
    Bottom,
}

/// Where an untrusted client index points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientTarget {
    /// A visible slot, as a global index.
    Slot(usize),
    /// Outside the window.
    Outside,
}

/// Index translation for one window layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotIndexMap {
    top_len: usize,
    client_to_server: Option<Vec<usize>>,
    server_to_client: Option<Vec<usize>>,
}

impl SlotIndexMap {
    /// Identity mapping for a window with `top_len` custom slots.
    pub fn new(top_len: usize) -> Result<Self, WindowError> {
        let len = top_len + MAIN_INVENTORY_SIZE;
        if len > MAX_WINDOW_SLOTS {
            return Err(WindowError::TooManySlots(len));
        }
        Ok(Self {
            top_len,
            client_to_server: None,
            server_to_client: None,
        })
    }

    /// Mapping where client index `c` shows server slot `order[c]`.
    pub fn with_client_order(top_len: usize, order: Vec<usize>) -> Result<Self, WindowError> {
        let mut map = Self::new(top_len)?;
        let len = map.len();
        if order.len() != len {
            return Err(WindowError::OrderLength {
                expected: len,
                found: order.len(),
            });
        }

        let mut inverse = vec![usize::MAX; len];
        for (client, &server) in order.iter().enumerate() {
            if server >= len || inverse[server] != usize::MAX {
                return Err(WindowError::NotABijection(server));
            }
            inverse[server] = client;
        }

        map.client_to_server = Some(order);
        map.server_to_client = Some(inverse);
        Ok(map)
    }

    /// Number of custom slots.
    pub fn top_len(&self) -> usize {
        self.top_len
    }

    /// Number of visible slots.
    pub fn len(&self) -> usize {
        self.top_len + MAIN_INVENTORY_SIZE
    }

    /// Always false: every window shows the player block.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of slots in a part.
    pub fn part_len(&self, part: PartKind) -> usize {
        match part {
            PartKind::Top => self.top_len,
            PartKind::Bottom => MAIN_INVENTORY_SIZE,
        }
    }

    /// Global index of a part-local index.
    ///
    /// Panics when `local` is outside the part; callers pass trusted indices only.
    pub fn to_global(&self, part: PartKind, local: usize) -> usize {
        let part_len = self.part_len(part);
        assert!(
            local < part_len,
            "{part:?} slot {local} out of range (part has {part_len} slots)"
        );
        match part {
            PartKind::Top => local,
            PartKind::Bottom => self.top_len + local,
        }
    }

    /// Part and part-local index of a global index.
    pub fn to_local(&self, global: usize) -> Option<(PartKind, usize)> {
        if global < self.top_len {
            Some((PartKind::Top, global))
        } else if global < self.len() {
            Some((PartKind::Bottom, global - self.top_len))
        } else {
            None
        }
    }

    /// Client index of a global index.
    pub fn to_client(&self, global: usize) -> i16 {
        assert!(global < self.len(), "slot {global} out of range");
        let client = match &self.server_to_client {
            Some(table) => table[global],
            None => global,
        };
        // len <= MAX_WINDOW_SLOTS keeps this in range
        client as i16
    }

    /// Resolve an untrusted client index. `None` when it addresses nothing.
    pub fn from_client(&self, client: i16) -> Option<ClientTarget> {
        if client == OUTSIDE_WINDOW_SLOT || client == LEGACY_OUTSIDE_WINDOW_SLOT {
            return Some(ClientTarget::Outside);
        }
        let client = usize::try_from(client).ok()?;
        if client >= self.len() {
            return None;
        }
        let server = match &self.client_to_server {
            Some(table) => table[client],
            None => client,
        };
        Some(ClientTarget::Slot(server))
    }
}
