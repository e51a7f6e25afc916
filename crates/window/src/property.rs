//! Polled window properties (furnace progress, brewing time...).

use mdcontainer_net::{ServerMessage, WireContainerId};
use std::fmt;

type Poll = Box<dyn FnMut() -> i32 + Send>;

struct Property {
    index: u16,
    poll: Poll,
    last_sent: Option<i32>,
}

/// Registered properties and the value each one last sent.
#[derive(Default)]
pub struct PropertyTracker {
    properties: Vec<Property>,
}

impl fmt::Debug for PropertyTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.properties.iter().map(|p| (p.index, p.last_sent)))
            .finish()
    }
}

impl PropertyTracker {
    /// Empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `poll` under `index`, replacing any previous registration.
    pub fn register(&mut self, index: u16, poll: impl FnMut() -> i32 + Send + 'static) {
        self.properties.retain(|p| p.index != index);
        self.properties.push(Property {
            index,
            poll: Box::new(poll),
            last_sent: None,
        });
    }

    /// Number of registered properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Poll every property and emit an update for each changed value.
    ///
    /// With `force` every property is emitted.
    pub fn collect(&mut self, container_id: WireContainerId, force: bool) -> Vec<ServerMessage> {
        let mut messages = Vec::new();
        for property in &mut self.properties {
            let value = (property.poll)();
            if force || property.last_sent != Some(value) {
                property.last_sent = Some(value);
                messages.push(ServerMessage::PropertyUpdate {
                    container_id,
                    property: property.index,
                    value,
                });
            }
        }
        messages
    }
}
