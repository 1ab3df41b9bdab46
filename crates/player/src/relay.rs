//! Listener registry for the native event relay.

use std::collections::HashMap;

use surface::{ListenerId, NativeEvent};

/// Maps each native event to the listener currently attached for it.
///
/// Non-empty only while content (not ad) playback is wired up. When
/// non-empty its key set equals `NativeEvent::ALL`; registration is
/// all-or-nothing.
#[derive(Debug, Default)]
pub struct EventRegistry {
    handlers: HashMap<NativeEvent, ListenerId>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the listener attached for `event`.
    pub fn insert(&mut self, event: NativeEvent, id: ListenerId) {
        self.handlers.insert(event, id);
    }

    /// Remove and return every recorded listener. Idempotent: an
    /// empty registry drains to nothing.
    pub fn drain(&mut self) -> Vec<ListenerId> {
        self.handlers.drain().map(|(_, id)| id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check whether the registry covers the full event map.
    pub fn is_complete(&self) -> bool {
        self.handlers.len() == NativeEvent::ALL.len()
    }
}
