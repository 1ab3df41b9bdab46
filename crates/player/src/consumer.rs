//! Consumer event bus seam.

use std::sync::Arc;

use surface::{SurfaceEvent, VideoSurface};

/// Payload delivered with every consumer event.
#[derive(Clone)]
pub struct EventPayload {
    /// The surface the event originated from.
    pub surface: Arc<dyn VideoSurface>,
    /// The native occurrence; `None` for ad-boundary events, which
    /// are raised by the player itself rather than the surface.
    pub event: Option<SurfaceEvent>,
}

impl EventPayload {
    /// Payload for a relayed native event.
    pub fn native(surface: Arc<dyn VideoSurface>, event: SurfaceEvent) -> Self {
        Self {
            surface,
            event: Some(event),
        }
    }

    /// Payload for a player-raised event (ad boundaries).
    pub fn bare(surface: Arc<dyn VideoSurface>) -> Self {
        Self {
            surface,
            event: None,
        }
    }
}

/// The hosting component that receives player events.
///
/// Every event is fired twice: once on its dedicated channel
/// (`$videoPlayerPlaying`, `$videoPlayerAdStart`, ...) and once on the
/// catch-all `$videoPlayerEvent` channel carrying the label.
pub trait EventConsumer: Send + Sync {
    /// Receive an event on its dedicated channel.
    fn fire(&self, channel: &str, payload: &EventPayload);

    /// Receive an event on the catch-all channel.
    fn fire_event(&self, label: &str, payload: &EventPayload) {
        let _ = (label, payload);
    }
}

/// Prefix for dedicated consumer channels.
pub const CHANNEL_PREFIX: &str = "$videoPlayer";

/// Name of the catch-all consumer channel.
pub const EVENT_CHANNEL: &str = "$videoPlayerEvent";

/// Build the dedicated channel name for an event label.
pub fn channel_for(label: &str) -> String {
    format!("{CHANNEL_PREFIX}{label}")
}
