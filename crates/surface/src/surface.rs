//! The render surface seam.

use std::sync::Arc;

use common::SurfaceRect;

use crate::events::{NativeEvent, SurfaceEvent};

/// Identifies an installed event listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Callback invoked when a native event fires.
pub type Listener = Arc<dyn Fn(&SurfaceEvent) + Send + Sync>;

/// A native video-rendering surface.
///
/// The platform integration implements this; the orchestrator is its
/// only driver and exclusively owns listener registration on it.
pub trait VideoSurface: Send + Sync {
    /// Get the current source URL, if any.
    fn src(&self) -> Option<String>;

    /// Set the source URL.
    fn set_src(&self, url: &str);

    /// Remove the source URL.
    fn clear_src(&self);

    /// (Re)load the current source. With no source set this empties
    /// the surface.
    fn load(&self);

    /// Start playback.
    fn play(&self);

    /// Pause playback.
    fn pause(&self);

    /// Check if muted.
    fn muted(&self) -> bool;

    /// Set muted state.
    fn set_muted(&self, muted: bool);

    /// Check if looping.
    fn looping(&self) -> bool;

    /// Set loop state.
    fn set_looping(&self, looping: bool);

    /// Get playback position in seconds.
    fn current_time(&self) -> f64;

    /// Seek to a position in seconds.
    fn set_current_time(&self, time: f64);

    /// Get media duration in seconds; `None` until metadata is known.
    fn duration(&self) -> Option<f64>;

    /// Get surface placement in device pixels.
    fn rect(&self) -> SurfaceRect;

    /// Set surface origin in device pixels.
    fn set_position(&self, top: f64, left: f64);

    /// Set surface size in device pixels.
    fn set_size(&self, width: f64, height: f64);

    /// Check if the surface is visible.
    fn visible(&self) -> bool;

    /// Show the surface.
    fn show(&self);

    /// Hide the surface.
    fn hide(&self);

    /// Attach a listener for one native event.
    fn add_listener(&self, event: NativeEvent, listener: Listener) -> ListenerId;

    /// Detach a previously attached listener. Unknown ids are ignored.
    fn remove_listener(&self, id: ListenerId);
}
