//! In-memory render surface.
//!
//! Stands in for the platform video element in headless runs and
//! tests: it keeps the element state (source, time, duration,
//! geometry, visibility) and emits the native events a real surface
//! would emit for each operation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use common::{MediaError, SurfaceRect};

use crate::events::{NativeEvent, SurfaceEvent};
use crate::surface::{Listener, ListenerId, VideoSurface};

/// In-memory video surface.
pub struct SimulatedSurface {
    /// Source URL.
    src: RwLock<Option<String>>,
    /// Playback position in seconds.
    current_time: RwLock<f64>,
    /// Duration in seconds; `None` until metadata is loaded.
    duration: RwLock<Option<f64>>,
    /// Whether playback is running.
    playing: RwLock<bool>,
    /// Muted flag.
    muted: RwLock<bool>,
    /// Loop flag.
    looping: RwLock<bool>,
    /// Visibility flag.
    visible: RwLock<bool>,
    /// Placement in device pixels.
    rect: RwLock<SurfaceRect>,
    /// Attached listeners, in registration order.
    listeners: RwLock<Vec<(ListenerId, NativeEvent, Listener)>>,
    /// Next listener id.
    next_listener_id: AtomicU64,
}

impl SimulatedSurface {
    /// Create a new surface with nothing loaded.
    pub fn new() -> Self {
        Self {
            src: RwLock::new(None),
            current_time: RwLock::new(0.0),
            duration: RwLock::new(None),
            playing: RwLock::new(false),
            muted: RwLock::new(false),
            looping: RwLock::new(false),
            visible: RwLock::new(false),
            rect: RwLock::new(SurfaceRect::default()),
            listeners: RwLock::new(Vec::new()),
            next_listener_id: AtomicU64::new(1),
        }
    }

    /// Complete the pending metadata load: record the duration and
    /// emit `durationchange` followed by `loadedmetadata`.
    pub fn finish_loading(&self, duration: f64) {
        *self.duration.write() = Some(duration);
        self.emit_kind(NativeEvent::DurationChange);
        self.emit_kind(NativeEvent::LoadedMetadata);
    }

    /// Advance the clock by `delta` seconds while playing, emitting
    /// `timeupdate` and, at the end of media, `ended`.
    pub fn advance(&self, delta: f64) {
        if !*self.playing.read() {
            return;
        }
        let mut ended = false;
        {
            let mut time = self.current_time.write();
            *time += delta;
            if let Some(duration) = *self.duration.read() {
                if *time >= duration {
                    if *self.looping.read() {
                        *time = 0.0;
                    } else {
                        *time = duration;
                        ended = true;
                    }
                }
            }
        }
        self.emit_kind(NativeEvent::TimeUpdate);
        if ended {
            *self.playing.write() = false;
            self.emit_kind(NativeEvent::Ended);
        }
    }

    /// Check if playback is running.
    pub fn playing(&self) -> bool {
        *self.playing.read()
    }

    /// Deliver an event to every listener attached for its kind.
    pub fn emit(&self, event: &SurfaceEvent) {
        // Snapshot outside the lock: listeners may re-enter the
        // surface (the seeked hook calls play).
        let matching: Vec<Listener> = self
            .listeners
            .read()
            .iter()
            .filter(|(_, kind, _)| *kind == event.kind)
            .map(|(_, _, listener)| listener.clone())
            .collect();
        tracing::trace!(event = event.kind.name(), listeners = matching.len(), "surface event");
        for listener in matching {
            listener(event);
        }
    }

    fn emit_kind(&self, kind: NativeEvent) {
        let event = SurfaceEvent::new(kind, *self.current_time.read());
        self.emit(&event);
    }

    /// Number of attached listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }
}

impl Default for SimulatedSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoSurface for SimulatedSurface {
    fn src(&self) -> Option<String> {
        self.src.read().clone()
    }

    fn set_src(&self, url: &str) {
        *self.src.write() = Some(url.to_string());
        // New media: metadata must load again.
        *self.duration.write() = None;
        *self.current_time.write() = 0.0;
    }

    fn clear_src(&self) {
        *self.src.write() = None;
    }

    fn load(&self) {
        if self.src.read().is_none() {
            *self.playing.write() = false;
            *self.current_time.write() = 0.0;
            *self.duration.write() = None;
            self.emit_kind(NativeEvent::Emptied);
        } else {
            self.emit_kind(NativeEvent::LoadStart);
        }
    }

    fn play(&self) {
        if self.src.read().is_none() {
            let event = SurfaceEvent::error(*self.current_time.read(), MediaError::SrcNotSupported);
            self.emit(&event);
            return;
        }
        *self.playing.write() = true;
        self.emit_kind(NativeEvent::Play);
        self.emit_kind(NativeEvent::Playing);
    }

    fn pause(&self) {
        *self.playing.write() = false;
        self.emit_kind(NativeEvent::Pause);
    }

    fn muted(&self) -> bool {
        *self.muted.read()
    }

    fn set_muted(&self, muted: bool) {
        *self.muted.write() = muted;
        self.emit_kind(NativeEvent::VolumeChange);
    }

    fn looping(&self) -> bool {
        *self.looping.read()
    }

    fn set_looping(&self, looping: bool) {
        *self.looping.write() = looping;
    }

    fn current_time(&self) -> f64 {
        *self.current_time.read()
    }

    fn set_current_time(&self, time: f64) {
        self.emit_kind(NativeEvent::Seeking);
        let clamped = match *self.duration.read() {
            Some(duration) => time.clamp(0.0, duration),
            None => time.max(0.0),
        };
        *self.current_time.write() = clamped;
        self.emit_kind(NativeEvent::Seeked);
    }

    fn duration(&self) -> Option<f64> {
        *self.duration.read()
    }

    fn rect(&self) -> SurfaceRect {
        *self.rect.read()
    }

    fn set_position(&self, top: f64, left: f64) {
        let mut rect = self.rect.write();
        rect.top = top;
        rect.left = left;
    }

    fn set_size(&self, width: f64, height: f64) {
        let mut rect = self.rect.write();
        rect.width = width;
        rect.height = height;
    }

    fn visible(&self) -> bool {
        *self.visible.read()
    }

    fn show(&self) {
        *self.visible.write() = true;
    }

    fn hide(&self) {
        *self.visible.write() = false;
    }

    fn add_listener(&self, event: NativeEvent, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_listener_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, event, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.write().retain(|(listener_id, _, _)| *listener_id != id);
    }
}
