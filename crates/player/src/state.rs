//! Playback state record.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

/// Mutable playback state owned by the orchestrator.
///
/// Flags are individual atomics and the two richer fields sit behind
/// their own mutexes, so internal hooks that re-enter player commands
/// never hold a lock another path needs.
#[derive(Debug, Default)]
pub struct PlaybackState {
    /// True between a native `play` event and the next native `pause`
    /// event. Driven by native events only, never by command calls.
    playing: AtomicBool,
    /// True while a preroll sequence is in progress. Mutated only via
    /// the orchestrator's ad-break transitions.
    playing_ads: AtomicBool,
    /// Sticky host toggle, read when opening new media.
    ads_enabled: AtomicBool,
    /// Accumulator for coalesced skip requests; `None` = no pending
    /// skip.
    skip_time: Mutex<Option<f64>>,
    /// Whether playback should resume after the in-flight seek
    /// sequence; `None` = no seek in flight.
    play_after_seek: Mutex<Option<bool>>,
}

impl PlaybackState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    pub fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::Release);
    }

    pub fn playing_ads(&self) -> bool {
        self.playing_ads.load(Ordering::Acquire)
    }

    pub(crate) fn set_playing_ads(&self, playing_ads: bool) {
        self.playing_ads.store(playing_ads, Ordering::Release);
    }

    pub fn ads_enabled(&self) -> bool {
        self.ads_enabled.load(Ordering::Acquire)
    }

    pub fn set_ads_enabled(&self, enabled: bool) {
        self.ads_enabled.store(enabled, Ordering::Release);
    }

    /// Fold a skip delta into the accumulator, seeding it with
    /// `base_time` when no skip is pending. Returns the accumulated
    /// target.
    pub fn accumulate_skip(&self, base_time: f64, delta: f64) -> f64 {
        let mut skip_time = self.skip_time.lock();
        let target = skip_time.unwrap_or(base_time) + delta;
        *skip_time = Some(target);
        target
    }

    /// Take the pending skip target, leaving the accumulator idle.
    pub fn take_skip(&self) -> Option<f64> {
        self.skip_time.lock().take()
    }

    /// Capture the resumption decision at the start of a seek
    /// sequence. Later seeks in the same sequence keep the first
    /// decision.
    pub fn capture_play_after_seek(&self, playing: bool) {
        let mut flag = self.play_after_seek.lock();
        if flag.is_none() {
            *flag = Some(playing);
        }
    }

    /// Take the resumption decision, unconditionally clearing it.
    pub fn take_play_after_seek(&self) -> Option<bool> {
        self.play_after_seek.lock().take()
    }
}
