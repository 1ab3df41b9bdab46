//! The playback orchestrator.
//!
//! Owns the render surface, mediates playback commands, runs the ad
//! preroll pipeline on open, and republishes native media events to
//! the consumer. Single logical instance per process; all state lives
//! here with injected collaborators.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;

use surface::{Listener, ListenerId, NativeEvent, SurfaceEvent, VideoSurface};

use crate::ads::{AdRequest, AdService};
use crate::config::PlayerConfig;
use crate::consumer::{channel_for, EventConsumer, EventPayload};
use crate::metrics::{MediaMetrics, MetricsSink};
use crate::relay::EventRegistry;
use crate::state::PlaybackState;

/// Quiescence window for coalescing skip requests into one seek.
const SKIP_DEBOUNCE: Duration = Duration::from_millis(300);

/// Margin kept from the end of media when clamping seeks; landing on
/// the final frame stalls some decoders.
const SEEK_END_MARGIN: f64 = 0.1;

/// Duration approximation sent to the ad service when metadata
/// reported no usable duration.
const AD_DURATION_FALLBACK: f64 = 300.0;

/// Outcome of a playback command.
///
/// Rejected commands have zero side effects and emit zero consumer
/// events; callers may ignore the status entirely (fire and forget).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandStatus {
    /// The command was applied.
    Done,
    /// Dropped: an ad break is in progress.
    AdsActive,
    /// Dropped: no media is loaded.
    NoSource,
}

/// Extra information supplied with `open`.
#[derive(Clone, Debug, Default)]
pub struct OpenDetails {
    /// Content asset id, forwarded to the ad service as `caid`.
    pub video_id: Option<String>,
}

/// The video playback component.
pub struct VideoPlayer {
    config: PlayerConfig,
    surface: Arc<dyn VideoSurface>,
    metrics_sink: Arc<dyn MetricsSink>,
    ad_service: Arc<dyn AdService>,
    /// Back-reference to the hosting component; no ownership implied.
    consumer: RwLock<Option<Arc<dyn EventConsumer>>>,
    /// Handle created fresh on every open.
    metrics: RwLock<Option<Arc<dyn MediaMetrics>>>,
    state: PlaybackState,
    /// Content event listeners currently attached to the surface.
    registry: Mutex<EventRegistry>,
    /// One-shot metadata listener installed by `open`.
    metadata_waiter: Mutex<Option<ListenerId>>,
    /// Pending skip debounce timer.
    skip_task: Mutex<Option<JoinHandle<()>>>,
    /// Epoch for the open pipeline. Every `open` and `close` bumps
    /// it; pending continuations compare before acting, so stale
    /// pipelines stop instead of showing or playing old media.
    generation: AtomicU64,
    runtime: tokio::runtime::Handle,
}

impl VideoPlayer {
    /// Create the player and place its surface.
    ///
    /// Must be called from within a Tokio runtime; the ad pipeline
    /// and the skip debounce run as tasks on it.
    pub fn new(
        config: PlayerConfig,
        surface: Arc<dyn VideoSurface>,
        metrics_sink: Arc<dyn MetricsSink>,
        ad_service: Arc<dyn AdService>,
    ) -> Arc<Self> {
        let precision = config.precision;
        surface.set_position(precision.px(0.0), precision.px(0.0));
        surface.set_size(precision.px(config.width), precision.px(config.height));
        surface.hide();

        let ads_enabled = config.ads_enabled;
        let player = Arc::new(Self {
            config,
            surface,
            metrics_sink,
            ad_service,
            consumer: RwLock::new(None),
            metrics: RwLock::new(None),
            state: PlaybackState::new(),
            registry: Mutex::new(EventRegistry::new()),
            metadata_waiter: Mutex::new(None),
            skip_task: Mutex::new(None),
            generation: AtomicU64::new(0),
            runtime: tokio::runtime::Handle::current(),
        });
        player.state.set_ads_enabled(ads_enabled);
        player
    }

    // Consumer wiring

    /// Attach (or detach) the consumer that receives player events.
    pub fn set_consumer(&self, consumer: Option<Arc<dyn EventConsumer>>) {
        *self.consumer.write() = consumer;
    }

    // Commands

    /// Open new media and run the full preroll pipeline before
    /// content playback starts.
    pub fn open(self: &Arc<Self>, url: &str, details: OpenDetails) -> CommandStatus {
        if !self.can_interact() {
            tracing::debug!(url, "dropping open: ad break in progress");
            return CommandStatus::AdsActive;
        }
        let token = self.bump_generation();
        tracing::info!(url, token, "opening media");

        *self.metrics.write() = Some(self.metrics_sink.media(url));
        let playable = self.config.transform_url(url);

        // Preload for metadata only; playback starts after prerolls.
        self.surface.set_src(&playable);
        self.surface.load();

        self.surface.hide();
        self.deregister_event_listeners();
        self.clear_metadata_waiter();

        // One-shot: the first metadata arrival hands off to the ad
        // pipeline and removes itself.
        let weak = Arc::downgrade(self);
        let caid = details.video_id;
        let waiter: Listener = Arc::new(move |_event: &SurfaceEvent| {
            let Some(player) = weak.upgrade() else { return };
            player.clear_metadata_waiter();
            if player.generation.load(Ordering::Acquire) != token {
                return;
            }
            let pipeline = player.clone();
            let playable = playable.clone();
            let caid = caid.clone();
            player.runtime.spawn(async move {
                pipeline.run_ad_pipeline(token, playable, caid).await;
            });
        });
        let id = self.surface.add_listener(NativeEvent::LoadedMetadata, waiter);
        *self.metadata_waiter.lock() = Some(id);

        CommandStatus::Done
    }

    /// Stop playback and unload the media.
    pub fn close(&self) -> CommandStatus {
        if !self.can_interact() {
            return CommandStatus::AdsActive;
        }
        tracing::info!("closing media");
        self.clear();
        self.surface.hide();
        self.deregister_event_listeners();
        self.clear_metadata_waiter();
        // Invalidate any pipeline still waiting on metadata or ads.
        self.bump_generation();
        CommandStatus::Done
    }

    /// Restart the current media from scratch, including a fresh ad
    /// break.
    pub fn reload(self: &Arc<Self>) -> CommandStatus {
        if !self.can_interact() {
            return CommandStatus::AdsActive;
        }
        let Some(url) = self.surface.src() else {
            return CommandStatus::NoSource;
        };
        self.close();
        self.open(&url, OpenDetails::default())
    }

    /// Remove the source and reset the surface to an empty state.
    pub fn clear(&self) -> CommandStatus {
        if !self.can_interact() {
            return CommandStatus::AdsActive;
        }
        // Pause first so removing the source does not pop audio.
        self.pause();
        self.surface.clear_src();
        self.surface.load();
        CommandStatus::Done
    }

    /// Start playback.
    pub fn play(&self) -> CommandStatus {
        if !self.can_interact() {
            return CommandStatus::AdsActive;
        }
        self.surface.play();
        CommandStatus::Done
    }

    /// Pause playback.
    pub fn pause(&self) -> CommandStatus {
        if !self.can_interact() {
            return CommandStatus::AdsActive;
        }
        self.surface.pause();
        CommandStatus::Done
    }

    /// Toggle between play and pause.
    pub fn play_pause(&self) -> CommandStatus {
        if !self.can_interact() {
            return CommandStatus::AdsActive;
        }
        if self.playing() {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Set muted state.
    pub fn mute(&self, muted: bool) -> CommandStatus {
        if !self.can_interact() {
            return CommandStatus::AdsActive;
        }
        self.surface.set_muted(muted);
        CommandStatus::Done
    }

    /// Set loop state. Not gated.
    pub fn loop_(&self, looped: bool) {
        self.surface.set_looping(looped);
    }

    /// Seek to `time` seconds, clamped to the playable range.
    pub fn seek(&self, time: f64) -> CommandStatus {
        if !self.can_interact() {
            return CommandStatus::AdsActive;
        }
        if self.surface.src().is_none() {
            return CommandStatus::NoSource;
        }
        // First seek of a sequence decides whether playback resumes
        // afterwards; later seeks in the sequence keep that decision.
        self.state.capture_play_after_seek(self.playing());
        // Pause before moving the clock to avoid audio artifacts.
        self.pause();
        let target = time.min(self.duration() - SEEK_END_MARGIN).max(0.0);
        self.surface.set_current_time(target);
        CommandStatus::Done
    }

    /// Skip by `seconds` relative to the current position. Rapid
    /// calls within the debounce window coalesce into a single seek
    /// of the accumulated delta.
    pub fn skip(self: &Arc<Self>, seconds: f64) -> CommandStatus {
        if !self.can_interact() {
            return CommandStatus::AdsActive;
        }
        if self.surface.src().is_none() {
            return CommandStatus::NoSource;
        }
        self.state.accumulate_skip(self.surface.current_time(), seconds);

        // Restart the quiescence timer; only the last call in a
        // burst performs the seek.
        let weak = Arc::downgrade(self);
        let timer = self.runtime.spawn(async move {
            tokio::time::sleep(SKIP_DEBOUNCE).await;
            let Some(player) = weak.upgrade() else { return };
            if let Some(target) = player.state.take_skip() {
                player.seek(target);
            }
        });
        if let Some(previous) = self.skip_task.lock().replace(timer) {
            previous.abort();
        }
        CommandStatus::Done
    }

    /// Show the surface.
    pub fn show(&self) -> CommandStatus {
        if !self.can_interact() {
            return CommandStatus::AdsActive;
        }
        self.surface.show();
        CommandStatus::Done
    }

    /// Hide the surface.
    pub fn hide(&self) -> CommandStatus {
        if !self.can_interact() {
            return CommandStatus::AdsActive;
        }
        self.surface.hide();
        CommandStatus::Done
    }

    /// Toggle the ad pipeline for subsequently opened media. Not
    /// gated.
    pub fn enable_ads(&self, enabled: bool) {
        self.state.set_ads_enabled(enabled);
    }

    // Geometry (not gated)

    /// Place the surface origin, in logical pixels.
    pub fn position(&self, top: f64, left: f64) {
        let precision = self.config.precision;
        self.surface.set_position(precision.px(top), precision.px(left));
    }

    /// Resize the surface, in logical pixels.
    pub fn size(&self, width: f64, height: f64) {
        let precision = self.config.precision;
        self.surface.set_size(precision.px(width), precision.px(height));
    }

    /// Place the surface by its edges, in logical pixels.
    pub fn area(&self, top: f64, right: f64, bottom: f64, left: f64) {
        self.position(top, left);
        self.size(right - left, bottom - top);
    }

    // Read-only surface

    /// Media duration in seconds; unbounded while unknown.
    pub fn duration(&self) -> f64 {
        match self.surface.duration() {
            Some(duration) if !duration.is_nan() => duration,
            _ => f64::INFINITY,
        }
    }

    pub fn current_time(&self) -> f64 {
        self.surface.current_time()
    }

    pub fn muted(&self) -> bool {
        self.surface.muted()
    }

    pub fn looped(&self) -> bool {
        self.surface.looping()
    }

    pub fn src(&self) -> Option<String> {
        self.surface.src()
    }

    pub fn playing(&self) -> bool {
        self.state.playing()
    }

    pub fn playing_ads(&self) -> bool {
        self.state.playing_ads()
    }

    /// The interaction gate: commands are accepted only while no ad
    /// break is in progress.
    pub fn can_interact(&self) -> bool {
        !self.state.playing_ads()
    }

    pub fn ads_enabled(&self) -> bool {
        self.state.ads_enabled()
    }

    pub fn visible(&self) -> bool {
        self.surface.visible()
    }

    pub fn top(&self) -> f64 {
        self.surface.rect().top
    }

    pub fn left(&self) -> f64 {
        self.surface.rect().left
    }

    pub fn bottom(&self) -> f64 {
        self.surface.rect().bottom()
    }

    pub fn right(&self) -> f64 {
        self.surface.rect().right()
    }

    pub fn width(&self) -> f64 {
        self.surface.rect().width
    }

    pub fn height(&self) -> f64 {
        self.surface.rect().height
    }

    // Ad pipeline

    async fn run_ad_pipeline(self: Arc<Self>, token: u64, playable: String, caid: Option<String>) {
        if self.generation.load(Ordering::Acquire) != token {
            return;
        }
        let duration = self.duration();
        let request = AdRequest {
            enabled: self.state.ads_enabled(),
            duration: if duration.is_finite() && duration > 0.0 {
                duration
            } else {
                AD_DURATION_FALLBACK
            },
            caid,
        };
        tracing::info!(?request, "requesting ad break");
        let consumer = self.consumer.read().clone();
        let ad_break = self.ad_service.request(request, consumer).await;

        if self.generation.load(Ordering::Acquire) != token {
            return;
        }
        self.enter_ad_break();
        ad_break.prerolls().await;
        // AdEnd pairs with AdStart even when the pipeline then stops
        // as stale.
        self.exit_ad_break();

        if self.generation.load(Ordering::Acquire) != token {
            return;
        }
        self.register_event_listeners();
        // An ad may have pointed the surface elsewhere.
        if self.surface.src().as_deref() != Some(playable.as_str()) {
            self.surface.set_src(&playable);
            self.surface.load();
        }
        self.show();
        self.play();
    }

    fn enter_ad_break(&self) {
        self.state.set_playing_ads(true);
        self.fire_on_consumer("AdStart", &EventPayload::bare(self.surface.clone()));
    }

    fn exit_ad_break(&self) {
        self.state.set_playing_ads(false);
        self.fire_on_consumer("AdEnd", &EventPayload::bare(self.surface.clone()));
    }

    // Event relay

    fn register_event_listeners(self: &Arc<Self>) {
        tracing::info!("registering media event listeners");
        let mut registry = self.registry.lock();
        for event in NativeEvent::ALL {
            let weak = Arc::downgrade(self);
            let listener: Listener = Arc::new(move |occurrence: &SurfaceEvent| {
                if let Some(player) = weak.upgrade() {
                    player.relay_native_event(occurrence);
                }
            });
            let id = self.surface.add_listener(event, listener);
            registry.insert(event, id);
        }
    }

    fn deregister_event_listeners(&self) {
        let ids = self.registry.lock().drain();
        if ids.is_empty() {
            return;
        }
        tracing::info!("deregistering media event listeners");
        for id in ids {
            self.surface.remove_listener(id);
        }
    }

    /// Fixed relay order: metrics, internal hook, consumer.
    fn relay_native_event(&self, occurrence: &SurfaceEvent) {
        let metrics = self.metrics.read().clone();
        if let Some(metrics) = metrics {
            metrics.record(occurrence.kind, self.surface.current_time());
        }
        self.fire_hook(occurrence);
        let payload = EventPayload::native(self.surface.clone(), occurrence.clone());
        self.fire_on_consumer(occurrence.kind.label(), &payload);
    }

    /// State reactions driven purely by native events; command calls
    /// never mutate `playing` directly.
    fn fire_hook(&self, occurrence: &SurfaceEvent) {
        match occurrence.kind {
            NativeEvent::Play => self.state.set_playing(true),
            NativeEvent::Pause => self.state.set_playing(false),
            NativeEvent::Seeked => {
                // Decide resumption before the flag is cleared; take
                // does both in one step.
                if self.state.take_play_after_seek() == Some(true) {
                    self.play();
                }
            }
            _ => {}
        }
    }

    fn fire_on_consumer(&self, label: &str, payload: &EventPayload) {
        let consumer = self.consumer.read().clone();
        if let Some(consumer) = consumer {
            consumer.fire(&channel_for(label), payload);
            consumer.fire_event(label, payload);
        }
    }

    // Plumbing

    fn bump_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn clear_metadata_waiter(&self) {
        if let Some(id) = self.metadata_waiter.lock().take() {
            self.surface.remove_listener(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ads::{AdBreak, NoAdService};
    use crate::metrics::NullMetrics;
    use async_trait::async_trait;
    use surface::SimulatedSurface;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct RecordingConsumer {
        log: Mutex<Vec<String>>,
    }

    impl RecordingConsumer {
        fn count(&self, channel: &str) -> usize {
            self.log.lock().iter().filter(|c| c.as_str() == channel).count()
        }

        fn position_of(&self, channel: &str) -> Option<usize> {
            self.log.lock().iter().position(|c| c == channel)
        }

        fn len(&self) -> usize {
            self.log.lock().len()
        }
    }

    impl EventConsumer for RecordingConsumer {
        fn fire(&self, channel: &str, _payload: &EventPayload) {
            self.log.lock().push(channel.to_string());
        }

        fn fire_event(&self, label: &str, _payload: &EventPayload) {
            self.log.lock().push(format!("$videoPlayerEvent:{label}"));
        }
    }

    struct ManualAdBreak {
        release: Arc<Notify>,
    }

    #[async_trait]
    impl AdBreak for ManualAdBreak {
        async fn prerolls(&self) {
            self.release.notified().await;
        }
    }

    /// Ad service whose prerolls finish only when the test says so.
    #[derive(Default)]
    struct ManualAdService {
        release: Arc<Notify>,
        requests: Mutex<Vec<AdRequest>>,
    }

    #[async_trait]
    impl AdService for ManualAdService {
        async fn request(
            &self,
            request: AdRequest,
            _consumer: Option<Arc<dyn EventConsumer>>,
        ) -> Arc<dyn AdBreak> {
            self.requests.lock().push(request);
            Arc::new(ManualAdBreak {
                release: self.release.clone(),
            })
        }
    }

    struct Fixture {
        player: Arc<VideoPlayer>,
        surface: Arc<SimulatedSurface>,
        consumer: Arc<RecordingConsumer>,
    }

    fn fixture_with(config: PlayerConfig, ads: Arc<dyn AdService>) -> Fixture {
        let surface = Arc::new(SimulatedSurface::new());
        let consumer = Arc::new(RecordingConsumer::default());
        let player = VideoPlayer::new(config, surface.clone(), Arc::new(NullMetrics), ads);
        player.set_consumer(Some(consumer.clone()));
        Fixture {
            player,
            surface,
            consumer,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(PlayerConfig::default(), Arc::new(NoAdService))
    }

    /// Let spawned pipeline tasks run to their next suspension point.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    async fn open_and_start(f: &Fixture, url: &str, duration: f64) {
        f.player.open(url, OpenDetails::default());
        f.surface.finish_loading(duration);
        settle().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_runs_full_pipeline() {
        let f = fixture();

        assert_eq!(f.player.open("a.mp4", OpenDetails::default()), CommandStatus::Done);
        assert!(!f.player.visible());
        assert!(!f.player.playing());
        // Only the one-shot metadata waiter is attached while
        // metadata loads.
        assert_eq!(f.surface.listener_count(), 1);

        f.surface.finish_loading(120.0);
        settle().await;

        assert_eq!(f.consumer.count("$videoPlayerAdStart"), 1);
        assert_eq!(f.consumer.count("$videoPlayerAdEnd"), 1);
        assert!(
            f.consumer.position_of("$videoPlayerAdStart").unwrap()
                < f.consumer.position_of("$videoPlayerAdEnd").unwrap()
        );
        assert!(!f.player.playing_ads());
        assert!(f.player.visible());
        assert!(f.player.playing());
        assert_eq!(f.player.src().as_deref(), Some("a.mp4"));
        // Waiter removed, full content listener set wired.
        assert_eq!(f.surface.listener_count(), NativeEvent::ALL.len());
        assert_eq!(f.consumer.count("$videoPlayerPlaying"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_applies_media_url_transform() {
        let config =
            PlayerConfig::new().with_media_url(Arc::new(|url| format!("{url}?platform=stb")));
        let f = fixture_with(config, Arc::new(NoAdService));

        open_and_start(&f, "a.mp4", 60.0).await;

        assert_eq!(f.player.src().as_deref(), Some("a.mp4?platform=stb"));
        assert!(f.player.playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ad_request_carries_duration_and_caid() {
        let ads = Arc::new(ManualAdService::default());
        let f = fixture_with(PlayerConfig::new().with_ads(true), ads.clone());

        f.player.open(
            "a.mp4",
            OpenDetails {
                video_id: Some("asset-7".to_string()),
            },
        );
        f.surface.finish_loading(120.0);
        settle().await;

        assert_eq!(
            *ads.requests.lock(),
            vec![AdRequest {
                enabled: true,
                duration: 120.0,
                caid: Some("asset-7".to_string()),
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_ad_request_falls_back_to_300s_without_duration() {
        let ads = Arc::new(ManualAdService::default());
        let f = fixture_with(PlayerConfig::default(), ads.clone());

        f.player.open("a.mp4", OpenDetails::default());
        // Metadata arrives without a usable duration.
        f.surface.emit(&SurfaceEvent::new(NativeEvent::LoadedMetadata, 0.0));
        settle().await;

        assert_eq!(ads.requests.lock()[0].duration, 300.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gate_drops_commands_during_ad_break() {
        let ads = Arc::new(ManualAdService::default());
        let f = fixture_with(PlayerConfig::new().with_ads(true), ads.clone());

        f.player.open("a.mp4", OpenDetails::default());
        f.surface.finish_loading(120.0);
        settle().await;

        assert!(f.player.playing_ads());
        assert!(!f.player.can_interact());
        let events_before = f.consumer.len();
        let src_before = f.surface.src();

        assert_eq!(f.player.play(), CommandStatus::AdsActive);
        assert_eq!(f.player.pause(), CommandStatus::AdsActive);
        assert_eq!(f.player.play_pause(), CommandStatus::AdsActive);
        assert_eq!(f.player.mute(true), CommandStatus::AdsActive);
        assert_eq!(f.player.seek(10.0), CommandStatus::AdsActive);
        assert_eq!(f.player.skip(5.0), CommandStatus::AdsActive);
        assert_eq!(f.player.show(), CommandStatus::AdsActive);
        assert_eq!(f.player.hide(), CommandStatus::AdsActive);
        assert_eq!(f.player.clear(), CommandStatus::AdsActive);
        assert_eq!(f.player.close(), CommandStatus::AdsActive);
        assert_eq!(f.player.reload(), CommandStatus::AdsActive);
        assert_eq!(
            f.player.open("b.mp4", OpenDetails::default()),
            CommandStatus::AdsActive
        );

        // Zero observable side effects, zero consumer events.
        assert_eq!(f.consumer.len(), events_before);
        assert_eq!(f.surface.src(), src_before);
        assert!(!f.surface.playing());
        assert!(!f.surface.muted());
        assert!(!f.player.visible());

        ads.release.notify_one();
        settle().await;

        assert!(f.player.can_interact());
        assert!(f.player.playing());
        assert!(f.player.visible());
        assert_eq!(f.consumer.count("$videoPlayerAdStart"), 1);
        assert_eq!(f.consumer.count("$videoPlayerAdEnd"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ungated_commands_work_during_ad_break() {
        let ads = Arc::new(ManualAdService::default());
        let f = fixture_with(PlayerConfig::new().with_ads(true), ads.clone());

        f.player.open("a.mp4", OpenDetails::default());
        f.surface.finish_loading(120.0);
        settle().await;
        assert!(f.player.playing_ads());

        f.player.loop_(true);
        assert!(f.player.looped());

        f.player.position(10.0, 20.0);
        f.player.size(640.0, 360.0);
        assert_eq!(f.player.top(), 10.0);
        assert_eq!(f.player.left(), 20.0);
        assert_eq!(f.player.width(), 640.0);

        f.player.enable_ads(false);
        assert!(!f.player.ads_enabled());

        ads.release.notify_one();
        settle().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_then_open_reruns_pipeline() {
        let f = fixture();
        open_and_start(&f, "a.mp4", 120.0).await;
        assert!(f.player.playing());

        assert_eq!(f.player.close(), CommandStatus::Done);
        assert!(f.player.src().is_none());
        assert!(!f.player.visible());
        assert!(!f.player.playing());
        assert_eq!(f.surface.listener_count(), 0);

        open_and_start(&f, "a.mp4", 120.0).await;

        assert_eq!(f.consumer.count("$videoPlayerAdStart"), 2);
        assert_eq!(f.consumer.count("$videoPlayerAdEnd"), 2);
        assert!(f.player.playing());
        assert!(f.player.visible());
        assert_eq!(f.surface.listener_count(), NativeEvent::ALL.len());
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_suppresses_pending_pipeline() {
        let f = fixture();

        f.player.open("a.mp4", OpenDetails::default());
        f.player.close();
        // Metadata for the closed open arrives late.
        f.surface.finish_loading(120.0);
        settle().await;

        assert_eq!(f.consumer.count("$videoPlayerAdStart"), 0);
        assert!(!f.player.visible());
        assert!(!f.player.playing());
        assert_eq!(f.surface.listener_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reopen_supersedes_pending_open() {
        let f = fixture();

        f.player.open("a.mp4", OpenDetails::default());
        f.player.open("b.mp4", OpenDetails::default());
        f.surface.finish_loading(120.0);
        settle().await;

        assert_eq!(f.consumer.count("$videoPlayerAdStart"), 1);
        assert_eq!(f.player.src().as_deref(), Some("b.mp4"));
        assert!(f.player.playing());
        assert_eq!(f.surface.listener_count(), NativeEvent::ALL.len());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_restarts_with_fresh_ad_break() {
        let f = fixture();
        open_and_start(&f, "a.mp4", 120.0).await;

        assert_eq!(f.player.reload(), CommandStatus::Done);
        assert!(!f.player.visible());

        f.surface.finish_loading(120.0);
        settle().await;

        assert_eq!(f.consumer.count("$videoPlayerAdStart"), 2);
        assert_eq!(f.player.src().as_deref(), Some("a.mp4"));
        assert!(f.player.playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_without_source_rejected() {
        let f = fixture();
        assert_eq!(f.player.reload(), CommandStatus::NoSource);
    }

    #[tokio::test(start_paused = true)]
    async fn test_seek_clamps_to_playable_range() {
        let f = fixture();
        open_and_start(&f, "a.mp4", 100.0).await;

        assert_eq!(f.player.seek(150.0), CommandStatus::Done);
        assert_eq!(f.surface.current_time(), 99.9);

        f.player.seek(-20.0);
        assert_eq!(f.surface.current_time(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_seek_resumes_only_when_playing() {
        let f = fixture();
        open_and_start(&f, "a.mp4", 120.0).await;
        assert!(f.player.playing());

        f.player.seek(30.0);
        assert_eq!(f.surface.current_time(), 30.0);
        assert!(f.player.playing());

        f.player.pause();
        f.player.seek(50.0);
        assert_eq!(f.surface.current_time(), 50.0);
        assert!(!f.player.playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_seek_and_skip_require_source() {
        let f = fixture();
        assert_eq!(f.player.seek(10.0), CommandStatus::NoSource);
        assert_eq!(f.player.skip(5.0), CommandStatus::NoSource);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_duration_is_unbounded_for_seek() {
        let f = fixture();
        f.player.open("a.mp4", OpenDetails::default());
        f.surface.emit(&SurfaceEvent::new(NativeEvent::LoadedMetadata, 0.0));
        settle().await;

        assert_eq!(f.player.duration(), f64::INFINITY);
        f.player.seek(5000.0);
        assert_eq!(f.surface.current_time(), 5000.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_skip_burst_coalesces_into_one_seek() {
        let f = fixture();
        open_and_start(&f, "a.mp4", 120.0).await;
        f.surface.advance(20.0);
        assert_eq!(f.surface.current_time(), 20.0);
        let seeking_before = f.consumer.count("$videoPlayerSeeking");

        f.player.skip(10.0);
        tokio::time::sleep(Duration::from_millis(50)).await;
        f.player.skip(10.0);

        // 300ms of quiescence has not elapsed since the last skip.
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(f.surface.current_time(), 20.0);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(f.surface.current_time(), 40.0);
        assert_eq!(f.consumer.count("$videoPlayerSeeking") - seeking_before, 1);
        // Playback resumed after the debounced seek.
        assert!(f.player.playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ad_changed_source_is_restored() {
        let ads = Arc::new(ManualAdService::default());
        let f = fixture_with(PlayerConfig::new().with_ads(true), ads.clone());

        f.player.open("a.mp4", OpenDetails::default());
        f.surface.finish_loading(120.0);
        settle().await;
        assert!(f.player.playing_ads());

        // The ad creative repointed the surface.
        f.surface.set_src("ad://creative");

        ads.release.notify_one();
        settle().await;

        assert_eq!(f.player.src().as_deref(), Some("a.mp4"));
        assert!(f.player.playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_native_events_drive_playing_flag() {
        let f = fixture();
        open_and_start(&f, "a.mp4", 120.0).await;
        assert!(f.player.playing());

        // Native pause, not a command.
        f.surface.pause();
        assert!(!f.player.playing());
        f.surface.play();
        assert!(f.player.playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_playing_flag_needs_wired_listeners() {
        let f = fixture();
        // Bypass open: source present but no listeners registered.
        f.surface.set_src("a.mp4");

        f.player.play();

        assert!(f.surface.playing());
        assert!(!f.player.playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_pause_and_mute() {
        let f = fixture();
        open_and_start(&f, "a.mp4", 120.0).await;

        f.player.play_pause();
        assert!(!f.player.playing());
        f.player.play_pause();
        assert!(f.player.playing());

        f.player.mute(true);
        assert!(f.player.muted());
        f.player.mute(false);
        assert!(!f.player.muted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_empties_surface() {
        let f = fixture();
        open_and_start(&f, "a.mp4", 120.0).await;

        assert_eq!(f.player.clear(), CommandStatus::Done);
        assert!(f.player.src().is_none());
        assert!(!f.player.playing());
        assert_eq!(f.player.current_time(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_geometry_scaling() {
        let config = PlayerConfig::new().with_precision(0.5);
        let f = fixture_with(config, Arc::new(NoAdService));

        // Construction applied the scaled default size.
        assert_eq!(f.player.width(), 960.0);
        assert_eq!(f.player.height(), 540.0);

        f.player.position(100.0, 200.0);
        assert_eq!(f.player.top(), 50.0);
        assert_eq!(f.player.left(), 100.0);
        assert_eq!(f.player.bottom(), 50.0 + 540.0);
        assert_eq!(f.player.right(), 100.0 + 960.0);

        f.player.area(0.0, 1280.0, 720.0, 0.0);
        assert_eq!(f.player.width(), 640.0);
        assert_eq!(f.player.height(), 360.0);
        assert_eq!(f.player.top(), 0.0);
        assert_eq!(f.player.left(), 0.0);
    }

    #[derive(Default)]
    struct RecordingMetrics {
        urls: Mutex<Vec<String>>,
        events: Mutex<Vec<(NativeEvent, f64)>>,
    }

    struct RecordingHandle(Arc<RecordingMetrics>);

    impl MediaMetrics for RecordingHandle {
        fn record(&self, event: NativeEvent, current_time: f64) {
            self.0.events.lock().push((event, current_time));
        }
    }

    struct RecordingSink(Arc<RecordingMetrics>);

    impl MetricsSink for RecordingSink {
        fn media(&self, url: &str) -> Arc<dyn MediaMetrics> {
            self.0.urls.lock().push(url.to_string());
            Arc::new(RecordingHandle(self.0.clone()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_metrics_handle_created_per_open_from_raw_url() {
        let metrics = Arc::new(RecordingMetrics::default());
        let config =
            PlayerConfig::new().with_media_url(Arc::new(|url| format!("{url}?platform=stb")));
        let surface = Arc::new(SimulatedSurface::new());
        let player = VideoPlayer::new(
            config,
            surface.clone(),
            Arc::new(RecordingSink(metrics.clone())),
            Arc::new(NoAdService),
        );

        player.open("a.mp4", OpenDetails::default());
        surface.finish_loading(120.0);
        settle().await;

        // Raw URL, not the transformed one.
        assert_eq!(*metrics.urls.lock(), vec!["a.mp4".to_string()]);
        assert!(metrics
            .events
            .lock()
            .iter()
            .any(|(event, _)| *event == NativeEvent::Playing));

        player.open("b.mp4", OpenDetails::default());
        assert_eq!(metrics.urls.lock().len(), 2);
    }

    struct OrderedMetricsHandle(Arc<Mutex<Vec<String>>>);

    impl MediaMetrics for OrderedMetricsHandle {
        fn record(&self, event: NativeEvent, _current_time: f64) {
            self.0.lock().push(format!("metrics:{}", event.label()));
        }
    }

    struct OrderedMetricsSink(Arc<Mutex<Vec<String>>>);

    impl MetricsSink for OrderedMetricsSink {
        fn media(&self, _url: &str) -> Arc<dyn MediaMetrics> {
            Arc::new(OrderedMetricsHandle(self.0.clone()))
        }
    }

    struct OrderedConsumer(Arc<Mutex<Vec<String>>>);

    impl EventConsumer for OrderedConsumer {
        fn fire(&self, channel: &str, _payload: &EventPayload) {
            self.0.lock().push(format!("consumer:{channel}"));
        }

        fn fire_event(&self, label: &str, _payload: &EventPayload) {
            self.0.lock().push(format!("catchall:{label}"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_relay_fires_metrics_before_consumer() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let surface = Arc::new(SimulatedSurface::new());
        let player = VideoPlayer::new(
            PlayerConfig::default(),
            surface.clone(),
            Arc::new(OrderedMetricsSink(log.clone())),
            Arc::new(NoAdService),
        );
        player.set_consumer(Some(Arc::new(OrderedConsumer(log.clone()))));

        player.open("a.mp4", OpenDetails::default());
        surface.finish_loading(120.0);
        settle().await;

        log.lock().clear();
        surface.pause();

        assert_eq!(
            *log.lock(),
            vec![
                "metrics:Pause".to_string(),
                "consumer:$videoPlayerPause".to_string(),
                "catchall:Pause".to_string(),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_consumer_is_a_no_op() {
        let f = fixture();
        f.player.set_consumer(None);

        open_and_start(&f, "a.mp4", 120.0).await;

        // Pipeline completes without a consumer attached.
        assert!(f.player.playing());
        assert_eq!(f.consumer.len(), 0);
    }
}
