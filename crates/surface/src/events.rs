//! Native media event vocabulary.

use common::MediaError;

/// A native media lifecycle event emitted by the render surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NativeEvent {
    Abort,
    CanPlay,
    CanPlayThrough,
    DurationChange,
    Emptied,
    Encrypted,
    Ended,
    Error,
    InterruptBegin,
    InterruptEnd,
    LoadedData,
    LoadedMetadata,
    LoadStart,
    Pause,
    Play,
    Playing,
    Progress,
    RateChange,
    Seeked,
    Seeking,
    Stalled,
    Suspend,
    TimeUpdate,
    VolumeChange,
    Waiting,
}

impl NativeEvent {
    /// Every event the relay wires up. Listener registration always
    /// covers this full set, never a subset.
    pub const ALL: [NativeEvent; 25] = [
        NativeEvent::Abort,
        NativeEvent::CanPlay,
        NativeEvent::CanPlayThrough,
        NativeEvent::DurationChange,
        NativeEvent::Emptied,
        NativeEvent::Encrypted,
        NativeEvent::Ended,
        NativeEvent::Error,
        NativeEvent::InterruptBegin,
        NativeEvent::InterruptEnd,
        NativeEvent::LoadedData,
        NativeEvent::LoadedMetadata,
        NativeEvent::LoadStart,
        NativeEvent::Pause,
        NativeEvent::Play,
        NativeEvent::Playing,
        NativeEvent::Progress,
        NativeEvent::RateChange,
        NativeEvent::Seeked,
        NativeEvent::Seeking,
        NativeEvent::Stalled,
        NativeEvent::Suspend,
        NativeEvent::TimeUpdate,
        NativeEvent::VolumeChange,
        NativeEvent::Waiting,
    ];

    /// Get the native (platform) event name.
    pub fn name(&self) -> &'static str {
        match self {
            NativeEvent::Abort => "abort",
            NativeEvent::CanPlay => "canplay",
            NativeEvent::CanPlayThrough => "canplaythrough",
            NativeEvent::DurationChange => "durationchange",
            NativeEvent::Emptied => "emptied",
            NativeEvent::Encrypted => "encrypted",
            NativeEvent::Ended => "ended",
            NativeEvent::Error => "error",
            NativeEvent::InterruptBegin => "interruptbegin",
            NativeEvent::InterruptEnd => "interruptend",
            NativeEvent::LoadedData => "loadeddata",
            NativeEvent::LoadedMetadata => "loadedmetadata",
            NativeEvent::LoadStart => "loadstart",
            NativeEvent::Pause => "pause",
            NativeEvent::Play => "play",
            NativeEvent::Playing => "playing",
            NativeEvent::Progress => "progress",
            NativeEvent::RateChange => "ratechange",
            NativeEvent::Seeked => "seeked",
            NativeEvent::Seeking => "seeking",
            NativeEvent::Stalled => "stalled",
            NativeEvent::Suspend => "suspend",
            NativeEvent::TimeUpdate => "timeupdate",
            NativeEvent::VolumeChange => "volumechange",
            NativeEvent::Waiting => "waiting",
        }
    }

    /// Get the human-readable label used on consumer channels.
    pub fn label(&self) -> &'static str {
        match self {
            NativeEvent::Abort => "Abort",
            NativeEvent::CanPlay => "CanPlay",
            NativeEvent::CanPlayThrough => "CanPlayThrough",
            NativeEvent::DurationChange => "DurationChange",
            NativeEvent::Emptied => "Emptied",
            NativeEvent::Encrypted => "Encrypted",
            NativeEvent::Ended => "Ended",
            NativeEvent::Error => "Error",
            NativeEvent::InterruptBegin => "InterruptBegin",
            NativeEvent::InterruptEnd => "InterruptEnd",
            NativeEvent::LoadedData => "LoadedData",
            NativeEvent::LoadedMetadata => "LoadedMetadata",
            NativeEvent::LoadStart => "LoadStart",
            NativeEvent::Pause => "Pause",
            NativeEvent::Play => "Play",
            NativeEvent::Playing => "Playing",
            NativeEvent::Progress => "Progress",
            NativeEvent::RateChange => "RateChange",
            NativeEvent::Seeked => "Seeked",
            NativeEvent::Seeking => "Seeking",
            NativeEvent::Stalled => "Stalled",
            NativeEvent::Suspend => "Suspend",
            NativeEvent::TimeUpdate => "TimeUpdate",
            NativeEvent::VolumeChange => "VolumeChange",
            NativeEvent::Waiting => "Waiting",
        }
    }

    /// Parse an event from its native name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|event| event.name() == name)
    }
}

/// A single native event occurrence, as delivered to listeners.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceEvent {
    /// Which event fired.
    pub kind: NativeEvent,
    /// Surface playback position when the event fired, in seconds.
    pub current_time: f64,
    /// Failure detail; only populated for `Error` events.
    pub error: Option<MediaError>,
}

impl SurfaceEvent {
    /// Create an occurrence of `kind` at `current_time`.
    pub fn new(kind: NativeEvent, current_time: f64) -> Self {
        Self {
            kind,
            current_time,
            error: None,
        }
    }

    /// Create an `Error` occurrence carrying `error`.
    pub fn error(current_time: f64, error: MediaError) -> Self {
        Self {
            kind: NativeEvent::Error,
            current_time,
            error: Some(error),
        }
    }
}
