//! Metrics sink seam.

use std::sync::Arc;

use surface::NativeEvent;

/// Per-media metrics handle, created once per `open`.
///
/// `record` has an empty default body: sinks override it for the
/// events they care about and silently absorb the rest, mirroring the
/// "callback if present" contract of the hosting runtime.
pub trait MediaMetrics: Send + Sync {
    /// Record one native event at the given playback position.
    fn record(&self, event: NativeEvent, current_time: f64) {
        let _ = (event, current_time);
    }
}

/// Factory for per-media metrics handles.
pub trait MetricsSink: Send + Sync {
    /// Create a handle for the given (untransformed) media URL.
    fn media(&self, url: &str) -> Arc<dyn MediaMetrics>;
}

/// Metrics sink that records nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullMetrics;

impl MediaMetrics for NullMetrics {}

impl MetricsSink for NullMetrics {
    fn media(&self, _url: &str) -> Arc<dyn MediaMetrics> {
        Arc::new(NullMetrics)
    }
}
