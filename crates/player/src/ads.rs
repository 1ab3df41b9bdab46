//! Ad-insertion service seam.

use std::sync::Arc;

use async_trait::async_trait;

use crate::consumer::EventConsumer;

/// Descriptor sent to the ad-insertion service when new media opens.
#[derive(Clone, Debug, PartialEq)]
pub struct AdRequest {
    /// Whether the host has ads enabled.
    pub enabled: bool,
    /// Content duration in seconds. When metadata reported no usable
    /// duration this carries the 300 second approximation.
    pub duration: f64,
    /// Content asset id, when the host supplied one.
    pub caid: Option<String>,
}

/// One ad break created by the service for a single `open`.
#[async_trait]
pub trait AdBreak: Send + Sync {
    /// Play the preroll sequence; resolves once every preroll has
    /// finished (immediately when there are none).
    async fn prerolls(&self);
}

/// The ad-insertion service.
#[async_trait]
pub trait AdService: Send + Sync {
    /// Request an ad break for the given media. The service owns any
    /// resources it creates and signals completion solely through the
    /// returned break's `prerolls` resolution.
    async fn request(
        &self,
        request: AdRequest,
        consumer: Option<Arc<dyn EventConsumer>>,
    ) -> Arc<dyn AdBreak>;
}

/// Ad service used when ads are disabled or unavailable: resolves
/// immediately with an empty break.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAdService;

/// Ad break with no prerolls.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyAdBreak;

#[async_trait]
impl AdBreak for EmptyAdBreak {
    async fn prerolls(&self) {}
}

#[async_trait]
impl AdService for NoAdService {
    async fn request(
        &self,
        _request: AdRequest,
        _consumer: Option<Arc<dyn EventConsumer>>,
    ) -> Arc<dyn AdBreak> {
        Arc::new(EmptyAdBreak)
    }
}
