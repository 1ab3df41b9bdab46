//! Player configuration.

use std::fmt;
use std::sync::Arc;

use common::Precision;

/// Transform applied to every media URL before it reaches the
/// surface, e.g. to rewrite CDN hosts per platform.
pub type MediaUrlFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Player configuration, fixed at construction.
#[derive(Clone)]
pub struct PlayerConfig {
    /// Whether the ad pipeline runs on open.
    pub ads_enabled: bool,
    /// Device pixel-scaling factor for geometry.
    pub precision: Precision,
    /// Initial surface width in logical pixels.
    pub width: f64,
    /// Initial surface height in logical pixels.
    pub height: f64,
    /// URL transform; identity when unset.
    pub media_url: Option<MediaUrlFn>,
}

impl PlayerConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set ads enabled.
    pub fn with_ads(mut self, enabled: bool) -> Self {
        self.ads_enabled = enabled;
        self
    }

    /// Set the pixel-scaling factor.
    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = Precision(precision);
        self
    }

    /// Set the initial surface size.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the media URL transform.
    pub fn with_media_url(mut self, media_url: MediaUrlFn) -> Self {
        self.media_url = Some(media_url);
        self
    }

    /// Map a raw media URL to the platform-playable URL.
    pub fn transform_url(&self, url: &str) -> String {
        match &self.media_url {
            Some(transform) => transform(url),
            None => {
                if url::Url::parse(url).is_err() {
                    tracing::warn!(url, "media url is not a valid absolute URL");
                }
                url.to_string()
            }
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            ads_enabled: false,
            precision: Precision::default(),
            width: 1920.0,
            height: 1080.0,
            media_url: None,
        }
    }
}

impl fmt::Debug for PlayerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerConfig")
            .field("ads_enabled", &self.ads_enabled)
            .field("precision", &self.precision)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("media_url", &self.media_url.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlayerConfig::default();
        assert!(!config.ads_enabled);
        assert_eq!(config.width, 1920.0);
        assert_eq!(config.height, 1080.0);
        assert_eq!(config.transform_url("http://cdn/a.mp4"), "http://cdn/a.mp4");
    }

    #[test]
    fn test_config_builder() {
        let config = PlayerConfig::new()
            .with_ads(true)
            .with_precision(0.6666)
            .with_size(1280.0, 720.0);

        assert!(config.ads_enabled);
        assert_eq!(config.width, 1280.0);
        assert_eq!(config.precision.px(1920.0), 1280.0);
    }

    #[test]
    fn test_media_url_transform() {
        let config = PlayerConfig::new()
            .with_media_url(Arc::new(|url| format!("{url}?platform=settop")));

        assert_eq!(
            config.transform_url("http://cdn/a.mp4"),
            "http://cdn/a.mp4?platform=settop"
        );
    }
}
