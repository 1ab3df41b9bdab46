//! Surface geometry and device pixel scaling.

use serde::{Deserialize, Serialize};

/// Device pixel-scaling factor supplied by the render stage.
///
/// Logical coordinates coming from the host UI are multiplied by this
/// factor and rounded to whole device pixels before being applied to
/// the surface.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Precision(pub f64);

impl Precision {
    /// Convert a logical value to rounded device pixels.
    #[inline]
    pub fn px(&self, value: f64) -> f64 {
        (self.0 * value).round()
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Placement of the playback surface, in device pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceRect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl SurfaceRect {
    #[inline]
    pub const fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self { top, left, width, height }
    }

    /// Bottom edge.
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Right edge.
    #[inline]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_rounds_to_device_pixels() {
        let precision = Precision(1.5);
        assert_eq!(precision.px(100.0), 150.0);
        assert_eq!(precision.px(101.0), 152.0); // 151.5 rounds up
        assert_eq!(Precision::default().px(1920.0), 1920.0);
    }

    #[test]
    fn test_rect_edges() {
        let rect = SurfaceRect::new(10.0, 20.0, 1920.0, 1080.0);
        assert_eq!(rect.bottom(), 1090.0);
        assert_eq!(rect.right(), 1940.0);
    }
}
