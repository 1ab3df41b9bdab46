//! Common types shared across the playback component.

pub mod error;
pub mod geometry;

pub use error::MediaError;
pub use geometry::{Precision, SurfaceRect};
