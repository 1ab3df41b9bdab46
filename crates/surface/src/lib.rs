//! Render surface abstraction for the playback component.
//!
//! This crate provides:
//! - The native media event vocabulary and its consumer-facing labels
//! - The `VideoSurface` trait the orchestrator drives
//! - An in-memory surface for headless runs and tests

pub mod events;
pub mod simulated;
pub mod surface;

pub use events::{NativeEvent, SurfaceEvent};
pub use simulated::SimulatedSurface;
pub use surface::{Listener, ListenerId, VideoSurface};
