//! Video playback orchestration for the set-top UI runtime.
//!
//! This crate provides:
//! - The `VideoPlayer` orchestrator: open/play/pause/seek/skip/close
//!   commands, the ad-preroll pipeline, and the interaction gate
//! - Collaborator seams: consumer event bus, metrics sink,
//!   ad-insertion service
//! - Playback state and the native event relay

pub mod ads;
pub mod config;
pub mod consumer;
pub mod metrics;
pub mod player;
pub mod relay;
pub mod state;

pub use ads::{AdBreak, AdRequest, AdService, NoAdService};
pub use config::{MediaUrlFn, PlayerConfig};
pub use consumer::{EventConsumer, EventPayload};
pub use metrics::{MediaMetrics, MetricsSink, NullMetrics};
pub use player::{CommandStatus, OpenDetails, VideoPlayer};
pub use state::PlaybackState;
