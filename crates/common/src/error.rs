//! Native media error types.

use thiserror::Error;

/// Native playback failure, as reported by the platform through an
/// `error` media event. The orchestrator relays these to the consumer
/// without intercepting or recovering from them.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("Media aborted")]
    Aborted,

    #[error("Network error")]
    Network,

    #[error("Decode error")]
    Decode,

    #[error("Source not supported")]
    SrcNotSupported,
}

impl MediaError {
    /// Get the platform error code.
    pub fn code(&self) -> u16 {
        match self {
            MediaError::Aborted => 1,
            MediaError::Network => 2,
            MediaError::Decode => 3,
            MediaError::SrcNotSupported => 4,
        }
    }
}
