//! Error types for plugin setup and state handling.
//!
//! None of these ever reach the audio thread's caller: the block entry point
//! degrades to silence or skips bridging instead of failing.

/// Errors raised by non-real-time plugin operations.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// Host supplied a sample rate outside `(0, MAX_SAMPLE_RATE]`.
    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(f64),
    /// Host supplied a maximum block size outside `1..=MAX_BLOCK_FRAMES`.
    #[error("invalid block size: {0} frames")]
    InvalidBlockSize(usize),
    /// A bus declares more channels than supported.
    #[error("{side} bus declares {count} channels, limit is {}", crate::types::MAX_CHANNELS)]
    TooManyChannels {
        /// "input" or "output".
        side: &'static str,
        /// Declared channel count.
        count: usize,
    },
    /// Saved state could not be encoded or decoded.
    #[error("state serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Saved state decoded but is not usable.
    #[error("invalid state: {0}")]
    State(String),
}

/// Result type for plugin operations.
pub type PluginResult<T> = Result<T, PluginError>;
