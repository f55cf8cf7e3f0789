//! Host-provided processing setup.
//!
//! | Type | Value | Written by | Read by |
//! |------|-------|------------|---------|
//! | [`SampleRate`] | `f64` Hz | reset (non-real-time) | block entry |
//! | [`MaxBufferSize`] | `usize` frames | reset (non-real-time) | storage allocation |
//!
//! Both value types validate on construction, so everything downstream can
//! assume they are in range.

use crate::error::{PluginError, PluginResult};
use crate::types::{MAX_BLOCK_FRAMES, MAX_SAMPLE_RATE};

/// Validated sample rate in Hz.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SampleRate(f64);

impl SampleRate {
    /// Accept finite rates in `(0, MAX_SAMPLE_RATE]`.
    pub fn new(hz: f64) -> PluginResult<Self> {
        if hz.is_finite() && hz > 0.0 && hz <= MAX_SAMPLE_RATE {
            Ok(Self(hz))
        } else {
            Err(PluginError::InvalidSampleRate(hz))
        }
    }

    /// Rate in Hz.
    #[inline]
    pub fn hz(self) -> f64 {
        self.0
    }
}

impl Default for SampleRate {
    fn default() -> Self {
        Self(44_100.0)
    }
}

/// Validated maximum frames per block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MaxBufferSize(usize);

impl MaxBufferSize {
    /// Accept `1..=MAX_BLOCK_FRAMES`.
    pub fn new(frames: usize) -> PluginResult<Self> {
        if (1..=MAX_BLOCK_FRAMES).contains(&frames) {
            Ok(Self(frames))
        } else {
            Err(PluginError::InvalidBlockSize(frames))
        }
    }

    /// Frames per block.
    #[inline]
    pub fn frames(self) -> usize {
        self.0
    }
}

impl Default for MaxBufferSize {
    fn default() -> Self {
        Self(MAX_BLOCK_FRAMES)
    }
}
