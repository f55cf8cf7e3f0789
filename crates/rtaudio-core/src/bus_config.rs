//! Main bus channel layout.
//!
//! The host negotiates how many channels are connected on the main input and
//! output buses. The layout is cached once during preparation and used to
//! size pointer storage; per-block channel counts may be lower than the
//! negotiated layout but never higher.

use crate::error::{PluginError, PluginResult};
use crate::types::MAX_CHANNELS;

/// Negotiated channel counts for the main input and output buses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelLayout {
    /// Channels on the main input bus.
    pub input_channels: usize,
    /// Channels on the main output bus.
    pub output_channels: usize,
}

impl ChannelLayout {
    /// Create a layout.
    pub const fn new(input_channels: usize, output_channels: usize) -> Self {
        Self {
            input_channels,
            output_channels,
        }
    }

    /// Channels copied by a pass-through (`min(inputs, outputs)`).
    pub fn paired_channels(&self) -> usize {
        self.input_channels.min(self.output_channels)
    }

    /// Validate that this layout doesn't exceed system limits.
    pub fn validate(&self) -> PluginResult<()> {
        if self.input_channels > MAX_CHANNELS {
            return Err(PluginError::TooManyChannels {
                side: "input",
                count: self.input_channels,
            });
        }
        if self.output_channels > MAX_CHANNELS {
            return Err(PluginError::TooManyChannels {
                side: "output",
                count: self.output_channels,
            });
        }
        Ok(())
    }
}

impl Default for ChannelLayout {
    /// Stereo in, stereo out.
    fn default() -> Self {
        Self::new(2, 2)
    }
}
