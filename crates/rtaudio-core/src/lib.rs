//! Format-agnostic core of the rtaudio plugin.
//!
//! Sample and buffer abstractions, pointer storage for host blocks,
//! parameters, setup types, configuration and the audio tap that hands
//! input blocks from the audio thread to the UI thread.

mod buffer;
mod buffer_storage;
mod bus_config;
pub mod config;
mod error;
mod parameter_format;
mod parameter_info;
mod parameter_range;
mod parameter_types;
mod sample;
pub mod setup;
pub mod tap;
mod types;

pub use buffer::Buffer;
pub use buffer_storage::ProcessBufferStorage;
pub use bus_config::ChannelLayout;
pub use config::PluginConfig;
pub use error::{PluginError, PluginResult};
pub use parameter_format::Formatter;
pub use parameter_info::{ParameterFlags, ParameterInfo, ParameterUnit};
pub use parameter_range::{LinearMapper, RangeMapper};
pub use parameter_types::{FloatParameter, ParameterRef, Parameters};
pub use sample::Sample;
pub use setup::{MaxBufferSize, SampleRate};
pub use tap::{AudioTap, BridgeConfig, StereoFrame, TapReader, TapStats, TapStatsSnapshot};
pub use types::{ParameterId, ParameterValue, Size, MAX_BLOCK_FRAMES, MAX_CHANNELS, MAX_SAMPLE_RATE};
