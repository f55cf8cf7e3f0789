//! RealTimeAudio: a pass-through plugin that streams its input to a
//! WebView pitch analyzer.
//!
//! The audio thread copies inputs to outputs and queues input channels 0/1
//! on a lock-free tap. The editor drains the tap on the UI thread and feeds
//! each block to the page as a guarded script.
//!
//! Hosts drive the plugin through the C-ABI functions in [`ffi`]; Rust
//! hosts (and tests) can use [`RealTimeAudio`] and [`Editor`] directly.

mod editor;
pub mod ffi;
mod params;
mod plugin;
mod processor;

pub use editor::Editor;
pub use params::{RealTimeAudioParameters, GAIN_ID};
pub use plugin::{RealTimeAudio, CONFIG};
pub use processor::passthrough;
