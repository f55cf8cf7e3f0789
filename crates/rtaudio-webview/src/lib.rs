//! UI runtime side of the rtaudio bridge.
//!
//! Loads the analyzer page into a WebView and delivers queued audio blocks
//! to it as guarded scripts. The audio thread never touches anything in this
//! crate; it only pushes into the tap from `rtaudio-core`.

mod bridge;
mod error;
mod handle;
mod runtime;
mod script;

pub use bridge::AudioBridge;
pub use error::{Result, WebViewError};
pub use handle::{EvalJsFn, LoadFileFn, WebViewHandle};
pub use runtime::{LoadRequest, RuntimeMode, UiRuntime, EMBEDDED_MODE_SCRIPT};
pub use script::PayloadWriter;
