//! Editor lifecycle.
//!
//! The editor lives on the UI thread. Opening it loads the analyzer page and
//! switches the audio tap on; the host's idle timer drains queued blocks;
//! closing switches the tap off again.

use std::sync::Arc;

use rtaudio_core::{BridgeConfig, PluginConfig, Size, TapReader, TapStatsSnapshot};
use rtaudio_webview::{AudioBridge, LoadRequest, Result, RuntimeMode, UiRuntime};

use crate::params::RealTimeAudioParameters;

/// UI-thread state of one plugin instance.
pub struct Editor {
    config: &'static PluginConfig,
    bridge: AudioBridge,
    params: Arc<RealTimeAudioParameters>,
}

impl Editor {
    pub(crate) fn new(
        config: &'static PluginConfig,
        reader: TapReader,
        bridge: BridgeConfig,
        params: Arc<RealTimeAudioParameters>,
    ) -> Self {
        Self {
            config,
            bridge: AudioBridge::new(reader, bridge),
            params,
        }
    }

    /// Initial editor size.
    pub fn size(&self) -> Size {
        self.config.editor_size
    }

    /// Load the page into `runtime` in embedded mode and start streaming.
    pub fn open(&mut self, runtime: Box<dyn UiRuntime>) -> Result<()> {
        let request = LoadRequest {
            entry_document: self.config.entry_document,
            identifier: self.config.bundle_id,
            mode: RuntimeMode::Embedded,
            dev_tools: self.config.dev_tools(),
        };
        self.bridge.attach(runtime, &request)?;
        log::info!(
            "Editor opened ({}x{}, dev tools {})",
            self.config.editor_size.width,
            self.config.editor_size.height,
            if request.dev_tools { "on" } else { "off" }
        );
        Ok(())
    }

    /// Deliver queued blocks. Call from the UI timer.
    ///
    /// Returns the number of blocks the page accepted.
    pub fn idle(&mut self) -> usize {
        self.bridge.drain()
    }

    /// Stop streaming and release the runtime.
    pub fn close(&mut self) {
        if self.bridge.detach().is_some() {
            let stats = self.bridge.stats();
            log::info!(
                "Editor closed (delivered {}, dropped {}, gain changes {})",
                stats.delivered,
                stats.dropped,
                self.params.param_changes()
            );
        }
    }

    /// Whether a runtime is attached.
    pub fn is_open(&self) -> bool {
        self.bridge.is_attached()
    }

    /// Bridge counters.
    pub fn stats(&self) -> TapStatsSnapshot {
        self.bridge.stats()
    }
}
