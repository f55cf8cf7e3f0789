//! UI-thread side of the audio bridge.
//!
//! [`AudioBridge`] owns the [`TapReader`] and the attached [`UiRuntime`].
//! The editor calls [`drain`](AudioBridge::drain) from its idle timer; each
//! queued block is rendered to a payload and handed to the runtime.
//!
//! Attaching flips the tap on, detaching flips it off, so the audio thread
//! only queues blocks while someone is there to consume them.

use rtaudio_core::{BridgeConfig, StereoFrame, TapReader, TapStatsSnapshot};

use crate::error::Result;
use crate::runtime::{LoadRequest, UiRuntime};
use crate::script::PayloadWriter;

/// Drains queued audio blocks into the UI runtime.
pub struct AudioBridge {
    reader: TapReader,
    runtime: Option<Box<dyn UiRuntime>>,
    writer: PayloadWriter,
    frames: Vec<StereoFrame>,
    reported_drops: u64,
    failing: bool,
}

impl AudioBridge {
    /// Create a detached bridge.
    ///
    /// `config` should match the one the tap was created with; it only sizes
    /// scratch buffers here.
    pub fn new(reader: TapReader, config: BridgeConfig) -> Self {
        let config = config.sanitized();
        Self {
            reader,
            runtime: None,
            writer: PayloadWriter::with_capacity(config.max_block_frames),
            frames: Vec::with_capacity(config.max_block_frames),
            reported_drops: 0,
            failing: false,
        }
    }

    /// Load the runtime and start accepting blocks.
    ///
    /// Any previously attached runtime is detached first. If loading fails
    /// the bridge stays detached.
    pub fn attach(
        &mut self,
        mut runtime: Box<dyn UiRuntime>,
        request: &LoadRequest<'_>,
    ) -> Result<()> {
        self.detach();

        if let Err(e) = runtime.load(request) {
            log::warn!("Failed to load {}: {e}", request.entry_document);
            return Err(e);
        }

        // Blocks queued before this runtime existed are stale
        self.reader.discard_pending();
        self.runtime = Some(runtime);
        self.failing = false;
        self.reader.set_attached(true);
        log::debug!("Audio bridge attached ({:?} mode)", request.mode);
        Ok(())
    }

    /// Stop accepting blocks and release the runtime.
    pub fn detach(&mut self) -> Option<Box<dyn UiRuntime>> {
        self.reader.set_attached(false);
        let discarded = self.reader.discard_pending();
        let runtime = self.runtime.take();
        if runtime.is_some() {
            log::debug!("Audio bridge detached, {discarded} pending blocks discarded");
        }
        runtime
    }

    /// Whether a runtime is attached.
    pub fn is_attached(&self) -> bool {
        self.runtime.is_some()
    }

    /// Deliver every block queued at the time of the call.
    ///
    /// Returns the number of blocks the runtime accepted. Without a runtime
    /// this is a no-op.
    pub fn drain(&mut self) -> usize {
        let Self {
            reader,
            runtime,
            writer,
            frames,
            failing,
            ..
        } = self;
        let Some(runtime) = runtime.as_mut() else {
            return 0;
        };

        let mut delivered = 0;
        for _ in 0..reader.pending_blocks() {
            let Some(header) = reader.pop_block(frames) else {
                break;
            };

            let script = writer.render(frames, header.sample_rate);
            match runtime.evaluate(script) {
                Ok(()) => {
                    reader.stats().record_delivered();
                    delivered += 1;
                    if *failing {
                        log::info!("Audio delivery recovered");
                        *failing = false;
                    }
                }
                Err(e) => {
                    reader.stats().record_delivery_failure();
                    if !*failing {
                        log::warn!("Audio delivery failed: {e}");
                        *failing = true;
                    }
                }
            }
        }

        self.report_drops();
        delivered
    }

    /// Current counters.
    pub fn stats(&self) -> TapStatsSnapshot {
        self.reader.stats().snapshot()
    }

    fn report_drops(&mut self) {
        let dropped = self.reader.stats().dropped();
        if dropped > self.reported_drops {
            log::debug!(
                "Audio bridge dropped {} blocks (UI thread behind)",
                dropped - self.reported_drops
            );
            self.reported_drops = dropped;
        }
    }
}

impl Drop for AudioBridge {
    fn drop(&mut self) {
        self.reader.set_attached(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WebViewError;
    use crate::runtime::RuntimeMode;
    use rtaudio_core::tap;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Log {
        loads: usize,
        scripts: Vec<String>,
    }

    struct Recording {
        log: Arc<Mutex<Log>>,
        fail_load: bool,
        fail_eval: bool,
    }

    impl UiRuntime for Recording {
        fn load(&mut self, _request: &LoadRequest<'_>) -> Result<()> {
            if self.fail_load {
                return Err(WebViewError::LoadFailed("index.html".into()));
            }
            self.log.lock().unwrap().loads += 1;
            Ok(())
        }

        fn evaluate(&mut self, script: &str) -> Result<()> {
            if self.fail_eval {
                return Err(WebViewError::EvalFailed("busy".into()));
            }
            self.log.lock().unwrap().scripts.push(script.to_string());
            Ok(())
        }
    }

    fn recording(log: &Arc<Mutex<Log>>) -> Box<dyn UiRuntime> {
        Box::new(Recording {
            log: Arc::clone(log),
            fail_load: false,
            fail_eval: false,
        })
    }

    const REQUEST: LoadRequest<'static> = LoadRequest {
        entry_document: "index.html",
        identifier: "com.example.test",
        mode: RuntimeMode::Embedded,
        dev_tools: false,
    };

    #[test]
    fn test_detached_bridge_does_not_enable_tap() {
        let (mut tap, reader) = tap::channel(BridgeConfig::default());
        let mut bridge = AudioBridge::new(reader, BridgeConfig::default());

        assert!(!tap.push(Some(&[0.5f32; 4][..]), None, 4, 48_000.0));
        assert_eq!(bridge.drain(), 0);
    }

    #[test]
    fn test_attach_drain_detach() {
        let (mut tap, reader) = tap::channel(BridgeConfig::default());
        let mut bridge = AudioBridge::new(reader, BridgeConfig::default());
        let log = Arc::new(Mutex::new(Log::default()));

        bridge.attach(recording(&log), &REQUEST).unwrap();
        assert!(tap.is_attached());

        tap.push(Some(&[0.25f32, 0.5][..]), None, 2, 48_000.0);
        assert_eq!(bridge.drain(), 1);

        {
            let log = log.lock().unwrap();
            assert_eq!(log.loads, 1);
            assert_eq!(log.scripts.len(), 1);
            let right = "const right = new Float32Array([0.250000,0.500000]);";
            assert!(log.scripts[0].contains(right));
        }

        assert!(bridge.detach().is_some());
        assert!(!tap.is_attached());
        assert_eq!(bridge.stats().delivered, 1);
    }

    #[test]
    fn test_failed_load_stays_detached() {
        let (tap, reader) = tap::channel(BridgeConfig::default());
        let mut bridge = AudioBridge::new(reader, BridgeConfig::default());
        let runtime = Box::new(Recording {
            log: Arc::default(),
            fail_load: true,
            fail_eval: false,
        });

        assert!(bridge.attach(runtime, &REQUEST).is_err());
        assert!(!bridge.is_attached());
        assert!(!tap.is_attached());
    }

    #[test]
    fn test_delivery_failures_are_counted() {
        let (mut tap, reader) = tap::channel(BridgeConfig::default());
        let mut bridge = AudioBridge::new(reader, BridgeConfig::default());
        let runtime = Box::new(Recording {
            log: Arc::default(),
            fail_load: false,
            fail_eval: true,
        });
        bridge.attach(runtime, &REQUEST).unwrap();

        tap.push(Some(&[0.1f32][..]), None, 1, 48_000.0);
        tap.push(Some(&[0.2f32][..]), None, 1, 48_000.0);

        assert_eq!(bridge.drain(), 0);
        let stats = bridge.stats();
        assert_eq!(stats.sent, 2);
        assert_eq!(stats.delivery_failures, 2);
    }

    #[test]
    fn test_reattach_discards_stale_blocks() {
        let (mut tap, reader) = tap::channel(BridgeConfig::default());
        let mut bridge = AudioBridge::new(reader, BridgeConfig::default());
        let first = Arc::new(Mutex::new(Log::default()));
        let second = Arc::new(Mutex::new(Log::default()));

        bridge.attach(recording(&first), &REQUEST).unwrap();
        tap.push(Some(&[0.1f32][..]), None, 1, 48_000.0);

        bridge.attach(recording(&second), &REQUEST).unwrap();
        assert_eq!(bridge.drain(), 0);
        assert!(first.lock().unwrap().scripts.is_empty());
        assert!(second.lock().unwrap().scripts.is_empty());
    }

    #[test]
    fn test_drop_disables_tap() {
        let (tap, reader) = tap::channel(BridgeConfig::default());
        let mut bridge = AudioBridge::new(reader, BridgeConfig::default());
        bridge.attach(recording(&Arc::default()), &REQUEST).unwrap();

        drop(bridge);
        assert!(!tap.is_attached());
    }
}
