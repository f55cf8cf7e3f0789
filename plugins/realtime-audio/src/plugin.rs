//! The plugin instance.
//!
//! [`RealTimeAudio`] is the audio-thread half: it owns pointer storage, the
//! sample rate and the producer end of the audio tap. The UI half is the
//! [`Editor`] returned alongside it. Parameters are shared by both.
//!
//! Per block:
//!
//! 1. pass inputs through to outputs
//! 2. read the sample rate once
//! 3. queue input channels 0/1 on the tap (no-op while the editor is closed)

use std::sync::Arc;

use rtaudio_core::tap;
use rtaudio_core::{
    AudioTap, BridgeConfig, Buffer, ChannelLayout, MaxBufferSize, Parameters, PluginConfig,
    PluginResult, ProcessBufferStorage, Sample, SampleRate,
};

use crate::editor::Editor;
use crate::params::RealTimeAudioParameters;
use crate::processor::passthrough;

/// Plugin metadata.
pub static CONFIG: PluginConfig = PluginConfig::new("RealTimeAudio", "com.realtimeaudio.plugin")
    .with_vendor("RealTimeAudio")
    .with_version(env!("CARGO_PKG_VERSION"));

/// Audio-thread state of one plugin instance.
pub struct RealTimeAudio {
    params: Arc<RealTimeAudioParameters>,
    tap: AudioTap,
    sample_rate: SampleRate,
    max_buffer_size: MaxBufferSize,
    layout: ChannelLayout,
    storage_f32: ProcessBufferStorage<f32>,
    storage_f64: ProcessBufferStorage<f64>,
}

impl RealTimeAudio {
    /// Create an instance for `layout` and its editor.
    ///
    /// Storage is sized for the largest supported block at 44.1 kHz until
    /// the host calls [`reset`](Self::reset).
    pub fn new(layout: ChannelLayout, bridge: BridgeConfig) -> PluginResult<(Self, Editor)> {
        layout.validate()?;

        let params = Arc::new(RealTimeAudioParameters::new());
        let (audio_tap, reader) = tap::channel(bridge);
        let max_buffer_size = MaxBufferSize::default();
        let max_frames = max_buffer_size.frames();

        let plugin = Self {
            params: Arc::clone(&params),
            tap: audio_tap,
            sample_rate: SampleRate::default(),
            max_buffer_size,
            layout,
            storage_f32: ProcessBufferStorage::allocate_from_layout(&layout, max_frames),
            storage_f64: ProcessBufferStorage::allocate_from_layout(&layout, max_frames),
        };
        let editor = Editor::new(&CONFIG, reader, bridge, params);

        log::debug!(
            "Created {} ({} in, {} out)",
            CONFIG.name,
            layout.input_channels,
            layout.output_channels
        );
        Ok((plugin, editor))
    }

    /// Shared parameters.
    pub fn params(&self) -> &Arc<RealTimeAudioParameters> {
        &self.params
    }

    /// Negotiated channel layout.
    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    /// Current sample rate.
    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// Largest block accepted by the raw entry points.
    pub fn max_buffer_size(&self) -> MaxBufferSize {
        self.max_buffer_size
    }

    /// Reset notification with the host's processing setup (non-real-time).
    ///
    /// Validates both values; on error nothing changes. Pointer storage is
    /// re-allocated only when the block size changes.
    pub fn reset(&mut self, sample_rate: f64, max_frames: usize) -> PluginResult<()> {
        let sample_rate = SampleRate::new(sample_rate)?;
        let max_buffer_size = MaxBufferSize::new(max_frames)?;

        self.sample_rate = sample_rate;
        if max_buffer_size != self.max_buffer_size {
            self.max_buffer_size = max_buffer_size;
            self.storage_f32 = ProcessBufferStorage::allocate_from_layout(&self.layout, max_frames);
            self.storage_f64 = ProcessBufferStorage::allocate_from_layout(&self.layout, max_frames);
        }

        log::debug!(
            "Reset: {} Hz, {} frames",
            sample_rate.hz(),
            max_buffer_size.frames()
        );
        Ok(())
    }

    /// Process one block.
    ///
    /// Real-time safe: no allocation, no locks, no logging.
    pub fn process_block<S: Sample>(&mut self, buffer: &mut Buffer<'_, S>) {
        process(&mut self.tap, self.sample_rate, buffer);
    }

    /// Process one block of single-precision host pointers.
    ///
    /// # Safety
    ///
    /// See [`ProcessBufferStorage::collect`] and
    /// [`ProcessBufferStorage::buffer`]: every non-null channel pointer must
    /// hold `frames` samples, and outputs must not alias.
    pub unsafe fn process_raw_f32(
        &mut self,
        inputs: *const *const f32,
        num_inputs: usize,
        outputs: *const *mut f32,
        num_outputs: usize,
        frames: usize,
    ) {
        // SAFETY: forwarded caller contract.
        unsafe {
            process_raw(
                &mut self.storage_f32,
                &mut self.tap,
                self.sample_rate,
                (inputs, num_inputs),
                (outputs, num_outputs),
                frames,
            );
        }
    }

    /// Process one block of double-precision host pointers.
    ///
    /// # Safety
    ///
    /// Same contract as [`process_raw_f32`](Self::process_raw_f32).
    pub unsafe fn process_raw_f64(
        &mut self,
        inputs: *const *const f64,
        num_inputs: usize,
        outputs: *const *mut f64,
        num_outputs: usize,
        frames: usize,
    ) {
        // SAFETY: forwarded caller contract.
        unsafe {
            process_raw(
                &mut self.storage_f64,
                &mut self.tap,
                self.sample_rate,
                (inputs, num_inputs),
                (outputs, num_outputs),
                frames,
            );
        }
    }

    /// Serialize parameter values.
    pub fn save_state(&self) -> PluginResult<Vec<u8>> {
        self.params.save_state()
    }

    /// Restore parameter values saved by [`save_state`](Self::save_state).
    pub fn load_state(&self, data: &[u8]) -> PluginResult<()> {
        self.params.load_state(data)
    }
}

fn process<S: Sample>(tap: &mut AudioTap, sample_rate: SampleRate, buffer: &mut Buffer<'_, S>) {
    passthrough(buffer);
    tap.push_buffer(buffer, sample_rate.hz());
}

/// # Safety
///
/// See [`RealTimeAudio::process_raw_f32`].
unsafe fn process_raw<S: Sample>(
    storage: &mut ProcessBufferStorage<S>,
    tap: &mut AudioTap,
    sample_rate: SampleRate,
    (inputs, num_inputs): (*const *const S, usize),
    (outputs, num_outputs): (*const *mut S, usize),
    frames: usize,
) {
    // SAFETY: caller guarantees the pointer arrays and channels are valid
    // for this block.
    unsafe {
        storage.collect(inputs, num_inputs, outputs, num_outputs);
        let mut buffer = storage.buffer(frames);
        process(tap, sample_rate, &mut buffer);
    }
}
