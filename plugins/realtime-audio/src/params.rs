//! Plugin parameters.
//!
//! A single "Gain" parameter is registered with the host. It is not applied
//! to the signal: changes are observed and counted, nothing more.

use std::sync::atomic::{AtomicU64, Ordering};

use rtaudio_core::{FloatParameter, ParameterId, ParameterRef, Parameters};

/// Host index of the gain parameter.
pub const GAIN_ID: ParameterId = 0;

/// Parameters shared by the host, editor and audio threads.
pub struct RealTimeAudioParameters {
    /// Gain in dB, -70..=12, default 0.
    pub gain: FloatParameter,
    changes: AtomicU64,
}

impl RealTimeAudioParameters {
    /// Create the parameter set with default values.
    pub fn new() -> Self {
        Self {
            gain: FloatParameter::db("Gain", 0.0, -70.0..=12.0)
                .with_id(GAIN_ID)
                .with_string_id("gain")
                .with_step_size(0.01)
                .with_precision(2),
            changes: AtomicU64::new(0),
        }
    }

    /// Parameter-change notification.
    ///
    /// Returns `false` for an unknown id. Known ids are counted; no audio
    /// state is touched.
    pub fn on_param_change(&self, id: ParameterId) -> bool {
        match id {
            GAIN_ID => {
                self.changes.fetch_add(1, Ordering::Relaxed);
                true
            }
            _ => false,
        }
    }

    /// Changes observed since creation.
    pub fn param_changes(&self) -> u64 {
        self.changes.load(Ordering::Relaxed)
    }
}

impl Default for RealTimeAudioParameters {
    fn default() -> Self {
        Self::new()
    }
}

impl Parameters for RealTimeAudioParameters {
    fn count(&self) -> usize {
        1
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &dyn ParameterRef> + '_> {
        Box::new(std::iter::once(&self.gain as &dyn ParameterRef))
    }
}
