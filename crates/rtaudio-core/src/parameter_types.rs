//! Parameter types with encapsulated atomic storage.
//!
//! [`FloatParameter`] stores its normalized value in an `AtomicU64`, so the
//! host, the UI and the audio thread can read and write it without locks.
//! [`Parameters`] is the collection trait a plugin implements to expose its
//! parameters to the host and to saved state.
//!
//! # Example
//!
//! ```
//! use rtaudio_core::FloatParameter;
//!
//! let gain = FloatParameter::db("Gain", 0.0, -70.0..=12.0)
//!     .with_string_id("gain")
//!     .with_step_size(0.01);
//!
//! gain.set(-6.004);
//! assert!((gain.get() - -6.0).abs() < 1e-9);
//! ```

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::PluginResult;
use crate::parameter_format::Formatter;
use crate::parameter_info::{ParameterFlags, ParameterInfo, ParameterUnit};
use crate::parameter_range::{LinearMapper, RangeMapper};
use crate::types::{ParameterId, ParameterValue};

// =============================================================================
// ParameterRef Trait - Type-erased parameter access
// =============================================================================

/// Trait for type-erased parameter access at runtime.
///
/// All implementations must be thread-safe (`Send + Sync`) for
/// concurrent access from audio, UI, and host threads.
pub trait ParameterRef: Send + Sync {
    /// Get the parameter's unique ID.
    fn id(&self) -> ParameterId {
        self.info().id
    }

    /// Get the parameter's display name.
    fn name(&self) -> &'static str {
        self.info().name
    }

    /// Get the parameter flags.
    fn flags(&self) -> &ParameterFlags {
        &self.info().flags
    }

    /// Get the current normalized value (0.0-1.0).
    ///
    /// This is lock-free and safe to call from the audio thread.
    fn get_normalized(&self) -> ParameterValue;

    /// Set the normalized value (0.0-1.0).
    ///
    /// Values are clamped to [0.0, 1.0]; non-finite values are ignored.
    fn set_normalized(&self, value: ParameterValue);

    /// Get the current plain value in natural units.
    fn get_plain(&self) -> ParameterValue;

    /// Set the plain value in natural units.
    fn set_plain(&self, value: ParameterValue);

    /// Format the current value for display.
    fn display(&self) -> String {
        self.display_normalized(self.get_normalized())
    }

    /// Format a normalized value for display.
    fn display_normalized(&self, normalized: ParameterValue) -> String;

    /// Parse a display string to a normalized value.
    fn parse(&self, s: &str) -> Option<ParameterValue>;

    /// Get the full metadata for this parameter.
    fn info(&self) -> &ParameterInfo;
}

// =============================================================================
// Parameters Trait - Parameter collection
// =============================================================================

/// Trait for parameter collections.
///
/// Provides type-erased iteration (for host integration) and JSON state
/// persistence keyed by each parameter's `string_id`.
pub trait Parameters: Send + Sync {
    /// Returns the total number of parameters.
    fn count(&self) -> usize;

    /// Iterate over all parameters (type-erased).
    fn iter(&self) -> Box<dyn Iterator<Item = &dyn ParameterRef> + '_>;

    /// Get a parameter by its ID.
    fn by_id(&self, id: ParameterId) -> Option<&dyn ParameterRef> {
        self.iter().find(|p| p.id() == id)
    }

    /// Serialize all parameter values (plain units) to JSON.
    fn save_state(&self) -> PluginResult<Vec<u8>> {
        let values: BTreeMap<&'static str, f64> = self
            .iter()
            .map(|p| (p.info().string_id, p.get_plain()))
            .collect();
        Ok(serde_json::to_vec(&values)?)
    }

    /// Restore parameter values from JSON produced by [`save_state`](Self::save_state).
    ///
    /// Unknown keys are ignored; parameters missing from the state keep their
    /// current value.
    fn load_state(&self, data: &[u8]) -> PluginResult<()> {
        let values: BTreeMap<String, f64> = serde_json::from_slice(data)?;
        for param in self.iter() {
            if let Some(&value) = values.get(param.info().string_id) {
                param.set_plain(value);
            }
        }
        Ok(())
    }
}

// =============================================================================
// FloatParameter - Continuous parameter with atomic storage
// =============================================================================

/// Float parameter with atomic storage.
///
/// # Specialized Constructors
///
/// - [`FloatParameter::new`]: Generic linear float
/// - [`FloatParameter::db`]: Decibel value, stored in dB
pub struct FloatParameter {
    /// Parameter metadata (id, name, units, flags, etc.)
    info: ParameterInfo,
    /// Atomic storage for normalized value (0.0-1.0)
    value: AtomicU64,
    /// Range mapper for normalized ↔ plain value conversion
    range: Box<dyn RangeMapper>,
    /// Formatter for display string conversion
    formatter: Formatter,
    /// Optional step size for discrete stepping. None = continuous.
    step_size: Option<f64>,
}

impl FloatParameter {
    /// Create a generic float parameter with linear mapping.
    ///
    /// The parameter ID defaults to 0 and should be set via [`with_id`](Self::with_id).
    pub fn new(name: &'static str, default: f64, range: RangeInclusive<f64>) -> Self {
        let mapper = LinearMapper::new(range);
        let default_normalized = mapper.normalize(default);

        Self {
            info: ParameterInfo {
                default_normalized,
                ..ParameterInfo::new(0, name)
            },
            value: AtomicU64::new(default_normalized.to_bits()),
            range: Box::new(mapper),
            formatter: Formatter::Float { precision: 2 },
            step_size: None,
        }
    }

    /// Create a decibel parameter.
    ///
    /// The value is stored in **dB**: [`get`](Self::get) returns dB.
    pub fn db(name: &'static str, default_db: f64, range_db: RangeInclusive<f64>) -> Self {
        let min_db = *range_db.start();
        let mapper = LinearMapper::new(range_db);
        let default_normalized = mapper.normalize(default_db);
        let formatter = Formatter::DecibelDirect {
            precision: 1,
            min_db,
        };

        Self {
            info: ParameterInfo {
                units: formatter.unit(),
                unit: ParameterUnit::Decibels,
                default_normalized,
                ..ParameterInfo::new(0, name)
            },
            value: AtomicU64::new(default_normalized.to_bits()),
            range: Box::new(mapper),
            formatter,
            step_size: None,
        }
    }

    /// Set the parameter ID.
    pub fn with_id(mut self, id: ParameterId) -> Self {
        self.info.id = id;
        self
    }

    /// Set the string identifier used for saved state.
    pub fn with_string_id(mut self, string_id: &'static str) -> Self {
        self.info = self.info.with_string_id(string_id);
        self
    }

    /// Snap values to multiples of `step_size` from the range minimum.
    ///
    /// # Panics
    ///
    /// Panics if `step_size` is not positive.
    pub fn with_step_size(mut self, step_size: f64) -> Self {
        assert!(
            step_size > 0.0,
            "step_size must be positive, got {}",
            step_size
        );

        let (min, max) = self.range.range();
        let range_size = max - min;

        // step_count = N means N+1 discrete values
        let step_count = if step_size >= range_size {
            1
        } else {
            (range_size / step_size).round() as i32
        };

        self.step_size = Some(step_size);
        self.info.step_count = step_count;
        self
    }

    /// Get the step size, if configured.
    pub fn step_size(&self) -> Option<f64> {
        self.step_size
    }

    /// Get the step count for host UI integration.
    pub fn step_count(&self) -> i32 {
        self.info.step_count
    }

    /// Set the display precision for this parameter.
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.formatter = self.formatter.with_precision(precision);
        self
    }

    /// Get the parameter metadata.
    pub fn info(&self) -> &ParameterInfo {
        &self.info
    }

    /// Get the current plain value in natural units.
    #[inline]
    pub fn get(&self) -> f64 {
        let normalized = f64::from_bits(self.value.load(Ordering::Relaxed));
        self.range.denormalize(normalized)
    }

    /// Set the plain value in natural units.
    ///
    /// If a step size is configured, the value is snapped to the nearest step.
    /// Non-finite values are ignored.
    #[inline]
    pub fn set(&self, value: f64) {
        if !value.is_finite() {
            return;
        }
        let snapped = match self.step_size {
            Some(step) => {
                let (min, max) = self.range.range();
                snap_to_step(value, step, min, max)
            }
            None => value,
        };
        let normalized = self.range.normalize(snapped);
        self.value.store(normalized.to_bits(), Ordering::Relaxed);
    }
}

impl ParameterRef for FloatParameter {
    fn get_normalized(&self) -> ParameterValue {
        f64::from_bits(self.value.load(Ordering::Relaxed))
    }

    fn set_normalized(&self, value: ParameterValue) {
        if value.is_finite() {
            self.value
                .store(value.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
        }
    }

    fn get_plain(&self) -> ParameterValue {
        self.get()
    }

    fn set_plain(&self, value: ParameterValue) {
        self.set(value);
    }

    fn display_normalized(&self, normalized: ParameterValue) -> String {
        let plain = self.range.denormalize(normalized);
        self.formatter.text(plain)
    }

    fn parse(&self, s: &str) -> Option<ParameterValue> {
        let plain = self.formatter.parse(s)?;
        Some(self.range.normalize(plain))
    }

    fn info(&self) -> &ParameterInfo {
        &self.info
    }
}

/// Snap a value to the nearest step within a range.
#[inline]
fn snap_to_step(value: f64, step_size: f64, min: f64, max: f64) -> f64 {
    let steps_from_min = ((value - min) / step_size).round();
    let snapped = min + steps_from_min * step_size;
    // Rounding can overshoot the bounds
    snapped.clamp(min, max)
}
