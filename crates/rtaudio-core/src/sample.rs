//! Sample type abstraction for generic f32/f64 processing.
//!
//! Hosts may deliver single or double precision audio. Processing code is
//! written once against [`Sample`] and instantiated for both.

use std::fmt::Debug;

/// Floating-point sample type carried by host audio buffers.
pub trait Sample: Copy + Default + PartialEq + Debug + Send + Sync + 'static {
    /// Silence.
    const ZERO: Self;

    /// Convert from `f32`.
    fn from_f32(value: f32) -> Self;

    /// Convert to `f32` (lossy for `f64`).
    fn to_f32(self) -> f32;

    /// Convert to `f64`.
    fn to_f64(self) -> f64;
}

impl Sample for f32 {
    const ZERO: Self = 0.0;

    #[inline]
    fn from_f32(value: f32) -> Self {
        value
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Sample for f64 {
    const ZERO: Self = 0.0;

    #[inline]
    fn from_f32(value: f32) -> Self {
        value as f64
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}
