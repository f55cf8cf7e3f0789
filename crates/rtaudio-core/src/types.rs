//! Shared scalar types and system limits.

/// Parameter identifier as exchanged with the host.
pub type ParameterId = u32;

/// Parameter value (normalized 0.0..=1.0 or plain, depending on context).
pub type ParameterValue = f64;

/// Maximum number of channels per bus.
///
/// Channel slices are held in fixed-size arrays during processing so that
/// building a [`Buffer`](crate::Buffer) never touches the heap.
pub const MAX_CHANNELS: usize = 32;

/// Maximum supported sample rate (384 kHz).
pub const MAX_SAMPLE_RATE: f64 = 384_000.0;

/// Maximum supported frames per block.
pub const MAX_BLOCK_FRAMES: usize = 8192;

/// Editor size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Create a new size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}
