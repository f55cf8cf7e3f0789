//! Pre-allocated buffer storage for real-time safe audio processing.
//!
//! [`ProcessBufferStorage`] reserves capacity for channel pointers during
//! plugin preparation. Each block then reuses that capacity:
//!
//! 1. Allocate storage once from the channel layout (non-real-time)
//! 2. [`collect`](ProcessBufferStorage::collect) host pointers at the start of
//!    each block (O(channels), never exceeds capacity)
//! 3. Build a [`Buffer`] from the collected pointers
//!
//! # Real-Time Safety
//!
//! - `clear()` is O(1) - only sets Vec lengths to 0
//! - `collect()` never allocates - capacity is pre-reserved and excess
//!   channels are ignored
//! - All allocations happen in `allocate_from_layout()` (non-real-time)

use std::slice;

use crate::buffer::Buffer;
use crate::bus_config::ChannelLayout;
use crate::sample::Sample;

/// Pre-allocated storage for audio processing channel pointers.
///
/// Capacity matches the negotiated [`ChannelLayout`], so a stereo plugin
/// holds four pointers.
///
/// # Type Parameter
///
/// `S` is the sample type (`f32` or `f64`).
#[derive(Clone)]
pub struct ProcessBufferStorage<S: Sample> {
    /// Main input channel pointers (capacity = layout input channels).
    main_inputs: Vec<*const S>,
    /// Main output channel pointers (capacity = layout output channels).
    main_outputs: Vec<*mut S>,
    /// Max frames per block (set during allocation).
    max_frames: usize,
}

impl<S: Sample> ProcessBufferStorage<S> {
    /// Create empty storage (no capacity reserved).
    pub fn new() -> Self {
        Self {
            main_inputs: Vec::new(),
            main_outputs: Vec::new(),
            max_frames: 0,
        }
    }

    /// Create storage sized for a channel layout.
    ///
    /// Should be called during plugin preparation (non-real-time).
    pub fn allocate_from_layout(layout: &ChannelLayout, max_frames: usize) -> Self {
        Self {
            main_inputs: Vec::with_capacity(layout.input_channels),
            main_outputs: Vec::with_capacity(layout.output_channels),
            max_frames,
        }
    }

    /// Clear all pointer storage without deallocating.
    #[inline]
    pub fn clear(&mut self) {
        self.main_inputs.clear();
        self.main_outputs.clear();
    }

    /// Collect host channel pointers for one block.
    ///
    /// At most `n_in` input and `n_out` output pointers are read, further
    /// limited by the reserved capacity. A null array means no channels on
    /// that side. A null channel pointer keeps its slot and marks only that
    /// channel as disconnected.
    ///
    /// # Safety
    ///
    /// - `inputs` must be null or point to at least `n_in` readable pointers
    /// - `outputs` must be null or point to at least `n_out` readable pointers
    /// - Every non-null channel pointer must be valid for the current block
    #[inline]
    pub unsafe fn collect(
        &mut self,
        inputs: *const *const S,
        n_in: usize,
        outputs: *const *mut S,
        n_out: usize,
    ) {
        self.clear();

        if !inputs.is_null() {
            let n = n_in.min(self.main_inputs.capacity());
            for i in 0..n {
                // SAFETY: caller guarantees `inputs` holds at least n_in pointers.
                self.main_inputs.push(unsafe { *inputs.add(i) });
            }
        }

        if !outputs.is_null() {
            let n = n_out.min(self.main_outputs.capacity());
            for i in 0..n {
                // SAFETY: caller guarantees `outputs` holds at least n_out pointers.
                self.main_outputs.push(unsafe { *outputs.add(i) });
            }
        }
    }

    /// Number of input slots collected for the current block.
    #[inline]
    pub fn input_channel_count(&self) -> usize {
        self.main_inputs.len()
    }

    /// Number of output slots collected for the current block.
    #[inline]
    pub fn output_channel_count(&self) -> usize {
        self.main_outputs.len()
    }

    /// Get the main input capacity.
    #[inline]
    pub fn main_input_capacity(&self) -> usize {
        self.main_inputs.capacity()
    }

    /// Get the main output capacity.
    #[inline]
    pub fn main_output_capacity(&self) -> usize {
        self.main_outputs.capacity()
    }

    /// Get the maximum frames per block.
    #[inline]
    pub fn max_frames(&self) -> usize {
        self.max_frames
    }

    /// Build a [`Buffer`] over the collected pointers.
    ///
    /// `num_samples` is clamped to [`max_frames`](Self::max_frames). Null
    /// pointers become disconnected slots.
    ///
    /// # Safety
    ///
    /// - Pointers must still be valid (within the same block)
    /// - Each channel must hold at least `num_samples` samples
    /// - Output channels must not alias each other or any input channel
    ///
    /// # Clippy Allow: mut_from_ref
    ///
    /// The mutable slices point into host memory, not into `self`. The host
    /// guarantees single-threaded access to its buffers for the block.
    #[inline]
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn buffer(&self, num_samples: usize) -> Buffer<'_, S> {
        let frames = num_samples.min(self.max_frames);
        Buffer::from_slots(
            self.main_inputs.iter().map(|&ptr| {
                // SAFETY: caller guarantees non-null ptrs are valid for `frames` samples.
                (!ptr.is_null()).then(|| unsafe { slice::from_raw_parts(ptr, frames) })
            }),
            self.main_outputs.iter().map(|&ptr| {
                // SAFETY: caller guarantees non-null ptrs are valid and unaliased.
                (!ptr.is_null()).then(|| unsafe { slice::from_raw_parts_mut(ptr, frames) })
            }),
            frames,
        )
    }
}

impl<S: Sample> Default for ProcessBufferStorage<S> {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: The raw pointers are only dereferenced within a single block
// where the host guarantees single-threaded access.
unsafe impl<S: Sample> Send for ProcessBufferStorage<S> {}
// SAFETY: Shared access never dereferences the stored pointers.
unsafe impl<S: Sample> Sync for ProcessBufferStorage<S> {}
