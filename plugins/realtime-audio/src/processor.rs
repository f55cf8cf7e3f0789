//! Pass-through processing.

use rtaudio_core::{Buffer, Sample};

/// Copy paired channels unchanged and silence the rest.
///
/// Channels `0..min(inputs, outputs)` are copied bit for bit; the remaining
/// outputs, and outputs whose input slot is disconnected, are zero-filled.
/// Touches only the output slices of `buffer`.
#[inline]
pub fn passthrough<S: Sample>(buffer: &mut Buffer<'_, S>) {
    for (input, output) in buffer.zip_channels() {
        output.copy_from_slice(input);
    }
    for output in buffer.unpaired_outputs() {
        output.fill(S::ZERO);
    }
}
