//! Channel buffers for one processing block.
//!
//! [`Buffer`] borrows host-owned channel memory for the duration of a single
//! block. Channel slices live in fixed-size arrays (at most
//! [`MAX_CHANNELS`] per side), so constructing a buffer never allocates and
//! is safe on the audio thread.
//!
//! Each channel index is a slot. A slot may be disconnected (the host passed
//! no memory for it) without shifting the indices of later channels.

use crate::sample::Sample;
use crate::types::MAX_CHANNELS;

/// Input and output channels of one audio block.
///
/// All connected channels expose exactly [`num_samples`](Self::num_samples)
/// frames. If any channel slice is shorter than the requested frame count,
/// the block is shortened to the shortest channel so the equal-length
/// invariant holds.
pub struct Buffer<'a, S: Sample = f32> {
    inputs: [Option<&'a [S]>; MAX_CHANNELS],
    outputs: [Option<&'a mut [S]>; MAX_CHANNELS],
    num_inputs: usize,
    num_outputs: usize,
    num_samples: usize,
}

impl<'a, S: Sample> Buffer<'a, S> {
    /// Create a buffer where every channel is connected.
    ///
    /// Channels beyond [`MAX_CHANNELS`] are ignored.
    pub fn new<I, O>(inputs: I, outputs: O, num_samples: usize) -> Self
    where
        I: IntoIterator<Item = &'a [S]>,
        O: IntoIterator<Item = &'a mut [S]>,
    {
        Self::from_slots(
            inputs.into_iter().map(Some),
            outputs.into_iter().map(Some),
            num_samples,
        )
    }

    /// Create a buffer from channel slots, `None` marking a disconnected
    /// channel.
    ///
    /// Slots beyond [`MAX_CHANNELS`] are ignored.
    pub fn from_slots<I, O>(inputs: I, outputs: O, num_samples: usize) -> Self
    where
        I: IntoIterator<Item = Option<&'a [S]>>,
        O: IntoIterator<Item = Option<&'a mut [S]>>,
    {
        let mut input_slots: [Option<&'a [S]>; MAX_CHANNELS] = [None; MAX_CHANNELS];
        let mut output_slots: [Option<&'a mut [S]>; MAX_CHANNELS] =
            std::array::from_fn(|_| None);

        let mut frames = num_samples;
        let mut num_inputs = 0;
        for (slot, channel) in input_slots.iter_mut().zip(inputs) {
            if let Some(channel) = channel {
                frames = frames.min(channel.len());
            }
            *slot = channel;
            num_inputs += 1;
        }

        let mut num_outputs = 0;
        for (slot, channel) in output_slots.iter_mut().zip(outputs) {
            if let Some(channel) = &channel {
                frames = frames.min(channel.len());
            }
            *slot = channel;
            num_outputs += 1;
        }

        Self {
            inputs: input_slots,
            outputs: output_slots,
            num_inputs,
            num_outputs,
            num_samples: frames,
        }
    }

    /// Frames per channel in this block.
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Number of input slots, connected or not.
    #[inline]
    pub fn num_input_channels(&self) -> usize {
        self.num_inputs
    }

    /// Number of output slots, connected or not.
    #[inline]
    pub fn num_output_channels(&self) -> usize {
        self.num_outputs
    }

    /// Get an input channel, or `None` if it is not connected.
    #[inline]
    pub fn input(&self, channel: usize) -> Option<&[S]> {
        let frames = self.num_samples;
        self.inputs
            .get(channel)
            .copied()
            .flatten()
            .map(|c| &c[..frames])
    }

    /// Get an output channel for writing, or `None` if it is not connected.
    #[inline]
    pub fn output_mut(&mut self, channel: usize) -> Option<&mut [S]> {
        let frames = self.num_samples;
        self.outputs
            .get_mut(channel)?
            .as_deref_mut()
            .map(|c| &mut c[..frames])
    }

    /// Iterate over (input, output) pairs where both slots are connected.
    ///
    /// Only channels below `min(inputs, outputs)` can pair.
    pub fn zip_channels(&mut self) -> impl Iterator<Item = (&[S], &mut [S])> + use<'_, 'a, S> {
        let frames = self.num_samples;
        self.inputs
            .iter()
            .zip(self.outputs[..self.num_outputs].iter_mut())
            .filter_map(move |(input, output)| {
                let input = (*input)?;
                let output = output.as_deref_mut()?;
                Some((&input[..frames], &mut output[..frames]))
            })
    }

    /// Connected outputs whose input slot is missing or disconnected.
    pub fn unpaired_outputs(&mut self) -> impl Iterator<Item = &mut [S]> + use<'_, 'a, S> {
        let frames = self.num_samples;
        self.inputs
            .iter()
            .zip(self.outputs[..self.num_outputs].iter_mut())
            .filter(|(input, _)| input.is_none())
            .filter_map(move |(_, output)| output.as_deref_mut().map(|o| &mut o[..frames]))
    }
}
