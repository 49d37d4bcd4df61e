//! Channel-plane views used on both sides of the bridge.
//!
//! [`Buffer`] is the one audio type in the crate. The host hands one to
//! `BlockBridge::process_block` covering however many frames arrived in the
//! callback; the bridge hands one to [`DspEngine::perform`](crate::DspEngine::perform)
//! covering exactly one fixed block, whose planes point either into the
//! carry buffers or straight into host memory.
//!
//! # Real-Time Safety
//!
//! Channel slices live in fixed-size stack arrays bounded by
//! [`MAX_CHANNELS`]. Building a `Buffer` never touches the heap.
//!
//! # Example: Engine Passthrough
//!
//! ```ignore
//! fn perform(&mut self, block: &mut Buffer, _midi: &mut MidiOutput) {
//!     block.copy_to_output();
//! }
//! ```

use crate::sample::Sample;
use crate::types::MAX_CHANNELS;

// =============================================================================
// Buffer
// =============================================================================

/// Input and output channel planes for one processing call.
///
/// # Type Parameter
///
/// `S` is the sample type, defaulting to `f32`.
///
/// # Lifetime
///
/// The `'a` lifetime ties the buffer to the memory it views: host memory for
/// the duration of one callback, or the bridge's carry storage for the
/// duration of one engine invocation.
///
/// # Channel Layout
///
/// Channels are indexed from 0. Channels beyond [`MAX_CHANNELS`] are
/// silently ignored.
pub struct Buffer<'a, S: Sample = f32> {
    /// Input channel slices (read-only)
    /// Option<&[S]> is Copy, so [None; N] works
    inputs: [Option<&'a [S]>; MAX_CHANNELS],
    /// Output channel slices
    outputs: [Option<&'a mut [S]>; MAX_CHANNELS],
    /// Number of active input channels
    num_input_channels: usize,
    /// Number of active output channels
    num_output_channels: usize,
    /// Number of frames in this call
    num_samples: usize,
}

impl<'a, S: Sample> Buffer<'a, S> {
    /// Create a new buffer from channel slices.
    ///
    /// Every slice must hold at least `num_samples` frames.
    #[inline]
    pub fn new(
        inputs: impl IntoIterator<Item = &'a [S]>,
        outputs: impl IntoIterator<Item = &'a mut [S]>,
        num_samples: usize,
    ) -> Self {
        let mut input_arr: [Option<&'a [S]>; MAX_CHANNELS] = [None; MAX_CHANNELS];
        let mut num_input_channels = 0;
        for (i, slice) in inputs.into_iter().take(MAX_CHANNELS).enumerate() {
            debug_assert!(slice.len() >= num_samples, "input channel {i} is too short");
            input_arr[i] = Some(slice);
            num_input_channels = i + 1;
        }

        // Can't use [None; N] for &mut because it's not Copy
        let mut output_arr: [Option<&'a mut [S]>; MAX_CHANNELS] = std::array::from_fn(|_| None);
        let mut num_output_channels = 0;
        for (i, slice) in outputs.into_iter().take(MAX_CHANNELS).enumerate() {
            debug_assert!(slice.len() >= num_samples, "output channel {i} is too short");
            output_arr[i] = Some(slice);
            num_output_channels = i + 1;
        }

        Self {
            inputs: input_arr,
            outputs: output_arr,
            num_input_channels,
            num_output_channels,
            num_samples,
        }
    }

    // =========================================================================
    // Buffer Info
    // =========================================================================

    /// Number of frames in this call.
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Number of input channels.
    #[inline]
    pub fn num_input_channels(&self) -> usize {
        self.num_input_channels
    }

    /// Number of output channels.
    #[inline]
    pub fn num_output_channels(&self) -> usize {
        self.num_output_channels
    }

    // =========================================================================
    // Channel Access
    // =========================================================================

    /// Get an input channel by index.
    ///
    /// Returns an empty slice if the channel doesn't exist.
    #[inline]
    pub fn input(&self, channel: usize) -> &[S] {
        self.inputs
            .get(channel)
            .and_then(|opt| opt.as_ref())
            .map(|ch| &ch[..self.num_samples])
            .unwrap_or(&[])
    }

    /// Get a mutable output channel by index.
    ///
    /// # Panics
    ///
    /// Panics if the channel index is out of bounds.
    #[inline]
    pub fn output(&mut self, channel: usize) -> &mut [S] {
        let n = self.num_samples;
        self.outputs[channel]
            .as_mut()
            .map(|ch| &mut ch[..n])
            .expect("output channel out of bounds")
    }

    // =========================================================================
    // Iterators
    // =========================================================================

    /// Iterate over all input channels.
    #[inline]
    pub fn inputs(&self) -> impl Iterator<Item = &[S]> + '_ {
        let n = self.num_samples;
        self.inputs[..self.num_input_channels]
            .iter()
            .filter_map(move |opt| opt.as_ref().map(|ch| &ch[..n]))
    }

    /// Iterate over all output channels mutably.
    #[inline]
    pub fn outputs_mut(&mut self) -> impl Iterator<Item = &mut [S]> + use<'_, 'a, S> {
        let n = self.num_samples;
        self.outputs[..self.num_output_channels]
            .iter_mut()
            .filter_map(move |opt| opt.as_mut().map(|ch| &mut ch[..n]))
    }

    /// Iterate over paired (input, output) channels.
    ///
    /// Only yields channels that exist in both input and output.
    #[inline]
    pub fn zip_channels(&mut self) -> impl Iterator<Item = (&[S], &mut [S])> + use<'_, 'a, S> {
        let n = self.num_samples;
        let num_pairs = self.num_input_channels.min(self.num_output_channels);
        self.inputs[..num_pairs]
            .iter()
            .zip(self.outputs[..num_pairs].iter_mut())
            .filter_map(move |(i_opt, o_opt)| match (i_opt.as_ref(), o_opt.as_mut()) {
                (Some(i), Some(o)) => Some((&i[..n], &mut o[..n])),
                _ => None,
            })
    }

    // =========================================================================
    // Bulk Operations
    // =========================================================================

    /// Copy all input channels to output channels.
    ///
    /// Only copies channels that exist in both input and output.
    pub fn copy_to_output(&mut self) {
        let num_channels = self.num_input_channels.min(self.num_output_channels);
        let n = self.num_samples;
        for ch in 0..num_channels {
            if let (Some(input), Some(output)) = (self.inputs[ch].as_ref(), self.outputs[ch].as_mut()) {
                output[..n].copy_from_slice(&input[..n]);
            }
        }
    }

    /// Clear all output channels to silence.
    pub fn clear_outputs(&mut self) {
        self.clear_outputs_from(0);
    }

    /// Clear output channels `first..` to silence.
    ///
    /// Used to silence host channels the engine does not drive.
    pub fn clear_outputs_from(&mut self, first: usize) {
        let n = self.num_samples;
        if first >= self.num_output_channels {
            return;
        }
        for opt in self.outputs[first..self.num_output_channels].iter_mut() {
            if let Some(output) = opt.as_mut() {
                output[..n].fill(S::ZERO);
            }
        }
    }
}
