//! The fixed-size DSP engine boundary.
//!
//! The bridge knows nothing about what the engine computes. It only
//! guarantees the call pattern:
//!
//! ```text
//!   prepare(num_inputs, num_outputs, effective_sample_rate)
//!      |
//!      v
//!   start()
//!      |
//!      v
//!   [ receive_midi(offset, event)* ; perform(block, midi_out) ]*   (audio thread)
//!      |
//!      v
//!   release()
//! ```
//!
//! `prepare` and `start` run again whenever the host changes sample rate,
//! block size or oversampling.

use crate::buffer::Buffer;
use crate::event::EngineEvent;
use crate::midi_out::MidiOutput;
use crate::sample::Sample;
use crate::types::DEFAULT_BLOCK_SIZE;

/// A synchronous DSP engine that only processes fixed-size blocks.
///
/// # Type Parameter
///
/// `S` is the sample type, defaulting to `f32`.
///
/// # Thread Safety
///
/// Implementors must be `Send` because the bridge may be moved to the audio
/// thread after construction. [`perform`](Self::perform) and
/// [`receive_midi`](Self::receive_midi) are called on the audio thread and
/// must be real-time safe:
/// - No allocations
/// - No locks
/// - No unbounded loops
pub trait DspEngine<S: Sample = f32>: Send {
    /// Frames per block at an oversampling factor of 1.
    ///
    /// Read once per prepare. The block handed to [`perform`](Self::perform)
    /// is this size multiplied by the oversampling factor.
    ///
    /// Default returns [`DEFAULT_BLOCK_SIZE`] (64).
    fn native_block_size(&self) -> usize {
        DEFAULT_BLOCK_SIZE
    }

    /// One-time setup for a new configuration. Not called on the audio
    /// thread while processing; may allocate.
    ///
    /// `sample_rate` already includes the oversampling factor.
    fn prepare(&mut self, num_inputs: usize, num_outputs: usize, sample_rate: f64);

    /// Called after [`prepare`](Self::prepare), before the first block.
    fn start(&mut self);

    /// Called when the bridge leaves the prepared state.
    ///
    /// Default implementation does nothing.
    fn release(&mut self) {}

    /// Deliver one input event for the block about to be performed.
    ///
    /// Called in offset order, immediately before [`perform`](Self::perform).
    /// `sample_offset` is relative to the start of that block.
    ///
    /// Default implementation ignores the event.
    fn receive_midi(&mut self, _sample_offset: u32, _event: EngineEvent) {}

    /// Process exactly one fixed block.
    ///
    /// Every input and output plane holds `block.num_samples()` frames, which
    /// always equals the fixed block size. Events sent to `midi_out` use
    /// block-relative offsets.
    fn perform(&mut self, block: &mut Buffer<'_, S>, midi_out: &mut MidiOutput<'_>);
}
