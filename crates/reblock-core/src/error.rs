//! Error types for reblock.
//!
//! Only preparation and FIFO bookkeeping can fail. The per-callback
//! adaptation path has no error returns: its bounds follow from the block
//! plan and are checked with debug assertions.

use thiserror::Error;

/// Errors reported by prepare-time configuration and the audio/MIDI FIFO.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    /// Sample rate was zero, negative or not finite.
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(f64),

    /// Host announced a zero maximum block size.
    #[error("Invalid host block size: {0}")]
    InvalidBlockSize(usize),

    /// Engine reported a zero native block size.
    #[error("Engine reported an invalid native block size: {0}")]
    InvalidEngineBlockSize(usize),

    /// Oversampling factor is not a power of two in `1..=MAX_OVERSAMPLING`.
    #[error("Invalid oversampling factor: {0}. Must be a power of two between 1 and {max}", max = crate::types::MAX_OVERSAMPLING)]
    InvalidOversampling(u32),

    /// A channel count exceeds [`MAX_CHANNELS`](crate::MAX_CHANNELS).
    #[error("{direction} channel count {requested} exceeds maximum of {max}")]
    TooManyChannels {
        direction: &'static str,
        requested: usize,
        max: usize,
    },

    /// More frames were written to the FIFO than it has room for.
    #[error("FIFO overflow: {requested} frames requested, {available} free")]
    FifoOverflow { requested: usize, available: usize },

    /// More frames were read from the FIFO than are queued.
    #[error("FIFO underflow: {requested} frames requested, {available} ready")]
    FifoUnderflow { requested: usize, available: usize },

    /// FIFO source or destination has the wrong number of channels.
    #[error("FIFO channel mismatch: expected {expected}, got {actual}")]
    FifoChannelMismatch { expected: usize, actual: usize },
}

/// Result type for reblock operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
