//! Common limits and defaults used throughout reblock.

// =============================================================================
// Audio Limits
// =============================================================================
//
// These constants bound the stack storage inside `Buffer` and the channel
// counts accepted at prepare time. Configurations exceeding them are
// rejected by `prepare()` with `BridgeError::TooManyChannels`.
// =============================================================================

/// Maximum number of audio channels on either side of the bridge.
///
/// Set to 32 to cover 22.2 surround and Atmos 9.1.6 layouts with headroom.
pub const MAX_CHANNELS: usize = 32;

/// Block size of an engine that does not override
/// [`DspEngine::native_block_size`](crate::DspEngine::native_block_size).
pub const DEFAULT_BLOCK_SIZE: usize = 64;

/// Minimum channel count presented to the engine on each side.
///
/// Hosts with mono buses still get a stereo engine; the missing input plane
/// is fed silence and the extra output plane is discarded.
pub const DEFAULT_MIN_ENGINE_CHANNELS: usize = 2;

/// Largest accepted oversampling factor.
pub const MAX_OVERSAMPLING: u32 = 16;
