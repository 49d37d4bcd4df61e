//! Bridge lifecycle state machine and prepare-time layout.
//!
//! This module provides the [`LifecycleState`] enum that manages the
//! two-phase lifecycle:
//! - **Unprepared**: bridge constructed, engine not set up, no buffers
//! - **Prepared**: buffers allocated and zeroed, engine prepared and started
//!
//! # State Transitions
//!
//! ```text
//! Unprepared --[prepare]--> Prepared
//!      ^                       |
//!      +-------[release]-------+
//! ```
//!
//! Calling `prepare()` while prepared releases first and prepares again with
//! the new sample rate, host block size and oversampling factor.
//!
//! Every allocation of the bridge happens in [`PreparedState::new`]. Nothing
//! here runs on the audio thread.

use reblock_core::{
    BridgeConfig, BridgeError, BridgeResult, ByteAssembler, MidiBuffer, Sample, MAX_CHANNELS,
    MAX_OVERSAMPLING,
};

use crate::carry::CarryBuffers;

// =============================================================================
// Oversampling
// =============================================================================

/// A power-of-two oversampling factor.
///
/// Scales the fixed block size and the sample rate reported to the engine.
/// No resampling happens inside the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Oversampling(u32);

impl Oversampling {
    /// No oversampling (factor 1).
    pub const NONE: Self = Self(1);

    /// Create from a factor. Must be a power of two in `1..=MAX_OVERSAMPLING`.
    pub fn new(factor: u32) -> BridgeResult<Self> {
        if factor.is_power_of_two() && factor <= MAX_OVERSAMPLING {
            Ok(Self(factor))
        } else {
            Err(BridgeError::InvalidOversampling(factor))
        }
    }

    /// Create from an exponent: the factor is `2^exponent`.
    pub fn from_exponent(exponent: u32) -> BridgeResult<Self> {
        match 1u32.checked_shl(exponent) {
            Some(factor) => Self::new(factor),
            None => Err(BridgeError::InvalidOversampling(u32::MAX)),
        }
    }

    /// The multiplier.
    #[inline]
    pub fn factor(&self) -> u32 {
        self.0
    }

    /// `log2` of the multiplier.
    #[inline]
    pub fn exponent(&self) -> u32 {
        self.0.trailing_zeros()
    }
}

impl Default for Oversampling {
    fn default() -> Self {
        Self::NONE
    }
}

// =============================================================================
// EngineLayout
// =============================================================================

/// Sizes computed at prepare time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineLayout {
    /// Host sample rate.
    pub sample_rate: f64,
    /// Sample rate reported to the engine (host rate × oversampling).
    pub effective_sample_rate: f64,
    /// Largest block the host announced. Informational only.
    pub max_host_frames: usize,
    /// Engine block size before oversampling.
    pub native_block_size: usize,
    /// Frames per engine invocation (native × oversampling).
    pub block_size: usize,
    pub oversampling: Oversampling,
    /// Channel planes handed to the engine.
    pub engine_inputs: usize,
    pub engine_outputs: usize,
}

impl EngineLayout {
    /// Validate the host setup and compute the engine layout.
    pub fn compute(
        config: &BridgeConfig,
        sample_rate: f64,
        max_host_frames: usize,
        oversampling: Oversampling,
        native_block_size: usize,
    ) -> BridgeResult<Self> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(BridgeError::InvalidSampleRate(sample_rate));
        }
        if max_host_frames == 0 {
            return Err(BridgeError::InvalidBlockSize(max_host_frames));
        }
        if native_block_size == 0 {
            return Err(BridgeError::InvalidEngineBlockSize(native_block_size));
        }
        validate_channels("input", config.num_inputs)?;
        validate_channels("output", config.num_outputs)?;

        let engine_inputs = config.engine_inputs();
        let engine_outputs = config.engine_outputs();
        validate_channels("engine input", engine_inputs)?;
        validate_channels("engine output", engine_outputs)?;

        let factor = oversampling.factor() as usize;
        Ok(Self {
            sample_rate,
            effective_sample_rate: sample_rate * factor as f64,
            max_host_frames,
            native_block_size,
            block_size: native_block_size * factor,
            oversampling,
            engine_inputs,
            engine_outputs,
        })
    }
}

fn validate_channels(direction: &'static str, requested: usize) -> BridgeResult<()> {
    if requested > MAX_CHANNELS {
        return Err(BridgeError::TooManyChannels {
            direction,
            requested,
            max: MAX_CHANNELS,
        });
    }
    Ok(())
}

// =============================================================================
// ProcessStats
// =============================================================================

/// Counters updated on the audio thread. Reset on every prepare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessStats {
    /// Host calls with a non-zero frame count.
    pub host_calls: u64,
    /// Engine invocations.
    pub engine_calls: u64,
    /// Engine invocations that read host memory in place.
    pub direct_blocks: u64,
    /// Frames copied into the input carry buffer.
    pub carried_frames: u64,
    /// Event buffer overflows: host lists per call, internal queues per block.
    pub midi_overflows: u64,
}

// =============================================================================
// PreparedState
// =============================================================================

/// Everything the audio thread touches, allocated up front.
pub struct PreparedState<S: Sample> {
    pub layout: EngineLayout,
    pub carry: CarryBuffers<S>,
    /// One block of zeros for engine inputs with no host counterpart.
    pub silence: Vec<S>,
    /// Input events of the block in progress, block-relative.
    pub pending_input: MidiBuffer,
    /// Output of the last completed block, block-relative. Drained to the
    /// host alongside that block's audio.
    pub pending_output: MidiBuffer,
    /// Output of the block being performed.
    pub block_output: MidiBuffer,
    /// Copy of the host's input events for the current call.
    pub swap_events: MidiBuffer,
    pub assembler: ByteAssembler,
    pub stats: ProcessStats,
}

impl<S: Sample> PreparedState<S> {
    /// Allocate zeroed buffers and empty event queues for `layout`.
    pub fn new(config: &BridgeConfig, layout: EngineLayout) -> Self {
        let events = || MidiBuffer::with_capacity(config.max_events, config.max_event_bytes);
        Self {
            layout,
            carry: CarryBuffers::new(layout.engine_inputs, layout.engine_outputs, layout.block_size),
            silence: vec![S::ZERO; layout.block_size],
            pending_input: events(),
            pending_output: events(),
            block_output: events(),
            swap_events: events(),
            assembler: ByteAssembler::new(),
            stats: ProcessStats::default(),
        }
    }

    /// Return to the freshly prepared condition without reallocating.
    /// Stats are kept.
    pub fn reset(&mut self) {
        self.carry.reset();
        self.pending_input.clear();
        self.pending_output.clear();
        self.block_output.clear();
        self.swap_events.clear();
        self.assembler.reset();
    }
}

// =============================================================================
// LifecycleState
// =============================================================================

/// Bridge lifecycle states.
pub enum LifecycleState<S: Sample> {
    /// Not prepared: processing outputs silence.
    Unprepared,
    /// Ready to process audio (boxed to keep the enum small).
    Prepared(Box<PreparedState<S>>),
}

impl<S: Sample> LifecycleState<S> {
    /// Check if in prepared state.
    #[inline]
    pub fn is_prepared(&self) -> bool {
        matches!(self, Self::Prepared(_))
    }

    /// Prepared state, if any.
    #[inline]
    pub fn prepared(&self) -> Option<&PreparedState<S>> {
        match self {
            Self::Prepared(state) => Some(&**state),
            Self::Unprepared => None,
        }
    }

    /// Prepared state, mutably, if any.
    #[inline]
    pub fn prepared_mut(&mut self) -> Option<&mut PreparedState<S>> {
        match self {
            Self::Prepared(state) => Some(&mut **state),
            Self::Unprepared => None,
        }
    }

    /// Layout of the prepared state, if any.
    #[inline]
    pub fn layout(&self) -> Option<&EngineLayout> {
        self.prepared().map(|state| &state.layout)
    }
}

impl<S: Sample> Default for LifecycleState<S> {
    fn default() -> Self {
        Self::Unprepared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oversampling_validation() {
        assert_eq!(Oversampling::new(1).unwrap().factor(), 1);
        assert_eq!(Oversampling::new(8).unwrap().exponent(), 3);
        assert_eq!(Oversampling::from_exponent(2).unwrap().factor(), 4);
        assert_eq!(Oversampling::new(3), Err(BridgeError::InvalidOversampling(3)));
        assert_eq!(Oversampling::new(0), Err(BridgeError::InvalidOversampling(0)));
        assert_eq!(Oversampling::new(32), Err(BridgeError::InvalidOversampling(32)));
        assert!(Oversampling::from_exponent(40).is_err());
    }

    #[test]
    fn test_layout_scales_with_oversampling() {
        let config = BridgeConfig::new(1, 2);
        let os = Oversampling::new(4).unwrap();
        let layout = EngineLayout::compute(&config, 48_000.0, 512, os, 64).unwrap();

        assert_eq!(layout.block_size, 256);
        assert_eq!(layout.effective_sample_rate, 192_000.0);
        assert_eq!(layout.engine_inputs, 2);
        assert_eq!(layout.engine_outputs, 2);
    }

    #[test]
    fn test_layout_rejects_bad_setups() {
        let config = BridgeConfig::stereo();
        let os = Oversampling::NONE;
        assert_eq!(
            EngineLayout::compute(&config, 0.0, 512, os, 64),
            Err(BridgeError::InvalidSampleRate(0.0))
        );
        assert_eq!(
            EngineLayout::compute(&config, 44_100.0, 0, os, 64),
            Err(BridgeError::InvalidBlockSize(0))
        );
        assert_eq!(
            EngineLayout::compute(&config, 44_100.0, 512, os, 0),
            Err(BridgeError::InvalidEngineBlockSize(0))
        );

        let wide = BridgeConfig::new(2, 40);
        assert_eq!(
            EngineLayout::compute(&wide, 44_100.0, 512, os, 64),
            Err(BridgeError::TooManyChannels {
                direction: "output",
                requested: 40,
                max: MAX_CHANNELS
            })
        );
    }

    #[test]
    fn test_prepared_state_starts_empty() {
        let config = BridgeConfig::stereo();
        let layout = EngineLayout::compute(&config, 44_100.0, 256, Oversampling::NONE, 64).unwrap();
        let state = PreparedState::<f32>::new(&config, layout);

        assert_eq!(state.carry.advancement(), 0);
        assert_eq!(state.carry.block_size(), 64);
        assert_eq!(state.silence.len(), 64);
        assert!(state.pending_input.is_empty());
        assert!(state.pending_output.is_empty());
        assert_eq!(state.stats, ProcessStats::default());

        let mut lifecycle = LifecycleState::Prepared(Box::new(state));
        assert!(lifecycle.is_prepared());
        assert_eq!(lifecycle.layout().map(|l| l.block_size), Some(64));
        lifecycle = LifecycleState::Unprepared;
        assert!(lifecycle.prepared_mut().is_none());
    }
}
