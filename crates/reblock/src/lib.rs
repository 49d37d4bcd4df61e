//! # Reblock
//!
//! Run a DSP engine that only accepts fixed-size blocks behind an audio host
//! that calls with any number of frames.
//!
//! ## Architecture
//!
//! ```text
//! Host callback (n frames, events at [0, n))
//!        ↓
//! BlockBridge<E> (carry buffers, block plan, event re-timing)
//!        ↓
//! Your engine (implements DspEngine, exactly block_size frames per call)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use reblock::prelude::*;
//!
//! struct Passthrough;
//!
//! impl DspEngine for Passthrough {
//!     fn prepare(&mut self, _inputs: usize, _outputs: usize, _sample_rate: f64) {}
//!     fn start(&mut self) {}
//!     fn perform(&mut self, block: &mut Buffer, _midi_out: &mut MidiOutput) {
//!         block.copy_to_output();
//!     }
//! }
//!
//! static CONFIG: BridgeConfig = BridgeConfig::new(2, 2).with_midi_input();
//!
//! let mut bridge = BlockBridge::new(Passthrough, CONFIG.clone());
//! bridge.prepare(48_000.0, 512, Oversampling::NONE)?;
//! host.set_latency(bridge.latency_samples());
//!
//! // Audio thread:
//! bridge.process_block(&mut buffer, &mut events);
//! ```

// Re-export sub-crates
pub use reblock_bridge as bridge;
pub use reblock_core as core;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use reblock::prelude::*;
/// ```
pub mod prelude {
    pub use reblock_core::{
        // Engine boundary
        DspEngine, EngineEvent, MidiCategory, MidiOutput,
        // Buffer types
        Buffer, MidiBuffer, MidiEvent, Sample,
        // Configuration
        BridgeConfig,
        // Error types
        BridgeError, BridgeResult,
        // Limits
        DEFAULT_BLOCK_SIZE, MAX_CHANNELS, MAX_MIDI_EVENTS, MAX_SYSEX_SIZE,
    };

    pub use reblock_bridge::{AudioMidiFifo, BlockBridge, Oversampling, ProcessStats};
}
