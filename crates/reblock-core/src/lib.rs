//! # reblock-core
//!
//! Boundary types for the reblock block-size adaptation bridge.
//!
//! This crate defines everything that crosses the line between the host-side
//! adapter and a fixed-size DSP engine. It holds no processing logic of its
//! own; see `reblock-bridge` for that.
//!
//! ## Main Traits
//!
//! - [`DspEngine`] - The injected engine that only accepts fixed-size blocks
//! - [`Sample`] - f32/f64 abstraction
//!
//! ## Types
//!
//! - [`Buffer`] - Channel-plane view for one host call or one engine block
//! - [`MidiBuffer`] - Pre-allocated, offset-ordered raw MIDI events
//! - [`EngineEvent`] / [`MidiCategory`] - Engine-side event vocabulary
//! - [`MidiOutput`] / [`ByteAssembler`] - Engine output back to raw MIDI
//! - [`BridgeConfig`] - Channel layout and MIDI behavior
//! - [`BridgeError`] - Error types

pub mod buffer;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod midi;
pub mod midi_out;
pub mod sample;
pub mod types;

// Re-exports for convenience
pub use buffer::Buffer;
pub use config::BridgeConfig;
pub use engine::DspEngine;
pub use error::{BridgeError, BridgeResult};
pub use event::{EngineEvent, MidiCategory};
pub use midi::{status, MidiBuffer, MidiEvent, DEFAULT_MIDI_BYTES, MAX_MIDI_EVENTS, MAX_SYSEX_SIZE};
pub use midi_out::{ByteAssembler, MidiOutput};
pub use sample::Sample;
pub use types::{DEFAULT_BLOCK_SIZE, DEFAULT_MIN_ENGINE_CHANNELS, MAX_CHANNELS, MAX_OVERSAMPLING};
