//! Bridge configuration.
//!
//! Everything here is fixed for the life of a bridge instance. Sample rate,
//! host block size and oversampling arrive later, through `prepare()`.
//!
//! # Example
//!
//! ```ignore
//! use reblock_core::BridgeConfig;
//!
//! pub static CONFIG: BridgeConfig = BridgeConfig::new(1, 2)
//!     .with_midi_input()
//!     .with_midi_output()
//!     .with_max_events(256);
//! ```

use crate::midi::{DEFAULT_MIDI_BYTES, MAX_MIDI_EVENTS};
use crate::types::DEFAULT_MIN_ENGINE_CHANNELS;

/// Channel layout and MIDI behavior of a bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Host input channel count.
    pub num_inputs: usize,

    /// Host output channel count.
    pub num_outputs: usize,

    /// Lower bound on the channel count presented to the engine on each side.
    pub min_engine_channels: usize,

    /// Whether host input events are delivered to the engine.
    pub accepts_midi: bool,

    /// Whether engine output events replace the host event list.
    /// When false, the host list is passed through untouched.
    pub produces_midi: bool,

    /// Deliver every input byte a second time as a raw byte event.
    pub mirror_raw_bytes: bool,

    /// Port number attached to byte-stream events.
    pub midi_port: u8,

    /// Event capacity of each internal event buffer.
    pub max_events: usize,

    /// Payload byte capacity of each internal event buffer.
    pub max_event_bytes: usize,
}

impl BridgeConfig {
    /// Create a configuration for the given host channel counts.
    ///
    /// MIDI is off in both directions; raw mirroring is on for when input is
    /// enabled.
    pub const fn new(num_inputs: usize, num_outputs: usize) -> Self {
        Self {
            num_inputs,
            num_outputs,
            min_engine_channels: DEFAULT_MIN_ENGINE_CHANNELS,
            accepts_midi: false,
            produces_midi: false,
            mirror_raw_bytes: true,
            midi_port: 0,
            max_events: MAX_MIDI_EVENTS,
            max_event_bytes: DEFAULT_MIDI_BYTES,
        }
    }

    /// Stereo in, stereo out, no MIDI.
    pub const fn stereo() -> Self {
        Self::new(2, 2)
    }

    /// Deliver host events to the engine.
    pub const fn with_midi_input(mut self) -> Self {
        self.accepts_midi = true;
        self
    }

    /// Replace the host event list with the engine's output.
    pub const fn with_midi_output(mut self) -> Self {
        self.produces_midi = true;
        self
    }

    /// Set the minimum engine channel count.
    pub const fn with_min_engine_channels(mut self, channels: usize) -> Self {
        self.min_engine_channels = channels;
        self
    }

    /// Enable or disable raw byte mirroring of input events.
    pub const fn with_raw_mirroring(mut self, enabled: bool) -> Self {
        self.mirror_raw_bytes = enabled;
        self
    }

    /// Set the port number attached to byte-stream events.
    pub const fn with_midi_port(mut self, port: u8) -> Self {
        self.midi_port = port;
        self
    }

    /// Set the event capacity of the internal event buffers.
    pub const fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = max_events;
        self
    }

    /// Set the payload byte capacity of the internal event buffers.
    pub const fn with_max_event_bytes(mut self, max_bytes: usize) -> Self {
        self.max_event_bytes = max_bytes;
        self
    }

    /// Engine input channel count.
    pub const fn engine_inputs(&self) -> usize {
        max(self.num_inputs, self.min_engine_channels)
    }

    /// Engine output channel count.
    pub const fn engine_outputs(&self) -> usize {
        max(self.num_outputs, self.min_engine_channels)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::stereo()
    }
}

const fn max(a: usize, b: usize) -> usize {
    if a > b {
        a
    } else {
        b
    }
}
