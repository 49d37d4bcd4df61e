//! # reblock-bridge
//!
//! Real-time adaptation between hosts that call with any number of frames
//! and DSP engines that only process fixed-size blocks.
//!
//! ## Components
//!
//! - [`BlockBridge`] - Host interface adapter, the entry point per callback
//! - [`BlockPlan`] - Block-walking state machine behind every call
//! - [`CarryBuffers`] - Storage for partially filled fixed blocks
//! - [`redistribute`] / [`midi_map`] - Event re-timing and category mapping
//! - [`LifecycleState`] / [`Oversampling`] - Prepare-time layout and state
//! - [`AudioMidiFifo`] - Single-threaded audio + MIDI FIFO
//!
//! ## Latency
//!
//! Output lags input by exactly one fixed block
//! ([`BlockBridge::latency_samples`]), independent of the host block size.

pub mod adapter;
pub mod carry;
pub mod fifo;
pub mod lifecycle;
pub mod midi_map;
pub mod plan;
pub mod redistribute;

#[cfg(test)]
mod test_engines;

pub use adapter::BlockBridge;
pub use carry::{CarryBuffers, ChannelBlock};
pub use fifo::AudioMidiFifo;
pub use lifecycle::{EngineLayout, LifecycleState, Oversampling, PreparedState, ProcessStats};
pub use midi_map::map_message;
pub use plan::{BlockPlan, Segment};
pub use redistribute::{move_window, shift_out, slice_into_window};
