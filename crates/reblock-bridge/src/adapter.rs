//! Host interface adapter.
//!
//! [`BlockBridge`] owns a [`DspEngine`] and drives it from host callbacks of
//! any size. Each call is walked with a [`BlockPlan`]:
//!
//! - **Carry segments** copy host input into the carry buffer and hand the
//!   host the same window of the carry output. When the fixed block fills,
//!   the engine runs on the carry buffers.
//! - **Direct segments** cover whole, grid-aligned fixed blocks. The engine
//!   reads host input in place (no carry copy-in).
//!
//! Host output always comes from the *previous* completed block, so output
//! lags input by exactly one fixed block regardless of host block size.
//! [`latency_samples`](BlockBridge::latency_samples) reports that figure.
//!
//! # MIDI
//!
//! The host event list is in/out. Input events are re-timed into the block
//! in progress and delivered to the engine through
//! [`DspEngine::receive_midi`] right before the block is performed. Engine
//! output is held with its block and emitted to the host, re-timed to host
//! offsets, as that block's audio is played out.
//!
//! # Real-Time Safety
//!
//! `process_block()` does not allocate, lock or log. All storage comes from
//! `prepare()`.

use reblock_core::{
    BridgeConfig, BridgeResult, Buffer, DspEngine, MidiBuffer, MidiOutput, Sample, MAX_CHANNELS,
};

use crate::lifecycle::{EngineLayout, LifecycleState, Oversampling, PreparedState, ProcessStats};
use crate::midi_map::map_message;
use crate::plan::{BlockPlan, Segment};
use crate::redistribute::{move_window, shift_out, slice_into_window};

/// Where the engine reads its input for one block.
#[derive(Clone, Copy)]
enum BlockSource {
    /// The input carry buffer.
    Carry,
    /// Host input frames `[start, start + block_size)`.
    Host { start: usize },
}

// =============================================================================
// BlockBridge
// =============================================================================

/// Adapts variable-size host callbacks to a fixed-size engine.
///
/// # Example
///
/// ```ignore
/// let mut bridge = BlockBridge::new(MyEngine::default(), BridgeConfig::stereo().with_midi_input());
/// bridge.prepare(48_000.0, 512, Oversampling::NONE)?;
///
/// // On the audio thread, once per host callback:
/// bridge.process_block(&mut buffer, &mut events);
/// ```
pub struct BlockBridge<E, S = f32>
where
    E: DspEngine<S>,
    S: Sample,
{
    engine: E,
    config: BridgeConfig,
    state: LifecycleState<S>,
    bypassed: bool,
}

impl<E, S> BlockBridge<E, S>
where
    E: DspEngine<S>,
    S: Sample,
{
    /// Wrap an engine. The bridge starts unprepared.
    pub fn new(engine: E, config: BridgeConfig) -> Self {
        Self {
            engine,
            config,
            state: LifecycleState::Unprepared,
            bypassed: false,
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Allocate buffers for a new host setup and prepare and start the engine.
    ///
    /// Must not run concurrently with [`process_block`](Self::process_block).
    /// Calling it while prepared releases first. On error the bridge is left
    /// unprepared.
    pub fn prepare(
        &mut self,
        sample_rate: f64,
        max_host_frames: usize,
        oversampling: Oversampling,
    ) -> BridgeResult<()> {
        if self.state.is_prepared() {
            log::debug!("Re-preparing bridge; releasing previous configuration");
            self.release();
        }

        let layout = EngineLayout::compute(
            &self.config,
            sample_rate,
            max_host_frames,
            oversampling,
            self.engine.native_block_size(),
        )
        .inspect_err(|e| log::error!("Bridge prepare failed: {}", e))?;

        log::debug!(
            "Preparing bridge: {} Hz x{} -> {} Hz, block {} (native {}), host max {} frames, engine {}in/{}out",
            layout.sample_rate,
            layout.oversampling.factor(),
            layout.effective_sample_rate,
            layout.block_size,
            layout.native_block_size,
            layout.max_host_frames,
            layout.engine_inputs,
            layout.engine_outputs,
        );
        if layout.engine_inputs > self.config.num_inputs || layout.engine_outputs > self.config.num_outputs {
            log::debug!(
                "Host layout {}in/{}out widened to engine minimum of {} channels",
                self.config.num_inputs,
                self.config.num_outputs,
                self.config.min_engine_channels,
            );
        }

        let state = PreparedState::new(&self.config, layout);
        self.engine
            .prepare(layout.engine_inputs, layout.engine_outputs, layout.effective_sample_rate);
        self.engine.start();
        self.state = LifecycleState::Prepared(Box::new(state));
        Ok(())
    }

    /// Leave the prepared state and free all buffers. No-op when unprepared.
    pub fn release(&mut self) {
        if let LifecycleState::Prepared(state) = std::mem::take(&mut self.state) {
            log::debug!(
                "Releasing bridge after {} engine calls ({} direct)",
                state.stats.engine_calls,
                state.stats.direct_blocks,
            );
            self.engine.release();
        }
    }

    /// Drop buffered audio, queued events and any partial engine MIDI
    /// output, then restart the engine. Keeps the layout and allocations.
    ///
    /// For transport jumps and similar discontinuities. No-op when
    /// unprepared.
    pub fn reset(&mut self) {
        if let Some(state) = self.state.prepared_mut() {
            state.reset();
            self.engine.start();
        }
    }

    /// Check if prepared.
    #[inline]
    pub fn is_prepared(&self) -> bool {
        self.state.is_prepared()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The bridge configuration.
    #[inline]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// The wrapped engine.
    #[inline]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The wrapped engine, mutably.
    #[inline]
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Prepare-time layout, when prepared.
    #[inline]
    pub fn layout(&self) -> Option<&EngineLayout> {
        self.state.layout()
    }

    /// Frames per engine invocation, when prepared.
    #[inline]
    pub fn fixed_block_size(&self) -> Option<usize> {
        self.layout().map(|layout| layout.block_size)
    }

    /// Frames buffered toward the next engine invocation.
    #[inline]
    pub fn advancement(&self) -> usize {
        self.state.prepared().map_or(0, |state| state.carry.advancement())
    }

    /// Constant output delay in host frames: one fixed block when prepared,
    /// 0 otherwise.
    #[inline]
    pub fn latency_samples(&self) -> u32 {
        self.fixed_block_size().map_or(0, |size| size as u32)
    }

    /// Counters since the last prepare.
    #[inline]
    pub fn stats(&self) -> ProcessStats {
        self.state.prepared().map(|state| state.stats).unwrap_or_default()
    }

    /// Set the bypass flag.
    ///
    /// While bypassed the engine still runs every block, on silent input,
    /// and host output is silent.
    #[inline]
    pub fn set_bypassed(&mut self, bypassed: bool) {
        self.bypassed = bypassed;
    }

    /// Check the bypass flag.
    #[inline]
    pub fn is_bypassed(&self) -> bool {
        self.bypassed
    }

    // =========================================================================
    // Processing
    // =========================================================================

    /// Process one host callback.
    ///
    /// `buffer` may hold any number of frames. `events` holds the host input
    /// events (offsets within `[0, num_samples)`); when the engine produces
    /// MIDI it is replaced by the engine output for this call.
    ///
    /// Unprepared bridges silence the outputs and leave `events` untouched.
    pub fn process_block(&mut self, buffer: &mut Buffer<'_, S>, events: &mut MidiBuffer) {
        let Some(state) = self.state.prepared_mut() else {
            buffer.clear_outputs();
            return;
        };

        let num_frames = buffer.num_samples();
        if num_frames == 0 {
            return;
        }

        let config = &self.config;
        let engine = &mut self.engine;
        let bypassed = self.bypassed;
        let block_size = state.layout.block_size;
        let host_inputs = buffer.num_input_channels().min(state.layout.engine_inputs);
        let host_outputs = buffer.num_output_channels().min(state.layout.engine_outputs);

        state.stats.host_calls += 1;
        state.swap_events.copy_from(events);
        if config.produces_midi {
            events.clear();
        }

        let plan = BlockPlan::new(state.carry.advancement(), num_frames, block_size);
        let final_advancement = plan.final_advancement();

        for segment in plan {
            match segment {
                Segment::Carry {
                    host_start,
                    block_offset,
                    len,
                    completes_block,
                } => {
                    let host = host_start..host_start + len;
                    for ch in 0..host_inputs {
                        state.carry.input.copy_in(ch, block_offset, &buffer.input(ch)[host.clone()]);
                    }
                    state.stats.carried_frames += len as u64;

                    for ch in 0..host_outputs {
                        let out = &mut buffer.output(ch)[host.clone()];
                        if bypassed {
                            out.fill(S::ZERO);
                        } else {
                            state.carry.output.copy_out(ch, block_offset, out);
                        }
                    }

                    if config.accepts_midi {
                        move_window(&state.swap_events, host_start, len, block_offset, &mut state.pending_input);
                    }
                    if config.produces_midi {
                        move_window(&state.pending_output, block_offset, len, host_start, events);
                    }

                    if completes_block {
                        perform_block(engine, state, config, bypassed, buffer, BlockSource::Carry);
                    }
                }
                Segment::Direct { host_start } => {
                    let host = host_start..host_start + block_size;
                    for ch in 0..host_outputs {
                        let out = &mut buffer.output(ch)[host.clone()];
                        if bypassed {
                            out.fill(S::ZERO);
                        } else {
                            state.carry.output.copy_out(ch, 0, out);
                        }
                    }

                    if config.accepts_midi {
                        slice_into_window(&state.swap_events, host_start, block_size, &mut state.pending_input);
                    }
                    if config.produces_midi {
                        shift_out(&state.pending_output, host_start, events);
                    }

                    state.stats.direct_blocks += 1;
                    perform_block(
                        engine,
                        state,
                        config,
                        bypassed,
                        buffer,
                        BlockSource::Host { start: host_start },
                    );
                }
            }
        }

        state.carry.set_advancement(final_advancement);

        // Host channels beyond the engine layout are not engine-driven
        buffer.clear_outputs_from(host_outputs);

        if events.has_overflowed() || state.swap_events.has_overflowed() {
            state.stats.midi_overflows += 1;
        }
    }
}

impl<E, S> Drop for BlockBridge<E, S>
where
    E: DspEngine<S>,
    S: Sample,
{
    fn drop(&mut self) {
        self.release();
    }
}

/// Deliver the block's input events, run the engine once and rotate its
/// MIDI output into `pending_output`.
fn perform_block<E, S>(
    engine: &mut E,
    state: &mut PreparedState<S>,
    config: &BridgeConfig,
    bypassed: bool,
    host: &Buffer<'_, S>,
    source: BlockSource,
) where
    E: DspEngine<S>,
    S: Sample,
{
    let layout = state.layout;
    let block_size = layout.block_size;

    if config.accepts_midi {
        for event in state.pending_input.iter() {
            map_message(event.bytes, config.midi_port, config.mirror_raw_bytes, |mapped| {
                engine.receive_midi(event.sample_offset, mapped)
            });
        }
    }
    if state.pending_input.has_overflowed() {
        state.stats.midi_overflows += 1;
    }
    state.pending_input.clear();
    state.block_output.clear();

    let silence = &state.silence[..];
    let empty: &[S] = &[];
    let mut inputs = [empty; MAX_CHANNELS];
    let host_inputs = host.num_input_channels().min(layout.engine_inputs);
    for (ch, plane) in inputs.iter_mut().enumerate().take(layout.engine_inputs) {
        *plane = match source {
            _ if bypassed => silence,
            BlockSource::Carry => state.carry.input.channel(ch),
            BlockSource::Host { start } if ch < host_inputs => &host.input(ch)[start..start + block_size],
            BlockSource::Host { .. } => silence,
        };
    }

    {
        let mut block = Buffer::new(
            inputs[..layout.engine_inputs].iter().copied(),
            state.carry.output.channels_mut().take(layout.engine_outputs),
            block_size,
        );
        let mut midi_out = MidiOutput::new(&mut state.block_output, &mut state.assembler, block_size);
        engine.perform(&mut block, &mut midi_out);
    }

    if bypassed {
        state.carry.output.clear();
    }
    if state.block_output.has_overflowed() {
        state.stats.midi_overflows += 1;
    }
    state.pending_output.swap_with(&mut state.block_output);
    state.stats.engine_calls += 1;
}
