//! Engines used by the bridge tests.

use reblock_core::{Buffer, DspEngine, EngineEvent, MidiCategory, MidiOutput, Sample};

/// Copies input planes to output planes and records everything it is told.
///
/// Output planes with no matching input are zeroed. With `echo_midi`, every
/// typed channel event is sent back at the offset it arrived at.
#[derive(Debug, Default)]
pub struct IdentityEngine {
    pub native_block_size: usize,
    pub echo_midi: bool,
    /// `(num_inputs, num_outputs, sample_rate)` of each prepare.
    pub prepares: Vec<(usize, usize, f64)>,
    pub starts: usize,
    pub releases: usize,
    pub performs: usize,
    /// `(perform index, block offset, event)` of each received event.
    pub received: Vec<(usize, u32, EngineEvent)>,
    /// Sum of absolute input samples seen, per perform.
    pub input_energy: Vec<f64>,
    /// Frame count of each perform.
    pub block_lengths: Vec<usize>,
}

impl IdentityEngine {
    pub fn with_block_size(native_block_size: usize) -> Self {
        Self {
            native_block_size,
            ..Self::default()
        }
    }

    /// Received events that were not raw byte mirrors.
    pub fn typed_events(&self) -> Vec<(usize, u32, EngineEvent)> {
        self.received
            .iter()
            .copied()
            .filter(|(_, _, e)| e.category() != MidiCategory::RawByte)
            .collect()
    }
}

impl<S: Sample> DspEngine<S> for IdentityEngine {
    fn native_block_size(&self) -> usize {
        self.native_block_size
    }

    fn prepare(&mut self, num_inputs: usize, num_outputs: usize, sample_rate: f64) {
        self.prepares.push((num_inputs, num_outputs, sample_rate));
    }

    fn start(&mut self) {
        self.starts += 1;
    }

    fn release(&mut self) {
        self.releases += 1;
    }

    fn receive_midi(&mut self, sample_offset: u32, event: EngineEvent) {
        self.received.push((self.performs, sample_offset, event));
    }

    fn perform(&mut self, block: &mut Buffer<'_, S>, midi_out: &mut MidiOutput<'_>) {
        self.block_lengths.push(block.num_samples());
        self.input_energy
            .push(block.inputs().flatten().map(|s| s.to_f64().abs()).sum());

        block.copy_to_output();
        block.clear_outputs_from(block.num_input_channels());

        if self.echo_midi {
            for &(index, offset, event) in &self.received {
                let typed = !matches!(
                    event.category(),
                    MidiCategory::RawByte | MidiCategory::SysExByte | MidiCategory::RealtimeByte
                );
                if index == self.performs && typed {
                    midi_out.send(offset, event);
                }
            }
        }
        self.performs += 1;
    }
}

/// Emits a scripted note on a chosen perform, and writes the perform index
/// into every output sample.
#[derive(Debug, Default)]
pub struct CountingEngine {
    pub native_block_size: usize,
    pub performs: usize,
    /// `(perform index, block offset, pitch)` notes to emit.
    pub script: Vec<(usize, u32, u8)>,
}

impl<S: Sample> DspEngine<S> for CountingEngine {
    fn native_block_size(&self) -> usize {
        self.native_block_size
    }

    fn prepare(&mut self, _num_inputs: usize, _num_outputs: usize, _sample_rate: f64) {
        self.performs = 0;
    }

    fn start(&mut self) {}

    fn perform(&mut self, block: &mut Buffer<'_, S>, midi_out: &mut MidiOutput<'_>) {
        let value = S::from_f64((self.performs + 1) as f64);
        for output in block.outputs_mut() {
            output.fill(value);
        }
        for &(index, offset, pitch) in &self.script {
            if index == self.performs {
                midi_out.send(offset, EngineEvent::NoteOn { channel: 0, pitch, velocity: 100 });
            }
        }
        self.performs += 1;
    }
}
