//! Engine-side MIDI output.
//!
//! The engine answers in [`EngineEvent`] categories. [`MidiOutput`] turns
//! them back into raw MIDI messages in a block-relative [`MidiBuffer`].
//! Channel voice categories encode directly; SysEx and raw byte streams are
//! reassembled into whole messages by a [`ByteAssembler`] that persists
//! across blocks, so a message may span several engine invocations.

use crate::event::EngineEvent;
use crate::midi::{status, MidiBuffer, MAX_SYSEX_SIZE};

// =============================================================================
// ByteAssembler
// =============================================================================

/// Running-status assembler for byte-at-a-time MIDI output.
///
/// - Realtime bytes are emitted immediately, even in the middle of another
///   message.
/// - SysEx is collected from `0xF0` to `0xF7`. When the fixed scratch fills,
///   the collected bytes are flushed as one event and collection continues.
/// - A channel message cut short by a new status byte is emitted as far as
///   it got. Stray data bytes with no running status are emitted on their
///   own. No byte is ever dropped.
#[derive(Debug, Clone)]
pub struct ByteAssembler {
    running_status: u8,
    pending: [u8; 3],
    pending_len: usize,
    expected_len: usize,
    sysex: Vec<u8>,
    in_sysex: bool,
}

impl ByteAssembler {
    /// Create an assembler with a SysEx scratch of [`MAX_SYSEX_SIZE`] bytes.
    pub fn new() -> Self {
        Self {
            running_status: 0,
            pending: [0; 3],
            pending_len: 0,
            expected_len: 0,
            sysex: Vec::with_capacity(MAX_SYSEX_SIZE),
            in_sysex: false,
        }
    }

    /// Drop any partially assembled message.
    pub fn reset(&mut self) {
        self.running_status = 0;
        self.pending_len = 0;
        self.expected_len = 0;
        self.sysex.clear();
        self.in_sysex = false;
    }

    /// True when no message is partially assembled.
    pub fn is_idle(&self) -> bool {
        self.pending_len == 0 && !self.in_sysex
    }

    /// Feed one byte. Completed messages are pushed into `sink` at
    /// `sample_offset`.
    pub fn feed(&mut self, sample_offset: u32, byte: u8, sink: &mut MidiBuffer) {
        if status::is_realtime(byte) {
            sink.push(sample_offset, &[byte]);
            return;
        }

        if self.in_sysex {
            if !status::is_status(byte) {
                if self.sysex.len() == MAX_SYSEX_SIZE {
                    sink.push(sample_offset, &self.sysex);
                    self.sysex.clear();
                }
                self.sysex.push(byte);
                return;
            }
            if byte == status::SYSEX_END {
                if self.sysex.len() == MAX_SYSEX_SIZE {
                    sink.push(sample_offset, &self.sysex);
                    self.sysex.clear();
                }
                self.sysex.push(byte);
                sink.push(sample_offset, &self.sysex);
                self.sysex.clear();
                self.in_sysex = false;
                return;
            }
            // Unterminated: emit what was collected, then treat the byte as a
            // new status.
            sink.push(sample_offset, &self.sysex);
            self.sysex.clear();
            self.in_sysex = false;
        }

        if status::is_status(byte) {
            self.flush_pending(sample_offset, sink);
        }

        if byte == status::SYSEX_START {
            self.running_status = 0;
            self.sysex.push(byte);
            self.in_sysex = true;
            return;
        }

        if status::is_status(byte) {
            match status::message_len(byte) {
                Some(1) | None => {
                    self.running_status = 0;
                    sink.push(sample_offset, &[byte]);
                }
                Some(len) => {
                    self.running_status = byte;
                    self.pending[0] = byte;
                    self.pending_len = 1;
                    self.expected_len = len;
                }
            }
            return;
        }

        // Data byte
        if self.running_status == 0 {
            sink.push(sample_offset, &[byte]);
            return;
        }
        if self.pending_len == 0 {
            self.pending[0] = self.running_status;
            self.pending_len = 1;
        }
        self.pending[self.pending_len] = byte;
        self.pending_len += 1;
        if self.pending_len == self.expected_len {
            sink.push(sample_offset, &self.pending[..self.pending_len]);
            self.pending_len = 0;
            // System common messages do not establish running status
            if self.running_status >= status::SYSEX_START {
                self.running_status = 0;
            }
        }
    }
}

impl ByteAssembler {
    /// Emit an incomplete channel or system common message as is.
    fn flush_pending(&mut self, sample_offset: u32, sink: &mut MidiBuffer) {
        if self.pending_len > 0 {
            sink.push(sample_offset, &self.pending[..self.pending_len]);
            self.pending_len = 0;
        }
    }
}

impl Default for ByteAssembler {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// MidiOutput
// =============================================================================

/// Sink handed to [`DspEngine::perform`](crate::DspEngine::perform).
///
/// Offsets are relative to the start of the fixed block and are clamped into
/// it. A full buffer drops the event and sets the buffer's overflow flag.
pub struct MidiOutput<'a> {
    events: &'a mut MidiBuffer,
    assembler: &'a mut ByteAssembler,
    block_size: u32,
}

impl<'a> MidiOutput<'a> {
    /// Wrap a block-relative event buffer.
    pub fn new(events: &'a mut MidiBuffer, assembler: &'a mut ByteAssembler, block_size: usize) -> Self {
        Self {
            events,
            assembler,
            block_size: block_size as u32,
        }
    }

    #[inline]
    fn clamp(&self, sample_offset: u32) -> u32 {
        sample_offset.min(self.block_size.saturating_sub(1))
    }

    /// Send one event at a block-relative offset.
    pub fn send(&mut self, sample_offset: u32, event: EngineEvent) {
        let offset = self.clamp(sample_offset);
        let mut message = [0u8; 3];
        if let Some(len) = event.encode(&mut message) {
            self.events.push(offset, &message[..len]);
            return;
        }
        match event {
            EngineEvent::RealtimeByte { byte, .. } => {
                self.events.push(offset, &[byte]);
            }
            EngineEvent::SysExByte { byte, .. } | EngineEvent::RawByte { byte, .. } => {
                self.assembler.feed(offset, byte, self.events);
            }
            _ => {}
        }
    }

    /// Number of events emitted so far in this block.
    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if nothing was emitted in this block.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of frames in the block this sink covers.
    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size as usize
    }
}
