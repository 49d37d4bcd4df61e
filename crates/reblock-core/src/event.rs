//! Engine-side event categories.
//!
//! The engine never sees raw transport bytes. Every host MIDI byte reaches
//! it as one of ten logical categories, and the engine answers in the same
//! vocabulary. The category numbering is part of the engine contract and is
//! fixed.

use crate::midi::status;

// =============================================================================
// MidiCategory
// =============================================================================

/// The fixed enumeration of event categories exchanged with the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MidiCategory {
    NoteOn = 0,
    NoteOff = 1,
    ControlChange = 2,
    PitchBend = 3,
    ChannelPressure = 4,
    PolyAftertouch = 5,
    ProgramChange = 6,
    SysExByte = 7,
    RealtimeByte = 8,
    RawByte = 9,
}

// =============================================================================
// EngineEvent
// =============================================================================

/// A single event in engine vocabulary.
///
/// Channels are 0-based (0-15). Data values are 7-bit. Pitch bend is signed
/// and centred on zero (`-8192..=8191`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    NoteOn { channel: u8, pitch: u8, velocity: u8 },
    NoteOff { channel: u8, pitch: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    PitchBend { channel: u8, value: i16 },
    ChannelPressure { channel: u8, value: u8 },
    PolyAftertouch { channel: u8, pitch: u8, value: u8 },
    ProgramChange { channel: u8, program: u8 },
    /// One byte of a SysEx stream, framing bytes included.
    SysExByte { port: u8, byte: u8 },
    /// One clock or transport byte.
    RealtimeByte { port: u8, byte: u8 },
    /// One byte of the raw transport stream.
    RawByte { port: u8, byte: u8 },
}

impl EngineEvent {
    /// Category of this event.
    pub const fn category(&self) -> MidiCategory {
        match self {
            Self::NoteOn { .. } => MidiCategory::NoteOn,
            Self::NoteOff { .. } => MidiCategory::NoteOff,
            Self::ControlChange { .. } => MidiCategory::ControlChange,
            Self::PitchBend { .. } => MidiCategory::PitchBend,
            Self::ChannelPressure { .. } => MidiCategory::ChannelPressure,
            Self::PolyAftertouch { .. } => MidiCategory::PolyAftertouch,
            Self::ProgramChange { .. } => MidiCategory::ProgramChange,
            Self::SysExByte { .. } => MidiCategory::SysExByte,
            Self::RealtimeByte { .. } => MidiCategory::RealtimeByte,
            Self::RawByte { .. } => MidiCategory::RawByte,
        }
    }

    /// Encode a channel voice event as a complete MIDI message.
    ///
    /// Returns the message length written into `out`, or `None` for the
    /// byte-stream categories, which need reassembly across events.
    /// Out-of-range fields are masked to their wire width.
    pub fn encode(&self, out: &mut [u8; 3]) -> Option<usize> {
        let (len, bytes) = match *self {
            Self::NoteOn { channel, pitch, velocity } => {
                (3, [status::NOTE_ON | (channel & 0x0F), pitch & 0x7F, velocity & 0x7F])
            }
            Self::NoteOff { channel, pitch, velocity } => {
                (3, [status::NOTE_OFF | (channel & 0x0F), pitch & 0x7F, velocity & 0x7F])
            }
            Self::ControlChange { channel, controller, value } => (
                3,
                [status::CONTROL_CHANGE | (channel & 0x0F), controller & 0x7F, value & 0x7F],
            ),
            Self::PitchBend { channel, value } => {
                let raw = (value.clamp(-8192, 8191) + 8192) as u16;
                (
                    3,
                    [
                        status::PITCH_BEND | (channel & 0x0F),
                        (raw & 0x7F) as u8,
                        ((raw >> 7) & 0x7F) as u8,
                    ],
                )
            }
            Self::ChannelPressure { channel, value } => {
                (2, [status::CHANNEL_PRESSURE | (channel & 0x0F), value & 0x7F, 0])
            }
            Self::PolyAftertouch { channel, pitch, value } => (
                3,
                [status::POLY_PRESSURE | (channel & 0x0F), pitch & 0x7F, value & 0x7F],
            ),
            Self::ProgramChange { channel, program } => {
                (2, [status::PROGRAM_CHANGE | (channel & 0x0F), program & 0x7F, 0])
            }
            Self::SysExByte { .. } | Self::RealtimeByte { .. } | Self::RawByte { .. } => {
                return None;
            }
        };
        *out = bytes;
        Some(len)
    }
}
