//! Host MIDI bytes to engine categories.
//!
//! Every host message is mapped into [`EngineEvent`]s with no filtering:
//!
//! | Input                         | Category                              |
//! |-------------------------------|---------------------------------------|
//! | `9n kk vv` (vv > 0)           | NoteOn                                |
//! | `8n kk vv`, `9n kk 00`        | NoteOff                               |
//! | `Bn cc vv`                    | ControlChange                         |
//! | `En ll mm`                    | PitchBend, `(mm << 7 \| ll) - 8192`   |
//! | `Dn vv`                       | ChannelPressure                       |
//! | `An kk vv`                    | PolyAftertouch                        |
//! | `Cn pp`                       | ProgramChange                         |
//! | `F0 .. F7`                    | SysExByte per payload byte            |
//! | `F8 FA FB FC FE FF`           | RealtimeByte                          |
//! | anything else                 | RawByte per byte                      |
//!
//! The `F0`/`F7` framing of a SysEx message is not part of its SysExByte
//! stream. It reaches the engine as RawByte: through the mirror when raw
//! mirroring is on, on its own otherwise.
//!
//! With raw mirroring on, every byte of a recognised message is delivered a
//! second time as RawByte after its typed event.

use reblock_core::{status, EngineEvent};

/// Map one raw host message to engine events.
///
/// `emit` is called once per engine event, in stream order.
pub fn map_message(bytes: &[u8], port: u8, mirror_raw: bool, mut emit: impl FnMut(EngineEvent)) {
    let Some(&first) = bytes.first() else {
        return;
    };

    if first == status::SYSEX_START {
        map_sysex(bytes, port, mirror_raw, emit);
        return;
    }

    let consumed = match first {
        s if status::is_clock_or_transport(s) => {
            emit(EngineEvent::RealtimeByte { port, byte: s });
            1
        }
        _ => match channel_event(bytes) {
            Some((event, len)) => {
                emit(event);
                len
            }
            None => 0,
        },
    };

    if mirror_raw {
        for &byte in bytes {
            emit(EngineEvent::RawByte { port, byte });
        }
    } else {
        // Whatever no category claimed still reaches the engine
        for &byte in &bytes[consumed..] {
            emit(EngineEvent::RawByte { port, byte });
        }
    }
}

/// Deliver the payload of a SysEx message as SysExByte, framing as RawByte.
fn map_sysex(bytes: &[u8], port: u8, mirror_raw: bool, mut emit: impl FnMut(EngineEvent)) {
    let end = match bytes.last() {
        Some(&status::SYSEX_END) if bytes.len() > 1 => bytes.len() - 1,
        _ => bytes.len(),
    };
    let payload = &bytes[1..end];

    if mirror_raw {
        for &byte in payload {
            emit(EngineEvent::SysExByte { port, byte });
        }
        for &byte in bytes {
            emit(EngineEvent::RawByte { port, byte });
        }
        return;
    }

    emit(EngineEvent::RawByte { port, byte: bytes[0] });
    for &byte in payload {
        emit(EngineEvent::SysExByte { port, byte });
    }
    for &byte in &bytes[end..] {
        emit(EngineEvent::RawByte { port, byte });
    }
}

/// Decode a complete channel voice message. Returns the event and the number
/// of bytes it used, or `None` for anything else, including truncated
/// messages and data bytes with the status bit set.
fn channel_event(bytes: &[u8]) -> Option<(EngineEvent, usize)> {
    let first = *bytes.first()?;
    if !(status::NOTE_OFF..status::SYSEX_START).contains(&first) {
        return None;
    }
    let len = status::message_len(first)?;
    if bytes.len() < len || bytes[1..len].iter().any(|&b| status::is_status(b)) {
        return None;
    }

    let channel = first & 0x0F;
    let d1 = bytes[1];
    let d2 = if len == 3 { bytes[2] } else { 0 };

    let event = match first & 0xF0 {
        status::NOTE_ON if d2 > 0 => EngineEvent::NoteOn { channel, pitch: d1, velocity: d2 },
        status::NOTE_ON | status::NOTE_OFF => {
            // Note-on with velocity 0 is a note-off; a real note-off keeps
            // its release velocity.
            let velocity = if first & 0xF0 == status::NOTE_OFF { d2 } else { 0 };
            EngineEvent::NoteOff { channel, pitch: d1, velocity }
        }
        status::CONTROL_CHANGE => EngineEvent::ControlChange { channel, controller: d1, value: d2 },
        status::PITCH_BEND => EngineEvent::PitchBend {
            channel,
            value: ((d2 as i16) << 7 | d1 as i16) - 8192,
        },
        status::CHANNEL_PRESSURE => EngineEvent::ChannelPressure { channel, value: d1 },
        status::POLY_PRESSURE => EngineEvent::PolyAftertouch { channel, pitch: d1, value: d2 },
        status::PROGRAM_CHANGE => EngineEvent::ProgramChange { channel, program: d1 },
        _ => return None,
    };
    Some((event, len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reblock_core::MidiCategory;

    fn map(bytes: &[u8], mirror: bool) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        map_message(bytes, 0, mirror, |e| events.push(e));
        events
    }

    fn raw(bytes: &[u8]) -> Vec<EngineEvent> {
        bytes.iter().map(|&byte| EngineEvent::RawByte { port: 0, byte }).collect()
    }

    #[test]
    fn test_channel_messages() {
        assert_eq!(
            map(&[0x91, 60, 100], false),
            vec![EngineEvent::NoteOn { channel: 1, pitch: 60, velocity: 100 }]
        );
        assert_eq!(
            map(&[0x91, 60, 0], false),
            vec![EngineEvent::NoteOff { channel: 1, pitch: 60, velocity: 0 }]
        );
        assert_eq!(
            map(&[0x82, 61, 40], false),
            vec![EngineEvent::NoteOff { channel: 2, pitch: 61, velocity: 40 }]
        );
        assert_eq!(
            map(&[0xB0, 74, 12], false),
            vec![EngineEvent::ControlChange { channel: 0, controller: 74, value: 12 }]
        );
        assert_eq!(
            map(&[0xD5, 33], false),
            vec![EngineEvent::ChannelPressure { channel: 5, value: 33 }]
        );
        assert_eq!(
            map(&[0xA3, 64, 90], false),
            vec![EngineEvent::PolyAftertouch { channel: 3, pitch: 64, value: 90 }]
        );
        assert_eq!(
            map(&[0xCF, 12], false),
            vec![EngineEvent::ProgramChange { channel: 15, program: 12 }]
        );
    }

    #[test]
    fn test_pitch_bend_is_centred() {
        assert_eq!(
            map(&[0xE0, 0x00, 0x40], false),
            vec![EngineEvent::PitchBend { channel: 0, value: 0 }]
        );
        assert_eq!(
            map(&[0xE0, 0x00, 0x00], false),
            vec![EngineEvent::PitchBend { channel: 0, value: -8192 }]
        );
        assert_eq!(
            map(&[0xE0, 0x7F, 0x7F], false),
            vec![EngineEvent::PitchBend { channel: 0, value: 8191 }]
        );
    }

    #[test]
    fn test_sysex_payload_delivered_per_byte() {
        let sysex = [0xF0, 0x7D, 0x01, 0xF7];
        let sysex_bytes = |events: &[EngineEvent]| -> Vec<u8> {
            events
                .iter()
                .filter_map(|e| match *e {
                    EngineEvent::SysExByte { byte, .. } => Some(byte),
                    _ => None,
                })
                .collect()
        };

        // Framing arrives as raw bytes around the payload
        let events = map(&sysex, false);
        assert_eq!(sysex_bytes(&events), vec![0x7D, 0x01]);
        assert_eq!(events[0], EngineEvent::RawByte { port: 0, byte: 0xF0 });
        assert_eq!(events[3], EngineEvent::RawByte { port: 0, byte: 0xF7 });
        assert_eq!(events.len(), 4);

        // Mirrored: payload first, then the whole message raw
        let events = map(&sysex, true);
        assert_eq!(sysex_bytes(&events), vec![0x7D, 0x01]);
        assert_eq!(&events[2..], raw(&sysex).as_slice());
    }

    #[test]
    fn test_unterminated_sysex_keeps_every_byte() {
        let events = map(&[0xF0, 0x7E, 0x09], false);
        assert_eq!(
            events,
            vec![
                EngineEvent::RawByte { port: 0, byte: 0xF0 },
                EngineEvent::SysExByte { port: 0, byte: 0x7E },
                EngineEvent::SysExByte { port: 0, byte: 0x09 },
            ]
        );
        assert_eq!(map(&[0xF0], false), raw(&[0xF0]));
    }

    #[test]
    fn test_realtime_bytes() {
        for byte in [0xF8, 0xFA, 0xFB, 0xFC, 0xFE, 0xFF] {
            assert_eq!(map(&[byte], false), vec![EngineEvent::RealtimeByte { port: 0, byte }]);
        }
        // Undefined realtime byte is not clock or transport
        assert_eq!(map(&[0xF9], false), raw(&[0xF9]));
    }

    #[test]
    fn test_unrecognised_bytes_fall_back_to_raw() {
        assert_eq!(map(&[0xF2, 0x10, 0x20], false), raw(&[0xF2, 0x10, 0x20]));
        assert_eq!(map(&[0x90, 60], false), raw(&[0x90, 60]));
        assert_eq!(map(&[0x42], false), raw(&[0x42]));

        // Trailing bytes past a complete message are kept
        let events = map(&[0xC0, 5, 7], false);
        assert_eq!(events[0], EngineEvent::ProgramChange { channel: 0, program: 5 });
        assert_eq!(&events[1..], raw(&[7]).as_slice());
    }

    #[test]
    fn test_mirroring_repeats_every_byte() {
        let events = map(&[0x90, 60, 100], true);
        assert_eq!(events.len(), 4);
        assert_eq!(events[0].category(), MidiCategory::NoteOn);
        assert_eq!(&events[1..], raw(&[0x90, 60, 100]).as_slice());

        // Unrecognised bytes are not doubled
        assert_eq!(map(&[0xF6], true), raw(&[0xF6]));
    }

    #[test]
    fn test_port_is_attached() {
        let mut events = Vec::new();
        map_message(&[0xF8], 3, false, |e| events.push(e));
        assert_eq!(events, vec![EngineEvent::RealtimeByte { port: 3, byte: 0xF8 }]);
    }
}
