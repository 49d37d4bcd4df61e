//! Host-side MIDI event storage.
//!
//! Hosts deliver MIDI as raw transport bytes tagged with a sample offset
//! into the current callback. [`MidiBuffer`] stores those events packed into
//! two pre-allocated vectors (event headers and payload bytes) so that
//! pushing, windowing and re-timing events never allocates on the audio
//! thread.
//!
//! ## Ordering
//!
//! Events are kept sorted by `sample_offset`. Events sharing an offset keep
//! their insertion order, so appending windows in increasing order never
//! reorders anything.
//!
//! ## Buffer Sizes
//!
//! SysEx scratch size can be configured via Cargo features:
//! - Default: 512 bytes
//! - `sysex-256`: 256 bytes (smaller memory footprint)
//! - `sysex-1024`: 1024 bytes
//! - `sysex-2048`: 2048 bytes

// =============================================================================
// Buffer Size Configuration
// =============================================================================

/// Maximum SysEx payload size in bytes.
///
/// Configurable via Cargo features: `sysex-256`, `sysex-1024`, `sysex-2048`.
#[cfg(feature = "sysex-2048")]
pub const MAX_SYSEX_SIZE: usize = 2048;

/// Maximum SysEx payload size in bytes.
#[cfg(all(feature = "sysex-1024", not(feature = "sysex-2048")))]
pub const MAX_SYSEX_SIZE: usize = 1024;

/// Maximum SysEx payload size in bytes.
#[cfg(all(feature = "sysex-256", not(feature = "sysex-1024"), not(feature = "sysex-2048")))]
pub const MAX_SYSEX_SIZE: usize = 256;

/// Maximum SysEx payload size in bytes.
#[cfg(not(any(feature = "sysex-256", feature = "sysex-1024", feature = "sysex-2048")))]
pub const MAX_SYSEX_SIZE: usize = 512;

/// Default maximum number of events per buffer.
pub const MAX_MIDI_EVENTS: usize = 1024;

/// Default payload capacity: every event a full channel message, plus room
/// for a few SysEx dumps.
pub const DEFAULT_MIDI_BYTES: usize = MAX_MIDI_EVENTS * 3 + MAX_SYSEX_SIZE * 4;

// =============================================================================
// Status Bytes
// =============================================================================

/// MIDI 1.0 status bytes and helpers.
pub mod status {
    pub const NOTE_OFF: u8 = 0x80;
    pub const NOTE_ON: u8 = 0x90;
    pub const POLY_PRESSURE: u8 = 0xA0;
    pub const CONTROL_CHANGE: u8 = 0xB0;
    pub const PROGRAM_CHANGE: u8 = 0xC0;
    pub const CHANNEL_PRESSURE: u8 = 0xD0;
    pub const PITCH_BEND: u8 = 0xE0;

    pub const SYSEX_START: u8 = 0xF0;
    pub const QUARTER_FRAME: u8 = 0xF1;
    pub const SONG_POSITION: u8 = 0xF2;
    pub const SONG_SELECT: u8 = 0xF3;
    pub const TUNE_REQUEST: u8 = 0xF6;
    pub const SYSEX_END: u8 = 0xF7;

    pub const CLOCK: u8 = 0xF8;
    pub const START: u8 = 0xFA;
    pub const CONTINUE: u8 = 0xFB;
    pub const STOP: u8 = 0xFC;
    pub const ACTIVE_SENSING: u8 = 0xFE;
    pub const RESET: u8 = 0xFF;

    /// True for any byte with the high bit set.
    #[inline]
    pub const fn is_status(byte: u8) -> bool {
        byte & 0x80 != 0
    }

    /// True for the system realtime range `0xF8..=0xFF`.
    #[inline]
    pub const fn is_realtime(byte: u8) -> bool {
        byte >= CLOCK
    }

    /// True for the realtime bytes the engine understands as clock/transport.
    #[inline]
    pub const fn is_clock_or_transport(byte: u8) -> bool {
        matches!(byte, CLOCK | START | CONTINUE | STOP | ACTIVE_SENSING | RESET)
    }

    /// Total message length implied by a status byte, or `None` for SysEx
    /// (variable length) and undefined status bytes.
    #[inline]
    pub const fn message_len(status: u8) -> Option<usize> {
        match status & 0xF0 {
            NOTE_OFF | NOTE_ON | POLY_PRESSURE | CONTROL_CHANGE | PITCH_BEND => Some(3),
            PROGRAM_CHANGE | CHANNEL_PRESSURE => Some(2),
            0xF0 => match status {
                QUARTER_FRAME | SONG_SELECT => Some(2),
                SONG_POSITION => Some(3),
                TUNE_REQUEST | SYSEX_END => Some(1),
                s if s >= CLOCK => Some(1),
                _ => None,
            },
            _ => None,
        }
    }
}

// =============================================================================
// MidiEvent
// =============================================================================

/// A sample-accurate raw MIDI event borrowed from a [`MidiBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiEvent<'a> {
    /// Sample offset within the buffer's time frame (0 = first frame).
    pub sample_offset: u32,
    /// Raw transport bytes, including any status and framing bytes.
    pub bytes: &'a [u8],
}

impl MidiEvent<'_> {
    /// First byte of the message, if any.
    #[inline]
    pub fn status(&self) -> Option<u8> {
        self.bytes.first().copied()
    }

    /// True for a message framed by `0xF0`.
    #[inline]
    pub fn is_sysex(&self) -> bool {
        self.status() == Some(status::SYSEX_START)
    }
}

// =============================================================================
// MidiBuffer
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EventHeader {
    sample_offset: u32,
    start: u32,
    len: u32,
}

/// A pre-allocated, offset-ordered list of raw MIDI events.
///
/// Capacity is fixed at construction: `push()` past either the event or
/// the byte capacity fails and sets the overflow flag instead of growing.
#[derive(Debug, Clone)]
pub struct MidiBuffer {
    headers: Vec<EventHeader>,
    data: Vec<u8>,
    max_events: usize,
    max_bytes: usize,
    /// Set to true when a push fails due to buffer exhaustion
    overflowed: bool,
}

impl MidiBuffer {
    /// Create a buffer with the default capacities
    /// ([`MAX_MIDI_EVENTS`] events, [`DEFAULT_MIDI_BYTES`] payload bytes).
    pub fn new() -> Self {
        Self::with_capacity(MAX_MIDI_EVENTS, DEFAULT_MIDI_BYTES)
    }

    /// Create a buffer holding up to `max_events` events totalling
    /// `max_bytes` payload bytes. Allocates; call outside the audio thread.
    pub fn with_capacity(max_events: usize, max_bytes: usize) -> Self {
        Self {
            headers: Vec::with_capacity(max_events),
            data: Vec::with_capacity(max_bytes),
            max_events,
            max_bytes,
            overflowed: false,
        }
    }

    /// Clear all events. O(1), keeps capacity.
    #[inline]
    pub fn clear(&mut self) {
        self.headers.clear();
        self.data.clear();
        self.overflowed = false;
    }

    /// Returns the number of events in the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Returns true if the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Maximum number of events this buffer holds without allocating.
    #[inline]
    pub fn event_capacity(&self) -> usize {
        self.max_events
    }

    /// Maximum number of payload bytes this buffer holds without allocating.
    #[inline]
    pub fn byte_capacity(&self) -> usize {
        self.max_bytes
    }

    /// Returns true if any push failed since the last clear.
    #[inline]
    pub fn has_overflowed(&self) -> bool {
        self.overflowed
    }

    /// Insert an event at its sorted position.
    ///
    /// Returns `true` if the event was added, `false` if the buffer is full
    /// or `bytes` is empty. Sets the overflow flag when the buffer is
    /// exhausted.
    pub fn push(&mut self, sample_offset: u32, bytes: &[u8]) -> bool {
        if bytes.is_empty() {
            return false;
        }
        if self.headers.len() >= self.max_events || self.data.len() + bytes.len() > self.max_bytes
        {
            self.overflowed = true;
            return false;
        }

        let header = EventHeader {
            sample_offset,
            start: self.data.len() as u32,
            len: bytes.len() as u32,
        };
        self.data.extend_from_slice(bytes);

        // Common case: events arrive in order
        match self.headers.last() {
            Some(last) if last.sample_offset > sample_offset => {
                let index = self
                    .headers
                    .partition_point(|h| h.sample_offset <= sample_offset);
                self.headers.insert(index, header);
            }
            _ => self.headers.push(header),
        }
        true
    }

    /// Event at `index` in offset order.
    #[inline]
    pub fn get(&self, index: usize) -> Option<MidiEvent<'_>> {
        self.headers.get(index).map(|h| self.event(h))
    }

    /// Iterate over events in offset order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = MidiEvent<'_>> + '_ {
        self.headers.iter().map(move |h| self.event(h))
    }

    /// Copy the events of `source` whose offsets lie in
    /// `[start, start + len)` into this buffer, adding `shift` to each
    /// offset.
    ///
    /// Returns the number of events copied. Shifted offsets are clamped at
    /// zero. Events that do not fit set the overflow flag.
    pub fn add_events(&mut self, source: &MidiBuffer, start: u32, len: u32, shift: i64) -> usize {
        let end = start.saturating_add(len);
        let first = source.headers.partition_point(|h| h.sample_offset < start);
        let mut copied = 0;
        for header in &source.headers[first..] {
            if header.sample_offset >= end {
                break;
            }
            let shifted = header.sample_offset as i64 + shift;
            debug_assert!(shifted >= 0, "event shifted before the start of its window");
            let bytes = &source.data[header.start as usize..(header.start + header.len) as usize];
            if self.push(shifted.max(0) as u32, bytes) {
                copied += 1;
            }
        }
        copied
    }

    /// Replace this buffer's events with a copy of `source`'s.
    ///
    /// Unlike `clone_from`, never grows the allocation.
    pub fn copy_from(&mut self, source: &MidiBuffer) {
        self.clear();
        for event in source.iter() {
            self.push(event.sample_offset, event.bytes);
        }
        self.overflowed |= source.overflowed;
    }

    /// Exchange contents (and capacities) with another buffer. O(1).
    #[inline]
    pub fn swap_with(&mut self, other: &mut MidiBuffer) {
        std::mem::swap(self, other);
    }

    #[inline]
    fn event(&self, header: &EventHeader) -> MidiEvent<'_> {
        MidiEvent {
            sample_offset: header.sample_offset,
            bytes: &self.data[header.start as usize..(header.start + header.len) as usize],
        }
    }
}

impl Default for MidiBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offsets(buffer: &MidiBuffer) -> Vec<u32> {
        buffer.iter().map(|e| e.sample_offset).collect()
    }

    #[test]
    fn test_push_keeps_offset_order() {
        let mut buffer = MidiBuffer::with_capacity(8, 64);
        assert!(buffer.push(5, &[0x90, 60, 100]));
        assert!(buffer.push(2, &[0x80, 60, 0]));
        assert!(buffer.push(5, &[0xB0, 1, 64]));
        assert!(buffer.push(0, &[0xF8]));

        assert_eq!(offsets(&buffer), vec![0, 2, 5, 5]);
        // Equal offsets keep insertion order
        assert_eq!(buffer.get(2).unwrap().bytes, &[0x90, 60, 100]);
        assert_eq!(buffer.get(3).unwrap().bytes, &[0xB0, 1, 64]);
    }

    #[test]
    fn test_push_overflow_sets_flag() {
        let mut buffer = MidiBuffer::with_capacity(2, 64);
        assert!(buffer.push(0, &[0x90, 60, 100]));
        assert!(buffer.push(1, &[0x90, 61, 100]));
        assert!(!buffer.push(2, &[0x90, 62, 100]));
        assert!(buffer.has_overflowed());
        assert_eq!(buffer.len(), 2);

        buffer.clear();
        assert!(!buffer.has_overflowed());
        assert!(buffer.is_empty());

        let mut small = MidiBuffer::with_capacity(8, 4);
        assert!(small.push(0, &[0xC0, 5]));
        assert!(!small.push(0, &[0x90, 60, 100]));
        assert!(small.has_overflowed());
    }

    #[test]
    fn test_push_never_grows_capacity() {
        let mut buffer = MidiBuffer::with_capacity(4, 8);
        let events = buffer.event_capacity();
        let bytes = buffer.byte_capacity();
        for i in 0..10 {
            buffer.push(i, &[0x90, 60, 100]);
        }
        assert_eq!(buffer.event_capacity(), events);
        assert_eq!(buffer.byte_capacity(), bytes);
    }

    #[test]
    fn test_empty_message_rejected() {
        let mut buffer = MidiBuffer::with_capacity(4, 8);
        assert!(!buffer.push(0, &[]));
        assert!(buffer.is_empty());
        assert!(!buffer.has_overflowed());
    }

    #[test]
    fn test_add_events_window_and_shift() {
        let mut source = MidiBuffer::with_capacity(8, 64);
        for offset in [0, 3, 4, 7, 9] {
            source.push(offset, &[0x90, offset as u8, 1]);
        }

        let mut dest = MidiBuffer::with_capacity(8, 64);
        let copied = dest.add_events(&source, 3, 5, -3);
        assert_eq!(copied, 3);
        assert_eq!(offsets(&dest), vec![0, 1, 4]);

        let copied = dest.add_events(&source, 9, 10, 1);
        assert_eq!(copied, 1);
        assert_eq!(offsets(&dest), vec![0, 1, 4, 10]);
    }

    #[test]
    fn test_sysex_payload_survives_copy() {
        let sysex = [0xF0, 0x7E, 0x7F, 0x06, 0x01, 0xF7];
        let mut source = MidiBuffer::with_capacity(4, 64);
        source.push(12, &sysex);

        let mut dest = MidiBuffer::with_capacity(4, 64);
        dest.copy_from(&source);
        let event = dest.get(0).unwrap();
        assert!(event.is_sysex());
        assert_eq!(event.bytes, &sysex);
        assert_eq!(event.sample_offset, 12);
    }

    #[test]
    fn test_status_helpers() {
        assert_eq!(status::message_len(0x93), Some(3));
        assert_eq!(status::message_len(0xC2), Some(2));
        assert_eq!(status::message_len(0xF2), Some(3));
        assert_eq!(status::message_len(0xF8), Some(1));
        assert_eq!(status::message_len(0xF0), None);
        assert_eq!(status::message_len(0x40), None);
        assert!(status::is_clock_or_transport(0xFA));
        assert!(!status::is_clock_or_transport(0xF9));
        assert!(status::is_realtime(0xF9));
    }
}
