//! Event offset translation between host calls and fixed blocks.
//!
//! Host events carry offsets relative to the start of the host call; engine
//! events carry offsets relative to the start of the fixed block. Both
//! directions are windowed copies over [`MidiBuffer`], which keeps events
//! sorted and never allocates.

use reblock_core::MidiBuffer;

/// Copy the events of `events` in `[from_start, from_start + len)` into
/// `dest`, moved so that `from_start` lands on `to_start`.
///
/// Returns the number of events copied. This is the general form of both
/// directions: a carry segment maps a host window onto a block window that
/// does not start at zero.
#[inline]
pub fn move_window(
    events: &MidiBuffer,
    from_start: usize,
    len: usize,
    to_start: usize,
    dest: &mut MidiBuffer,
) -> usize {
    dest.add_events(
        events,
        from_start as u32,
        len as u32,
        to_start as i64 - from_start as i64,
    )
}

/// Copy the events of `events` in `[window_start, window_start + window_len)`
/// into `dest`, rebased so that `window_start` becomes offset 0.
///
/// Returns the number of events copied. Ordering is preserved.
#[inline]
pub fn slice_into_window(
    events: &MidiBuffer,
    window_start: usize,
    window_len: usize,
    dest: &mut MidiBuffer,
) -> usize {
    move_window(events, window_start, window_len, 0, dest)
}

/// Copy every event of `events` into `dest`, moved `window_start` frames
/// later. The inverse of [`slice_into_window`].
#[inline]
pub fn shift_out(events: &MidiBuffer, window_start: usize, dest: &mut MidiBuffer) -> usize {
    dest.add_events(events, 0, u32::MAX, window_start as i64)
}
