//! Single-threaded audio + MIDI FIFO.
//!
//! A ring of `channels × capacity` frames with a companion event list whose
//! offsets are relative to the current read position. Writing appends
//! frames and re-times the written events behind whatever is already
//! queued; reading pops frames and the events inside the read window, then
//! moves the remaining events forward.

use reblock_core::{BridgeError, BridgeResult, Buffer, MidiBuffer, Sample};

use crate::carry::ChannelBlock;

/// Ring buffer of audio frames plus block-aligned MIDI events.
pub struct AudioMidiFifo<S: Sample = f32> {
    audio: ChannelBlock<S>,
    midi: MidiBuffer,
    /// Scratch for re-timing queued events after a read.
    scratch: MidiBuffer,
    read_pos: usize,
    num_ready: usize,
}

impl<S: Sample> AudioMidiFifo<S> {
    /// Allocate a FIFO holding up to `capacity` frames of `channels` channels,
    /// with the default event capacities.
    pub fn new(channels: usize, capacity: usize) -> Self {
        Self {
            audio: ChannelBlock::new(channels, capacity),
            midi: MidiBuffer::new(),
            scratch: MidiBuffer::new(),
            read_pos: 0,
            num_ready: 0,
        }
    }

    /// Reallocate for a new channel count and capacity. Clears the FIFO.
    /// Not real-time safe.
    pub fn set_size(&mut self, channels: usize, capacity: usize) {
        self.audio = ChannelBlock::new(channels, capacity);
        self.clear();
    }

    /// Drop all queued frames and events.
    pub fn clear(&mut self) {
        self.audio.clear();
        self.midi.clear();
        self.read_pos = 0;
        self.num_ready = 0;
    }

    /// Channel count.
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.audio.num_channels()
    }

    /// Maximum number of queued frames.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.audio.block_size()
    }

    /// Frames available to read.
    #[inline]
    pub fn num_ready(&self) -> usize {
        self.num_ready
    }

    /// Frames that can be written without overflowing.
    #[inline]
    pub fn num_free(&self) -> usize {
        self.capacity() - self.num_ready
    }

    /// Events queued, relative to the read position.
    #[inline]
    pub fn events(&self) -> &MidiBuffer {
        &self.midi
    }

    /// Append the input planes of `source` and its events.
    ///
    /// Event offsets are moved behind the frames already queued.
    pub fn write(&mut self, source: &Buffer<'_, S>, midi: &MidiBuffer) -> BridgeResult<()> {
        let n = source.num_samples();
        self.check_free(n)?;
        self.check_channels(source.num_input_channels())?;

        self.midi.add_events(midi, 0, n as u32, self.num_ready as i64);

        let (start, first, second) = self.write_regions(n);
        for ch in 0..self.num_channels() {
            let input = source.input(ch);
            self.audio.copy_in(ch, start, &input[..first]);
            self.audio.copy_in(ch, 0, &input[first..first + second]);
        }
        self.num_ready += n;
        Ok(())
    }

    /// Append `n` silent frames.
    pub fn write_silence(&mut self, n: usize) -> BridgeResult<()> {
        self.check_free(n)?;

        let (start, first, second) = self.write_regions(n);
        for ch in 0..self.num_channels() {
            self.audio.fill_zero(ch, start, first);
            self.audio.fill_zero(ch, 0, second);
        }
        self.num_ready += n;
        Ok(())
    }

    /// Pop `dest.num_samples()` frames into the output planes of `dest` and
    /// append the events inside that window to `midi`.
    pub fn read(&mut self, dest: &mut Buffer<'_, S>, midi: &mut MidiBuffer) -> BridgeResult<()> {
        let n = dest.num_samples();
        if n > self.num_ready {
            return Err(BridgeError::FifoUnderflow {
                requested: n,
                available: self.num_ready,
            });
        }
        self.check_channels(dest.num_output_channels())?;

        midi.add_events(&self.midi, 0, n as u32, 0);
        self.scratch.clear();
        self.scratch.add_events(&self.midi, n as u32, u32::MAX, -(n as i64));
        self.midi.swap_with(&mut self.scratch);

        let capacity = self.capacity();
        let start = self.read_pos;
        let first = n.min(capacity - start);
        let second = n - first;
        for ch in 0..self.num_channels() {
            let output = dest.output(ch);
            self.audio.copy_out(ch, start, &mut output[..first]);
            self.audio.copy_out(ch, 0, &mut output[first..first + second]);
        }

        self.read_pos = if capacity == 0 { 0 } else { (start + n) % capacity };
        self.num_ready -= n;
        Ok(())
    }

    /// Split a write of `n` frames into `(start, first_len, wrapped_len)`.
    fn write_regions(&self, n: usize) -> (usize, usize, usize) {
        let capacity = self.capacity();
        if capacity == 0 {
            return (0, 0, 0);
        }
        let start = (self.read_pos + self.num_ready) % capacity;
        let first = n.min(capacity - start);
        (start, first, n - first)
    }

    fn check_free(&self, n: usize) -> BridgeResult<()> {
        if n > self.num_free() {
            return Err(BridgeError::FifoOverflow {
                requested: n,
                available: self.num_free(),
            });
        }
        Ok(())
    }

    fn check_channels(&self, actual: usize) -> BridgeResult<()> {
        if actual != self.num_channels() {
            return Err(BridgeError::FifoChannelMismatch {
                expected: self.num_channels(),
                actual,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_ramp(fifo: &mut AudioMidiFifo, start: usize, n: usize, midi: &MidiBuffer) -> BridgeResult<()> {
        let left: Vec<f32> = (start..start + n).map(|t| t as f32).collect();
        let right: Vec<f32> = (start..start + n).map(|t| -(t as f32)).collect();
        let buffer = Buffer::new([left.as_slice(), right.as_slice()], std::iter::empty(), n);
        fifo.write(&buffer, midi)
    }

    fn read_frames(fifo: &mut AudioMidiFifo, n: usize, midi: &mut MidiBuffer) -> BridgeResult<Vec<Vec<f32>>> {
        let mut out = vec![vec![0.0f32; n]; 2];
        {
            let mut buffer = Buffer::new(std::iter::empty(), out.iter_mut().map(|c| c.as_mut_slice()), n);
            fifo.read(&mut buffer, midi)?;
        }
        Ok(out)
    }

    #[test]
    fn test_frames_come_out_in_order_across_wrap() {
        let mut fifo = AudioMidiFifo::new(2, 10);
        let none = MidiBuffer::with_capacity(0, 0);
        let mut midi = MidiBuffer::with_capacity(8, 32);

        write_ramp(&mut fifo, 0, 7, &none).unwrap();
        let out = read_frames(&mut fifo, 5, &mut midi).unwrap();
        assert_eq!(out[0], vec![0.0, 1.0, 2.0, 3.0, 4.0]);

        // This write wraps around the end of the ring
        write_ramp(&mut fifo, 7, 6, &none).unwrap();
        assert_eq!(fifo.num_ready(), 8);
        let out = read_frames(&mut fifo, 8, &mut midi).unwrap();
        assert_eq!(out[0], (5..13).map(|t| t as f32).collect::<Vec<_>>());
        assert_eq!(out[1], (5..13).map(|t| -(t as f32)).collect::<Vec<_>>());
        assert_eq!(fifo.num_free(), 10);
    }

    #[test]
    fn test_events_are_retimed_through_the_fifo() {
        let mut fifo = AudioMidiFifo::new(2, 32);
        let mut midi_in = MidiBuffer::with_capacity(8, 32);
        midi_in.push(2, &[0x90, 60, 100]);
        write_ramp(&mut fifo, 0, 4, &midi_in).unwrap();

        midi_in.clear();
        midi_in.push(1, &[0x80, 60, 0]);
        write_ramp(&mut fifo, 4, 4, &midi_in).unwrap();

        // Queued at 2 and 4 + 1
        let queued: Vec<u32> = fifo.events().iter().map(|e| e.sample_offset).collect();
        assert_eq!(queued, vec![2, 5]);

        let mut midi_out = MidiBuffer::with_capacity(8, 32);
        read_frames(&mut fifo, 3, &mut midi_out).unwrap();
        assert_eq!(midi_out.len(), 1);
        assert_eq!(midi_out.get(0).unwrap().sample_offset, 2);

        // The note-off moved forward by the 3 frames consumed
        midi_out.clear();
        read_frames(&mut fifo, 5, &mut midi_out).unwrap();
        assert_eq!(midi_out.len(), 1);
        assert_eq!(midi_out.get(0).unwrap().sample_offset, 2);
        assert!(fifo.events().is_empty());
    }

    #[test]
    fn test_silence_and_clear() {
        let mut fifo = AudioMidiFifo::new(2, 8);
        let mut midi = MidiBuffer::with_capacity(8, 32);
        midi.push(0, &[0xF8]);
        write_ramp(&mut fifo, 1, 3, &midi).unwrap();
        fifo.write_silence(4).unwrap();
        assert_eq!(fifo.num_ready(), 7);

        let mut out_midi = MidiBuffer::with_capacity(8, 32);
        let out = read_frames(&mut fifo, 7, &mut out_midi).unwrap();
        assert_eq!(out[0], vec![1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0]);

        write_ramp(&mut fifo, 0, 2, &midi).unwrap();
        fifo.clear();
        assert_eq!(fifo.num_ready(), 0);
        assert!(fifo.events().is_empty());
    }

    #[test]
    fn test_overflow_underflow_and_mismatch() {
        let mut fifo = AudioMidiFifo::new(2, 4);
        let none = MidiBuffer::with_capacity(0, 0);
        let mut midi = MidiBuffer::with_capacity(8, 32);

        assert_eq!(
            write_ramp(&mut fifo, 0, 5, &none),
            Err(BridgeError::FifoOverflow { requested: 5, available: 4 })
        );
        assert_eq!(
            fifo.write_silence(5),
            Err(BridgeError::FifoOverflow { requested: 5, available: 4 })
        );
        assert_eq!(
            read_frames(&mut fifo, 1, &mut midi),
            Err(BridgeError::FifoUnderflow { requested: 1, available: 0 })
        );

        let mono = [0.0f32; 2];
        let buffer = Buffer::new([&mono[..]], std::iter::empty(), 2);
        assert_eq!(
            fifo.write(&buffer, &none),
            Err(BridgeError::FifoChannelMismatch { expected: 2, actual: 1 })
        );

        fifo.set_size(1, 16);
        assert_eq!(fifo.num_channels(), 1);
        assert_eq!(fifo.capacity(), 16);
        assert!(fifo.write(&buffer, &none).is_ok());
    }
}
