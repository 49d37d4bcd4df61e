//! Block-walking state machine.
//!
//! A host call of `n` frames is cut into segments against the fixed block
//! grid. [`BlockPlan`] is the only place that computes `room`, the carry
//! offset and the host read position; the adapter just executes segments.
//!
//! ```text
//!  advancement = 3, block = 8, n = 20
//!
//!  host:       |0..4 |5 ....12|13 ..19|
//!  block:   [###.....][........][.......-]
//!              carry     direct   carry
//!           (completes)          (partial, advancement 7)
//! ```
//!
//! Invariants (checked by the tests below):
//! - segments tile `[0, n)` exactly once, in order
//! - engine invocations per call = `(advancement + n) / block_size`
//! - advancement after the call = `(advancement + n) % block_size`

/// One step of a host call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// Copy `len` host frames through the carry buffers at `block_offset`.
    /// When `completes_block`, the fixed block is full afterwards and the
    /// engine runs on the carry buffers.
    Carry {
        host_start: usize,
        block_offset: usize,
        len: usize,
        completes_block: bool,
    },
    /// A whole fixed block of host frames starting at `host_start`, aligned
    /// with the block grid. The engine reads these frames in place.
    Direct { host_start: usize },
}

impl Segment {
    /// First host frame covered by this segment.
    #[inline]
    pub fn host_start(&self) -> usize {
        match *self {
            Segment::Carry { host_start, .. } | Segment::Direct { host_start } => host_start,
        }
    }

    /// Number of host frames covered, given the fixed block size.
    #[inline]
    pub fn len(&self, block_size: usize) -> usize {
        match *self {
            Segment::Carry { len, .. } => len,
            Segment::Direct { .. } => block_size,
        }
    }

    /// True if the engine runs at the end of this segment.
    #[inline]
    pub fn runs_engine(&self) -> bool {
        match *self {
            Segment::Carry { completes_block, .. } => completes_block,
            Segment::Direct { .. } => true,
        }
    }
}

/// Iterator over the segments of one host call.
#[derive(Debug, Clone)]
pub struct BlockPlan {
    advancement: usize,
    pos: usize,
    num_frames: usize,
    block_size: usize,
}

impl BlockPlan {
    /// Plan a call of `num_frames` frames starting `advancement` frames into
    /// the current fixed block.
    #[inline]
    pub fn new(advancement: usize, num_frames: usize, block_size: usize) -> Self {
        debug_assert!(block_size > 0, "block size must be positive");
        debug_assert!(advancement < block_size, "advancement {advancement} out of range");
        Self {
            advancement,
            pos: 0,
            num_frames,
            block_size,
        }
    }

    /// Advancement once every segment has been executed.
    #[inline]
    pub fn final_advancement(&self) -> usize {
        (self.advancement + self.num_frames - self.pos) % self.block_size
    }

    /// Engine invocations still ahead in this plan.
    #[inline]
    pub fn engine_calls(&self) -> usize {
        (self.advancement + self.num_frames - self.pos) / self.block_size
    }

    /// Advancement at the current position.
    #[inline]
    pub fn advancement(&self) -> usize {
        self.advancement
    }
}

impl Iterator for BlockPlan {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        let remaining = self.num_frames - self.pos;
        if remaining == 0 {
            return None;
        }

        let host_start = self.pos;
        if self.advancement == 0 && remaining >= self.block_size {
            self.pos += self.block_size;
            return Some(Segment::Direct { host_start });
        }

        let room = self.block_size - self.advancement;
        let len = room.min(remaining);
        let segment = Segment::Carry {
            host_start,
            block_offset: self.advancement,
            len,
            completes_block: len == room,
        };
        self.pos += len;
        self.advancement = (self.advancement + len) % self.block_size;
        Some(segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_short_call_stays_in_carry() {
        let segments: Vec<_> = BlockPlan::new(0, 32, 64).collect();
        assert_eq!(
            segments,
            vec![Segment::Carry {
                host_start: 0,
                block_offset: 0,
                len: 32,
                completes_block: false
            }]
        );

        let segments: Vec<_> = BlockPlan::new(32, 32, 64).collect();
        assert_eq!(
            segments,
            vec![Segment::Carry {
                host_start: 0,
                block_offset: 32,
                len: 32,
                completes_block: true
            }]
        );
    }

    #[test]
    fn test_completing_call_with_leftover() {
        // advancement = 20, n = 100, block = 64: 44 to complete, 56 left over
        let plan = BlockPlan::new(20, 100, 64);
        assert_eq!(plan.engine_calls(), 1);
        assert_eq!(plan.final_advancement(), 56);

        let segments: Vec<_> = plan.collect();
        assert_eq!(
            segments,
            vec![
                Segment::Carry {
                    host_start: 0,
                    block_offset: 20,
                    len: 44,
                    completes_block: true
                },
                Segment::Carry {
                    host_start: 44,
                    block_offset: 0,
                    len: 56,
                    completes_block: false
                },
            ]
        );
    }

    #[test]
    fn test_aligned_calls_are_direct() {
        let segments: Vec<_> = BlockPlan::new(0, 192, 64).collect();
        assert_eq!(
            segments,
            vec![
                Segment::Direct { host_start: 0 },
                Segment::Direct { host_start: 64 },
                Segment::Direct { host_start: 128 },
            ]
        );
    }

    #[test]
    fn test_direct_blocks_between_carries() {
        let segments: Vec<_> = BlockPlan::new(3, 20, 8).collect();
        assert_eq!(
            segments,
            vec![
                Segment::Carry {
                    host_start: 0,
                    block_offset: 3,
                    len: 5,
                    completes_block: true
                },
                Segment::Direct { host_start: 5 },
                Segment::Carry {
                    host_start: 13,
                    block_offset: 0,
                    len: 7,
                    completes_block: false
                },
            ]
        );
    }

    #[test]
    fn test_empty_call_has_no_segments() {
        let mut plan = BlockPlan::new(5, 0, 8);
        assert_eq!(plan.next(), None);
        assert_eq!(plan.final_advancement(), 5);
    }

    proptest! {
        #[test]
        fn prop_segments_tile_the_call(
            block_size in 1usize..200,
            advancement_seed in 0usize..200,
            num_frames in 0usize..2000,
        ) {
            let advancement = advancement_seed % block_size;
            let plan = BlockPlan::new(advancement, num_frames, block_size);
            let expected_calls = plan.engine_calls();
            let expected_advancement = plan.final_advancement();
            prop_assert_eq!(expected_calls, (advancement + num_frames) / block_size);
            prop_assert_eq!(expected_advancement, (advancement + num_frames) % block_size);

            let mut pos = 0;
            let mut calls = 0;
            let mut adv = advancement;
            for segment in plan {
                prop_assert_eq!(segment.host_start(), pos);
                let len = segment.len(block_size);
                prop_assert!(len > 0);
                match segment {
                    Segment::Carry { block_offset, completes_block, .. } => {
                        prop_assert_eq!(block_offset, adv);
                        prop_assert!(block_offset + len <= block_size);
                        prop_assert_eq!(completes_block, block_offset + len == block_size);
                    }
                    Segment::Direct { .. } => prop_assert_eq!(adv, 0),
                }
                if segment.runs_engine() {
                    calls += 1;
                }
                adv = (adv + len) % block_size;
                prop_assert!(adv < block_size);
                pos += len;
            }
            prop_assert_eq!(pos, num_frames);
            prop_assert_eq!(calls, expected_calls);
            prop_assert_eq!(adv, expected_advancement);
        }
    }
}
