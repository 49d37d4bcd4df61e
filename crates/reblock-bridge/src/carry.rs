//! Carry-over storage for partially filled fixed blocks.
//!
//! Samples live in one flat allocation per direction, laid out as
//! `channel * block_size + offset`. [`ChannelBlock`] hides that arithmetic
//! behind per-channel slices so callers only ever deal in
//! `(channel, offset, len)` windows.
//!
//! # Real-Time Safety
//!
//! - All storage is allocated in [`CarryBuffers::new`] (prepare time)
//! - `copy_in()` / `copy_out()` / `clear()` never allocate
//! - Window bounds are debug-asserted; slice indexing still bounds-checks in
//!   release builds

use reblock_core::Sample;

// =============================================================================
// ChannelBlock
// =============================================================================

/// `channels × block_size` samples in one flat buffer.
#[derive(Debug, Clone)]
pub struct ChannelBlock<S: Sample> {
    data: Vec<S>,
    num_channels: usize,
    block_size: usize,
}

impl<S: Sample> ChannelBlock<S> {
    /// Allocate a zeroed block. Not real-time safe.
    pub fn new(num_channels: usize, block_size: usize) -> Self {
        Self {
            data: vec![S::ZERO; num_channels * block_size],
            num_channels,
            block_size,
        }
    }

    /// Number of channel planes.
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Frames per channel plane.
    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// One channel plane.
    #[inline]
    pub fn channel(&self, channel: usize) -> &[S] {
        let start = channel * self.block_size;
        &self.data[start..start + self.block_size]
    }

    /// One channel plane, mutably.
    #[inline]
    pub fn channel_mut(&mut self, channel: usize) -> &mut [S] {
        let start = channel * self.block_size;
        &mut self.data[start..start + self.block_size]
    }

    /// Iterate over all channel planes.
    ///
    /// A zero block size yields no planes.
    #[inline]
    pub fn channels(&self) -> impl Iterator<Item = &[S]> + '_ {
        self.data.chunks_exact(self.block_size.max(1))
    }

    /// Iterate over all channel planes mutably.
    #[inline]
    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut [S]> + '_ {
        self.data.chunks_exact_mut(self.block_size.max(1))
    }

    /// Write `src` into `channel` starting at `offset`.
    #[inline]
    pub fn copy_in(&mut self, channel: usize, offset: usize, src: &[S]) {
        debug_assert!(channel < self.num_channels, "channel {channel} out of range");
        debug_assert!(
            offset + src.len() <= self.block_size,
            "window {offset}+{} exceeds block of {}",
            src.len(),
            self.block_size
        );
        self.channel_mut(channel)[offset..offset + src.len()].copy_from_slice(src);
    }

    /// Read `dst.len()` frames of `channel` starting at `offset` into `dst`.
    #[inline]
    pub fn copy_out(&self, channel: usize, offset: usize, dst: &mut [S]) {
        debug_assert!(channel < self.num_channels, "channel {channel} out of range");
        debug_assert!(
            offset + dst.len() <= self.block_size,
            "window {offset}+{} exceeds block of {}",
            dst.len(),
            self.block_size
        );
        dst.copy_from_slice(&self.channel(channel)[offset..offset + dst.len()]);
    }

    /// Zero `len` frames of `channel` starting at `offset`.
    #[inline]
    pub fn fill_zero(&mut self, channel: usize, offset: usize, len: usize) {
        debug_assert!(offset + len <= self.block_size);
        self.channel_mut(channel)[offset..offset + len].fill(S::ZERO);
    }

    /// Zero every plane.
    #[inline]
    pub fn clear(&mut self) {
        self.data.fill(S::ZERO);
    }
}

// =============================================================================
// CarryBuffers
// =============================================================================

/// Input and output carry storage plus the fill level of the current block.
///
/// At entry to every host call, frames `[0, advancement)` of each input plane
/// hold buffered host input for the block in progress, and every output
/// plane holds the result of the previous completed block.
#[derive(Debug, Clone)]
pub struct CarryBuffers<S: Sample> {
    /// Host input waiting for its fixed block to fill.
    pub input: ChannelBlock<S>,
    /// Result of the most recent engine invocation.
    pub output: ChannelBlock<S>,
    advancement: usize,
}

impl<S: Sample> CarryBuffers<S> {
    /// Allocate zeroed carry storage for the given engine layout.
    pub fn new(num_inputs: usize, num_outputs: usize, block_size: usize) -> Self {
        Self {
            input: ChannelBlock::new(num_inputs, block_size),
            output: ChannelBlock::new(num_outputs, block_size),
            advancement: 0,
        }
    }

    /// Frames already written into the block in progress.
    #[inline]
    pub fn advancement(&self) -> usize {
        self.advancement
    }

    /// Record the fill level after a host call.
    #[inline]
    pub fn set_advancement(&mut self, advancement: usize) {
        debug_assert!(
            advancement < self.block_size(),
            "advancement {advancement} must stay below block size {}",
            self.block_size()
        );
        self.advancement = advancement;
    }

    /// Fixed block size.
    #[inline]
    pub fn block_size(&self) -> usize {
        self.input.block_size()
    }

    /// Zero both directions and reset the fill level.
    pub fn reset(&mut self) {
        self.input.clear();
        self.output.clear();
        self.advancement = 0;
    }
}
