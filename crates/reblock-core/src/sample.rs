//! Sample type abstraction for f32/f64 block adaptation.
//!
//! The bridge only moves samples around: it copies, zero-fills and hands
//! whole planes to the engine. The trait therefore carries conversions and
//! the silence constant, nothing arithmetic.

/// Trait for audio sample types (f32, f64).
///
/// All methods inline so carry-buffer copies monomorphize to plain memcpy
/// and memset loops.
///
/// # Example: Generic Engine
///
/// ```ignore
/// impl<S: Sample> DspEngine<S> for Gain {
///     fn perform(&mut self, block: &mut Buffer<S>, _midi: &mut MidiOutput) {
///         let gain = S::from_f32(self.gain);
///         for (input, output) in block.zip_channels() {
///             for (i, o) in input.iter().zip(output.iter_mut()) {
///                 *o = S::from_f64(i.to_f64() * gain.to_f64());
///             }
///         }
///     }
/// }
/// ```
pub trait Sample: Copy + Default + PartialEq + PartialOrd + Send + Sync + core::fmt::Debug + 'static {
    /// Silence (0.0).
    const ZERO: Self;

    /// Convert from f32.
    fn from_f32(value: f32) -> Self;

    /// Convert to f32.
    fn to_f32(self) -> f32;

    /// Convert from f64.
    fn from_f64(value: f64) -> Self;

    /// Convert to f64.
    fn to_f64(self) -> f64;
}

impl Sample for f32 {
    const ZERO: Self = 0.0;

    #[inline(always)]
    fn from_f32(value: f32) -> Self {
        value
    }

    #[inline(always)]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline(always)]
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    #[inline(always)]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Sample for f64 {
    const ZERO: Self = 0.0;

    #[inline(always)]
    fn from_f32(value: f32) -> Self {
        value as f64
    }

    #[inline(always)]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline(always)]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline(always)]
    fn to_f64(self) -> f64 {
        self
    }
}
