//! sc-dsp: spectral analysis primitives for SpectraScope
//!
//! ## Modules
//! - `window` - Hann/Gaussian envelope generation with a per-size cache
//! - `fft` - FFT scratch buffers and magnitude-to-display conversion
//! - `fixed` - single-resolution analyzer (live byte spectrum + offline)
//! - `multiband` - parallel FFT sizes cross-faded over frequency sub-ranges
//! - `logfreq` - constant-Q / wavelet log-frequency correlation analyzer
//! - `display` - noise floor, auto gain, and peak-stabilizer followers

pub mod display;
pub mod fft;
pub mod fixed;
pub mod logfreq;
pub mod multiband;
pub mod window;

/// A prepared magnitude source sampled by the render pipeline.
///
/// `magnitude_at` returns linear display amplitude (roughly 0..1) over the
/// analyzer's own frequency grid; callers interpolate nothing themselves.
/// Values outside the prepared grid degrade to 0 rather than erroring.
pub trait Analyzer {
    /// Linear display amplitude at `hz`.
    fn magnitude_at(&self, hz: f64) -> f64;

    /// Drop transient per-session state.
    fn reset(&mut self);
}
