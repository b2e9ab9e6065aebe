//! FFT scratch buffers and magnitude-to-display conversion
//!
//! All analyzers hand their magnitudes through the same dB clamp so the
//! downstream line pipeline works in one consistent linear-amplitude space
//! regardless of which transform produced them.

use std::sync::Arc;

use realfft::{RealFftPlanner, RealToComplex};
use rustfft::num_complex::Complex;
use sc_core::Sample;

use crate::window::WindowKind;

/// Display floor when the source reports no dB bounds
pub const DEFAULT_MIN_DB: f64 = -100.0;
/// Display ceiling when the source reports no dB bounds
pub const DEFAULT_MAX_DB: f64 = -30.0;

/// Minimum FFT size
pub const MIN_FFT_SIZE: usize = 32;
/// Maximum FFT size
pub const MAX_FFT_SIZE: usize = 65536;
/// Default FFT size
pub const DEFAULT_FFT_SIZE: usize = 4096;

/// Correct an FFT size in place: power of two within [MIN, MAX], else default.
pub fn validate_fft_size(size: usize) -> usize {
    if (MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&size) && size.is_power_of_two() {
        size
    } else {
        DEFAULT_FFT_SIZE
    }
}

/// Convert a normalized magnitude to linear display amplitude.
///
/// `db = 20·log10(mag)` clamped to `[min_db, max_db]`, re-expressed as
/// `10^((db - max_db)/20)`. Non-finite or zero magnitudes map to the floor.
#[inline]
pub fn to_display_amp(mag: f64, min_db: f64, max_db: f64) -> f64 {
    let db = if mag.is_finite() && mag > 0.0 {
        (20.0 * mag.log10()).clamp(min_db, max_db)
    } else {
        min_db
    };
    10.0_f64.powf((db - max_db) / 20.0)
}

/// Convert a quantized spectrum byte (0..255) to linear display amplitude.
///
/// The byte encodes dB linearly between `min_db` and `max_db`; fractional
/// inputs are accepted because noise-floor subtraction happens upstream in
/// byte space.
#[inline]
pub fn byte_to_amp(v: f64, min_db: f64, max_db: f64) -> f64 {
    let db = min_db + (v / 255.0) * (max_db - min_db);
    10.0_f64.powf((db - max_db) / 20.0)
}

/// Linear interpolation between adjacent bins of a uniformly spaced grid.
#[inline]
pub fn sample_linear(amps: &[f64], bin_hz: f64, hz: f64) -> f64 {
    if amps.is_empty() || !(bin_hz > 0.0) {
        return 0.0;
    }
    let pos = (hz / bin_hz).max(0.0);
    let lo = pos.floor() as usize;
    if lo + 1 >= amps.len() {
        return *amps.last().unwrap_or(&0.0);
    }
    let t = pos - lo as f64;
    amps[lo] * (1.0 - t) + amps[lo + 1] * t
}

/// Per-size FFT scratch: plan, Hann window, input/spectrum buffers, and the
/// resulting display amplitudes. Reallocated whenever the size changes,
/// never reused mismatched.
pub struct FftScratch {
    size: usize,
    fft: Arc<dyn RealToComplex<f64>>,
    window: Vec<f64>,
    input: Vec<f64>,
    spectrum: Vec<Complex<f64>>,
    amps: Vec<f64>,
}

impl FftScratch {
    pub fn new(size: usize) -> Self {
        let size = validate_fft_size(size);
        let mut planner = RealFftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        Self {
            size,
            fft,
            window: WindowKind::Hann.generate(size),
            input: vec![0.0; size],
            spectrum: vec![Complex::new(0.0, 0.0); size / 2 + 1],
            amps: vec![0.0; size / 2],
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn bin_count(&self) -> usize {
        self.amps.len()
    }

    /// Width of one bin in Hz.
    #[inline]
    pub fn bin_hz(&self, sample_rate: f64) -> f64 {
        sample_rate / self.size as f64
    }

    /// Window `size` samples centered at `center` (silence beyond the
    /// source), transform, and refresh the display amplitudes.
    pub fn analyze_centered(&mut self, samples: &[Sample], center: i64) {
        let half = (self.size / 2) as i64;
        let start = center - half;
        for (i, (slot, &win)) in self.input.iter_mut().zip(&self.window).enumerate() {
            let idx = start + i as i64;
            let s = if idx >= 0 {
                samples.get(idx as usize).copied().unwrap_or(0.0)
            } else {
                0.0
            };
            *slot = s * win;
        }

        if self.fft.process(&mut self.input, &mut self.spectrum).is_err() {
            self.amps.fill(0.0);
            return;
        }

        let norm = 1.0 / (self.size as f64 * 0.5);
        for (amp, c) in self.amps.iter_mut().zip(self.spectrum.iter()) {
            let mag = (c.re * c.re + c.im * c.im).sqrt() * norm;
            *amp = to_display_amp(mag, DEFAULT_MIN_DB, DEFAULT_MAX_DB);
        }
    }

    /// Display amplitudes for the first `size/2` bins.
    #[inline]
    pub fn amps(&self) -> &[f64] {
        &self.amps
    }

    pub fn reset(&mut self) {
        self.input.fill(0.0);
        self.amps.fill(0.0);
    }
}
