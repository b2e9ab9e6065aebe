//! Single-resolution FFT analyzer
//!
//! Live mode consumes a hardware-computed byte spectrum and only performs a
//! bin lookup; offline mode windows and transforms a sample buffer itself.

use sc_core::Sample;

use crate::display::NoiseFloor;
use crate::fft::{self, FftScratch};
use crate::Analyzer;

/// Magnitude-spectrum snapshot already quantized to bytes by the live
/// source, with the dB bounds the quantization used.
#[derive(Debug, Clone)]
pub struct ByteSpectrum {
    pub data: Vec<u8>,
    pub min_db: f64,
    pub max_db: f64,
    pub sample_rate: f64,
}

impl ByteSpectrum {
    pub fn new(data: Vec<u8>, sample_rate: f64) -> Self {
        Self {
            data,
            min_db: fft::DEFAULT_MIN_DB,
            max_db: fft::DEFAULT_MAX_DB,
            sample_rate,
        }
    }

    #[inline]
    pub fn nyquist(&self) -> f64 {
        self.sample_rate * 0.5
    }
}

/// Live fixed-FFT analyzer: per-bin display amplitudes derived from the
/// latest byte spectrum, after optional noise-floor subtraction.
#[derive(Debug, Default)]
pub struct LiveFixedAnalyzer {
    amps: Vec<f64>,
    nyquist: f64,
}

impl LiveFixedAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh from a byte-spectrum snapshot. Subtraction happens in byte
    /// space so the auto-gain peak later sees the gated values.
    pub fn prepare(&mut self, snapshot: &ByteSpectrum, floor: Option<&NoiseFloor>) {
        self.nyquist = snapshot.nyquist();
        self.amps.resize(snapshot.data.len(), 0.0);
        for (i, (&raw, amp)) in snapshot.data.iter().zip(self.amps.iter_mut()).enumerate() {
            let v = match floor {
                Some(nf) => nf.subtracted(i, raw),
                None => raw as f64,
            };
            *amp = fft::byte_to_amp(v, snapshot.min_db, snapshot.max_db);
        }
    }
}

impl Analyzer for LiveFixedAnalyzer {
    /// Direct bin lookup: `clamp(floor(f/nyquist · bins), 0, bins-1)`.
    fn magnitude_at(&self, hz: f64) -> f64 {
        if self.amps.is_empty() || !(self.nyquist > 0.0) {
            return 0.0;
        }
        let bins = self.amps.len();
        let bin = ((hz / self.nyquist) * bins as f64).floor() as i64;
        let bin = bin.clamp(0, bins as i64 - 1) as usize;
        self.amps[bin]
    }

    fn reset(&mut self) {
        self.amps.clear();
        self.nyquist = 0.0;
    }
}

/// Offline fixed-FFT analyzer: windows `fft_size` samples centered at the
/// requested time point and transforms them itself.
pub struct OfflineFixedAnalyzer {
    scratch: FftScratch,
    bin_hz: f64,
}

impl OfflineFixedAnalyzer {
    pub fn new(fft_size: usize) -> Self {
        Self {
            scratch: FftScratch::new(fft_size),
            bin_hz: 0.0,
        }
    }

    /// Reallocate scratch if the configured size changed.
    pub fn set_fft_size(&mut self, fft_size: usize) {
        let fft_size = fft::validate_fft_size(fft_size);
        if fft_size != self.scratch.size() {
            self.scratch = FftScratch::new(fft_size);
            self.bin_hz = 0.0;
        }
    }

    /// Compute the magnitude spectrum around `center` (a sample index; reads
    /// beyond the buffer are silence).
    pub fn prepare(&mut self, samples: &[Sample], sample_rate: f64, center: i64) {
        self.scratch.analyze_centered(samples, center);
        self.bin_hz = self.scratch.bin_hz(sample_rate);
    }
}

impl Analyzer for OfflineFixedAnalyzer {
    fn magnitude_at(&self, hz: f64) -> f64 {
        fft::sample_linear(self.scratch.amps(), self.bin_hz, hz)
    }

    fn reset(&mut self) {
        self.scratch.reset();
        self.bin_hz = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn live_lookup_uses_floor_bin() {
        let mut a = LiveFixedAnalyzer::new();
        let mut data = vec![0u8; 512];
        data[100] = 255;
        a.prepare(&ByteSpectrum::new(data, 48000.0), None);

        // Bin 100 covers [100, 101) · nyq/512.
        let nyq = 24000.0;
        let f_lo = 100.0 / 512.0 * nyq;
        assert_relative_eq!(a.magnitude_at(f_lo), 1.0);
        assert_relative_eq!(a.magnitude_at(f_lo + 0.9 * nyq / 512.0), 1.0);
        assert!(a.magnitude_at(f_lo + 1.1 * nyq / 512.0) < 1.0);
        // Out-of-range frequencies clamp to the edge bins.
        assert!(a.magnitude_at(-100.0) < 1.0);
        assert!(a.magnitude_at(1e6) < 1.0);
    }

    #[test]
    fn offline_sine_peak_maps_back_within_one_bin() {
        let sr = 48000.0;
        let f0 = 440.0;
        // Below the -30 dB display ceiling so the peak bin is unique.
        let samples: Vec<f64> = (0..sr as usize)
            .map(|i| (2.0 * std::f64::consts::PI * f0 * i as f64 / sr).sin() * 0.01)
            .collect();
        let mut a = OfflineFixedAnalyzer::new(8192);
        a.prepare(&samples, sr, 24000);

        let bin_hz = sr / 8192.0;
        let mut best_hz = 0.0;
        let mut best = 0.0;
        let mut hz = 0.0;
        while hz < 2000.0 {
            let v = a.magnitude_at(hz);
            if v > best {
                best = v;
                best_hz = hz;
            }
            hz += bin_hz * 0.25;
        }
        assert!((best_hz - f0).abs() <= bin_hz);
    }

    #[test]
    fn prepare_outside_clip_degrades_to_silence() {
        let mut a = OfflineFixedAnalyzer::new(1024);
        a.prepare(&[0.25; 100], 48000.0, 10_000_000);
        let floor = a.magnitude_at(0.0);
        assert!(a.magnitude_at(1000.0) <= floor + 1e-12);
    }
}
