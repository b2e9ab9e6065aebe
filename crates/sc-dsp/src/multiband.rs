//! Multi-band analyzer
//!
//! Runs several FFT sizes in parallel, each covering a frequency sub-range:
//! the largest FFT resolves the bass, the smallest keeps time resolution in
//! the highs. Band edges are cross-faded so the seam between resolutions is
//! not visible as a step.

use sc_core::Sample;

use crate::fft::{self, FftScratch};
use crate::Analyzer;

/// Cross-fade width around each band boundary in Hz.
pub const EDGE_OVERLAP_HZ: f64 = 120.0;

/// One entry of the band plan: this FFT size serves frequencies up to
/// `max_hz` (exclusive upper bound of the previous band onward).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BandPlan {
    pub max_hz: f64,
    pub fft_size: usize,
}

/// Default plan: 16384 samples up to 600 Hz, 8192 up to 2 kHz, 2048 above.
pub fn default_band_plan() -> Vec<BandPlan> {
    vec![
        BandPlan {
            max_hz: 600.0,
            fft_size: 16384,
        },
        BandPlan {
            max_hz: 2000.0,
            fft_size: 8192,
        },
        BandPlan {
            max_hz: f64::INFINITY,
            fft_size: 2048,
        },
    ]
}

struct Band {
    max_hz: f64,
    scratch: FftScratch,
    bin_hz: f64,
}

/// Analyzer blending magnitudes from every configured FFT size.
pub struct MultiBandAnalyzer {
    bands: Vec<Band>,
}

impl MultiBandAnalyzer {
    pub fn new(plan: &[BandPlan]) -> Self {
        let plan: Vec<BandPlan> = if plan.is_empty() {
            default_band_plan()
        } else {
            plan.to_vec()
        };
        let bands = plan
            .iter()
            .map(|p| Band {
                max_hz: p.max_hz,
                scratch: FftScratch::new(p.fft_size),
                bin_hz: 0.0,
            })
            .collect();
        Self { bands }
    }

    /// Compute magnitudes for every band once per time point. Each band
    /// windows its own `fft_size` samples around `center`.
    pub fn prepare(&mut self, samples: &[Sample], sample_rate: f64, center: i64) {
        for band in &mut self.bands {
            band.scratch.analyze_centered(samples, center);
            band.bin_hz = band.scratch.bin_hz(sample_rate);
        }
    }

    /// Index of the band whose `max_hz` bound covers `hz`.
    fn band_index(&self, hz: f64) -> usize {
        self.bands
            .iter()
            .position(|b| hz <= b.max_hz)
            .unwrap_or(self.bands.len() - 1)
    }

    #[inline]
    fn sample_band(&self, index: usize, hz: f64) -> f64 {
        let band = &self.bands[index];
        fft::sample_linear(band.scratch.amps(), band.bin_hz, hz)
    }
}

impl Analyzer for MultiBandAnalyzer {
    fn magnitude_at(&self, hz: f64) -> f64 {
        if self.bands.is_empty() {
            return 0.0;
        }
        let idx = self.band_index(hz);
        let own = self.sample_band(idx, hz);

        // Within EDGE_OVERLAP_HZ of a boundary, blend linearly toward the
        // neighboring band; at the boundary itself both contribute equally,
        // which keeps the seam continuous from either side.
        let lower_bound = if idx > 0 {
            self.bands[idx - 1].max_hz
        } else {
            f64::NEG_INFINITY
        };
        let upper_bound = self.bands[idx].max_hz;

        let dist_lower = hz - lower_bound;
        if idx > 0 && dist_lower < EDGE_OVERLAP_HZ {
            let t = (dist_lower / EDGE_OVERLAP_HZ).clamp(0.0, 1.0);
            let w = 0.5 + 0.5 * t;
            return own * w + self.sample_band(idx - 1, hz) * (1.0 - w);
        }

        let dist_upper = upper_bound - hz;
        if idx + 1 < self.bands.len() && dist_upper < EDGE_OVERLAP_HZ {
            let t = (dist_upper / EDGE_OVERLAP_HZ).clamp(0.0, 1.0);
            let w = 0.5 + 0.5 * t;
            return own * w + self.sample_band(idx + 1, hz) * (1.0 - w);
        }

        own
    }

    fn reset(&mut self) {
        for band in &mut self.bands {
            band.scratch.reset();
            band.bin_hz = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(sr: f64, f0: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * f0 * i as f64 / sr).sin())
            .collect()
    }

    #[test]
    fn band_selection_honors_plan_order() {
        let a = MultiBandAnalyzer::new(&default_band_plan());
        assert_eq!(a.band_index(100.0), 0);
        assert_eq!(a.band_index(600.0), 0);
        assert_eq!(a.band_index(601.0), 1);
        assert_eq!(a.band_index(10_000.0), 2);
    }

    #[test]
    fn boundary_is_continuous() {
        let sr = 48000.0;
        // Broadband-ish content so both bands carry energy near the seam.
        let samples: Vec<f64> = sine(sr, 590.0, 65536)
            .iter()
            .zip(sine(sr, 610.0, 65536))
            .map(|(a, b)| 0.5 * a + 0.5 * b)
            .collect();

        let mut a = MultiBandAnalyzer::new(&default_band_plan());
        a.prepare(&samples, sr, 32768);

        // Values 1 Hz either side of the 600 Hz seam must not jump.
        let below = a.magnitude_at(599.0);
        let at = a.magnitude_at(600.0);
        let above = a.magnitude_at(601.0);
        let step = (below - above).abs();
        let local = (below - a.magnitude_at(598.0)).abs().max(1e-6) * 10.0 + 0.05;
        assert!(step < local, "seam step {step} exceeds local variation {local}");
        assert!(at >= below.min(above) - 0.05 && at <= below.max(above) + 0.05);
    }

    #[test]
    fn empty_plan_falls_back_to_default() {
        let a = MultiBandAnalyzer::new(&[]);
        assert_eq!(a.bands.len(), 3);
    }
}
