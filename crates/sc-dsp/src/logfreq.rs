//! Log-frequency analyzer (constant-Q / wavelet)
//!
//! Produces log-spaced magnitude bins directly: each bin correlates the
//! signal with a frequency-tuned, variable-length windowed sinusoid
//! (Goertzel-style, one rotating phasor per bin) instead of going through a
//! linear FFT. The bin table is rebuilt only when sample rate, frequency
//! range, detail level, or variant changes.

use sc_core::{DetailLevel, ResolvedRange, Sample};

use crate::fft;
use crate::window::{WindowCache, WindowKind};
use crate::Analyzer;

/// Lowest admissible center frequency in Hz.
const F_MIN_FLOOR: f64 = 10.0;
/// Minimum per-bin window length in samples.
const MIN_WINDOW_LEN: usize = 64;
/// Q scale applied to the wavelet variant's window lengths.
const WAVELET_Q_SCALE: f64 = 0.6;

/// Which log-frequency transform shapes the per-bin windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LogVariant {
    /// Constant-Q: Hann window, full Q
    Cqt,
    /// Wavelet-like: Gaussian window, shortened Q for better time response
    Wavelet,
}

impl LogVariant {
    fn window_kind(self) -> WindowKind {
        match self {
            LogVariant::Cqt => WindowKind::Hann,
            LogVariant::Wavelet => WindowKind::Gaussian,
        }
    }

    fn q(self, bins_per_octave: usize) -> f64 {
        let q = 1.0 / (2.0_f64.powf(1.0 / bins_per_octave as f64) - 1.0);
        match self {
            LogVariant::Cqt => q,
            LogVariant::Wavelet => q * WAVELET_Q_SCALE,
        }
    }
}

/// Cache key for the lazily built bin table.
#[derive(Debug, Clone, PartialEq)]
struct TableKey {
    variant: LogVariant,
    sample_rate: f64,
    f_min: f64,
    f_max: f64,
    detail: DetailLevel,
}

/// One log-spaced analysis bin.
struct LogBin {
    center_hz: f64,
    window: Vec<f64>,
    /// Unit-circle rotation per sample: (cos ω, sin ω) with ω = 2π·f/sr
    cos_step: f64,
    sin_step: f64,
    /// Start offset inside the analysis buffer (centers the window)
    offset: usize,
    /// 2 / Σwindow, converts the correlation sum to sine amplitude
    norm: f64,
}

/// Ordered bin table; center frequencies strictly increasing.
struct LogBinTable {
    key: TableKey,
    bins: Vec<LogBin>,
    buffer_len: usize,
}

impl LogBinTable {
    fn build(key: TableKey) -> Self {
        let bpo = key.detail.bins_per_octave();
        let buffer_len = key.detail.max_buffer();
        let ratio = 2.0_f64.powf(1.0 / bpo as f64);
        let q = key.variant.q(bpo);
        let kind = key.variant.window_kind();

        let f_lo = key.f_min.max(F_MIN_FLOOR);
        let mut centers = Vec::new();
        let mut f = f_lo;
        while f < key.f_max {
            centers.push(f);
            f *= ratio;
        }
        // Always close the range so the last bin sits on f_max exactly.
        if centers.last().copied().unwrap_or(0.0) < key.f_max {
            centers.push(key.f_max);
        }

        // Bins at the range edges clamp to shared lengths, so the cache
        // saves regenerating identical envelopes.
        let mut windows = WindowCache::new();
        let bins = centers
            .into_iter()
            .map(|center_hz| {
                let len = ((q * key.sample_rate / center_hz).round() as usize)
                    .clamp(MIN_WINDOW_LEN, buffer_len);
                let window = windows.get(kind, len).to_vec();
                let wsum: f64 = window.iter().sum();
                let omega = 2.0 * std::f64::consts::PI * center_hz / key.sample_rate;
                LogBin {
                    center_hz,
                    window,
                    cos_step: omega.cos(),
                    sin_step: omega.sin(),
                    offset: (buffer_len - len) / 2,
                    norm: if wsum > 0.0 { 2.0 / wsum } else { 0.0 },
                }
            })
            .collect();

        Self {
            key,
            bins,
            buffer_len,
        }
    }
}

/// Log-frequency analyzer with a memoized bin table.
pub struct LogFreqAnalyzer {
    variant: LogVariant,
    table: Option<LogBinTable>,
    amps: Vec<f64>,
}

impl LogFreqAnalyzer {
    pub fn new(variant: LogVariant) -> Self {
        Self {
            variant,
            table: None,
            amps: Vec::new(),
        }
    }

    /// Rebuild the bin table if the cache key no longer matches.
    fn ensure_table(&mut self, sample_rate: f64, range: &ResolvedRange, detail: DetailLevel) {
        let key = TableKey {
            variant: self.variant,
            sample_rate,
            f_min: range.f_min,
            f_max: range.f_max,
            detail,
        };
        let stale = match &self.table {
            Some(t) => t.key != key,
            None => true,
        };
        if stale {
            log::debug!(
                "rebuilding {:?} bin table: {:.1}..{:.1} Hz @ {} Hz, {:?}",
                key.variant,
                key.f_min,
                key.f_max,
                key.sample_rate,
                key.detail
            );
            self.table = Some(LogBinTable::build(key));
        }
    }

    /// Correlate every bin against the buffer centered at `center`.
    pub fn prepare(
        &mut self,
        samples: &[Sample],
        sample_rate: f64,
        center: i64,
        range: &ResolvedRange,
        detail: DetailLevel,
    ) {
        self.ensure_table(sample_rate, range, detail);
        let table = match &self.table {
            Some(t) => t,
            None => return,
        };

        let start = center - (table.buffer_len / 2) as i64;
        self.amps.resize(table.bins.len(), 0.0);

        for (amp, bin) in self.amps.iter_mut().zip(&table.bins) {
            let mut re = 0.0;
            let mut im = 0.0;
            // Rotating phasor advanced once per sample.
            let mut cos_n = 1.0;
            let mut sin_n = 0.0;
            let bin_start = start + bin.offset as i64;
            for (n, &w) in bin.window.iter().enumerate() {
                let idx = bin_start + n as i64;
                let s = if idx >= 0 {
                    samples.get(idx as usize).copied().unwrap_or(0.0)
                } else {
                    0.0
                };
                let sw = s * w;
                re += sw * cos_n;
                im -= sw * sin_n;
                let next_cos = cos_n * bin.cos_step - sin_n * bin.sin_step;
                sin_n = cos_n * bin.sin_step + sin_n * bin.cos_step;
                cos_n = next_cos;
            }
            let mag = (re * re + im * im).sqrt() * bin.norm;
            *amp = fft::to_display_amp(mag, fft::DEFAULT_MIN_DB, fft::DEFAULT_MAX_DB);
        }
    }

    /// Bin center frequencies (strictly increasing), for inspection/tests.
    pub fn center_frequencies(&self) -> Vec<f64> {
        self.table
            .as_ref()
            .map(|t| t.bins.iter().map(|b| b.center_hz).collect())
            .unwrap_or_default()
    }
}

impl Analyzer for LogFreqAnalyzer {
    /// Nearest-pair interpolation over the log-spaced grid. A table that was
    /// never built yields silence, not an error.
    fn magnitude_at(&self, hz: f64) -> f64 {
        let table = match &self.table {
            Some(t) => t,
            None => return 0.0,
        };
        if table.bins.is_empty() || self.amps.is_empty() {
            return 0.0;
        }
        let centers = &table.bins;
        if hz <= centers[0].center_hz {
            return self.amps[0];
        }
        if hz >= centers[centers.len() - 1].center_hz {
            return self.amps[self.amps.len() - 1];
        }
        let hi = centers.partition_point(|b| b.center_hz < hz);
        let lo = hi - 1;
        let f0 = centers[lo].center_hz;
        let f1 = centers[hi].center_hz;
        let t = (hz - f0) / (f1 - f0);
        self.amps[lo] * (1.0 - t) + self.amps[hi] * t
    }

    fn reset(&mut self) {
        self.amps.clear();
        // Table survives reset: it depends only on configuration, not on
        // session state.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_core::AnalysisConfig;

    fn range(f_min: f64, f_max: f64) -> ResolvedRange {
        AnalysisConfig {
            f_min,
            f_max,
            ..Default::default()
        }
        .resolve(48000.0)
    }

    #[test]
    fn bin_centers_strictly_increasing_and_cover_range() {
        for variant in [LogVariant::Cqt, LogVariant::Wavelet] {
            let mut a = LogFreqAnalyzer::new(variant);
            let r = range(20.0, 4000.0);
            a.prepare(&[0.0; 1024], 48000.0, 512, &r, DetailLevel::Medium);
            let centers = a.center_frequencies();
            assert!(!centers.is_empty());
            assert!(centers.windows(2).all(|w| w[1] > w[0]));
            assert!(centers[0] <= 20.0_f64.max(10.0) + 1e-9);
            assert_eq!(*centers.last().unwrap(), 4000.0);
        }
    }

    #[test]
    fn f_min_floored_at_ten_hz() {
        let mut a = LogFreqAnalyzer::new(LogVariant::Cqt);
        let r = range(0.0, 1000.0);
        a.prepare(&[0.0; 1024], 48000.0, 512, &r, DetailLevel::Low);
        assert!(a.center_frequencies()[0] >= 10.0);
    }

    #[test]
    fn table_rebuilds_only_on_key_change() {
        let mut a = LogFreqAnalyzer::new(LogVariant::Cqt);
        let r = range(20.0, 2000.0);
        a.prepare(&[0.0; 512], 48000.0, 0, &r, DetailLevel::Low);
        let first = a.center_frequencies();
        a.prepare(&[0.0; 512], 48000.0, 128, &r, DetailLevel::Low);
        assert_eq!(first, a.center_frequencies());
        a.prepare(&[0.0; 512], 44100.0, 128, &r, DetailLevel::Low);
        assert_ne!(first.len(), 0);
        assert_eq!(a.table.as_ref().unwrap().key.sample_rate, 44100.0);
    }

    #[test]
    fn sine_peaks_near_its_center_bin() {
        let sr = 48000.0;
        let f0 = 440.0;
        // Quiet tone: keeps the peak below the -30 dB display ceiling, so
        // the maximum is a single bin rather than a clipped plateau.
        let samples: Vec<f64> = (0..65536)
            .map(|i| (2.0 * std::f64::consts::PI * f0 * i as f64 / sr).sin() * 0.01)
            .collect();

        let mut a = LogFreqAnalyzer::new(LogVariant::Cqt);
        let r = range(100.0, 2000.0);
        a.prepare(&samples, sr, 32768, &r, DetailLevel::High);

        let centers = a.center_frequencies();
        let (best, _) = centers
            .iter()
            .enumerate()
            .max_by(|a2, b| a.amps[a2.0].total_cmp(&a.amps[b.0]))
            .unwrap();
        let ratio = 2.0_f64.powf(1.0 / DetailLevel::High.bins_per_octave() as f64);
        assert!(
            centers[best] / f0 < ratio && f0 / centers[best] < ratio,
            "peak at {} Hz, expected near {f0} Hz",
            centers[best]
        );
    }

    #[test]
    fn window_lengths_clamped_to_buffer() {
        let mut a = LogFreqAnalyzer::new(LogVariant::Cqt);
        let r = range(10.0, 24000.0);
        a.prepare(&[0.0; 64], 48000.0, 32, &r, DetailLevel::Low);
        let table = a.table.as_ref().unwrap();
        for bin in &table.bins {
            assert!(bin.window.len() >= MIN_WINDOW_LEN);
            assert!(bin.window.len() <= table.buffer_len);
        }
    }
}
