//! Display-state followers
//!
//! Cross-cutting mutable state that lives alongside the analyzers: the
//! per-bin noise-floor estimate (live fixed mode only), the display auto
//! gain, and the peak-stabilizer EMA. All of it is transient per session
//! and carries an explicit `reset` contract.

/// Downward follow rate (raw value below the floor)
const FLOOR_FALL_RATE: f64 = 0.05;
/// Upward drift rate (raw value above the floor)
const FLOOR_RISE_RATE: f64 = 0.001;

/// Per-FFT-bin slow follower used as a display-only noise gate.
///
/// Asymmetric: pulls down fast when the signal drops below the tracked
/// floor, drifts up slowly otherwise. Not persisted across stop/reset.
#[derive(Debug, Default)]
pub struct NoiseFloor {
    floor: Vec<f64>,
}

impl NoiseFloor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track the latest raw byte spectrum. A bin-count change reallocates
    /// and seeds the floor from the current frame.
    pub fn update(&mut self, raw: &[u8]) {
        if self.floor.len() != raw.len() {
            self.floor = raw.iter().map(|&v| v as f64).collect();
            return;
        }
        for (nf, &v) in self.floor.iter_mut().zip(raw) {
            let v = v as f64;
            let rate = if v < *nf {
                FLOOR_FALL_RATE
            } else {
                FLOOR_RISE_RATE
            };
            *nf += (v - *nf) * rate;
        }
    }

    /// Raw byte value with the tracked floor removed, clamped at zero.
    #[inline]
    pub fn subtracted(&self, bin: usize, raw: u8) -> f64 {
        let nf = self.floor.get(bin).copied().unwrap_or(0.0);
        (raw as f64 - nf).max(0.0)
    }

    #[inline]
    pub fn estimate(&self, bin: usize) -> Option<f64> {
        self.floor.get(bin).copied()
    }

    pub fn reset(&mut self) {
        self.floor.clear();
    }
}

/// Peak intensity the auto gain steers the frame toward (of 255)
const AUTO_TARGET: f64 = 190.0;
/// Per-tick smoothing rate toward the target multiplier
const AUTO_SMOOTH: f64 = 0.03;

/// Display-only auto gain: a single smoothed multiplier mapping the frame
/// peak to a fixed target level.
#[derive(Debug)]
pub struct AutoGain {
    gain: f64,
}

impl Default for AutoGain {
    fn default() -> Self {
        Self { gain: 1.0 }
    }
}

impl AutoGain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one tick given the frame's peak pixel value (0..255) and
    /// return the multiplier to apply. Disabled auto gain decays toward 1.
    pub fn update(&mut self, peak: f64, enabled: bool) -> f64 {
        let target = if enabled {
            if peak > 0.0 {
                AUTO_TARGET / peak
            } else {
                1.0
            }
        } else {
            1.0
        };
        self.gain += (target - self.gain) * AUTO_SMOOTH;
        self.gain
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.gain
    }

    pub fn reset(&mut self) {
        self.gain = 1.0;
    }
}

/// EMA follow rate for the peak-stabilizer spectrum
const PEAK_EMA_RATE: f64 = 0.02;
/// Minimum EMA amplitude for a labeled peak (of 255)
const PEAK_MIN_AMP: f64 = 18.0;
/// Minimum pixel separation between selected peaks
const PEAK_MIN_SEPARATION: usize = 12;
/// Maximum number of labeled peaks
const PEAK_MAX_COUNT: usize = 5;

/// A stable spectral peak, in render-line pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakLabel {
    pub px: usize,
    /// Smoothed amplitude 0..255
    pub value: f64,
}

/// Exponential-moving-average spectrum used to label peaks independent of
/// frame-to-frame jitter. Lifecycle independent from the noise floor.
#[derive(Debug, Default)]
pub struct PeakStabilizer {
    ema: Vec<f64>,
}

impl PeakStabilizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the latest render line into the EMA. A width change restarts
    /// the average from the current line.
    pub fn update(&mut self, line: &[u8]) {
        if self.ema.len() != line.len() {
            self.ema = line.iter().map(|&v| v as f64).collect();
            return;
        }
        for (e, &v) in self.ema.iter_mut().zip(line) {
            *e += (v as f64 - *e) * PEAK_EMA_RATE;
        }
    }

    /// Detect up to five stable peaks: local maxima above the amplitude
    /// floor, strongest first, then greedily thinned to the minimum pixel
    /// separation, finally re-sorted left to right for stable labeling.
    pub fn peaks(&self) -> Vec<PeakLabel> {
        let n = self.ema.len();
        if n < 3 {
            return Vec::new();
        }

        let mut candidates: Vec<PeakLabel> = (1..n - 1)
            .filter(|&i| {
                self.ema[i] > self.ema[i - 1]
                    && self.ema[i] >= self.ema[i + 1]
                    && self.ema[i] >= PEAK_MIN_AMP
            })
            .map(|i| PeakLabel {
                px: i,
                value: self.ema[i],
            })
            .collect();

        candidates.sort_by(|a, b| b.value.total_cmp(&a.value));

        let mut selected: Vec<PeakLabel> = Vec::with_capacity(PEAK_MAX_COUNT);
        for cand in candidates {
            if selected.len() >= PEAK_MAX_COUNT {
                break;
            }
            let far_enough = selected
                .iter()
                .all(|s| s.px.abs_diff(cand.px) >= PEAK_MIN_SEPARATION);
            if far_enough {
                selected.push(cand);
            }
        }

        selected.sort_by_key(|p| p.px);
        selected
    }

    pub fn reset(&mut self) {
        self.ema.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn noise_floor_converges_to_constant_input() {
        let mut nf = NoiseFloor::new();
        let raw = vec![40u8; 8];
        nf.update(&raw); // seeds
        for _ in 0..500 {
            nf.update(&raw);
        }
        for bin in 0..8 {
            assert_relative_eq!(nf.estimate(bin).unwrap(), 40.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn noise_floor_falls_faster_than_it_rises() {
        let mut nf = NoiseFloor::new();
        nf.update(&[100u8; 1]);
        nf.update(&[0u8; 1]);
        let after_fall = nf.estimate(0).unwrap();
        assert_relative_eq!(after_fall, 95.0, epsilon = 1e-9);

        let mut nf = NoiseFloor::new();
        nf.update(&[0u8; 1]);
        nf.update(&[100u8; 1]);
        let after_rise = nf.estimate(0).unwrap();
        assert_relative_eq!(after_rise, 0.1, epsilon = 1e-9);
    }

    #[test]
    fn subtraction_clamps_at_zero() {
        let mut nf = NoiseFloor::new();
        nf.update(&[50u8; 2]);
        assert_eq!(nf.subtracted(0, 30), 0.0);
        assert_eq!(nf.subtracted(1, 80), 30.0);
    }

    #[test]
    fn auto_gain_steers_peak_toward_target() {
        let mut ag = AutoGain::new();
        for _ in 0..2000 {
            ag.update(95.0, true);
        }
        assert_relative_eq!(ag.value(), 2.0, epsilon = 1e-6);
    }

    #[test]
    fn auto_gain_decays_to_unity_when_disabled() {
        let mut ag = AutoGain::new();
        for _ in 0..100 {
            ag.update(10.0, true);
        }
        assert!(ag.value() > 1.0);
        for _ in 0..1000 {
            ag.update(10.0, false);
        }
        assert_relative_eq!(ag.value(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn auto_gain_handles_silent_frame() {
        let mut ag = AutoGain::new();
        for _ in 0..100 {
            ag.update(0.0, true);
        }
        assert_relative_eq!(ag.value(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn peak_selection_enforces_separation_and_order() {
        let mut ps = PeakStabilizer::new();
        let mut line = vec![0u8; 100];
        // Strong peak at 50, close weaker shoulder at 55, distant peaks at
        // 20 and 80, sub-threshold bump at 90.
        line[20] = 120;
        line[50] = 200;
        line[55] = 180;
        line[80] = 90;
        line[90] = 10;
        ps.update(&line);

        let peaks = ps.peaks();
        let px: Vec<usize> = peaks.iter().map(|p| p.px).collect();
        assert_eq!(px, vec![20, 50, 80]);
        // Ordered left-to-right even though 50 is the strongest.
        assert!(peaks.windows(2).all(|w| w[0].px < w[1].px));
    }

    #[test]
    fn peaks_require_minimum_amplitude() {
        let mut ps = PeakStabilizer::new();
        let mut line = vec![0u8; 32];
        line[10] = 17; // below the floor of 18
        ps.update(&line);
        assert!(ps.peaks().is_empty());
    }
}
