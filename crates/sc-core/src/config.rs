//! Analysis configuration and display-range normalization

/// Which analysis strategy produces the magnitude spectrum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
pub enum AnalysisMode {
    /// Single-resolution FFT at the configured size
    #[default]
    Fixed,
    /// Several FFT sizes cross-faded over frequency sub-ranges
    Multi,
    /// Constant-Q log-frequency transform (Hann-windowed correlation)
    Cqt,
    /// Wavelet-like log-frequency transform (Gaussian window, shorter Q)
    Wavelet,
}

/// Resolution/cost trade-off for the log-frequency modes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
pub enum DetailLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl DetailLevel {
    /// Log-frequency bin density.
    #[inline]
    pub fn bins_per_octave(self) -> usize {
        match self {
            DetailLevel::Low => 8,
            DetailLevel::Medium => 20,
            DetailLevel::High => 36,
        }
    }

    /// Maximum analysis buffer length in samples.
    #[inline]
    pub fn max_buffer(self) -> usize {
        match self {
            DetailLevel::Low => 4096,
            DetailLevel::Medium => 8192,
            DetailLevel::High => 16384,
        }
    }
}

/// Full analysis configuration, read fresh each render tick.
///
/// Values are never rejected: `resolve` and the `*_clamped` accessors
/// correct out-of-range or non-finite values in place.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AnalysisConfig {
    pub mode: AnalysisMode,
    pub fft_size: usize,
    pub detail: DetailLevel,
    /// Inter-frame display smoothing, 0..0.95 (live mode only)
    pub smoothing: f64,
    pub f_min: f64,
    pub f_max: f64,
    pub log_axis: bool,
    pub highpass_hz: f64,
    pub lowpass_hz: f64,
    pub gain: f64,
    pub auto_gain: bool,
    pub waterfall_seconds: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            mode: AnalysisMode::Fixed,
            fft_size: 4096,
            detail: DetailLevel::Medium,
            smoothing: 0.8,
            f_min: 0.0,
            f_max: 4000.0,
            log_axis: false,
            highpass_hz: 0.0,
            lowpass_hz: f64::INFINITY,
            gain: 1.0,
            auto_gain: true,
            waterfall_seconds: 60.0,
        }
    }
}

impl AnalysisConfig {
    /// Normalize and validate the display frequency range against the
    /// current sample rate.
    pub fn resolve(&self, sample_rate: f64) -> ResolvedRange {
        let nyquist = if sample_rate.is_finite() && sample_rate > 0.0 {
            sample_rate * 0.5
        } else {
            24000.0
        };

        let mut f_min = if self.f_min.is_finite() { self.f_min } else { 0.0 };
        let mut f_max = if self.f_max.is_finite() {
            self.f_max
        } else {
            4000.0
        };

        f_min = f_min.clamp(0.0, nyquist);
        f_max = f_max.clamp(1.0, nyquist);
        if f_max <= f_min {
            f_max = (f_min + 1.0).min(nyquist);
        }

        // Log mode must avoid a non-positive logarithm argument.
        let f_min_for_log = f_min.max(1.0);

        ResolvedRange {
            nyquist,
            f_min,
            f_max,
            f_min_for_log,
            log_axis: self.log_axis,
        }
    }

    #[inline]
    pub fn smoothing_clamped(&self) -> f64 {
        if self.smoothing.is_finite() {
            self.smoothing.clamp(0.0, 0.95)
        } else {
            0.0
        }
    }

    #[inline]
    pub fn gain_clamped(&self) -> f64 {
        if self.gain.is_finite() && self.gain > 0.0 {
            self.gain
        } else {
            1.0
        }
    }

    /// Configured waterfall span, floored at 5 seconds.
    #[inline]
    pub fn waterfall_seconds_clamped(&self) -> f64 {
        if self.waterfall_seconds.is_finite() && self.waterfall_seconds > 0.0 {
            self.waterfall_seconds.max(5.0)
        } else {
            60.0
        }
    }

    /// Band-pass mask bounds in Hz, resolved against the nyquist.
    pub fn band_pass(&self, nyquist: f64) -> (f64, f64) {
        let hp = if self.highpass_hz.is_finite() {
            self.highpass_hz.clamp(0.0, nyquist)
        } else {
            0.0
        };
        let lp = if self.lowpass_hz.is_finite() {
            self.lowpass_hz.clamp(10.0, nyquist)
        } else {
            nyquist
        };
        (hp, lp)
    }
}

/// Validated frequency range produced by [`AnalysisConfig::resolve`].
///
/// Invariant: `f_min < f_max`, both within `[0, nyquist]`,
/// `f_min_for_log >= 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedRange {
    pub nyquist: f64,
    pub f_min: f64,
    pub f_max: f64,
    pub f_min_for_log: f64,
    pub log_axis: bool,
}

impl ResolvedRange {
    #[inline]
    pub fn span(&self) -> f64 {
        self.f_max - self.f_min
    }
}
