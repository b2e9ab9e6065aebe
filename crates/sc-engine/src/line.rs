//! Render-line builder
//!
//! Maps analyzer magnitudes onto screen-width pixel columns: axis lookup,
//! band-pass mask, configured gain, optional inter-frame smoothing (live
//! only) and auto-gain normalization. Output is one intensity byte per
//! pixel.

use sc_core::AnalysisConfig;
use sc_dsp::display::AutoGain;
use sc_dsp::Analyzer;

use crate::axis::FreqAxis;

/// Per-pixel line builder with the live smoothing state.
#[derive(Debug, Default)]
pub struct LineBuilder {
    /// Inter-frame smoothed values, live mode only
    smoothed: Vec<f64>,
}

impl LineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw per-pixel values before any temporal processing.
    fn raw_line(
        &self,
        analyzer: &dyn Analyzer,
        axis: &FreqAxis,
        config: &AnalysisConfig,
        out: &mut Vec<f64>,
    ) {
        let width = axis.plot_width();
        let (hp, lp) = config.band_pass(axis.range().nyquist);
        let gain = config.gain_clamped();

        out.clear();
        out.reserve(width);
        for px in 0..width {
            let f = axis.norm_to_freq(px as f64 / width as f64);
            let v = if f < hp || f > lp {
                0.0
            } else {
                (analyzer.magnitude_at(f) * 255.0 * gain).min(255.0)
            };
            out.push(v);
        }
    }

    /// Build a live-frame line: smooth across frames, then auto-gain.
    pub fn build_live(
        &mut self,
        analyzer: &dyn Analyzer,
        axis: &FreqAxis,
        config: &AnalysisConfig,
        auto_gain: &mut AutoGain,
    ) -> Vec<u8> {
        let mut values = Vec::new();
        self.raw_line(analyzer, axis, config, &mut values);

        // A width change invalidates the history.
        if self.smoothed.len() != values.len() {
            self.smoothed = values.clone();
        } else {
            let alpha = config.smoothing_clamped();
            for (s, &v) in self.smoothed.iter_mut().zip(&values) {
                *s = *s * alpha + v * (1.0 - alpha);
            }
        }

        let smoothed = self.smoothed.clone();
        Self::finish(smoothed, config.auto_gain, auto_gain)
    }

    /// Build a line for one offline time point. No inter-frame smoothing:
    /// consecutive scrub positions are unrelated spectra.
    pub fn build_at_time(
        &mut self,
        analyzer: &dyn Analyzer,
        axis: &FreqAxis,
        config: &AnalysisConfig,
        auto_gain: &mut AutoGain,
    ) -> Vec<u8> {
        let mut values = Vec::new();
        self.raw_line(analyzer, axis, config, &mut values);
        Self::finish(values, config.auto_gain, auto_gain)
    }

    /// Peak measurement, auto-gain update, final clamp to bytes.
    fn finish(values: Vec<f64>, enabled: bool, auto_gain: &mut AutoGain) -> Vec<u8> {
        let peak = values.iter().copied().fold(1.0_f64, f64::max);
        let gain = auto_gain.update(peak, enabled);
        values
            .into_iter()
            .map(|v| (v * gain).clamp(0.0, 255.0) as u8)
            .collect()
    }

    /// Drop the inter-frame history (session reset).
    pub fn reset(&mut self) {
        self.smoothed.clear();
    }
}
