//! Frequency axis mapping
//!
//! One shared mapping between normalized plot position (0..1), pixel
//! columns and frequency, so the line builder, waterfall rows and overlay
//! consumers (cursor readouts, markers) all agree exactly.

use sc_core::ResolvedRange;

/// Axis transform for the current resolved range and plot width.
#[derive(Debug, Clone, Copy)]
pub struct FreqAxis {
    range: ResolvedRange,
    plot_width: usize,
}

impl FreqAxis {
    pub fn new(range: ResolvedRange, plot_width: usize) -> Self {
        Self {
            range,
            plot_width: plot_width.max(1),
        }
    }

    #[inline]
    pub fn plot_width(&self) -> usize {
        self.plot_width
    }

    #[inline]
    pub fn range(&self) -> &ResolvedRange {
        &self.range
    }

    /// Normalized position (0..1) to frequency.
    pub fn norm_to_freq(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        let r = &self.range;
        if !r.log_axis {
            return r.f_min + t * r.span();
        }
        let ratio = r.f_max / r.f_min_for_log;
        r.f_min_for_log * ratio.powf(t)
    }

    /// Frequency to normalized position (0..1); input clamped to the range.
    pub fn freq_to_norm(&self, f: f64) -> f64 {
        let r = &self.range;
        let f = f.clamp(r.f_min, r.f_max);
        if !r.log_axis {
            return (f - r.f_min) / r.span();
        }
        let f = f.max(r.f_min_for_log);
        (f / r.f_min_for_log).ln() / (r.f_max / r.f_min_for_log).ln()
    }

    /// Fractional pixel column for a frequency.
    #[inline]
    pub fn freq_to_pixel(&self, f: f64) -> f64 {
        self.freq_to_norm(f) * self.plot_width as f64
    }

    /// Frequency at a fractional pixel column.
    #[inline]
    pub fn pixel_to_freq(&self, px: f64) -> f64 {
        self.norm_to_freq(px / self.plot_width as f64)
    }
}
