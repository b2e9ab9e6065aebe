//! Frequency markers and harmonic overlays
//!
//! Two independent marker channels, each pinning a frequency with an
//! optional harmonic series. The engine hands back pixel positions; the
//! host draws the lines.

use serde::{Deserialize, Serialize};

use crate::axis::FreqAxis;

/// Harmonics drawn above a fundamental, fundamental included.
pub const MAX_HARMONICS: usize = 8;

/// The two marker channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerChannel {
    Primary,
    Secondary,
}

impl MarkerChannel {
    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            MarkerChannel::Primary => 0,
            MarkerChannel::Secondary => 1,
        }
    }
}

/// Per-channel display options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerOptions {
    pub color: [u8; 3],
    pub harmonics: bool,
}

impl Default for MarkerOptions {
    fn default() -> Self {
        Self {
            color: [255, 255, 0],
            harmonics: false,
        }
    }
}

/// One marker channel: a pinned frequency plus its options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Marker {
    hz: Option<f64>,
    options: MarkerOptions,
}

/// A marker line ready to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerPixel {
    pub px: f64,
    pub hz: f64,
    /// 1.0 for the fundamental, 0.5 for harmonics.
    pub strength: f64,
    pub color: [u8; 3],
}

impl Marker {
    /// Pin the marker, or clear it with `None`. Non-finite and
    /// non-positive frequencies clear it too.
    pub fn set_frequency(&mut self, hz: Option<f64>) {
        self.hz = hz.filter(|f| f.is_finite() && *f > 0.0);
    }

    #[inline]
    pub fn frequency(&self) -> Option<f64> {
        self.hz
    }

    pub fn set_options(&mut self, options: MarkerOptions) {
        self.options = options;
    }

    #[inline]
    pub fn options(&self) -> &MarkerOptions {
        &self.options
    }

    /// Frequencies to draw for this marker: the fundamental and, when
    /// harmonics are on, up to [`MAX_HARMONICS`] integer multiples that
    /// stay at or below `f_max`.
    pub fn frequencies(&self, f_max: f64) -> Vec<f64> {
        let base = match self.hz {
            Some(f) => f,
            None => return Vec::new(),
        };
        if !self.options.harmonics {
            return vec![base];
        }
        (1..=MAX_HARMONICS)
            .map(|k| base * k as f64)
            .take_while(|&f| f <= f_max)
            .collect()
    }

    /// Pixel positions of every visible marker line on the given axis.
    pub fn pixels(&self, axis: &FreqAxis) -> Vec<MarkerPixel> {
        let f_max = axis.range().f_max;
        self.frequencies(f_max)
            .into_iter()
            .enumerate()
            .filter(|(_, f)| *f >= axis.range().f_min)
            .map(|(i, hz)| MarkerPixel {
                px: axis.freq_to_pixel(hz),
                hz,
                strength: if i == 0 { 1.0 } else { 0.5 },
                color: self.options.color,
            })
            .collect()
    }
}
