//! Window envelope generation
//!
//! Shared by every analyzer: the fixed and multi-band FFT paths window with
//! Hann, the log-frequency analyzer windows per bin with Hann (CQT) or
//! Gaussian (wavelet).

use std::collections::HashMap;

/// Window envelope shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum WindowKind {
    Hann,
    Gaussian,
}

impl WindowKind {
    /// Generate a `size`-length envelope.
    pub fn generate(self, size: usize) -> Vec<f64> {
        if size < 2 {
            return vec![1.0; size];
        }
        match self {
            WindowKind::Hann => (0..size)
                .map(|i| {
                    0.5 * (1.0
                        - (2.0 * std::f64::consts::PI * i as f64 / (size - 1) as f64).cos())
                })
                .collect(),
            WindowKind::Gaussian => {
                let center = (size - 1) as f64 * 0.5;
                let sigma = 0.18 * size as f64;
                (0..size)
                    .map(|i| {
                        let d = i as f64 - center;
                        (-(d * d) / (2.0 * sigma * sigma)).exp()
                    })
                    .collect()
            }
        }
    }
}

/// Cache of generated envelopes keyed by (kind, size).
///
/// Envelope generation is cheap but runs inside per-frame code paths when
/// FFT sizes change; caching keeps reconfiguration out of the hot path.
#[derive(Debug, Default)]
pub struct WindowCache {
    cache: HashMap<(WindowKind, usize), Vec<f64>>,
}

impl WindowCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, kind: WindowKind, size: usize) -> &[f64] {
        self.cache
            .entry((kind, size))
            .or_insert_with(|| kind.generate(size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn hann_endpoints_and_symmetry() {
        let w = WindowKind::Hann.generate(1024);
        assert_relative_eq!(w[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(w[1023], 0.0, epsilon = 1e-12);
        for i in 0..512 {
            assert_relative_eq!(w[i], w[1023 - i], epsilon = 1e-12);
        }
        // Midpoint of the (size-1)-periodic Hann is 1.
        let mid = WindowKind::Hann.generate(1025);
        assert_relative_eq!(mid[512], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn gaussian_peaks_at_center() {
        let w = WindowKind::Gaussian.generate(257);
        assert_relative_eq!(w[128], 1.0, epsilon = 1e-12);
        assert!(w[0] < w[64] && w[64] < w[128]);
    }

    #[test]
    fn cache_returns_identical_envelopes() {
        let mut cache = WindowCache::new();
        let a = cache.get(WindowKind::Hann, 256).to_vec();
        let b = cache.get(WindowKind::Hann, 256).to_vec();
        assert_eq!(a, b);
    }
}
