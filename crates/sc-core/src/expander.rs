//! Downward-expander parameter contract
//!
//! The expander itself is an external collaborator that conditions the
//! signal before analysis; this engine only carries its parameter set.

/// Runtime-controllable expander parameters with their legal ranges.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExpanderParams {
    pub enabled: bool,
    threshold_db: f64,
    ratio: f64,
    attack_ms: f64,
    release_ms: f64,
}

impl Default for ExpanderParams {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_db: -45.0,
            ratio: 3.0,
            attack_ms: 10.0,
            release_ms: 200.0,
        }
    }
}

impl ExpanderParams {
    /// Set threshold in dB, clamped to [-120, 0].
    pub fn set_threshold_db(&mut self, db: f64) {
        self.threshold_db = db.clamp(-120.0, 0.0);
    }

    /// Set expansion ratio, clamped to [1, 20].
    pub fn set_ratio(&mut self, ratio: f64) {
        self.ratio = ratio.clamp(1.0, 20.0);
    }

    /// Set attack time in ms, clamped to [0.1, 2000].
    pub fn set_attack_ms(&mut self, ms: f64) {
        self.attack_ms = ms.clamp(0.1, 2000.0);
    }

    /// Set release time in ms, clamped to [1, 5000].
    pub fn set_release_ms(&mut self, ms: f64) {
        self.release_ms = ms.clamp(1.0, 5000.0);
    }

    #[inline]
    pub fn threshold_db(&self) -> f64 {
        self.threshold_db
    }

    #[inline]
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    #[inline]
    pub fn attack_ms(&self) -> f64 {
        self.attack_ms
    }

    #[inline]
    pub fn release_ms(&self) -> f64 {
        self.release_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_clamp_to_contract_ranges() {
        let mut p = ExpanderParams::default();
        p.set_threshold_db(-500.0);
        assert_eq!(p.threshold_db(), -120.0);
        p.set_ratio(100.0);
        assert_eq!(p.ratio(), 20.0);
        p.set_attack_ms(0.0);
        assert_eq!(p.attack_ms(), 0.1);
        p.set_release_ms(1e6);
        assert_eq!(p.release_ms(), 5000.0);
    }
}
