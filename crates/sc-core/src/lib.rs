//! sc-core: Shared types, traits, and utilities for SpectraScope
//!
//! This crate provides the foundational types used across all SpectraScope
//! crates: the sample alias, decibel conversions, the analysis configuration
//! with its clamping/normalization rules, and the error type.

mod clip;
mod config;
mod error;
mod expander;

pub use clip::*;
pub use config::*;
pub use error::*;
pub use expander::*;

/// Type alias for audio samples (always f64 for maximum precision)
pub type Sample = f64;

/// Decibel value wrapper
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Decibels(pub f64);

impl Decibels {
    pub const ZERO: Self = Self(0.0);
    pub const NEG_INF: Self = Self(f64::NEG_INFINITY);

    #[inline]
    pub fn from_gain(gain: f64) -> Self {
        if gain <= 0.0 {
            Self::NEG_INF
        } else {
            Self(20.0 * gain.log10())
        }
    }

    #[inline]
    pub fn to_gain(self) -> f64 {
        if self.0 <= -144.0 {
            0.0
        } else {
            10.0_f64.powf(self.0 / 20.0)
        }
    }
}

impl Default for Decibels {
    fn default() -> Self {
        Self::ZERO
    }
}
