//! Decoded audio clip buffer for offline analysis

use crate::Sample;

/// Mono sample buffer at a fixed sample rate, owned by the file-loading
/// collaborator. Analyzers treat reads outside the buffer as silence.
#[derive(Debug, Clone)]
pub struct SampleClip {
    samples: Vec<Sample>,
    sample_rate: f64,
}

impl SampleClip {
    pub fn new(samples: Vec<Sample>, sample_rate: f64) -> crate::ScResult<Self> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(crate::ScError::InvalidParam(format!(
                "sample rate must be positive, got {sample_rate}"
            )));
        }
        if samples.is_empty() {
            return Err(crate::ScError::InvalidParam(
                "clip must contain at least one sample".into(),
            ));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    #[inline]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Total duration in seconds.
    #[inline]
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate
    }

    /// Sample index nearest to a time point, unclamped.
    #[inline]
    pub fn index_at(&self, time_sec: f64) -> i64 {
        (time_sec * self.sample_rate).round() as i64
    }
}
