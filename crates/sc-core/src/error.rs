//! Error types for SpectraScope
//!
//! The analysis core corrects recoverable numeric conditions in place
//! (clamping, silence fallback); these variants cover genuine caller
//! contract violations only.

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum ScError {
    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("No audio clip loaded")]
    NoClip,

    #[error("A range scan is already in flight")]
    ScanBusy,
}

/// Result type alias
pub type ScResult<T> = Result<T, ScError>;
