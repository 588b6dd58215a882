//! Error types for the detection pipeline

use thiserror::Error;

/// Errors surfaced by the detection pipeline.
///
/// Only an unusable configuration fails a call. Sparse or empty input is
/// not an error and degrades to empty output.
#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("invalid configuration: {parameter} {reason}")]
    InvalidConfiguration {
        parameter: &'static str,
        reason: String,
    },
}

impl DetectorError {
    pub(crate) fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            parameter,
            reason: reason.into(),
        }
    }
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, DetectorError>;
