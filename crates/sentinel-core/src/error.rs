//! Error types for the detection core

use thiserror::Error;

/// Errors raised by the sliding window and the isolation-forest detector
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectorError {
    /// Fewer history points than the configured minimum were supplied
    #[error("insufficient history: {actual} samples, at least {required} required")]
    InsufficientHistory { required: usize, actual: usize },

    /// A configuration value is out of its valid range
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A sample is NaN or infinite
    #[error("invalid sample value: {value}")]
    InvalidSample { value: f64 },
}

impl DetectorError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        DetectorError::InvalidConfiguration(message.into())
    }
}
