//! Error types for kernel-spline transforms.
//!
//! Structural violations (mismatched landmark counts, malformed parameter
//! buffers, bad configuration) are reported through [`TransformError`].
//! Numerical degeneracy of the landmark system is not an error: it is
//! absorbed by the pseudo-inverse solve.

use thiserror::Error;

/// Main error type for transform operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// Source and target landmark counts differ.
    #[error("Landmark size mismatch: {source_count} source landmarks, {target_count} target landmarks")]
    SizeMismatch {
        source_count: usize,
        target_count: usize,
    },

    /// A flat parameter buffer does not describe the expected landmarks.
    #[error("Invalid parameter length: expected {expected} values ({dimension} per landmark), got {actual}")]
    InvalidParameterLength {
        expected: usize,
        actual: usize,
        dimension: usize,
    },

    /// A landmark coordinate is NaN or infinite.
    #[error("Non-finite landmark: {role} landmark {index} has a NaN or infinite coordinate")]
    NonFiniteLandmark { role: &'static str, index: usize },

    /// A cache stage was requested before its prerequisite stage.
    #[error("Stale cache: {0}")]
    StaleCache(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The singular value decomposition did not produce its factors.
    #[error("Decomposition error: {0}")]
    Decomposition(String),
}

/// Result type for transform operations.
pub type Result<T> = std::result::Result<T, TransformError>;

impl TransformError {
    /// Create a size mismatch error.
    pub fn size_mismatch(source_count: usize, target_count: usize) -> Self {
        Self::SizeMismatch {
            source_count,
            target_count,
        }
    }

    /// Create a non-finite landmark error.
    pub fn non_finite_landmark(role: &'static str, index: usize) -> Self {
        Self::NonFiniteLandmark { role, index }
    }

    /// Create a stale cache error.
    pub fn stale_cache(msg: impl Into<String>) -> Self {
        Self::StaleCache(msg.into())
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Create a decomposition error.
    pub fn decomposition(msg: impl Into<String>) -> Self {
        Self::Decomposition(msg.into())
    }
}
