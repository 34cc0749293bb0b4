//! Error types for the scan pipeline.

use morpho_transform::TransformError;
use thiserror::Error;

/// Result type for scan pipeline operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors that abort a whole measurement.
///
/// Per-field problems never show up here; they become `NaN` fields and
/// [`Degradation`](crate::Degradation) entries instead.
#[derive(Debug, Error)]
pub enum ScanError {
    /// No valid points remain after filtering.
    #[error("point cloud is empty after {stage}")]
    EmptyCloud {
        /// Stage that left the cloud empty.
        stage: &'static str,
    },

    /// Configuration rejected before any work was done.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the rejected value.
        reason: String,
    },

    /// Plane fitting or alignment failed.
    #[error(transparent)]
    Transform(#[from] TransformError),
}

impl ScanError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}
