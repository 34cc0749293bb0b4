//! Error types for plane fitting and alignment.

use thiserror::Error;

/// Result type for transform operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Errors that can occur while fitting or aligning a cloud.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Not enough points for the operation.
    #[error("insufficient points: need at least {required}, got {actual}")]
    InsufficientPoints {
        /// Minimum number of points required.
        required: usize,
        /// Actual number of points provided.
        actual: usize,
    },

    /// The cloud contains a non-finite coordinate.
    #[error("point {index} has a non-finite coordinate")]
    NonFinitePoint {
        /// Index of the first offending point.
        index: usize,
    },

    /// PCA computation failed.
    #[error("PCA computation failed: {reason}")]
    PcaFailed {
        /// Reason for failure.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = TransformError::InsufficientPoints {
            required: 1,
            actual: 0,
        };
        assert!(format!("{err}").contains("need at least 1"));

        let err = TransformError::NonFinitePoint { index: 7 };
        assert!(format!("{err}").contains("point 7"));

        let err = TransformError::PcaFailed {
            reason: "no right singular vectors".to_string(),
        };
        assert!(format!("{err}").contains("no right singular vectors"));
    }
}
