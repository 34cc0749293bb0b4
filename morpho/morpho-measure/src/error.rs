//! Error types for measurement operations.

use thiserror::Error;

/// Result type alias for measurement operations.
pub type MeasureResult<T> = Result<T, MeasureError>;

/// Errors that can occur during measurement operations.
#[derive(Debug, Error)]
pub enum MeasureError {
    /// Too few points to form the requested shape.
    #[error("insufficient points: need at least {required}, got {actual}")]
    InsufficientPoints {
        /// Minimum number of points required.
        required: usize,
        /// Actual number of points provided.
        actual: usize,
    },

    /// The volume backend could not produce a value.
    #[error("volume computation failed: {reason}")]
    VolumeFailed {
        /// Reason for failure.
        reason: String,
    },
}

impl MeasureError {
    /// Create a volume failure error.
    #[must_use]
    pub fn volume_failed(reason: impl Into<String>) -> Self {
        Self::VolumeFailed {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MeasureError::InsufficientPoints {
            required: 3,
            actual: 2,
        };
        assert!(format!("{err}").contains("need at least 3, got 2"));

        let err = MeasureError::volume_failed("face 2 references vertex 9");
        assert!(format!("{err}").contains("face 2 references vertex 9"));
    }
}
