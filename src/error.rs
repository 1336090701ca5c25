use thiserror::Error;

/// Failures raised by the landmark transform and geometry core.
///
/// All variants are deterministic for fixed inputs; callers are expected to
/// reject the offending landmark set or image instead of retrying.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LandmarkError {
    /// Two coincident points produced a zero-length vector.
    #[error("zero-length vector encountered: {context}")]
    DegenerateVector { context: String },

    #[error("missing landmarks: {}", .missing.join(", "))]
    MissingLandmarks { missing: Vec<String> },

    #[error("unknown landmark name '{name}'")]
    UnknownLandmark { name: String },

    #[error("invalid image shape: {reason}")]
    InvalidImageShape { reason: String },

    #[error("affine matrix is not invertible")]
    SingularAffine,

    #[error("expected {expected} landmark channels, found {found}")]
    ChannelCount { expected: usize, found: usize },
}

impl LandmarkError {
    pub(crate) fn degenerate(context: &str) -> Self {
        LandmarkError::DegenerateVector {
            context: context.to_string(),
        }
    }

    pub(crate) fn shape(reason: impl Into<String>) -> Self {
        LandmarkError::InvalidImageShape {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LandmarkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_landmarks_message_lists_names() {
        let err = LandmarkError::MissingLandmarks {
            missing: vec!["S1_ant".to_string(), "L1_post".to_string()],
        };
        assert_eq!(err.to_string(), "missing landmarks: S1_ant, L1_post");
    }

    #[test]
    fn test_channel_count_message() {
        let err = LandmarkError::ChannelCount {
            expected: 5,
            found: 3,
        };
        assert!(err.to_string().contains("expected 5"));
    }

    #[test]
    fn test_unknown_landmark_message() {
        let err = LandmarkError::UnknownLandmark {
            name: "T12".to_string(),
        };
        assert_eq!(err.to_string(), "unknown landmark name 'T12'");
    }
}
