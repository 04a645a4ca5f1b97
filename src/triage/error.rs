//! Error types for priority classification

use crate::error::AppError;

/// Result type for classification operations
pub type ClassificationResult<T> = std::result::Result<T, ClassificationError>;

/// Errors that can occur while triaging a description
#[derive(Debug, thiserror::Error)]
pub enum ClassificationError {
    /// The sentiment scorer failed or produced unusable output
    #[error("Sentiment scorer unavailable: {0}")]
    ScorerUnavailable(String),

    /// The description was rejected before classification
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A lexicon entry was malformed
    #[error("Invalid lexicon: {0}")]
    InvalidLexicon(String),
}

impl From<ClassificationError> for AppError {
    fn from(err: ClassificationError) -> Self {
        match err {
            ClassificationError::ScorerUnavailable(msg) => AppError::ClassificationUnavailable(msg),
            ClassificationError::InvalidInput(msg) => AppError::Validation(msg),
            ClassificationError::InvalidLexicon(msg) => AppError::Configuration(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_scorer_failure_is_distinguishable() {
        let err: AppError = ClassificationError::ScorerUnavailable("offline".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.error_code(), "CLASSIFICATION_UNAVAILABLE");
    }

    #[test]
    fn test_invalid_input_maps_to_validation() {
        let err: AppError = ClassificationError::InvalidInput("too long".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
