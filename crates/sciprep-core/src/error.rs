//! Error types.
//!
//! `StudyError` is the user-facing taxonomy: every gateway failure is
//! converted into it before it reaches the navigation controller.
//! `ProviderError` is defined here as well so the gateway can classify
//! provider failures by downcasting instead of string matching.

use thiserror::Error;

/// User-facing failures of the study flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StudyError {
    /// The LLM credential is missing. Fatal at startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A question batch could not be obtained. Local to one session.
    #[error("question generation failed: {0}")]
    GenerationFailed(String),

    /// The weakness analysis failed. Degrades to a fixed text.
    #[error("weakness analysis unavailable: {0}")]
    AnalysisUnavailable(String),
}

/// Misuse of the quiz session API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The session is not accepting answers (loading, failed, or completed).
    #[error("session is not active")]
    NotActive,

    /// `advance` was called before the current question was answered.
    #[error("question {index} has not been answered")]
    NotAnswered { index: usize },

    /// The chosen option does not exist on the current question.
    #[error("option {option} is out of range (question has {available} options)")]
    OptionOutOfRange { option: usize, available: usize },

    /// A generation result arrived for a different session instance.
    #[error("stale generation result (expected token {expected}, got {got})")]
    StaleGeneration { expected: u64, got: u64 },

    /// The session already received its question batch.
    #[error("session is no longer loading")]
    NotLoading,
}

/// Errors that can occur when interacting with an LLM provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Returns `true` if this error is permanent and retrying cannot help.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ProviderError::AuthenticationFailed(_) | ProviderError::ModelNotFound(_)
        )
    }

    /// Returns the retry-after delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            ProviderError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_classification() {
        assert!(ProviderError::AuthenticationFailed("bad key".into()).is_permanent());
        assert!(ProviderError::ModelNotFound("x".into()).is_permanent());
        assert!(!ProviderError::Timeout(60).is_permanent());
        assert_eq!(
            ProviderError::RateLimited {
                retry_after_ms: 5000
            }
            .retry_after_ms(),
            Some(5000)
        );
        assert_eq!(ProviderError::NetworkError("x".into()).retry_after_ms(), None);
    }

    #[test]
    fn study_error_messages() {
        let err = StudyError::GenerationFailed("empty batch".into());
        assert_eq!(err.to_string(), "question generation failed: empty batch");
        let err = StudyError::Configuration("API key missing".into());
        assert!(err.to_string().starts_with("configuration error"));
    }
}
