//! Error types for the AI orchestration layer.

use nimbus_core::error::NimbusError;

/// Errors from the AI core.
///
/// Upstream variants are surfaced distinctly so callers can decide
/// recoverability; the orchestrator never collapses them.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("upstream rate limited: {0}")]
    UpstreamRateLimited(String),
    #[error("upstream timeout: {0}")]
    UpstreamTimeout(String),
    #[error("unparseable model response: {0}")]
    UnparseableResponse(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AiError {
    /// Whether a retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AiError::UpstreamUnavailable(_)
                | AiError::UpstreamRateLimited(_)
                | AiError::UpstreamTimeout(_)
        )
    }
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AiError::UpstreamTimeout(err.to_string())
        } else if err.is_connect() {
            AiError::UpstreamUnavailable(err.to_string())
        } else {
            AiError::Internal(err.to_string())
        }
    }
}

impl From<AiError> for NimbusError {
    fn from(err: AiError) -> Self {
        NimbusError::Ai(err.to_string())
    }
}
