use thiserror::Error;

/// Errors surfaced by a single analysis request.
///
/// Every variant is scoped to the request that produced it; the caller decides
/// whether to retry or show a message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Upstream returned HTTP {status}: {body}")]
    UpstreamError { status: u16, body: String },

    #[error("Invalid response shape: {0}")]
    InvalidResponseShape(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("API session expired at {expired_at}")]
    SessionExpired { expired_at: String },
}

impl AnalysisError {
    pub fn validation(reason: impl Into<String>) -> Self {
        AnalysisError::ValidationError(reason.into())
    }

    pub fn invalid_shape(reason: impl Into<String>) -> Self {
        AnalysisError::InvalidResponseShape(reason.into())
    }

    /// Short machine-readable tag, used when the failure is reported as JSON.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::InsufficientData { .. } => "insufficient_data",
            AnalysisError::NetworkError(_) => "network_error",
            AnalysisError::UpstreamError { .. } => "upstream_error",
            AnalysisError::InvalidResponseShape(_) => "invalid_response_shape",
            AnalysisError::ValidationError(_) => "validation_error",
            AnalysisError::SessionExpired { .. } => "session_expired",
        }
    }
}
