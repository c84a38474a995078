use extract::ExtractionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Caller key missing or wrong. Carries the validator's message.
    #[error("{0}")]
    Unauthorized(String),

    #[error("No image provided")]
    NoImage,

    #[error("No images provided")]
    NoImages,

    /// The server has no credential for the AI model.
    #[error("API key not configured")]
    Misconfigured,

    #[error("Failed to parse AI response")]
    ParseFailure { reason: String },

    #[error("AI request failed: {0}")]
    Upstream(String),

    /// The batch task panicked or was aborted before producing an outcome.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ExtractionError> for ServiceError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::MalformedResponse(reason) => ServiceError::ParseFailure { reason },
            ExtractionError::Upstream(source) => ServiceError::Upstream(format!("{source:#}")),
        }
    }
}
