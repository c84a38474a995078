use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The model answered, but not with a usable species JSON object.
    #[error("Failed to parse AI response: {0}")]
    MalformedResponse(String),

    /// The call to the model itself failed (network, quota, bad status).
    #[error("AI request failed: {0:#}")]
    Upstream(anyhow::Error),
}
