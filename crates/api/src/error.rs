use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use classify::ServiceError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Request body could not be read (bad multipart, bad JSON).
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Service(ServiceError::Unauthorized(_)) => StatusCode::UNAUTHORIZED,
            ApiError::Service(ServiceError::NoImage | ServiceError::NoImages) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Service(
                ServiceError::Misconfigured
                | ServiceError::ParseFailure { .. }
                | ServiceError::Upstream(_)
                | ServiceError::Internal(_),
            ) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
