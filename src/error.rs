use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid access PIN")]
    Unauthorized,

    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Rendering error: {0}")]
    Render(#[from] RenderError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure kinds of the content pipeline.
///
/// `Timeout` and `Failure` may succeed on retry. `Decode`, `ModelNotFound`
/// and `InvalidTarget` are caller errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Renderer unavailable: {0}")]
    Unavailable(String),

    #[error("Render timed out: {0}")]
    Timeout(String),

    #[error("Render failed: {0}")]
    Failure(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Device model not found: {0}")]
    ModelNotFound(String),

    #[error("Invalid render target: {0}")]
    InvalidTarget(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Render(e) => match e {
                RenderError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                RenderError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                RenderError::Failure(_) => StatusCode::BAD_GATEWAY,
                RenderError::Decode(_) => StatusCode::BAD_REQUEST,
                RenderError::ModelNotFound(_) => StatusCode::NOT_FOUND,
                RenderError::InvalidTarget(_) => StatusCode::BAD_REQUEST,
                RenderError::Encode(_) | RenderError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "status": status.as_u16(),
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
