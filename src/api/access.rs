use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::server::AppState;

/// Header carrying the shared access PIN
pub const ACCESS_PIN_HEADER: &str = "Access-Pin";

/// Reject requests without the configured PIN
///
/// When no PIN is configured every request passes.
pub async fn require_pin(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(expected) = state.config.access_pin.as_deref() {
        let provided = headers
            .get(ACCESS_PIN_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if !pin_matches(provided, expected) {
            tracing::warn!(path = %request.uri().path(), "Rejected request with wrong access PIN");
            return Err(ApiError::Unauthorized);
        }
    }
    Ok(next.run(request).await)
}

/// Compare without short-circuiting on the first differing byte
fn pin_matches(provided: &str, expected: &str) -> bool {
    let (a, b) = (provided.as_bytes(), expected.as_bytes());
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
