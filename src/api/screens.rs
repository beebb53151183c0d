use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::models::{ContentLocator, RenderTarget};
use crate::server::AppState;
use crate::services::TargetSpec;

/// Output geometry: either a device model id or explicit dimensions
#[derive(Debug, Default, Clone, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TargetParams {
    /// Device model id; takes precedence over explicit dimensions
    pub model: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Displayable levels, 2 (monochrome) when omitted
    pub color_depth: Option<u32>,
}

impl TargetParams {
    pub fn to_spec(&self) -> Result<TargetSpec, ApiError> {
        if let Some(model) = self.model.as_deref().filter(|m| !m.is_empty()) {
            return Ok(TargetSpec::Model(model.to_string()));
        }
        match (self.width, self.height) {
            (Some(width), Some(height)) => Ok(TargetSpec::Explicit(RenderTarget::new(
                width,
                height,
                self.color_depth.unwrap_or(2),
            ))),
            _ => Err(ApiError::BadRequest(
                "either model or width and height are required".to_string(),
            )),
        }
    }
}

/// Render HTML markup
#[derive(Debug, Deserialize, ToSchema)]
pub struct HtmlScreenRequest {
    pub html: String,
    #[serde(flatten)]
    pub target: TargetParams,
}

/// Render a remote page
#[derive(Debug, Deserialize, ToSchema)]
pub struct UrlScreenRequest {
    /// http(s) URL to capture
    pub url: String,
    #[serde(flatten)]
    pub target: TargetParams,
}

/// Render the welcome screen for a device
#[derive(Debug, Deserialize, ToSchema)]
pub struct WelcomeScreenRequest {
    pub device_name: String,
    pub device_id: String,
    #[serde(flatten)]
    pub target: TargetParams,
}

/// Create screen content from HTML
#[utoipa::path(
    post,
    path = "/api/screens/html",
    request_body = HtmlScreenRequest,
    responses(
        (status = 200, description = "Content produced", body = ContentLocator),
        (status = 400, description = "Invalid request or target"),
        (status = 404, description = "Unknown device model"),
        (status = 503, description = "Browser unavailable"),
        (status = 504, description = "Page load timed out"),
    ),
    tag = "Screens"
)]
pub async fn handle_html(
    State(state): State<AppState>,
    Json(request): Json<HtmlScreenRequest>,
) -> Result<Json<ContentLocator>, ApiError> {
    if request.html.trim().is_empty() {
        return Err(ApiError::BadRequest("html must not be empty".to_string()));
    }
    let target = request.target.to_spec()?;
    let locator = state.content.from_html(&request.html, &target).await?;
    notify(&state, locator).await
}

/// Create screen content from a URL
#[utoipa::path(
    post,
    path = "/api/screens/url",
    request_body = UrlScreenRequest,
    responses(
        (status = 200, description = "Content produced", body = ContentLocator),
        (status = 400, description = "Invalid URL or target"),
        (status = 404, description = "Unknown device model"),
        (status = 503, description = "Browser unavailable"),
        (status = 504, description = "Page load timed out"),
    ),
    tag = "Screens"
)]
pub async fn handle_url(
    State(state): State<AppState>,
    Json(request): Json<UrlScreenRequest>,
) -> Result<Json<ContentLocator>, ApiError> {
    validate_url(&request.url)?;
    let target = request.target.to_spec()?;
    let locator = state.content.from_url(&request.url, &target).await?;
    notify(&state, locator).await
}

/// Create screen content from an uploaded image
///
/// The request body is the raw image file (PNG, JPEG, GIF, WebP, ...).
#[utoipa::path(
    post,
    path = "/api/screens/image",
    params(TargetParams),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Content produced", body = ContentLocator),
        (status = 400, description = "Undecodable image or invalid target"),
        (status = 404, description = "Unknown device model"),
    ),
    tag = "Screens"
)]
pub async fn handle_image(
    State(state): State<AppState>,
    Query(params): Query<TargetParams>,
    body: Bytes,
) -> Result<Json<ContentLocator>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("image body must not be empty".to_string()));
    }
    let target = params.to_spec()?;
    let locator = state.content.from_image(body.to_vec(), &target).await?;
    notify(&state, locator).await
}

/// Render the welcome screen
#[utoipa::path(
    post,
    path = "/api/screens/welcome",
    request_body = WelcomeScreenRequest,
    responses(
        (status = 200, description = "Content produced", body = ContentLocator),
        (status = 404, description = "Unknown device model"),
        (status = 503, description = "Browser unavailable"),
    ),
    tag = "Screens"
)]
pub async fn handle_welcome(
    State(state): State<AppState>,
    Json(request): Json<WelcomeScreenRequest>,
) -> Result<Json<ContentLocator>, ApiError> {
    let target = request.target.to_spec()?;
    let locator = state
        .content
        .welcome_screen(&request.device_name, &request.device_id, &target)
        .await?;
    notify(&state, locator).await
}

/// Delete the files behind a locator
///
/// Missing files are not an error.
#[utoipa::path(
    delete,
    path = "/api/screens/content",
    request_body = ContentLocator,
    responses(
        (status = 204, description = "Content removed"),
        (status = 400, description = "Locator outside the content store"),
    ),
    tag = "Screens"
)]
pub async fn handle_remove_content(
    State(state): State<AppState>,
    Json(locator): Json<ContentLocator>,
) -> Result<StatusCode, ApiError> {
    let store = state.content.store();
    for url in [&locator.image, &locator.thumbnail] {
        if store.path_for_url(url).is_none() {
            return Err(ApiError::BadRequest(format!("not a content URL: {url}")));
        }
    }
    state.content.remove_content(&locator).await;
    Ok(StatusCode::NO_CONTENT)
}

async fn notify(
    state: &AppState,
    locator: ContentLocator,
) -> Result<Json<ContentLocator>, ApiError> {
    state.notifier.content_changed(&locator).await;
    Ok(Json(locator))
}

fn validate_url(url: &str) -> Result<(), ApiError> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| ApiError::BadRequest("url must start with http:// or https://".into()))?;
    if rest.is_empty() || rest.starts_with('/') {
        return Err(ApiError::BadRequest("url has no host".into()));
    }
    Ok(())
}
