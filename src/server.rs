//! HTTP server setup and configuration.
//!
//! This module provides the router and application state used by both
//! the production server and integration tests.

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{header::CACHE_CONTROL, HeaderValue},
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::api;
use crate::assets::{AssetLoader, WELCOME_TEMPLATE};
use crate::models::AppConfig;
use crate::services::{
    BrowserLauncher, BrowserRenderer, ChangeNotifier, DeviceModelRegistry, InMemoryModelRegistry,
    LogNotifier, ScreenContentService,
};

/// Largest accepted image upload
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Path the content directory is served under
pub const CONTENT_ROUTE: &str = "/content";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub registry: Arc<dyn DeviceModelRegistry>,
    pub content: Arc<ScreenContentService>,
    pub notifier: Arc<dyn ChangeNotifier>,
}

impl AppState {
    pub fn new(config: AppConfig, renderer: Arc<BrowserRenderer>, welcome_template: String) -> Self {
        let registry: Arc<dyn DeviceModelRegistry> =
            Arc::new(InMemoryModelRegistry::with_models(config.device_models()));
        let content = Arc::new(ScreenContentService::new(
            &config,
            renderer,
            registry.clone(),
            welcome_template,
        ));

        tracing::info!(
            models = config.models.len(),
            content_dir = %config.content.dir.display(),
            pin_protected = config.access_pin.is_some(),
            "Application state created"
        );

        Self {
            config: Arc::new(config),
            registry,
            content,
            notifier: Arc::new(LogNotifier),
        }
    }
}

/// Create application state from config and assets.
///
/// The browser is not started here; the first HTML or URL render launches it
/// through `launcher`.
pub fn create_app_state(
    config: AppConfig,
    asset_loader: &AssetLoader,
    launcher: Arc<dyn BrowserLauncher>,
) -> anyhow::Result<AppState> {
    let welcome_template = asset_loader
        .read_template(WELCOME_TEMPLATE)
        .context("Failed to load welcome template")?;
    let renderer = Arc::new(BrowserRenderer::new(launcher, config.renderer.timeouts()));

    Ok(AppState::new(config, renderer, welcome_template))
}

/// Build the API router with all endpoints and middleware.
///
/// This is the core router used by both production and tests. Everything
/// under `/api` sits behind the access PIN; health and content files do not.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/api/models", get(api::handle_list_models))
        .route("/api/models/:id", get(api::handle_get_model))
        .route("/api/screens/html", post(api::handle_html))
        .route("/api/screens/url", post(api::handle_url))
        .route("/api/screens/image", post(api::handle_image))
        .route("/api/screens/welcome", post(api::handle_welcome))
        .route("/api/screens/content", delete(api::handle_remove_content))
        .route("/api/playlists/items", post(api::handle_add_items))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_pin,
        ));

    // Artifact names are unique, so a file never changes once written
    let content_routes = Router::new()
        .nest_service(CONTENT_ROUTE, ServeDir::new(&state.config.content.dir))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=31536000, immutable"),
        ));

    Router::new()
        .merge(api_routes)
        .merge(content_routes)
        .route("/health", get(|| async { "OK" }))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
