//! Test application factory for integration tests.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

use inkscreen::assets::{AssetLoader, WELCOME_TEMPLATE};
use inkscreen::models::{AppConfig, ContentLocator};
use inkscreen::server::{build_router, create_app_state, AppState};
use inkscreen::services::BrowserRenderer;

use super::fake_browser::FakeLauncher;
use super::fixtures;

/// Test application with router and direct access to services
pub struct TestApp {
    router: axum::Router,
    pub state: AppState,
    pub launcher: Arc<FakeLauncher>,
    // Dropped last; holds content and temp dirs
    _dir: TempDir,
}

impl TestApp {
    /// Create a new test application with a working fake browser
    pub fn new() -> Self {
        Self::with_launcher(FakeLauncher::new())
    }

    /// Create a test application around the given browser launcher
    pub fn with_launcher(launcher: Arc<FakeLauncher>) -> Self {
        Self::build(launcher, |_| {})
    }

    /// Create a test application whose API requires `pin`
    pub fn with_pin(pin: &str) -> Self {
        let pin = pin.to_string();
        Self::build(FakeLauncher::new(), move |config| {
            config.access_pin = Some(pin)
        })
    }

    /// Create a test application with a short page load ceiling
    pub fn with_load_timeout(launcher: Arc<FakeLauncher>, load: Duration) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config = fixtures::config_in(dir.path());
        let mut timeouts = config.renderer.timeouts();
        timeouts.load = load;

        let welcome = AssetLoader::new(None, None)
            .read_template(WELCOME_TEMPLATE)
            .expect("embedded welcome template");
        let renderer = Arc::new(BrowserRenderer::new(launcher.clone(), timeouts));
        let state = AppState::new(config, renderer, welcome);

        Self::finish(state, launcher, dir)
    }

    fn build(launcher: Arc<FakeLauncher>, customize: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut config = fixtures::config_in(dir.path());
        customize(&mut config);

        // Embedded assets only (no external paths), same path as production
        let asset_loader = AssetLoader::new(None, None);
        let state = create_app_state(config, &asset_loader, launcher.clone())
            .expect("Failed to create app state");

        Self::finish(state, launcher, dir)
    }

    fn finish(state: AppState, launcher: Arc<FakeLauncher>, dir: TempDir) -> Self {
        let router = build_router(state.clone());
        Self {
            router,
            state,
            launcher,
            _dir: dir,
        }
    }

    pub fn content_dir(&self) -> PathBuf {
        self.state.config.content.dir.clone()
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.state.config.content.temp_dir()
    }

    /// Files currently in a directory (empty when it does not exist)
    pub fn files_in(dir: &std::path::Path) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|e| e.path().is_file())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Make a GET request to the given path
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Request::get(path).body(Body::empty()).unwrap())
            .await
    }

    /// Make a GET request with custom headers
    pub async fn get_with_headers(&self, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        let mut builder = Request::get(path);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        self.request(builder.body(Body::empty()).unwrap()).await
    }

    /// Make a POST request with JSON body
    pub async fn post_json(
        &self,
        path: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> TestResponse {
        let mut builder = Request::post(path).header("Content-Type", "application/json");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        self.request(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Make a POST request with a raw binary body
    pub async fn post_bytes(&self, path: &str, body: Vec<u8>) -> TestResponse {
        let request = Request::post(path)
            .header("Content-Type", "application/octet-stream")
            .body(Body::from(body))
            .unwrap();
        self.request(request).await
    }

    /// Make a DELETE request with JSON body
    pub async fn delete_json(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::delete(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request(request).await
    }

    /// Send a request to the router
    async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Render HTML for a model and return the locator
    pub async fn render_html(&self, html: &str, model: &str) -> ContentLocator {
        let response = self
            .post_json("/api/screens/html", &[], &fixtures::html_request(html, model))
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text());
        response.json()
    }

    /// Fetch a content URL and decode it as grayscale
    pub async fn fetch_image(&self, url: &str) -> image::GrayImage {
        let response = self.get(url).await;
        assert_eq!(response.status, StatusCode::OK, "GET {url}");
        image::load_from_memory(&response.body)
            .expect("decode served image")
            .to_luma8()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Test response with convenience methods
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parse body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    /// Get body as string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Header value as string, if present
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Check if response is a PNG image
    pub fn is_png(&self) -> bool {
        self.body.len() >= 8 && &self.body[0..8] == b"\x89PNG\r\n\x1a\n"
    }

    /// Check if response is a JPEG image
    pub fn is_jpeg(&self) -> bool {
        self.body.starts_with(&[0xFF, 0xD8, 0xFF])
    }
}
