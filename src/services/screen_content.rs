use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::error::RenderError;
use crate::models::{AppConfig, ContentLocator, ContentSource, RenderTarget, ThumbnailConfig};
use crate::rendering::{create_thumbnail, HalftoneProcessor};
use crate::services::browser::BrowserRenderer;
use crate::services::content_store::{ContentStore, StoredFile};
use crate::services::model_registry::DeviceModelRegistry;
use crate::services::template::{html_escape, render_template};

/// Where the output geometry of a screen comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    /// Look up a configured device model by id
    Model(String),
    /// Caller supplied dimensions
    Explicit(RenderTarget),
}

/// Turns HTML, URLs and uploaded images into e-ink screen content
///
/// Every producer runs the same pipeline: raw capture → halftone →
/// thumbnail → store. The returned locator always points at both files.
pub struct ScreenContentService {
    renderer: Arc<BrowserRenderer>,
    registry: Arc<dyn DeviceModelRegistry>,
    store: ContentStore,
    halftone: HalftoneProcessor,
    thumbnail: ThumbnailConfig,
    welcome_template: String,
}

impl ScreenContentService {
    pub fn new(
        config: &AppConfig,
        renderer: Arc<BrowserRenderer>,
        registry: Arc<dyn DeviceModelRegistry>,
        welcome_template: String,
    ) -> Self {
        Self {
            renderer,
            registry,
            store: ContentStore::new(&config.content),
            halftone: HalftoneProcessor::new(&config.halftone),
            thumbnail: config.thumbnail,
            welcome_template,
        }
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    pub fn renderer(&self) -> &BrowserRenderer {
        &self.renderer
    }

    /// Render HTML markup into screen content
    pub async fn from_html(
        &self,
        html: &str,
        target: &TargetSpec,
    ) -> Result<ContentLocator, RenderError> {
        self.produce(ContentSource::Html(html.to_string()), "html", target)
            .await
    }

    /// Render a remote page into screen content
    pub async fn from_url(
        &self,
        url: &str,
        target: &TargetSpec,
    ) -> Result<ContentLocator, RenderError> {
        self.produce(ContentSource::Url(url.to_string()), "url", target)
            .await
    }

    /// Halftone an uploaded image; no browser involved
    pub async fn from_image(
        &self,
        bytes: Vec<u8>,
        target: &TargetSpec,
    ) -> Result<ContentLocator, RenderError> {
        self.produce(ContentSource::Image(bytes), "image", target)
            .await
    }

    /// Render the canned welcome screen for a freshly added device
    pub async fn welcome_screen(
        &self,
        device_name: &str,
        device_id: &str,
        target: &TargetSpec,
    ) -> Result<ContentLocator, RenderError> {
        let variables = HashMap::from([
            ("device_name".to_string(), html_escape(device_name)),
            ("device_id".to_string(), html_escape(device_id)),
        ]);
        let html = render_template(&self.welcome_template, &variables);
        self.produce(ContentSource::Html(html), "welcome", target)
            .await
    }

    /// Best-effort removal of both files behind a locator
    ///
    /// Locators that do not point into the store are ignored.
    pub async fn remove_content(&self, locator: &ContentLocator) {
        for url in [&locator.image, &locator.thumbnail] {
            match self.store.path_for_url(url) {
                Some(path) => ContentStore::remove_quietly(&path).await,
                None => tracing::warn!(url = %url, "Ignoring locator outside content store"),
            }
        }
    }

    /// Resolve a target spec to concrete, validated geometry
    pub async fn resolve_target(&self, spec: &TargetSpec) -> Result<RenderTarget, RenderError> {
        let target = match spec {
            TargetSpec::Model(model_id) => self.target_for_model(model_id).await?,
            TargetSpec::Explicit(target) => *target,
        };
        target.validate().map_err(RenderError::InvalidTarget)?;
        Ok(target)
    }

    pub async fn target_for_model(&self, model_id: &str) -> Result<RenderTarget, RenderError> {
        self.registry
            .find(model_id)
            .await
            .map_err(|e| RenderError::Failure(e.to_string()))?
            .map(|model| model.target())
            .ok_or_else(|| RenderError::ModelNotFound(model_id.to_string()))
    }

    async fn produce(
        &self,
        source: ContentSource,
        kind: &str,
        target: &TargetSpec,
    ) -> Result<ContentLocator, RenderError> {
        let start = Instant::now();
        let target = self.resolve_target(target).await?;
        tracing::debug!(source = source.kind(), kind, ?target, "Producing screen content");

        let raw = match source {
            ContentSource::Html(html) => self.capture_html(&html, target).await?,
            ContentSource::Url(url) => self.capture_url(&url, target).await?,
            ContentSource::Image(bytes) => bytes,
        };
        let captured_ms = start.elapsed().as_millis() as u64;

        let halftone = self.halftone;
        let thumbnail = self.thumbnail;
        let (image, thumb) = tokio::task::spawn_blocking(move || {
            let image = halftone.process(&raw, target)?;
            let thumb = create_thumbnail(&image, &thumbnail)?;
            Ok::<_, RenderError>((image, thumb))
        })
        .await
        .map_err(|e| RenderError::Failure(format!("Processing task failed: {e}")))??;

        let locator = self.store_pair(kind, &image, &thumb).await?;

        tracing::info!(
            kind,
            width = target.width,
            height = target.height,
            color_depth = target.color_depth,
            capture_ms = captured_ms,
            total_ms = start.elapsed().as_millis() as u64,
            image = %locator.image,
            "Screen content produced"
        );
        Ok(locator)
    }

    async fn capture_html(
        &self,
        html: &str,
        target: RenderTarget,
    ) -> Result<Vec<u8>, RenderError> {
        let temp = self.store.temp_path("raw", "png");
        let result = self
            .renderer
            .render_html(html, target.width, target.height, &temp)
            .await;
        self.read_and_discard(&temp, result.map(|_| ())).await
    }

    async fn capture_url(
        &self,
        url: &str,
        target: RenderTarget,
    ) -> Result<Vec<u8>, RenderError> {
        let temp = self.store.temp_path("raw", "png");
        let result = self
            .renderer
            .render_url(url, target.width, target.height, &temp)
            .await;
        self.read_and_discard(&temp, result.map(|_| ())).await
    }

    /// Read a raw capture back and delete it whatever happened
    async fn read_and_discard(
        &self,
        temp: &std::path::Path,
        rendered: Result<(), RenderError>,
    ) -> Result<Vec<u8>, RenderError> {
        let bytes = match rendered {
            Ok(()) => tokio::fs::read(temp).await.map_err(RenderError::from),
            Err(e) => Err(e),
        };
        ContentStore::remove_quietly(temp).await;
        bytes
    }

    /// Write image and thumbnail, or neither
    async fn store_pair(
        &self,
        kind: &str,
        image: &[u8],
        thumb: &[u8],
    ) -> Result<ContentLocator, RenderError> {
        let image_file = self.store.write(kind, "png", image).await?;
        let thumb_file = self.store.write("thumb", "jpg", thumb).await;
        pair_or_rollback(image_file, thumb_file).await
    }
}

/// Locator for both files, or remove the image when its thumbnail is missing
async fn pair_or_rollback(
    image: StoredFile,
    thumbnail: std::io::Result<StoredFile>,
) -> Result<ContentLocator, RenderError> {
    match thumbnail {
        Ok(thumb) => Ok(ContentLocator {
            image: image.url,
            thumbnail: thumb.url,
        }),
        Err(e) => {
            tracing::warn!(error = %e, "Thumbnail write failed, discarding image");
            ContentStore::remove_quietly(&image.path).await;
            Err(e.into())
        }
    }
}
