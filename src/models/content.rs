use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Where the finished artifacts of one pipeline run live.
///
/// Both fields are URLs in the content store namespace. A locator always
/// carries both the full image and its thumbnail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ContentLocator {
    /// Halftoned PNG at exact device resolution
    pub image: String,
    /// Lossy JPEG preview
    pub thumbnail: String,
}

/// What a pipeline run starts from.
#[derive(Debug, Clone)]
pub enum ContentSource {
    Html(String),
    Url(String),
    Image(Vec<u8>),
}

impl ContentSource {
    /// Short name used for artifact file names and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ContentSource::Html(_) => "html",
            ContentSource::Url(_) => "url",
            ContentSource::Image(_) => "image",
        }
    }
}
