pub mod config;
pub mod content;
pub mod device_model;
pub mod playlist;

pub use config::{
    AppConfig, ContentConfig, HalftoneConfig, ModelConfig, RenderTimeouts, RendererConfig,
    ThumbnailConfig,
};
pub use content::{ContentLocator, ContentSource};
pub use device_model::{DeviceModel, RenderTarget};
pub use playlist::{collect_playlist_items, PlaylistItem};
