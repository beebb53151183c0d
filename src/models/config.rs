use crate::assets::AssetLoader;
use crate::models::DeviceModel;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from config.yaml
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Artifact storage
    #[serde(default)]
    pub content: ContentConfig,

    /// Headless browser settings
    #[serde(default)]
    pub renderer: RendererConfig,

    /// Halftone defaults
    #[serde(default)]
    pub halftone: HalftoneConfig,

    /// Preview image settings
    #[serde(default)]
    pub thumbnail: ThumbnailConfig,

    /// Device models keyed by id
    #[serde(default = "default_models")]
    pub models: BTreeMap<String, ModelConfig>,

    /// Shared PIN guarding the API; no PIN means the API is open
    #[serde(default)]
    pub access_pin: Option<String>,
}

/// Where artifacts are written and how they are addressed
#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    /// Directory holding processed images and thumbnails
    #[serde(default = "default_content_dir")]
    pub dir: PathBuf,

    /// Directory for raw captures (deleted after processing)
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,

    /// URL prefix under which `dir` is served
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("./content")
}

fn default_base_url() -> String {
    "/content".to_string()
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            dir: default_content_dir(),
            temp_dir: None,
            base_url: default_base_url(),
        }
    }
}

impl ContentConfig {
    /// Raw capture directory; defaults outside `dir` so captures are never served
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("inkscreen"))
    }
}

/// Headless browser settings
#[derive(Debug, Deserialize, Clone)]
pub struct RendererConfig {
    /// Chrome/Chromium executable; auto-detected when unset
    #[serde(default)]
    pub chrome_path: Option<PathBuf>,

    /// Ceiling for navigation and content load
    #[serde(default = "default_load_timeout_secs")]
    pub load_timeout_secs: u64,

    /// Soft ceiling for web font loading
    #[serde(default = "default_font_timeout_ms")]
    pub font_timeout_ms: u64,

    /// Quiet window that counts as network idle for URL captures
    #[serde(default = "default_network_idle_ms")]
    pub network_idle_ms: u64,

    /// How long a liveness check may take before the browser counts as hung
    #[serde(default = "default_liveness_timeout_ms")]
    pub liveness_timeout_ms: u64,

    /// Browser process is torn down after this long without activity
    #[serde(default = "default_idle_browser_timeout_secs")]
    pub idle_browser_timeout_secs: u64,

    /// Run Chrome with its sandbox (disable inside containers)
    #[serde(default = "default_sandbox")]
    pub sandbox: bool,
}

fn default_load_timeout_secs() -> u64 {
    30
}

fn default_font_timeout_ms() -> u64 {
    2000
}

fn default_network_idle_ms() -> u64 {
    500
}

fn default_liveness_timeout_ms() -> u64 {
    2000
}

fn default_idle_browser_timeout_secs() -> u64 {
    3600
}

fn default_sandbox() -> bool {
    true
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            load_timeout_secs: default_load_timeout_secs(),
            font_timeout_ms: default_font_timeout_ms(),
            network_idle_ms: default_network_idle_ms(),
            liveness_timeout_ms: default_liveness_timeout_ms(),
            idle_browser_timeout_secs: default_idle_browser_timeout_secs(),
            sandbox: default_sandbox(),
        }
    }
}

impl RendererConfig {
    pub fn timeouts(&self) -> RenderTimeouts {
        RenderTimeouts {
            load: Duration::from_secs(self.load_timeout_secs),
            fonts: Duration::from_millis(self.font_timeout_ms),
            network_idle: Duration::from_millis(self.network_idle_ms),
            liveness: Duration::from_millis(self.liveness_timeout_ms),
        }
    }
}

/// Per-call ceilings for one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTimeouts {
    /// Hard ceiling on navigation/content load
    pub load: Duration,
    /// Soft ceiling on font loading; exceeding it is not an error
    pub fonts: Duration,
    /// Quiet window for network idleness
    pub network_idle: Duration,
    /// Longest wait for a liveness answer before relaunching
    pub liveness: Duration,
}

impl Default for RenderTimeouts {
    fn default() -> Self {
        RendererConfig::default().timeouts()
    }
}

/// Halftone defaults
#[derive(Debug, Deserialize, Clone)]
pub struct HalftoneConfig {
    #[serde(default = "default_threshold")]
    pub threshold: u8,
    #[serde(default = "default_contrast")]
    pub contrast: f32,
}

fn default_threshold() -> u8 {
    128
}

fn default_contrast() -> f32 {
    1.2
}

impl Default for HalftoneConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            contrast: default_contrast(),
        }
    }
}

/// Thumbnail settings
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ThumbnailConfig {
    #[serde(default = "default_thumb_width")]
    pub width: u32,
    #[serde(default = "default_thumb_height")]
    pub height: u32,
    #[serde(default = "default_thumb_quality")]
    pub quality: u8,
}

fn default_thumb_width() -> u32 {
    200
}

fn default_thumb_height() -> u32 {
    150
}

fn default_thumb_quality() -> u8 {
    80
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            width: default_thumb_width(),
            height: default_thumb_height(),
            quality: default_thumb_quality(),
        }
    }
}

/// A device model entry as written in YAML (id is the map key)
#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    pub name: String,
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_color_depth")]
    pub color_depth: u32,
}

fn default_color_depth() -> u32 {
    2
}

fn default_models() -> BTreeMap<String, ModelConfig> {
    let mut models = BTreeMap::new();
    models.insert(
        "og".to_string(),
        ModelConfig {
            name: "TRMNL OG".to_string(),
            width: 800,
            height: 480,
            color_depth: 2,
        },
    );
    models.insert(
        "x".to_string(),
        ModelConfig {
            name: "TRMNL X".to_string(),
            width: 1872,
            height: 1404,
            color_depth: 16,
        },
    );
    models
}

impl AppConfig {
    /// Load configuration from AssetLoader (embedded or external)
    pub fn load_from_assets(loader: &AssetLoader) -> Self {
        let config = match loader.read_config_string() {
            Ok(content) => Self::parse_or_default(&content),
            Err(e) => {
                tracing::warn!(%e, "Failed to read config, using defaults");
                Self::with_default_models()
            }
        };
        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Parse YAML, falling back to defaults on error
    pub fn parse_or_default(content: &str) -> Self {
        match serde_yaml::from_str::<Self>(content) {
            Ok(config) => {
                tracing::info!(models = config.models.len(), "Loaded configuration");
                config
            }
            Err(e) => {
                tracing::warn!(%e, "Failed to parse config, using defaults");
                Self::with_default_models()
            }
        }
    }

    /// Defaults including the built-in device models
    pub fn with_default_models() -> Self {
        Self {
            models: default_models(),
            ..Default::default()
        }
    }

    /// Apply `CONTENT_DIR`, `CHROME_PATH` and `ACCESS_PIN` overrides
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("CONTENT_DIR").filter(|s| !s.is_empty()) {
            self.content.dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup("CHROME_PATH").filter(|s| !s.is_empty()) {
            self.renderer.chrome_path = Some(PathBuf::from(path));
        }
        if let Some(pin) = lookup("ACCESS_PIN").filter(|s| !s.is_empty()) {
            self.access_pin = Some(pin);
        }
        self
    }

    /// All configured device models, ordered by id
    pub fn device_models(&self) -> Vec<DeviceModel> {
        self.models
            .iter()
            .map(|(id, m)| DeviceModel {
                id: id.clone(),
                name: m.name.clone(),
                width: m.width,
                height: m.height,
                color_depth: m.color_depth,
            })
            .collect()
    }
}
