pub mod browser;
pub mod chrome;
pub mod content_store;
pub mod model_registry;
pub mod notifier;
pub mod screen_content;
pub mod template;

pub use browser::{BrowserEngine, BrowserLauncher, BrowserRenderer, CaptureSource};
pub use chrome::{ChromeEngine, ChromeLauncher};
pub use content_store::{ContentStore, StoredFile};
pub use model_registry::{DeviceModelRegistry, InMemoryModelRegistry};
pub use notifier::{ChangeNotifier, LogNotifier};
pub use screen_content::{ScreenContentService, TargetSpec};
pub use template::{html_escape, render_template};
