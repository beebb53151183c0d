use crate::models::ContentLocator;
use async_trait::async_trait;

/// Sink for "new content is available" events
///
/// Called after a locator has been produced and handed to the caller.
/// Implementations push the event to whoever is listening (UI, devices);
/// delivery failures stay inside the implementation.
#[async_trait]
pub trait ChangeNotifier: Send + Sync {
    async fn content_changed(&self, locator: &ContentLocator);
}

/// Notifier that only records the event in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl ChangeNotifier for LogNotifier {
    async fn content_changed(&self, locator: &ContentLocator) {
        tracing::info!(
            image = %locator.image,
            thumbnail = %locator.thumbnail,
            "Content changed"
        );
    }
}
