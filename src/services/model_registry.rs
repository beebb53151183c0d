use crate::error::ApiError;
use crate::models::DeviceModel;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Trait for device model lookup
#[async_trait]
pub trait DeviceModelRegistry: Send + Sync {
    /// Find a model by its id
    async fn find(&self, model_id: &str) -> Result<Option<DeviceModel>, ApiError>;

    /// All known models, ordered by id
    async fn list(&self) -> Result<Vec<DeviceModel>, ApiError>;

    /// Store or replace a model
    async fn upsert(&self, model: DeviceModel) -> Result<(), ApiError>;
}

/// In-memory device model storage, seeded from config
pub struct InMemoryModelRegistry {
    models: Arc<RwLock<BTreeMap<String, DeviceModel>>>,
}

impl InMemoryModelRegistry {
    pub fn new() -> Self {
        Self {
            models: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    pub fn with_models(models: impl IntoIterator<Item = DeviceModel>) -> Self {
        let map = models.into_iter().map(|m| (m.id.clone(), m)).collect();
        Self {
            models: Arc::new(RwLock::new(map)),
        }
    }
}

impl Default for InMemoryModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeviceModelRegistry for InMemoryModelRegistry {
    async fn find(&self, model_id: &str) -> Result<Option<DeviceModel>, ApiError> {
        let models = self.models.read().await;
        Ok(models.get(model_id).cloned())
    }

    async fn list(&self) -> Result<Vec<DeviceModel>, ApiError> {
        let models = self.models.read().await;
        Ok(models.values().cloned().collect())
    }

    async fn upsert(&self, model: DeviceModel) -> Result<(), ApiError> {
        let mut models = self.models.write().await;
        models.insert(model.id.clone(), model);
        Ok(())
    }
}
