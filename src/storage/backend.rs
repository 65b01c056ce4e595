use super::memory::MemoryStore;
use super::mongo::MongoStore;
use super::types::{Record, StoreResult};
use crate::config::BackendSettings;

use async_trait::async_trait;
use std::sync::Arc;

/// The capability set every record backend provides.
///
/// Implementations must be safe to share between concurrently running request
/// handlers. A completed write is visible to every read that starts after it.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// Every live record, in no particular order.
    async fn get_all(&self) -> StoreResult<Vec<Record>>;

    /// The record stored under `id`, or `None` when it is absent.
    async fn get_by_id(&self, id: &str) -> StoreResult<Option<Record>>;

    /// Inserts a new record under a caller-chosen id.
    ///
    /// # Errors
    /// `StoreError::AlreadyExists` when `id` is already live; the stored value is left untouched.
    async fn create(&self, id: &str, value: &str) -> StoreResult<()>;

    /// Replaces the value of an existing record.
    ///
    /// Returns `false` (not an error) when no record has this id; nothing is created.
    async fn update(&self, id: &str, value: &str) -> StoreResult<bool>;

    /// Removes the record if present. Returns whether a record was removed.
    async fn delete(&self, id: &str) -> StoreResult<bool>;

    /// Number of live records.
    async fn len(&self) -> StoreResult<usize>;

    async fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len().await? == 0)
    }

    /// Short backend name used in startup logs.
    fn backend_name(&self) -> &'static str;
}

/// Builds the backend selected in the settings.
///
/// The durable backend only prepares its client here; the collection itself is
/// ensured lazily on the first operation.
pub fn open_store(settings: &BackendSettings) -> StoreResult<Arc<dyn RecordStore>> {
    match settings {
        BackendSettings::Memory => {
            tracing::info!("Using in-memory record store");
            Ok(Arc::new(MemoryStore::new()))
        }
        BackendSettings::Mongo(mongo) => {
            tracing::info!(
                "Using MongoDB at {}:{}/{}",
                mongo.server_address,
                mongo.server_port,
                mongo.database_name
            );
            Ok(Arc::new(MongoStore::new(mongo)?))
        }
    }
}
