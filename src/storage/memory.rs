use super::backend::RecordStore;
use super::types::{Record, StoreError, StoreResult};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// In-process backend.
///
/// Records live in a sharded concurrent map, so parallel request workers can
/// create, update and delete without a global lock and without lost updates.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store pre-populated with `records`. Later duplicates win.
    #[cfg(test)]
    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        let store = Self::new();
        for record in records {
            store.records.insert(record.id, record.value);
        }
        store
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get_all(&self) -> StoreResult<Vec<Record>> {
        Ok(self
            .records
            .iter()
            .map(|entry| Record::new(entry.key().clone(), entry.value().clone()))
            .collect())
    }

    async fn get_by_id(&self, id: &str) -> StoreResult<Option<Record>> {
        Ok(self
            .records
            .get(id)
            .map(|value| Record::new(id, value.value().clone())))
    }

    async fn create(&self, id: &str, value: &str) -> StoreResult<()> {
        // The entry guard holds the shard lock, so check-and-insert is atomic.
        match self.records.entry(id.to_string()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(id.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(value.to_string());
                Ok(())
            }
        }
    }

    async fn update(&self, id: &str, value: &str) -> StoreResult<bool> {
        match self.records.get_mut(id) {
            Some(mut current) => {
                *current = value.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        Ok(self.records.remove(id).is_some())
    }

    async fn len(&self) -> StoreResult<usize> {
        Ok(self.records.len())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
