//! InMemoryStatusStore - process-local status store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{StoreError, TaskId, TaskRecord};
use crate::ports::{StatusStore, newest_first};

/// HashMap-backed store. Cloning yields another handle onto the same map.
#[derive(Clone, Default)]
pub struct InMemoryStatusStore {
    records: Arc<RwLock<HashMap<TaskId, TaskRecord>>>,
}

impl InMemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatusStore for InMemoryStatusStore {
    async fn put(&self, record: &TaskRecord) -> Result<(), StoreError> {
        self.records.write().await.insert(record.id, record.clone());
        Ok(())
    }

    async fn get(&self, id: TaskId) -> Result<Option<TaskRecord>, StoreError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn list(&self, limit: usize) -> Result<Vec<TaskRecord>, StoreError> {
        let mut records: Vec<TaskRecord> = self.records.read().await.values().cloned().collect();
        newest_first(&mut records);
        records.truncate(limit);
        Ok(records)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().await.len())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
