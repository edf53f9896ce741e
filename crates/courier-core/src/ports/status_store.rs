//! StatusStore port - task id → current Task Record.
//!
//! # Implementations
//! - `InMemoryStatusStore` (tests, single-process runs)
//! - `RedisStatusStore` (`SET`/`GET` on `task_status:<id>`)

use async_trait::async_trait;

use crate::domain::{StoreError, TaskId, TaskRecord};

/// Key-value persistence of Task Records.
///
/// # Contract
/// - `put` is an upsert that replaces the whole record; there is no partial merge
///   and no transaction. Only the worker that popped a task writes to it after
///   admission, so concurrent writers to one id are not guarded against.
/// - Records are never deleted.
#[async_trait]
pub trait StatusStore: Send + Sync {
    async fn put(&self, record: &TaskRecord) -> Result<(), StoreError>;

    /// `Ok(None)` means not found.
    async fn get(&self, id: TaskId) -> Result<Option<TaskRecord>, StoreError>;

    /// The `limit` most recently created records, newest first.
    async fn list(&self, limit: usize) -> Result<Vec<TaskRecord>, StoreError>;

    /// Total number of records ever admitted.
    async fn count(&self) -> Result<usize, StoreError>;

    /// Reachability check for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Newest first: `created_at` descending, ties broken by id descending.
pub fn newest_first(records: &mut [TaskRecord]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}
