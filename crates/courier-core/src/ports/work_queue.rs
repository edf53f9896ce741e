//! WorkQueue port - FIFO hand-off from producer to worker.
//!
//! # Implementations
//! - `InMemoryWorkQueue` (tests, single-process runs)
//! - `RedisWorkQueue` (`RPUSH` / `BLPOP` / `LLEN`)

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{QueueError, TaskRecord};

/// An ordered, blocking FIFO of serialized Task Records.
///
/// # Contract
/// - `enqueue` appends to the tail and carries a full copy of the record.
/// - `dequeue` removes the head. `Ok(None)` means nothing arrived within
///   `timeout`; that is not an error.
/// - Each element is handed to exactly one `dequeue` call, even with several
///   consumers. There is no acknowledgement: once popped, an element is gone
///   whether or not the consumer finishes with it (at-most-once).
#[async_trait]
pub trait WorkQueue: Send + Sync {
    async fn enqueue(&self, record: &TaskRecord) -> Result<(), QueueError>;

    async fn dequeue(&self, timeout: Duration) -> Result<Option<TaskRecord>, QueueError>;

    /// Number of elements waiting.
    async fn len(&self) -> Result<usize, QueueError>;

    /// Reachability check for the health endpoint.
    async fn ping(&self) -> Result<(), QueueError>;
}
