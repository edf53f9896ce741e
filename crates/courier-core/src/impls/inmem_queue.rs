//! InMemoryWorkQueue - process-local work queue.
//!
//! Holds serialized records, exactly like the Redis list does, so the worker's
//! decode path is the same in tests as in production.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use crate::domain::{QueueError, TaskRecord};
use crate::ports::WorkQueue;

/// In-memory FIFO with blocking pop.
///
/// # Implementation
/// - `Mutex<VecDeque<String>>` holds JSON-encoded records
/// - `Notify` wakes one waiting consumer per push
/// - pop takes the lock, so each element goes to exactly one consumer
///
/// Cloning yields another handle onto the same queue.
#[derive(Clone, Default)]
pub struct InMemoryWorkQueue {
    items: Arc<Mutex<VecDeque<String>>>,
    notify: Arc<Notify>,
}

impl InMemoryWorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an already-serialized entry. Lets tests plant entries that a
    /// foreign or older producer might have written.
    pub async fn push_raw(&self, raw: impl Into<String>) {
        self.items.lock().await.push_back(raw.into());
        self.notify.notify_one();
    }
}

#[async_trait]
impl WorkQueue for InMemoryWorkQueue {
    async fn enqueue(&self, record: &TaskRecord) -> Result<(), QueueError> {
        let raw = serde_json::to_string(record).map_err(|e| QueueError::Codec(e.to_string()))?;
        self.push_raw(raw).await;
        Ok(())
    }

    async fn dequeue(&self, timeout: Duration) -> Result<Option<TaskRecord>, QueueError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let popped = self.items.lock().await.pop_front();
            if let Some(raw) = popped {
                return serde_json::from_str(&raw)
                    .map(Some)
                    .map_err(|e| QueueError::Codec(format!("{e}: {raw}")));
            }

            // notify_one leaves a permit behind when nobody is waiting, so a push
            // that lands between the check above and this await is not lost.
            if tokio::time::timeout_at(deadline, self.notify.notified())
                .await
                .is_err()
            {
                return Ok(None);
            }
        }
    }

    async fn len(&self) -> Result<usize, QueueError> {
        Ok(self.items.lock().await.len())
    }

    async fn ping(&self) -> Result<(), QueueError> {
        Ok(())
    }
}
