//! Backend - the handle bundle shared by the producer side and the worker.

use std::sync::Arc;

use crate::config::RedisConfig;
use crate::domain::CourierError;
use crate::impls::{InMemoryStatusStore, InMemoryWorkQueue, RedisStatusStore, RedisWorkQueue};
use crate::ports::{Clock, StatusStore, SystemClock, WorkQueue};

/// Explicit connection state: store, queue and clock.
///
/// Passed into [`super::TaskService`] and [`super::WorkerLoop`] instead of living
/// in globals, so several isolated instances (or test doubles) can coexist in one
/// process. Cloning shares the underlying connections.
#[derive(Clone)]
pub struct Backend {
    pub store: Arc<dyn StatusStore>,
    pub queue: Arc<dyn WorkQueue>,
    pub clock: Arc<dyn Clock>,
}

impl Backend {
    pub fn new(store: Arc<dyn StatusStore>, queue: Arc<dyn WorkQueue>) -> Self {
        Self {
            store,
            queue,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Fresh in-memory store and queue.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryStatusStore::new()),
            Arc::new(InMemoryWorkQueue::new()),
        )
    }

    /// Connect the Redis-backed store and queue.
    pub async fn redis(config: &RedisConfig) -> Result<Self, CourierError> {
        let store = RedisStatusStore::connect(config).await?;
        let queue = RedisWorkQueue::connect(config).await?;
        tracing::info!(%config, "connected to redis");
        Ok(Self::new(Arc::new(store), Arc::new(queue)))
    }
}
