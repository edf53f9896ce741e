//! Redis-backed Work Queue and Status Store.
//!
//! Layout:
//! - Work Queue: a list at `queue_key`, `RPUSH` to enqueue, `BLPOP` to dequeue.
//! - Status Store: one string per task at `<status_prefix><id>` holding the JSON
//!   record.
//!
//! Queue and store each own a [`ConnectionManager`]. `BLPOP` parks the
//! connection it runs on, so the store must not share it.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, RedisError};
use tracing::debug;

use crate::config::RedisConfig;
use crate::domain::{QueueError, StoreError, TaskId, TaskRecord};
use crate::ports::{StatusStore, WorkQueue, newest_first};

fn is_connectivity(e: &RedisError) -> bool {
    e.is_io_error() || e.is_connection_refusal() || e.is_connection_dropped() || e.is_timeout()
}

impl From<RedisError> for QueueError {
    fn from(e: RedisError) -> Self {
        if is_connectivity(&e) {
            QueueError::Connectivity(e.to_string())
        } else {
            QueueError::Backend(e.to_string())
        }
    }
}

impl From<RedisError> for StoreError {
    fn from(e: RedisError) -> Self {
        if is_connectivity(&e) {
            StoreError::Connectivity(e.to_string())
        } else {
            StoreError::Backend(e.to_string())
        }
    }
}

/// Reconnect policy: a short, bounded retry so an outage surfaces as a
/// connectivity error and the caller's own backoff decides what happens next.
fn manager_config(config: &RedisConfig) -> ConnectionManagerConfig {
    ConnectionManagerConfig::new()
        .set_factor(100)
        .set_number_of_retries(config.reconnect_retries)
        .set_max_delay(config.reconnect_max_delay_ms)
        .set_connection_timeout(Duration::from_millis(config.connect_timeout_ms))
}

async fn connect(config: &RedisConfig) -> Result<ConnectionManager, RedisError> {
    let client = redis::Client::open(config.url())?;
    ConnectionManager::new_with_config(client, manager_config(config)).await
}

/// Work Queue on a Redis list.
#[derive(Clone)]
pub struct RedisWorkQueue {
    conn: ConnectionManager,
    key: String,
}

impl RedisWorkQueue {
    pub async fn connect(config: &RedisConfig) -> Result<Self, QueueError> {
        let conn = connect(config).await?;
        Ok(Self {
            conn,
            key: config.queue_key.clone(),
        })
    }
}

#[async_trait]
impl WorkQueue for RedisWorkQueue {
    async fn enqueue(&self, record: &TaskRecord) -> Result<(), QueueError> {
        let raw = serde_json::to_string(record).map_err(|e| QueueError::Codec(e.to_string()))?;
        let mut conn = self.conn.clone();
        let _: () = conn.rpush(&self.key, raw).await?;
        Ok(())
    }

    async fn dequeue(&self, timeout: Duration) -> Result<Option<TaskRecord>, QueueError> {
        let mut conn = self.conn.clone();
        // BLPOP with 0 blocks forever; a zero wait is a plain LPOP instead
        let popped: Option<String> = if timeout.is_zero() {
            conn.lpop(&self.key, None).await?
        } else {
            let entry: Option<(String, String)> =
                conn.blpop(&self.key, timeout.as_secs_f64()).await?;
            entry.map(|(_, raw)| raw)
        };
        let Some(raw) = popped else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| QueueError::Codec(format!("{e}: {raw}")))
    }

    async fn len(&self) -> Result<usize, QueueError> {
        let mut conn = self.conn.clone();
        Ok(conn.llen(&self.key).await?)
    }

    async fn ping(&self) -> Result<(), QueueError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

/// Status Store on Redis string keys.
#[derive(Clone)]
pub struct RedisStatusStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisStatusStore {
    pub async fn connect(config: &RedisConfig) -> Result<Self, StoreError> {
        let conn = connect(config).await?;
        Ok(Self {
            conn,
            prefix: config.status_prefix.clone(),
        })
    }

    fn key(&self, id: TaskId) -> String {
        status_key(&self.prefix, id)
    }

    /// Incremental `SCAN` over the status keys, so the server is never blocked by
    /// a full keyspace walk.
    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn.clone();
        let mut iter = conn.scan_match::<_, String>(status_pattern(&self.prefix)).await?;
        let mut keys = Vec::new();
        while let Some(key) = iter.next_item().await {
            keys.push(key);
        }
        Ok(keys)
    }
}

fn status_key(prefix: &str, id: TaskId) -> String {
    format!("{prefix}{id}")
}

fn status_pattern(prefix: &str) -> String {
    format!("{prefix}*")
}

fn decode(raw: &str) -> Result<TaskRecord, StoreError> {
    serde_json::from_str(raw).map_err(|e| StoreError::Codec(format!("{e}: {raw}")))
}

#[async_trait]
impl StatusStore for RedisStatusStore {
    async fn put(&self, record: &TaskRecord) -> Result<(), StoreError> {
        let raw = serde_json::to_string(record).map_err(|e| StoreError::Codec(e.to_string()))?;
        let mut conn = self.conn.clone();
        let _: () = conn.set(self.key(record.id), raw).await?;
        Ok(())
    }

    async fn get(&self, id: TaskId) -> Result<Option<TaskRecord>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(self.key(id)).await?;
        raw.as_deref().map(decode).transpose()
    }

    async fn list(&self, limit: usize) -> Result<Vec<TaskRecord>, StoreError> {
        let keys = self.keys().await?;
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        for key in &keys {
            pipe.get(key);
        }
        let mut conn = self.conn.clone();
        let values: Vec<Option<String>> = pipe.query_async(&mut conn).await?;

        let mut records = Vec::with_capacity(values.len());
        for raw in values.into_iter().flatten() {
            match decode(&raw) {
                Ok(record) => records.push(record),
                // one unreadable entry should not hide the rest of the listing
                Err(e) => debug!(error = %e, "skipping undecodable status entry"),
            }
        }
        newest_first(&mut records);
        records.truncate(limit);
        Ok(records)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.keys().await?.len())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use envconfig::Envconfig;
    use redis::ErrorKind;
    use std::collections::HashMap;
    use ulid::Ulid;

    #[test]
    fn status_keys_use_the_prefix() {
        let id = TaskId::from_ulid(Ulid::new());
        assert_eq!(status_key("task_status:", id), format!("task_status:{id}"));
    }

    #[test]
    fn status_pattern_matches_only_status_keys() {
        assert_eq!(status_pattern("task_status:"), "task_status:*");
    }

    #[tokio::test]
    async fn unreachable_server_fails_fast_with_connectivity_error() {
        // grab a free port, then close it so connections are refused
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let env = HashMap::from([
            ("REDIS_HOST".to_string(), "127.0.0.1".to_string()),
            ("REDIS_PORT".to_string(), port.to_string()),
        ]);
        let config = RedisConfig::init_from_hashmap(&env).unwrap();

        let queue = tokio::time::timeout(Duration::from_secs(10), RedisWorkQueue::connect(&config))
            .await
            .expect("connect should give up well before the deadline");
        assert!(matches!(queue, Err(QueueError::Connectivity(_))));

        let store = tokio::time::timeout(Duration::from_secs(10), RedisStatusStore::connect(&config))
            .await
            .expect("connect should give up well before the deadline");
        assert!(matches!(store, Err(StoreError::Connectivity(_))));
    }

    #[test]
    fn io_errors_are_connectivity_failures() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = RedisError::from(io);
        assert!(matches!(QueueError::from(err), QueueError::Connectivity(_)));
    }

    #[test]
    fn protocol_errors_are_not_connectivity_failures() {
        let err = RedisError::from((ErrorKind::TypeError, "WRONGTYPE"));
        assert!(matches!(QueueError::from(err), QueueError::Backend(_)));
        let err = RedisError::from((ErrorKind::TypeError, "WRONGTYPE"));
        assert!(matches!(StoreError::from(err), StoreError::Backend(_)));
    }

    #[test]
    fn undecodable_status_entry_is_a_codec_error() {
        assert!(matches!(decode("not json"), Err(StoreError::Codec(_))));
    }
}
