//! TaskService - the admission and query surface.
//!
//! # Flow of `submit`
//! 1. validate the submission (kind + payload schema)
//! 2. mint a fresh id and build a `queued` record
//! 3. write the record to the Status Store
//! 4. push the full record onto the Work Queue
//!
//! The write happens before the push, so a worker never dequeues a task whose
//! record does not exist yet. If the push fails after the write, the record stays
//! `queued` with no queue entry; the caller sees the queue error.

use std::sync::Arc;

use tracing::{error, info};

use super::context::Backend;
use super::status::{HealthReport, QueueStats};
use super::validator::{self, TaskSubmission};
use crate::domain::{CourierError, TaskId, TaskRecord};
use crate::ports::{IdGenerator, UlidGenerator};

pub const DEFAULT_LIST_LIMIT: usize = 100;

#[derive(Clone)]
pub struct TaskService {
    backend: Backend,
    ids: Arc<dyn IdGenerator>,
    list_limit: usize,
}

impl TaskService {
    pub fn new(backend: Backend) -> Self {
        let ids = Arc::new(UlidGenerator::new(Arc::clone(&backend.clock)));
        Self {
            backend,
            ids,
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_list_limit(mut self, list_limit: usize) -> Self {
        self.list_limit = list_limit;
        self
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Admit a task: validate, persist as `queued`, enqueue.
    pub async fn submit(&self, submission: TaskSubmission) -> Result<TaskRecord, CourierError> {
        let (kind, payload) = validator::validate(&submission)?;
        let record = TaskRecord::new(
            self.ids.generate_task_id(),
            kind,
            payload,
            self.backend.clock.now(),
        );

        self.backend.store.put(&record).await?;
        if let Err(e) = self.backend.queue.enqueue(&record).await {
            error!(task_id = %record.id, error = %e, "task recorded but could not be enqueued");
            return Err(e.into());
        }

        info!(task_id = %record.id, kind = %record.kind, "task queued");
        Ok(record)
    }

    pub async fn get(&self, id: TaskId) -> Result<TaskRecord, CourierError> {
        self.backend
            .store
            .get(id)
            .await?
            .ok_or(CourierError::NotFound(id))
    }

    /// Most recent records first, capped at the list limit.
    pub async fn list(&self) -> Result<Vec<TaskRecord>, CourierError> {
        Ok(self.backend.store.list(self.list_limit).await?)
    }

    pub async fn stats(&self) -> Result<QueueStats, CourierError> {
        Ok(QueueStats {
            queue_length: self.backend.queue.len().await?,
            total_tasks: self.backend.store.count().await?,
        })
    }

    pub async fn health(&self) -> HealthReport {
        let queue = self.backend.queue.ping().await;
        let store = self.backend.store.ping().await;
        if let Err(e) = &queue {
            error!(error = %e, "health check: queue unreachable");
        }
        if let Err(e) = &store {
            error!(error = %e, "health check: store unreachable");
        }
        HealthReport::from_reachable(queue.is_ok() && store.is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AdmissionError, QueueError, TaskKind, TaskStatus};
    use crate::impls::{InMemoryStatusStore, InMemoryWorkQueue};
    use crate::ports::{FixedClock, WorkQueue};
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use serde_json::json;
    use std::time::Duration;

    struct DownQueue;

    #[async_trait]
    impl WorkQueue for DownQueue {
        async fn enqueue(&self, _record: &TaskRecord) -> Result<(), QueueError> {
            Err(QueueError::Connectivity("connection refused".into()))
        }
        async fn dequeue(&self, _timeout: Duration) -> Result<Option<TaskRecord>, QueueError> {
            Err(QueueError::Connectivity("connection refused".into()))
        }
        async fn len(&self) -> Result<usize, QueueError> {
            Err(QueueError::Connectivity("connection refused".into()))
        }
        async fn ping(&self) -> Result<(), QueueError> {
            Err(QueueError::Connectivity("connection refused".into()))
        }
    }

    fn email(recipient: &str) -> TaskSubmission {
        TaskSubmission::new("email", json!({ "recipient": recipient, "content": "hi" }))
    }

    fn service() -> (TaskService, InMemoryWorkQueue, InMemoryStatusStore) {
        let queue = InMemoryWorkQueue::new();
        let store = InMemoryStatusStore::new();
        let backend = Backend::new(Arc::new(store.clone()), Arc::new(queue.clone()));
        (TaskService::new(backend), queue, store)
    }

    #[tokio::test]
    async fn submit_records_then_enqueues() {
        let (service, queue, _store) = service();

        let record = service.submit(email("a@x.com")).await.unwrap();
        assert_eq!(record.status, TaskStatus::Queued);
        assert_eq!(record.kind, TaskKind::Email);
        assert_eq!(record.created_at, record.updated_at);
        assert!(record.result.is_none() && record.error.is_none());

        let stored = service.get(record.id).await.unwrap();
        assert_eq!(stored, record);

        let entry = queue.dequeue(Duration::from_millis(10)).await.unwrap();
        assert_eq!(entry, Some(record));
    }

    #[tokio::test]
    async fn identical_submissions_get_distinct_ids() {
        let (service, queue, _store) = service();

        let a = service.submit(email("a@x.com")).await.unwrap();
        let b = service.submit(email("a@x.com")).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(queue.len().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn rejected_submission_writes_nothing() {
        let (service, queue, _store) = service();

        let err = service
            .submit(TaskSubmission::new("sms", json!({})))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CourierError::Admission(AdmissionError::UnknownType(_))
        ));
        assert_eq!(queue.len().await.unwrap(), 0);
        assert_eq!(service.stats().await.unwrap().total_tasks, 0);
    }

    #[tokio::test]
    async fn get_unknown_id_is_not_found() {
        let (service, _queue, _store) = service();
        let id = TaskId::from_ulid(ulid::Ulid::new());

        assert!(matches!(
            service.get(id).await,
            Err(CourierError::NotFound(missing)) if missing == id
        ));
    }

    #[tokio::test]
    async fn enqueue_failure_leaves_a_queued_record_behind() {
        let store = InMemoryStatusStore::new();
        let backend = Backend::new(Arc::new(store.clone()), Arc::new(DownQueue));
        let service = TaskService::new(backend);

        let err = service.submit(email("a@x.com")).await.unwrap_err();
        assert!(matches!(err, CourierError::Queue(QueueError::Connectivity(_))));

        let orphans = service.list().await.unwrap();
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].status, TaskStatus::Queued);
    }

    #[tokio::test]
    async fn list_is_newest_first_and_capped() {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        ));
        let backend = Backend::in_memory().with_clock(clock.clone());
        let service = TaskService::new(backend).with_list_limit(2);

        let mut ids = Vec::new();
        for n in 0..3 {
            let record = service.submit(email(&format!("{n}@x.com"))).await.unwrap();
            ids.push(record.id);
            clock.advance(ChronoDuration::seconds(1));
        }

        let listed: Vec<TaskId> = service.list().await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(listed, vec![ids[2], ids[1]]);
    }

    #[tokio::test]
    async fn stats_count_queue_and_store() {
        let (service, queue, _store) = service();
        service.submit(email("a@x.com")).await.unwrap();
        service.submit(email("b@x.com")).await.unwrap();
        queue.dequeue(Duration::from_millis(10)).await.unwrap();

        assert_eq!(
            service.stats().await.unwrap(),
            QueueStats {
                queue_length: 1,
                total_tasks: 2
            }
        );
    }

    #[tokio::test]
    async fn health_reflects_backend_reachability() {
        let (service, _queue, _store) = service();
        assert!(service.health().await.is_healthy());

        let down = TaskService::new(Backend::new(
            Arc::new(InMemoryStatusStore::new()),
            Arc::new(DownQueue),
        ));
        assert!(!down.health().await.is_healthy());
    }
}
