//! WorkerLoop - the consumer side.
//!
//! # Flow of one iteration
//! 1. `WorkQueue::dequeue` with a short timeout (nothing ready → next iteration)
//! 2. record `processing` in the Status Store (best effort)
//! 3. dispatch the payload through the [`TypedRegistry`]
//! 4. record `completed` + result, or `failed` + error
//!
//! # Failure handling
//! - A handler failure is the task's failure: it is written onto the record and
//!   the loop moves on without pausing.
//! - Queue connectivity failures pause the loop for the long backoff, anything
//!   else that goes wrong pauses it for the short one.
//! - Handlers run on their own tokio task, so a panic or an overrun of the handler
//!   timeout fails that task instead of taking the loop down.
//!
//! Delivery is at-most-once: a task popped by a worker that dies before step 4 is
//! not redelivered and its record keeps the last status written.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tracing::{Instrument, debug, error, info, info_span, warn};

use super::context::Backend;
use crate::config::WorkerSettings;
use crate::domain::{Payload, TaskError, TaskId, TaskKind, TaskRecord, TaskStatus, WorkerError};
use crate::typed::TypedRegistry;

/// What one iteration did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Iteration {
    /// The dequeue timed out.
    Idle,
    /// A task was taken and its terminal status written.
    Processed { id: TaskId, status: TaskStatus },
}

pub struct WorkerLoop {
    backend: Backend,
    registry: Arc<TypedRegistry>,
    settings: WorkerSettings,
}

impl WorkerLoop {
    /// Prefer [`super::WorkerBuilder`], which refuses a registry missing a kind.
    pub fn new(backend: Backend, registry: TypedRegistry, settings: WorkerSettings) -> Self {
        Self {
            backend,
            registry: Arc::new(registry),
            settings,
        }
    }

    pub fn settings(&self) -> &WorkerSettings {
        &self.settings
    }

    /// Run until `shutdown` turns `true` or its sender is dropped.
    ///
    /// Shutdown is checked between iterations and interrupts backoff pauses. A
    /// handler already running is allowed to finish and its status is written.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            registered = ?self.registry.registered_kinds(),
            "worker started, waiting for tasks"
        );

        while !stopping(&shutdown) {
            let Err(e) = self.run_once().await else {
                continue;
            };

            let backoff = self.backoff_for(&e);
            if e.is_queue_connectivity() {
                warn!(error = %e, ?backoff, "work queue unreachable, backing off");
            } else {
                error!(error = %e, ?backoff, "worker iteration failed, backing off");
            }

            if !pause(backoff, &mut shutdown).await {
                break;
            }
        }

        info!("worker stopped");
    }

    /// Spawn [`Self::run`] onto the runtime.
    pub fn spawn(self) -> WorkerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(async move { self.run(shutdown_rx).await });
        WorkerHandle { shutdown_tx, join }
    }

    /// One dequeue-and-process step.
    pub async fn run_once(&self) -> Result<Iteration, WorkerError> {
        match self.backend.queue.dequeue(self.settings.dequeue_timeout).await? {
            None => Ok(Iteration::Idle),
            Some(record) => {
                let span = info_span!("task", task_id = %record.id, kind = %record.kind);
                self.process(record).instrument(span).await
            }
        }
    }

    fn backoff_for(&self, e: &WorkerError) -> Duration {
        if e.is_queue_connectivity() {
            self.settings.connectivity_backoff
        } else {
            self.settings.error_backoff
        }
    }

    async fn process(&self, mut record: TaskRecord) -> Result<Iteration, WorkerError> {
        info!("task received");

        record.start_processing(self.backend.clock.now())?;
        if let Err(e) = self.backend.store.put(&record).await {
            warn!(error = %e, "could not record processing status, continuing");
        }

        let outcome = self.execute(record.kind, record.payload.clone()).await;
        let now = self.backend.clock.now();
        match outcome {
            Ok(result) => {
                info!(%result, "task completed");
                record.complete(result, now)?;
            }
            Err(e) => {
                warn!(error = %e, "task failed");
                record.fail(e.to_string(), now)?;
            }
        }

        self.backend.store.put(&record).await?;
        debug!(status = %record.status, "terminal status recorded");

        Ok(Iteration::Processed {
            id: record.id,
            status: record.status,
        })
    }

    async fn execute(&self, kind: TaskKind, payload: Payload) -> Result<String, TaskError> {
        let registry = Arc::clone(&self.registry);
        let mut handle = tokio::spawn(
            async move { registry.dispatch(kind, payload).await }.in_current_span(),
        );

        let joined = match self.settings.handler_timeout {
            None => handle.await,
            Some(limit) => match tokio::time::timeout(limit, &mut handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    handle.abort();
                    return Err(TaskError::TimedOut(limit));
                }
            },
        };

        joined.unwrap_or_else(|e| Err(join_failure(e)))
    }
}

/// Handle on a spawned [`WorkerLoop`].
pub struct WorkerHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl WorkerHandle {
    /// Stop taking new tasks. An in-flight handler still runs to completion.
    pub fn request_shutdown(&self) {
        // receivers may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    /// True once the loop has exited.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        if let Err(e) = self.join.await {
            error!(error = %e, "worker task ended abnormally");
        }
    }
}

fn stopping(shutdown: &watch::Receiver<bool>) -> bool {
    *shutdown.borrow() || shutdown.has_changed().is_err()
}

/// Sleep for `backoff` unless shutdown arrives first. Returns whether to keep going.
async fn pause(backoff: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(backoff) => true,
        changed = shutdown.changed() => changed.is_ok() && !*shutdown.borrow(),
    }
}

fn join_failure(e: JoinError) -> TaskError {
    if e.is_panic() {
        TaskError::Panicked(panic_message(e.into_panic()))
    } else {
        TaskError::Other("handler was cancelled".to_string())
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
