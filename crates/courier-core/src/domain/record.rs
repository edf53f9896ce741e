//! Task record: the persisted state of one submitted unit of work.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::TaskId;
use super::state::TaskStatus;
use super::task_type::TaskKind;

/// Task payload. Opaque to the store; checked per kind before admission.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// One unit of work and its status.
///
/// Design:
/// - `id`, `kind`, `payload` and `created_at` are fixed at admission.
/// - All status changes go through the transition methods, which refuse anything
///   but `queued → processing → {completed | failed}`.
/// - `updated_at` is never moved backwards, even if the clock is.
/// - `result` is only ever set with `completed`, `error` only with `failed`.
///
/// The same serialized form travels through the Work Queue and sits in the
/// Status Store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,

    #[serde(rename = "type")]
    pub kind: TaskKind,

    pub payload: Payload,

    pub status: TaskStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A status change the lifecycle does not allow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("task {id}: illegal status transition {from} -> {to}")]
pub struct TransitionError {
    pub id: TaskId,
    pub from: TaskStatus,
    pub to: TaskStatus,
}

impl TaskRecord {
    pub fn new(id: TaskId, kind: TaskKind, payload: Payload, now: DateTime<Utc>) -> Self {
        Self {
            id,
            kind,
            payload,
            status: TaskStatus::Queued,
            created_at: now,
            updated_at: now,
            result: None,
            error: None,
        }
    }

    /// Mark as picked up by a worker.
    pub fn start_processing(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError> {
        self.transition(TaskStatus::Processing, now)
    }

    /// Mark as completed with the handler's result.
    pub fn complete(&mut self, result: String, now: DateTime<Utc>) -> Result<(), TransitionError> {
        self.transition(TaskStatus::Completed, now)?;
        self.result = Some(result);
        Ok(())
    }

    /// Mark as failed with a description of what went wrong.
    pub fn fail(&mut self, error: String, now: DateTime<Utc>) -> Result<(), TransitionError> {
        self.transition(TaskStatus::Failed, now)?;
        self.error = Some(error);
        Ok(())
    }

    fn transition(&mut self, next: TaskStatus, now: DateTime<Utc>) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(TransitionError {
                id: self.id,
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = now.max(self.updated_at);
        Ok(())
    }
}
