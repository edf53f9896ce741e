//! Errors - error types and their classification.
//!
//! # Taxonomy
//! - [`AdmissionError`]: the submission is rejected synchronously.
//! - [`CourierError::NotFound`]: unknown task id on the query surface.
//! - [`QueueError`] / [`StoreError`]: infrastructure. Connectivity failures are
//!   told apart from everything else so the worker can pick its backoff.
//! - [`TaskError`]: a handler failed. Captured into the record's `error` field and
//!   never propagated past the worker iteration.
//! - [`WorkerError`]: an iteration failed for a reason that is not the task's fault.

use std::time::Duration;

use thiserror::Error;

use super::ids::TaskId;
use super::task_type::{TaskKind, UnknownTaskKind};
use super::record::TransitionError;

/// Why a submission was refused at admission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    #[error("missing required field: type")]
    MissingType,

    #[error("field `type` must be a string")]
    InvalidType,

    #[error(transparent)]
    UnknownType(#[from] UnknownTaskKind),

    #[error("field `data` must be an object")]
    InvalidData,

    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("field `{field}` must be a {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("field `{field}` must not be empty")]
    EmptyField { field: &'static str },
}

impl AdmissionError {
    /// True when a required field is absent, as opposed to present but invalid.
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            AdmissionError::MissingType | AdmissionError::MissingField { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("work queue unreachable: {0}")]
    Connectivity(String),

    #[error("queue entry could not be encoded or decoded: {0}")]
    Codec(String),

    #[error("work queue error: {0}")]
    Backend(String),
}

impl QueueError {
    pub fn is_connectivity(&self) -> bool {
        matches!(self, QueueError::Connectivity(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("status store unreachable: {0}")]
    Connectivity(String),

    #[error("task record could not be encoded or decoded: {0}")]
    Codec(String),

    #[error("status store error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MailError {
    #[error("missing required config: {0}")]
    MissingConfig(String),

    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// A handler-level failure. Recorded on the task, never raised out of the loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error(transparent)]
    Mail(#[from] MailError),

    #[error("no handler registered for task type {0}")]
    NoHandler(TaskKind),

    #[error("handler timed out after {0:?}")]
    TimedOut(Duration),

    #[error("handler panicked: {0}")]
    Panicked(String),

    #[error("{0}")]
    Other(String),
}

/// Failure of one worker iteration that is not attributable to the task.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl WorkerError {
    /// Only queue connectivity earns the long backoff; everything else is
    /// unclassified.
    pub fn is_queue_connectivity(&self) -> bool {
        matches!(self, WorkerError::Queue(e) if e.is_connectivity())
    }
}

/// Errors surfaced synchronously by the admission/query surface.
#[derive(Debug, Error)]
pub enum CourierError {
    #[error(transparent)]
    Admission(#[from] AdmissionError),

    #[error("task not found: {0}")]
    NotFound(TaskId),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_are_told_apart_from_invalid_ones() {
        assert!(AdmissionError::MissingType.is_missing());
        assert!(AdmissionError::MissingField { field: "recipient" }.is_missing());
        assert!(!AdmissionError::InvalidType.is_missing());
        assert!(
            !AdmissionError::WrongType {
                field: "content",
                expected: "string"
            }
            .is_missing()
        );
        assert!(!AdmissionError::EmptyField { field: "content" }.is_missing());
    }

    #[test]
    fn only_queue_connectivity_is_classified() {
        let conn = WorkerError::from(QueueError::Connectivity("refused".into()));
        let codec = WorkerError::from(QueueError::Codec("bad json".into()));
        let store = WorkerError::from(StoreError::Connectivity("refused".into()));

        assert!(conn.is_queue_connectivity());
        assert!(!codec.is_queue_connectivity());
        assert!(!store.is_queue_connectivity());
    }

    #[test]
    fn mail_errors_read_as_delivery_failures() {
        let err = TaskError::from(MailError::Delivery("authentication failed".into()));
        assert_eq!(err.to_string(), "delivery failed: authentication failed");
    }
}
