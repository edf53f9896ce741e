//! Task Validator - admission checks on a raw submission.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{AdmissionError, Payload, TaskKind};
use crate::typed::{EmailTask, Task};

/// A submission as it arrives: `{"type": ..., "data": {...}}`.
///
/// Both fields are kept as raw JSON so that a wrong-typed `type` can be reported
/// differently from a missing one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskSubmission {
    #[serde(rename = "type", default)]
    pub task_type: Option<Value>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl TaskSubmission {
    pub fn new(task_type: impl Into<String>, data: Value) -> Self {
        Self {
            task_type: Some(Value::String(task_type.into())),
            data: Some(data),
        }
    }
}

/// Resolve the kind and check the payload against its schema.
///
/// An absent or `null` `data` is treated as an empty payload.
pub fn validate(submission: &TaskSubmission) -> Result<(TaskKind, Payload), AdmissionError> {
    let kind = match &submission.task_type {
        None | Some(Value::Null) => return Err(AdmissionError::MissingType),
        Some(Value::String(raw)) => raw.parse::<TaskKind>()?,
        Some(_) => return Err(AdmissionError::InvalidType),
    };

    let payload = match &submission.data {
        None | Some(Value::Null) => Payload::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => return Err(AdmissionError::InvalidData),
    };

    validate_payload(kind, &payload)?;
    Ok((kind, payload))
}

/// Per-kind schema check. Exhaustive: a new kind does not compile until it has one.
pub fn validate_payload(kind: TaskKind, payload: &Payload) -> Result<(), AdmissionError> {
    match kind {
        TaskKind::Email => EmailTask::validate(payload),
    }
}
