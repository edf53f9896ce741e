//! Task trait - ties a payload type to its kind and admission checks.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::{AdmissionError, Payload, TaskKind};

/// A typed task payload.
///
/// # Example
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct ResizeTask {
///     url: String,
/// }
///
/// impl Task for ResizeTask {
///     const KIND: TaskKind = TaskKind::Resize;
///
///     fn validate(payload: &Payload) -> Result<(), AdmissionError> {
///         fields::require_string(payload, "url").map(|_| ())
///     }
/// }
/// ```
///
/// # Trait Bounds
/// - `DeserializeOwned`: the worker rebuilds `Self` from the record's payload
/// - `Send + Sync + 'static`: handlers live behind `Arc` and run on the runtime
pub trait Task: Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: TaskKind;

    /// Schema check run once, before the task is admitted.
    fn validate(payload: &Payload) -> Result<(), AdmissionError>;
}

/// Field checks shared by task schemas.
pub mod fields {
    use serde_json::Value;

    use crate::domain::{AdmissionError, Payload};

    /// A present, non-empty string.
    pub fn require_string<'a>(
        payload: &'a Payload,
        field: &'static str,
    ) -> Result<&'a str, AdmissionError> {
        match payload.get(field) {
            None | Some(Value::Null) => Err(AdmissionError::MissingField { field }),
            Some(Value::String(s)) if s.trim().is_empty() => {
                Err(AdmissionError::EmptyField { field })
            }
            Some(Value::String(s)) => Ok(s),
            Some(_) => Err(AdmissionError::WrongType {
                field,
                expected: "string",
            }),
        }
    }

    /// An optional string; absent and `null` both read as `None`.
    pub fn optional_string<'a>(
        payload: &'a Payload,
        field: &'static str,
    ) -> Result<Option<&'a str>, AdmissionError> {
        match payload.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(AdmissionError::WrongType {
                field,
                expected: "string",
            }),
        }
    }
}
