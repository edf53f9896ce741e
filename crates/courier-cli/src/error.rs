//! HTTP error mapping for the producer API.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use courier_core::domain::{CourierError, InvalidTaskId};

/// An error rendered as `{"error": "..."}` with a status code.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<CourierError> for HttpError {
    fn from(err: CourierError) -> Self {
        let status = match &err {
            CourierError::Admission(e) if e.is_missing() => StatusCode::BAD_REQUEST,
            CourierError::Admission(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CourierError::NotFound(_) => StatusCode::NOT_FOUND,
            CourierError::Queue(_) | CourierError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        if status == StatusCode::SERVICE_UNAVAILABLE {
            tracing::error!(error = %err, "backend unavailable");
        }
        Self::new(status, err.to_string())
    }
}

// An id that does not parse cannot name a stored task.
impl From<InvalidTaskId> for HttpError {
    fn from(err: InvalidTaskId) -> Self {
        Self::new(StatusCode::NOT_FOUND, err.to_string())
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::domain::{AdmissionError, QueueError, TaskId, UnknownTaskKind};

    #[test]
    fn status_mapping() {
        let cases = [
            (AdmissionError::MissingType.into(), StatusCode::BAD_REQUEST),
            (
                AdmissionError::MissingField { field: "recipient" }.into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                AdmissionError::UnknownType(UnknownTaskKind("sms".into())).into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AdmissionError::EmptyField { field: "content" }.into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                CourierError::NotFound("01J0000000000000000000000Z".parse::<TaskId>().unwrap()),
                StatusCode::NOT_FOUND,
            ),
            (
                QueueError::Connectivity("refused".into()).into(),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (err, expected) in cases {
            let err: CourierError = err;
            assert_eq!(HttpError::from(err).status(), expected);
        }
    }
}
