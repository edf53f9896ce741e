//! Producer HTTP API.
//!
//! | route              | handler       |
//! |--------------------|---------------|
//! | `POST /tasks`      | submit a task, returns the queued record |
//! | `GET /tasks/{id}`  | one record    |
//! | `GET /tasks`       | recent records|
//! | `GET /queue/stats` | queue length and record count |
//! | `GET /health`      | backend reachability |

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use courier_core::app::{QueueStats, TaskService, TaskSubmission};
use courier_core::domain::{TaskId, TaskRecord};

use crate::error::HttpError;

#[derive(Debug, Serialize)]
pub struct TaskList {
    pub tasks: Vec<TaskRecord>,
    pub count: usize,
}

pub fn router(service: TaskService) -> Router {
    Router::new()
        .route("/tasks", post(submit_task).get(list_tasks))
        .route("/tasks/{id}", get(get_task))
        .route("/queue/stats", get(queue_stats))
        .route("/health", get(health))
        .with_state(service)
}

async fn submit_task(
    State(service): State<TaskService>,
    body: Result<Json<TaskSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskRecord>), HttpError> {
    let Json(submission) = body?;
    let record = service.submit(submission).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn get_task(
    State(service): State<TaskService>,
    Path(id): Path<String>,
) -> Result<Json<TaskRecord>, HttpError> {
    let id: TaskId = id.parse()?;
    Ok(Json(service.get(id).await?))
}

async fn list_tasks(State(service): State<TaskService>) -> Result<Json<TaskList>, HttpError> {
    let tasks = service.list().await?;
    Ok(Json(TaskList {
        count: tasks.len(),
        tasks,
    }))
}

async fn queue_stats(State(service): State<TaskService>) -> Result<Json<QueueStats>, HttpError> {
    Ok(Json(service.stats().await?))
}

async fn health(State(service): State<TaskService>) -> impl IntoResponse {
    let report = service.health().await;
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}
