//! Handler trait - the type-specific logic the worker invokes.
//!
//! - `Handler<T>` is what task authors implement, against a typed payload
//! - `DynHandler` is the object-safe form the registry stores
//! - `TypedHandler<T, H>` bridges the two by decoding the payload first

use std::marker::PhantomData;

use async_trait::async_trait;

use super::task::Task;
use crate::domain::{Payload, TaskError, TaskKind};

/// Runs one task and returns a human-readable result.
///
/// # Example
/// ```ignore
/// struct ResizeHandler;
///
/// #[async_trait]
/// impl Handler<ResizeTask> for ResizeHandler {
///     async fn handle(&self, task: ResizeTask) -> Result<String, TaskError> {
///         Ok(format!("Resized {}", task.url))
///     }
/// }
/// ```
#[async_trait]
pub trait Handler<T: Task>: Send + Sync {
    async fn handle(&self, task: T) -> Result<String, TaskError>;
}

/// Object-safe handler over an untyped payload.
#[async_trait]
pub trait DynHandler: Send + Sync {
    async fn handle_dyn(&self, payload: Payload) -> Result<String, TaskError>;
    fn kind(&self) -> TaskKind;
}

pub struct TypedHandler<T: Task, H: Handler<T>> {
    handler: H,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Task, H: Handler<T>> TypedHandler<T, H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T: Task, H: Handler<T>> DynHandler for TypedHandler<T, H> {
    async fn handle_dyn(&self, payload: Payload) -> Result<String, TaskError> {
        let task: T = serde_json::from_value(serde_json::Value::Object(payload))
            .map_err(|e| TaskError::InvalidPayload(e.to_string()))?;
        self.handler.handle(task).await
    }

    fn kind(&self) -> TaskKind {
        T::KIND
    }
}
