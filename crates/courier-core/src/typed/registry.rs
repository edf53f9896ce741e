//! TypedRegistry - the Processor Registry.
//!
//! Maps each [`TaskKind`] to the handler that runs it. New kinds get a new
//! handler registered here; the worker loop does not change.

use std::collections::HashMap;
use std::sync::Arc;

use super::handler::{DynHandler, Handler, TypedHandler};
use super::task::Task;
use crate::domain::{Payload, TaskError, TaskKind};

/// Registry of type-erased handlers keyed by kind.
///
/// # Usage
/// ```ignore
/// let mut registry = TypedRegistry::new();
/// registry.register::<EmailTask, _>(EmailHandler::new(mailer))?;
///
/// let result = registry.dispatch(TaskKind::Email, payload).await;
/// ```
#[derive(Default)]
pub struct TypedRegistry {
    handlers: HashMap<TaskKind, Arc<dyn DynHandler>>,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Handler for task type '{0}' is already registered")]
    AlreadyRegistered(TaskKind),
}

impl TypedRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register<T: Task, H: Handler<T> + 'static>(
        &mut self,
        handler: H,
    ) -> Result<(), RegistryError> {
        if self.handlers.contains_key(&T::KIND) {
            return Err(RegistryError::AlreadyRegistered(T::KIND));
        }
        self.handlers
            .insert(T::KIND, Arc::new(TypedHandler::<T, H>::new(handler)));
        Ok(())
    }

    pub fn get(&self, kind: TaskKind) -> Option<Arc<dyn DynHandler>> {
        self.handlers.get(&kind).cloned()
    }

    pub fn registered_kinds(&self) -> Vec<TaskKind> {
        let mut kinds: Vec<TaskKind> = self.handlers.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Kinds with no handler yet.
    pub fn missing_kinds(&self) -> Vec<TaskKind> {
        TaskKind::ALL
            .iter()
            .copied()
            .filter(|kind| !self.handlers.contains_key(kind))
            .collect()
    }

    /// Run the handler for `kind`. An unregistered kind is a task failure.
    pub async fn dispatch(&self, kind: TaskKind, payload: Payload) -> Result<String, TaskError> {
        let handler = self.get(kind).ok_or(TaskError::NoHandler(kind))?;
        handler.handle_dyn(payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typed::email::EmailTask;
    use async_trait::async_trait;
    use serde_json::json;

    struct FixedHandler(&'static str);

    #[async_trait]
    impl Handler<EmailTask> for FixedHandler {
        async fn handle(&self, _task: EmailTask) -> Result<String, TaskError> {
            Ok(self.0.to_string())
        }
    }

    fn email_payload() -> Payload {
        json!({ "recipient": "a@x.com", "content": "hi" })
            .as_object()
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = TypedRegistry::new();
        registry.register::<EmailTask, _>(FixedHandler("ok")).unwrap();

        let retrieved = registry.get(TaskKind::Email);
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().kind(), TaskKind::Email);
    }

    #[test]
    fn test_double_registration() {
        let mut registry = TypedRegistry::new();
        registry.register::<EmailTask, _>(FixedHandler("first")).unwrap();
        let result = registry.register::<EmailTask, _>(FixedHandler("second"));
        assert!(matches!(
            result,
            Err(RegistryError::AlreadyRegistered(TaskKind::Email))
        ));
    }

    #[test]
    fn test_registered_and_missing_kinds() {
        let mut registry = TypedRegistry::new();
        assert_eq!(registry.missing_kinds(), TaskKind::ALL.to_vec());
        assert!(registry.registered_kinds().is_empty());

        registry.register::<EmailTask, _>(FixedHandler("ok")).unwrap();
        assert_eq!(registry.registered_kinds(), vec![TaskKind::Email]);
        assert!(registry.missing_kinds().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_runs_registered_handler() {
        let mut registry = TypedRegistry::new();
        registry.register::<EmailTask, _>(FixedHandler("sent")).unwrap();

        let result = registry.dispatch(TaskKind::Email, email_payload()).await;
        assert_eq!(result, Ok("sent".to_string()));
    }

    #[tokio::test]
    async fn test_dispatch_without_handler_fails_the_task() {
        let registry = TypedRegistry::new();

        let err = registry
            .dispatch(TaskKind::Email, email_payload())
            .await
            .unwrap_err();
        assert_eq!(err, TaskError::NoHandler(TaskKind::Email));
        assert_eq!(err.to_string(), "no handler registered for task type email");
    }
}
