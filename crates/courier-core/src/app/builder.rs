//! WorkerBuilder - wiring for the worker process.
//!
//! # Fail-fast
//! `build()` refuses to produce a [`WorkerLoop`] unless every [`TaskKind`] has a
//! handler, so a deploy with a missing handler dies at startup instead of failing
//! each task of that kind one by one.

use super::context::Backend;
use super::worker_loop::WorkerLoop;
use crate::config::WorkerSettings;
use crate::domain::TaskKind;
use crate::typed::{Handler, RegistryError, Task, TypedRegistry};

/// # Usage
/// ```ignore
/// let worker = WorkerBuilder::new()
///     .register::<EmailTask, _>(EmailHandler::new(mailer))?
///     .settings(WorkerSettings::from(&config))
///     .build(backend)?;
/// worker.run(shutdown_rx).await;
/// ```
pub struct WorkerBuilder {
    registry: TypedRegistry,
    settings: WorkerSettings,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing handlers for task types: {0:?}. Every task type needs a registered handler.")]
    MissingHandlers(Vec<TaskKind>),
}

impl WorkerBuilder {
    pub fn new() -> Self {
        Self {
            registry: TypedRegistry::new(),
            settings: WorkerSettings::default(),
        }
    }

    pub fn register<T: Task, H: Handler<T> + 'static>(
        mut self,
        handler: H,
    ) -> Result<Self, RegistryError> {
        self.registry.register::<T, H>(handler)?;
        Ok(self)
    }

    pub fn settings(mut self, settings: WorkerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self, backend: Backend) -> Result<WorkerLoop, BuildError> {
        let missing = self.registry.missing_kinds();
        if !missing.is_empty() {
            return Err(BuildError::MissingHandlers(missing));
        }
        Ok(WorkerLoop::new(backend, self.registry, self.settings))
    }
}

impl Default for WorkerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
