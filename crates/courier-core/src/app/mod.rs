//! App - the application layer.
//!
//! Combines the ports into the two halves of the pipeline.
//!
//! # Components
//! - **TaskService**: admission (validate → record → enqueue) and queries
//! - **WorkerLoop**: dequeue → processing → dispatch → terminal status, with backoff
//! - **WorkerBuilder**: handler registration with a startup completeness check
//! - **Backend**: the store/queue/clock handles both halves share

pub mod builder;
pub mod context;
pub mod service;
pub mod status;
pub mod validator;
pub mod worker_loop;

pub use self::builder::{BuildError, WorkerBuilder};
pub use self::context::Backend;
pub use self::service::{DEFAULT_LIST_LIMIT, TaskService};
pub use self::status::{BackendState, HealthReport, HealthStatus, QueueStats};
pub use self::validator::{TaskSubmission, validate, validate_payload};
pub use self::worker_loop::{Iteration, WorkerHandle, WorkerLoop};
