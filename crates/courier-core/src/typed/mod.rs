//! Typed task API.
//!
//! - **Task**: a payload type bound to a [`crate::domain::TaskKind`] and its schema check
//! - **Handler**: typed execution logic, erased to `DynHandler` for storage
//! - **TypedRegistry**: kind → handler, used by the worker for dispatch
//! - **email**: the `email` task and its handler

pub mod email;
pub mod handler;
pub mod registry;
pub mod task;

pub use self::email::{EmailHandler, EmailTask};
pub use self::handler::{DynHandler, Handler, TypedHandler};
pub use self::registry::{RegistryError, TypedRegistry};
pub use self::task::Task;
