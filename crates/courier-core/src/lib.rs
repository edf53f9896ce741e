//! courier-core
//!
//! Core building blocks for the Courier task pipeline: producers submit typed
//! tasks, a worker executes them, and every task's lifecycle is queryable.
//!
//! # Modules
//! - **domain**: task ids, kinds, statuses, the Task Record and error types
//! - **ports**: seams to the outside (StatusStore, WorkQueue, Mailer, Clock, IdGenerator)
//! - **typed**: typed Task API (Task trait, Handler trait, TypedRegistry, email task)
//! - **app**: TaskService, WorkerLoop, WorkerBuilder
//! - **impls**: in-memory, Redis and SMTP implementations of the ports
//! - **config**: environment-driven configuration

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod typed;
