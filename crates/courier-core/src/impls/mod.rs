//! Impls - implementations of the ports.
//!
//! # Included
//! - **InMemoryWorkQueue** / **InMemoryStatusStore**: tests and single-process runs
//! - **RedisWorkQueue** / **RedisStatusStore**: production queue and store
//! - **SmtpMailer**: mail delivery through an SMTP relay

pub mod inmem_queue;
pub mod inmem_store;
pub mod redis_backend;
pub mod smtp;

pub use self::inmem_queue::InMemoryWorkQueue;
pub use self::inmem_store::InMemoryStatusStore;
pub use self::redis_backend::{RedisStatusStore, RedisWorkQueue};
pub use self::smtp::SmtpMailer;
