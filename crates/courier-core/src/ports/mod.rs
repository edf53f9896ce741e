//! Ports - the seams between the core and the outside world.
//!
//! Each trait hides one external system (the Redis list and keyspace, the SMTP
//! relay, the wall clock) so the admission path and the worker can be driven by
//! in-memory doubles in tests.

pub mod clock;
pub mod work_queue;
pub mod id_generator;
pub mod mailer;
pub mod status_store;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::work_queue::WorkQueue;
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::mailer::{Mailer, OutgoingEmail};
pub use self::status_store::{StatusStore, newest_first};
