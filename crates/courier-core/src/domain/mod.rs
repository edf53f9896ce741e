//! Domain model (ids, kinds, statuses, records, errors).

pub mod errors;
pub mod ids;
pub mod record;
pub mod state;
pub mod task_type;

pub use self::errors::{
    AdmissionError, CourierError, MailError, QueueError, StoreError, TaskError, WorkerError,
};
pub use self::ids::{InvalidTaskId, TaskId};
pub use self::record::{Payload, TaskRecord, TransitionError};
pub use self::state::TaskStatus;
pub use self::task_type::{TaskKind, UnknownTaskKind};
