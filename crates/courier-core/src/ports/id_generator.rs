//! IdGenerator port - task id allocation.
//!
//! # Implementations
//! - **UlidGenerator**: ULID from the clock's millisecond timestamp plus 80 random bits.

use std::sync::Arc;

use ulid::Ulid;

use crate::domain::TaskId;
use crate::ports::Clock;

/// IdGenerator hands out task ids.
///
/// # Thread Safety
/// - `Send + Sync` is required: concurrent submissions share one generator and
///   need no other coordination.
pub trait IdGenerator: Send + Sync {
    fn generate_task_id(&self) -> TaskId;
}

/// ULID-based generator.
///
/// Reads the timestamp from a [`Clock`], so a [`crate::ports::FixedClock`] gives
/// ids with a predictable time component (the random part still differs).
pub struct UlidGenerator {
    clock: Arc<dyn Clock>,
}

impl UlidGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl IdGenerator for UlidGenerator {
    fn generate_task_id(&self) -> TaskId {
        let timestamp_ms = self.clock.now().timestamp_millis().max(0) as u64;
        let ulid = Ulid::from_parts(timestamp_ms, rand::random());
        TaskId::from(ulid)
    }
}
