//! Status views - queue statistics and health.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    /// Entries waiting in the Work Queue.
    pub queue_length: usize,
    /// Records in the Status Store.
    pub total_tasks: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendState {
    Connected,
    Disconnected,
}

/// Reachability of the queue/store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub backend: BackendState,
}

impl HealthReport {
    pub fn from_reachable(reachable: bool) -> Self {
        if reachable {
            Self {
                status: HealthStatus::Healthy,
                backend: BackendState::Connected,
            }
        } else {
            Self {
                status: HealthStatus::Unhealthy,
                backend: BackendState::Disconnected,
            }
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}
