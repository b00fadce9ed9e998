use serde::{Deserialize, Serialize};

/// Availability of the compute worker as reported to the UI context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Idle,
    Busy,
}

impl WorkerState {
    pub fn is_busy(self) -> bool {
        self == WorkerState::Busy
    }
}

/// Memory snapshot of the compute worker, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemoryUsage {
    pub total: u64,
    pub used: u64,
}
