use std::time::Duration;

/// Configuration parameters for [`Synchronizer`](crate::Synchronizer).
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// The maximum permitted spread between the member timestamps of one
    /// emitted tuple.
    pub tolerance: Duration,

    /// The maximum number of messages kept per input stream. Pushing into
    /// a full stream evicts the oldest message.
    pub capacity: usize,
}

impl SyncConfig {
    pub fn new(tolerance: Duration, capacity: usize) -> Self {
        Self {
            tolerance,
            capacity,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            tolerance: Duration::from_millis(100),
            capacity: 5,
        }
    }
}
