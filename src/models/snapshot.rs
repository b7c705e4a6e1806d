// Published exposition document

use chrono::{DateTime, Utc};

/// Result of one completed collection cycle. Never edited after creation; the
/// cache swaps whole snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub document: String,
    pub completed_at: DateTime<Utc>,
    /// Number of containers rendered into `document`.
    pub containers: usize,
}

impl Snapshot {
    pub fn new(document: String, containers: usize) -> Self {
        Self {
            document,
            completed_at: Utc::now(),
            containers,
        }
    }

    /// Completion time as whole seconds since the Unix epoch.
    pub fn completed_at_secs(&self) -> i64 {
        self.completed_at.timestamp()
    }
}
