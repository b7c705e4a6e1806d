// Latest published snapshot, swapped atomically.

use crate::models::Snapshot;
use arc_swap::ArcSwapOption;
use std::sync::Arc;

/// Holds the most recent completed snapshot. One writer (the scheduler) and
/// any number of readers; a reader gets either a whole snapshot or none.
#[derive(Default)]
pub struct SnapshotCache {
    current: ArcSwapOption<Snapshot>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self) -> Option<Arc<Snapshot>> {
        self.current.load_full()
    }

    /// Replace the cached snapshot. `completed_at` never moves backwards, even
    /// if the wall clock does.
    pub fn publish(&self, mut snapshot: Snapshot) {
        if let Some(prev) = self.current.load_full()
            && snapshot.completed_at < prev.completed_at
        {
            snapshot.completed_at = prev.completed_at;
        }
        self.current.store(Some(Arc::new(snapshot)));
    }
}
