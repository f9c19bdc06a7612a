// Memory Journal — Per-project mutation locks
// Every orchestrator operation is a read-modify-write of (journal, persisted
// state). Holding the project's guard for the whole operation keeps a single
// writer per project; different projects never contend.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;

#[derive(Default)]
pub struct ProjectLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ProjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `project_id`. The guard releases on drop.
    pub async fn acquire(&self, project_id: &str) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the map lock is not held across the await.
        let lock = {
            let mut map = self.locks.lock();
            map.entry(project_id.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Number of projects with a lock entry.
    pub fn tracked_projects(&self) -> usize {
        self.locks.lock().len()
    }

    /// Drop entries nobody holds or waits on; returns how many were removed.
    /// A waiter always owns a clone of the Arc, so a live entry is never evicted.
    pub fn prune_idle(&self) -> usize {
        let mut map = self.locks.lock();
        let before = map.len();
        map.retain(|_, lock| Arc::strong_count(lock) > 1);
        before - map.len()
    }
}
