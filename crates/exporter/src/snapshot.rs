use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use lagwatch_common::snapshot::{EndpointSnapshot, Snapshot};

/// Shared read-mostly view of the latest normalized statuses. Writers
/// build a complete new snapshot and swap the `Arc`; readers (exposition
/// handler, evaluation loop) always hold a consistent cycle, never a
/// partially updated one.
pub struct SnapshotStore {
    inner: RwLock<Arc<Snapshot>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Arc::new(Snapshot::default())),
        }
    }

    pub fn load(&self) -> Arc<Snapshot> {
        self.inner.read().expect("snapshot lock poisoned").clone()
    }

    /// Publishes one poll cycle: every polled endpoint's entry is replaced
    /// whole, entries for endpoints no longer registered are dropped, and
    /// stale updates (older than the stored cycle for that endpoint) are
    /// discarded.
    pub fn publish_cycle(&self, updates: Vec<EndpointSnapshot>, registered: &[String]) {
        let registered: HashSet<&String> = registered.iter().collect();
        let current = self.load();

        let mut next = Snapshot::default();
        for (id, entry) in &current.endpoints {
            if registered.contains(id) {
                next.endpoints.insert(id.clone(), entry.clone());
            }
        }
        for update in updates {
            if !registered.contains(&update.endpoint) {
                continue;
            }
            match next.endpoints.get(&update.endpoint) {
                Some(existing) if existing.polled_at_ms > update.polled_at_ms => {}
                _ => {
                    next.endpoints.insert(update.endpoint.clone(), update);
                }
            }
        }

        *self.inner.write().expect("snapshot lock poisoned") = Arc::new(next);
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
