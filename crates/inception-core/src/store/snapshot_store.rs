// ── Atomic snapshot holder ──
//
// Reads are wait-free through `ArcSwap`; subscribers are woken through a
// `watch` channel carrying the same `Arc`. Only the coordinator commits.

use std::collections::BTreeMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::Utc;
use tokio::sync::watch;

use super::diff::{EntityChange, diff};
use super::snapshot::Snapshot;
use crate::model::{EntityKey, EntityRecord};
use crate::stream::SnapshotStream;

pub struct SnapshotStore {
    current: ArcSwap<Snapshot>,
    updates: watch::Sender<Arc<Snapshot>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        let initial = Arc::new(Snapshot::default());
        let (updates, _) = watch::channel(Arc::clone(&initial));
        Self {
            current: ArcSwap::new(initial),
            updates,
        }
    }

    pub fn current(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    pub fn subscribe(&self) -> SnapshotStream {
        SnapshotStream::new(self.updates.subscribe())
    }

    /// Replace the snapshot with `entities`, bumping the generation.
    ///
    /// Returns the committed snapshot and what changed relative to the
    /// previous one.
    pub(crate) fn commit(
        &self,
        entities: BTreeMap<EntityKey, Arc<EntityRecord>>,
    ) -> (Arc<Snapshot>, Vec<EntityChange>) {
        let previous = self.current.load_full();
        let changes = diff(previous.entities(), &entities);
        let next = Arc::new(Snapshot::new(
            entities,
            previous.generation().saturating_add(1),
            Utc::now(),
        ));

        self.current.store(Arc::clone(&next));
        self.updates.send_replace(Arc::clone(&next));
        (next, changes)
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_bumps_generation_and_notifies() {
        let store = SnapshotStore::new();
        let stream = store.subscribe();
        assert_eq!(store.current().generation(), 0);

        let (snap, changes) = store.commit(BTreeMap::new());
        assert_eq!(snap.generation(), 1);
        assert!(changes.is_empty());
        assert_eq!(stream.latest().generation(), 1);
        assert!(snap.refreshed_at().is_some());
    }
}
