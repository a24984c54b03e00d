// ── Reactive snapshot stream ──
//
// Subscription type for consuming committed snapshots from the store.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::store::Snapshot;

/// A subscription to the entity snapshot.
///
/// Offers the snapshot seen at creation, the latest one, and change
/// notification via [`changed`](Self::changed) or as a `Stream`.
pub struct SnapshotStream {
    current: Arc<Snapshot>,
    receiver: watch::Receiver<Arc<Snapshot>>,
}

impl SnapshotStream {
    pub(crate) fn new(receiver: watch::Receiver<Arc<Snapshot>>) -> Self {
        let current = Arc::clone(&receiver.borrow());
        Self { current, receiver }
    }

    /// The snapshot captured at creation (or at the last `changed()`).
    pub fn current(&self) -> &Arc<Snapshot> {
        &self.current
    }

    pub fn latest(&self) -> Arc<Snapshot> {
        Arc::clone(&self.receiver.borrow())
    }

    /// Wait for the next commit. `None` once the engine is gone.
    pub async fn changed(&mut self) -> Option<Arc<Snapshot>> {
        self.receiver.changed().await.ok()?;
        let snap = Arc::clone(&self.receiver.borrow_and_update());
        self.current = Arc::clone(&snap);
        Some(snap)
    }

    /// Convert into a `Stream` that yields the current snapshot first.
    pub fn into_stream(self) -> SnapshotWatchStream {
        SnapshotWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by the store's `watch` channel.
pub struct SnapshotWatchStream {
    inner: WatchStream<Arc<Snapshot>>,
}

impl Stream for SnapshotWatchStream {
    type Item = Arc<Snapshot>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use tokio_test::{assert_pending, assert_ready, task};

    use crate::store::SnapshotStore;

    #[test]
    fn stream_yields_initial_then_each_commit() {
        let store = SnapshotStore::new();
        let mut stream = task::spawn(store.subscribe().into_stream());

        let first = assert_ready!(stream.poll_next());
        assert_eq!(first.map(|s| s.generation()), Some(0));
        assert_pending!(stream.poll_next());

        store.commit(BTreeMap::new());
        assert!(stream.is_woken());
        let next = assert_ready!(stream.poll_next());
        assert_eq!(next.map(|s| s.generation()), Some(1));
    }

    #[tokio::test]
    async fn changed_tracks_current() {
        let store = SnapshotStore::new();
        let mut sub = store.subscribe();
        store.commit(BTreeMap::new());

        let snap = sub.changed().await;
        assert_eq!(snap.map(|s| s.generation()), Some(1));
        assert_eq!(sub.current().generation(), 1);
    }
}
