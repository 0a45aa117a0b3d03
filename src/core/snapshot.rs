//! Holder of the current quote snapshot

use crate::models::Snapshot;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Current snapshot, swapped wholesale on every refresh.
///
/// Readers get an `Arc` to an immutable snapshot, so a reader holding one
/// keeps seeing exactly that cycle's quotes even while a newer one is stored.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: RwLock<Arc<Snapshot>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn read(&self) -> Arc<Snapshot> {
        self.current.read().await.clone()
    }

    /// Store `snapshot` as current and return the shared handle to it
    pub async fn replace(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        *self.current.write().await = snapshot.clone();
        snapshot
    }
}
