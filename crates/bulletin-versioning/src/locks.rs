//! Per-master write exclusion
//!
//! Version creation is a read-modify-write over two documents (read the
//! current version, insert the next, move the pointer). [`MasterLocks`]
//! serialises that sequence per master inside one process; writers on
//! different masters never wait for each other.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Guard held for the duration of a per-master write.
pub type MasterGuard = OwnedMutexGuard<()>;

/// Registry of per-master mutexes.
///
/// Cloning shares the registry. Entries nobody holds or waits on are pruned
/// on the next acquisition.
#[derive(Debug, Clone, Default)]
pub struct MasterLocks {
    locks: Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl MasterLocks {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `master_id`.
    pub async fn acquire(&self, master_id: Uuid) -> MasterGuard {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.retain(|id, lock| *id == master_id || Arc::strong_count(lock) > 1);
            locks.entry(master_id).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Number of masters currently tracked.
    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }

    /// Check if no master is tracked.
    pub async fn is_empty(&self) -> bool {
        self.locks.lock().await.is_empty()
    }
}
