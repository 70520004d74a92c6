//! Copy-on-write snapshots for tables that are read on every message and
//! written by rare administrative commands.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, RwLock};

/// Holds the current snapshot of a table.
///
/// Readers take an `Arc` to the snapshot and never observe a partial update.
/// Writers serialize on a separate lock and publish a complete replacement.
#[derive(Debug)]
pub struct SnapshotTable<T> {
    current: RwLock<Arc<T>>,
    writer: Mutex<()>,
}

impl<T> SnapshotTable<T> {
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
            writer: Mutex::new(()),
        }
    }

    /// Returns the snapshot that is current right now.
    pub async fn load(&self) -> Arc<T> {
        Arc::clone(&*self.current.read().await)
    }

    /// Serializes writers. Hold the guard across persist + reload + publish.
    pub async fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().await
    }

    /// Publishes a new snapshot.
    pub async fn publish(&self, next: T) {
        *self.current.write().await = Arc::new(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_old_snapshot_survives_publish() {
        let table = SnapshotTable::new(vec![1, 2]);
        let before = table.load().await;

        table.publish(vec![3]).await;

        assert_eq!(*before, vec![1, 2]);
        assert_eq!(*table.load().await, vec![3]);
    }

    #[tokio::test]
    async fn test_writers_are_serialized() {
        let table = Arc::new(SnapshotTable::new(0_u32));
        let mut handles = Vec::new();

        for _ in 0..16 {
            let table = Arc::clone(&table);
            handles.push(tokio::spawn(async move {
                let _guard = table.lock_writer().await;
                let current = *table.load().await;
                tokio::task::yield_now().await;
                table.publish(current + 1).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(*table.load().await, 16);
    }
}
