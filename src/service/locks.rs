use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::types::EntityId;

/// One async mutex per entity id, created on demand.
///
/// Entries nobody holds or waits on are pruned whenever a new lock is taken,
/// so the registry only grows with the number of ids in flight.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: Mutex<HashMap<EntityId, Arc<AsyncMutex<()>>>>,
}

impl KeyedLocks {
    pub async fn lock(&self, id: &EntityId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock();
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(id.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Number of ids currently tracked
    pub fn tracked(&self) -> usize {
        self.locks.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_id_is_serialized() {
        let locks = Arc::new(KeyedLocks::default());
        let id = EntityId::new("1");
        let guard = locks.lock(&id).await;

        let waiter = {
            let locks = Arc::clone(&locks);
            let id = id.clone();
            tokio::spawn(async move {
                let _guard = locks.lock(&id).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());
        drop(guard);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_ids_do_not_block() {
        let locks = KeyedLocks::default();
        let _a = locks.lock(&EntityId::new("a")).await;
        let _b = locks.lock(&EntityId::new("b")).await;
        assert_eq!(locks.tracked(), 2);
    }

    #[tokio::test]
    async fn test_idle_entries_are_pruned() {
        let locks = KeyedLocks::default();
        drop(locks.lock(&EntityId::new("a")).await);
        drop(locks.lock(&EntityId::new("b")).await);
        assert_eq!(locks.tracked(), 1);
    }
}
