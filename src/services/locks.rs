use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per chat. Holding the guard serializes every
/// read-decide-write cycle on that chat's pending request.
#[derive(Default)]
pub struct ChatLocks {
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl ChatLocks {
    pub async fn acquire(&self, chat_id: i64) -> OwnedMutexGuard<()> {
        // The shard guard must be released before awaiting the chat lock.
        let lock = self.locks.entry(chat_id).or_default().clone();
        lock.lock_owned().await
    }

    /// Drops entries nobody is holding or waiting on.
    pub fn prune(&self) {
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
