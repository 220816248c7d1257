use std::num::NonZeroUsize;

use lru::LruCache;

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1024) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};

/// Remembers the most recent Telegram update ids so redelivered updates are
/// acknowledged without being processed twice.
pub struct RecentUpdates {
    seen: LruCache<i64, ()>,
}

impl Default for RecentUpdates {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl RecentUpdates {
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            seen: LruCache::new(capacity),
        }
    }

    /// Returns false if the id was already seen.
    pub fn insert(&mut self, update_id: i64) -> bool {
        if self.seen.contains(&update_id) {
            return false;
        }
        self.seen.put(update_id, ());
        true
    }
}
