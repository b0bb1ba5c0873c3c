use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use rocketstore::ports::{CachedResponse, ResponseCache};
use std::collections::hash_map::RandomState;
use std::fmt::Debug;
use std::hash::BuildHasher;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

/// Number of invalidation counters keys are spread over
const GENERATION_STRIPES: usize = 64;

/// Stored response together with its own sliding window
#[derive(Clone)]
struct Entry {
    value: CachedResponse,
    sliding: Duration,
}

/// Restarts an entry's idle window on create, update and every read
struct SlidingExpiry;

impl Expiry<String, Entry> for SlidingExpiry {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(entry.sliding)
    }

    fn expire_after_read(
        &self,
        _key: &String,
        entry: &Entry,
        _read_at: Instant,
        _duration_until_expiry: Option<Duration>,
        _last_modified_at: Instant,
    ) -> Option<Duration> {
        Some(entry.sliding)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.sliding)
    }
}

/// Moka-based response cache with per-entry sliding expiration.
/// Lock-free and concurrent, optionally bounded by entry count.
///
/// Invalidation generations live in a fixed set of striped counters, so keys
/// sharing a stripe also share a generation. A collision only costs a skipped
/// store, never a stale one.
pub struct MokaResponseCache {
    cache: Cache<String, Entry>,
    generations: Box<[AtomicU64]>,
    hasher: RandomState,
}

impl MokaResponseCache {
    /// Create an unbounded cache
    pub fn new_unbounded() -> Self {
        Self::new("responses", None)
    }

    /// Create a cache holding at most `max_entries` responses
    pub fn new_bounded(max_entries: u64) -> Self {
        Self::new("responses", Some(max_entries))
    }

    pub fn new(name: &str, max_entries: Option<u64>) -> Self {
        let mut builder = Cache::builder().name(name).expire_after(SlidingExpiry);

        if let Some(capacity) = max_entries {
            builder = builder.max_capacity(capacity);
        }

        Self {
            cache: builder.build(),
            generations: (0..GENERATION_STRIPES).map(|_| AtomicU64::new(0)).collect(),
            hasher: RandomState::new(),
        }
    }

    fn stripe(&self, key: &str) -> &AtomicU64 {
        let index = self.hasher.hash_one(key) as usize % self.generations.len();
        &self.generations[index]
    }

    /// Apply pending evictions and expirations, mostly useful before reading counts
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }
}

#[async_trait]
impl ResponseCache for MokaResponseCache {
    async fn try_get(&self, key: &str) -> Option<CachedResponse> {
        match self.cache.get(key).await {
            Some(entry) => Some(entry.value),
            None => {
                debug!("Cache miss for key: {}", key);
                None
            }
        }
    }

    async fn set(&self, key: String, value: CachedResponse, sliding: Duration) {
        self.cache.insert(key, Entry { value, sliding }).await;
    }

    fn generation(&self, key: &str) -> u64 {
        self.stripe(key).load(Ordering::SeqCst)
    }

    async fn set_if_current(
        &self,
        key: String,
        value: CachedResponse,
        sliding: Duration,
        generation: u64,
    ) -> bool {
        if self.generation(&key) != generation {
            return false;
        }
        self.cache.insert(key.clone(), Entry { value, sliding }).await;

        // a remove that advanced the generation after the first check may
        // have run before the insert; evict on its behalf
        if self.generation(&key) != generation {
            self.cache.invalidate(&key).await;
            return false;
        }
        true
    }

    async fn remove(&self, key: &str) -> bool {
        self.stripe(key).fetch_add(1, Ordering::SeqCst);
        self.cache.remove(key).await.is_some()
    }

    fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Debug for MokaResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaResponseCache")
            .field("entry_count", &self.cache.entry_count())
            .field("weighted_size", &self.cache.weighted_size())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::time::sleep;

    fn text(value: &CachedResponse) -> &str {
        value.downcast_ref::<String>().map(String::as_str).unwrap_or_default()
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MokaResponseCache::new_unbounded();

        cache
            .set("hello".into(), Arc::new("world".to_string()), Duration::from_secs(60))
            .await;

        let value = cache.try_get("hello").await.unwrap();
        assert_eq!(text(&value), "world");
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let cache = MokaResponseCache::new_unbounded();
        assert!(cache.try_get("nonexistent").await.is_none());
    }

    #[tokio::test]
    async fn test_remove() {
        let cache = MokaResponseCache::new_unbounded();
        cache
            .set("key".into(), Arc::new("value".to_string()), Duration::from_secs(60))
            .await;

        assert!(cache.remove("key").await);
        assert!(cache.try_get("key").await.is_none());
        assert!(!cache.remove("key").await);
    }

    #[tokio::test]
    async fn test_overwrite() {
        let cache = MokaResponseCache::new_unbounded();

        cache
            .set("key".into(), Arc::new("value1".to_string()), Duration::from_secs(60))
            .await;
        cache
            .set("key".into(), Arc::new("value2".to_string()), Duration::from_secs(60))
            .await;

        let value = cache.try_get("key").await.unwrap();
        assert_eq!(text(&value), "value2");
    }

    #[tokio::test]
    async fn test_stored_object_is_shared_not_copied() {
        let cache = MokaResponseCache::new_unbounded();
        let stored: CachedResponse = Arc::new(7_u32);
        cache.set("n".into(), stored.clone(), Duration::from_secs(60)).await;

        let fetched = cache.try_get("n").await.unwrap();
        assert!(Arc::ptr_eq(&stored, &fetched));
    }

    #[tokio::test]
    async fn test_set_if_current_stores_when_untouched() {
        let cache = MokaResponseCache::new_unbounded();
        let generation = cache.generation("customer");

        let stored = cache
            .set_if_current("customer".into(), Arc::new("v".to_string()), Duration::from_secs(60), generation)
            .await;

        assert!(stored);
        assert_eq!(text(&cache.try_get("customer").await.unwrap()), "v");
    }

    #[tokio::test]
    async fn test_remove_after_generation_read_blocks_store() {
        let cache = MokaResponseCache::new_unbounded();
        cache
            .set("customer".into(), Arc::new("old".to_string()), Duration::from_secs(60))
            .await;
        let generation = cache.generation("customer");

        assert!(cache.remove("customer").await);
        let stored = cache
            .set_if_current("customer".into(), Arc::new("stale".to_string()), Duration::from_secs(60), generation)
            .await;

        assert!(!stored);
        assert!(cache.try_get("customer").await.is_none());

        // a fresh read of the generation allows caching again
        let generation = cache.generation("customer");
        assert!(
            cache
                .set_if_current("customer".into(), Arc::new("new".to_string()), Duration::from_secs(60), generation)
                .await
        );
    }

    #[tokio::test]
    async fn test_idle_entry_expires() {
        let cache = MokaResponseCache::new_unbounded();
        cache
            .set("idle".into(), Arc::new("v".to_string()), Duration::from_millis(100))
            .await;

        assert!(cache.try_get("idle").await.is_some());

        sleep(Duration::from_millis(250)).await;

        assert!(cache.try_get("idle").await.is_none());
    }

    #[tokio::test]
    async fn test_reads_slide_the_window() {
        let cache = MokaResponseCache::new_unbounded();
        cache
            .set("busy".into(), Arc::new("v".to_string()), Duration::from_millis(500))
            .await;

        // each read lands inside the window and restarts it, well past the original deadline
        for _ in 0..4 {
            sleep(Duration::from_millis(250)).await;
            assert!(cache.try_get("busy").await.is_some());
        }

        sleep(Duration::from_millis(800)).await;
        assert!(cache.try_get("busy").await.is_none());
    }

    #[tokio::test]
    async fn test_windows_are_per_entry() {
        let cache = MokaResponseCache::new_unbounded();
        cache
            .set("short".into(), Arc::new(1_u8), Duration::from_millis(100))
            .await;
        cache
            .set("long".into(), Arc::new(2_u8), Duration::from_secs(60))
            .await;

        sleep(Duration::from_millis(250)).await;

        assert!(cache.try_get("short").await.is_none());
        assert!(cache.try_get("long").await.is_some());
    }

    #[tokio::test]
    async fn test_bounded() {
        let cache = MokaResponseCache::new_bounded(2); // Max 2 entries

        for key in ["key1", "key2", "key3"] {
            cache
                .set(key.into(), Arc::new(key.to_string()), Duration::from_secs(60))
                .await;
        }

        cache.run_pending_tasks().await;

        assert!(cache.entry_count() <= 2, "Cache should have at most 2 entries");
    }
}
