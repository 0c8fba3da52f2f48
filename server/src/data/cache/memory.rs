//! In-memory cache implementation using moka + dashmap
//!
//! Uses moka for the main cache with per-entry TTL expiry and dashmap for
//! the atomic counters backing rate limiting. Suitable for single-node
//! deployments where a Redis instance is not worth operating.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use moka::Expiry;
use moka::future::Cache;

use super::backend::CacheBackend;
use super::error::CacheError;
use crate::core::config::CacheConfig;

/// Cache entry with data and metadata
#[derive(Clone)]
struct CacheEntry {
    data: Vec<u8>,
    ttl: Option<Duration>,
    created_at: Instant,
}

/// Per-entry expiry tracking for variable TTLs
struct VariableTtlExpiry;

impl Expiry<String, CacheEntry> for VariableTtlExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_read(
        &self,
        _key: &String,
        _value: &CacheEntry,
        _read_at: Instant,
        duration_until_expiry: Option<Duration>,
        _last_modified_at: Instant,
    ) -> Option<Duration> {
        duration_until_expiry
    }
}

/// Counter entry for rate limiting
struct CounterEntry {
    count: AtomicI64,
    expires_at: Instant,
}

/// In-memory cache backend
pub struct InMemoryCache {
    cache: Cache<String, CacheEntry>,
    counters: DashMap<String, CounterEntry>,
    /// Counter for cleanup scheduling (increments on every incr operation)
    cleanup_ops: AtomicU64,
}

impl InMemoryCache {
    /// Create a new in-memory cache with the given configuration
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            .initial_capacity((config.max_entries as usize / 4).min(10_000))
            .expire_after(VariableTtlExpiry)
            .build();

        Self {
            cache,
            counters: DashMap::new(),
            cleanup_ops: AtomicU64::new(0),
        }
    }

    /// Clean up expired counters (called periodically)
    fn cleanup_expired_counters(&self) {
        let now = Instant::now();
        self.counters.retain(|_, entry| now < entry.expires_at);
    }
}

/// Match a key against a glob pattern (`*` = any run, `?` = one character)
///
/// Covers the Redis MATCH subset the flush utility uses, so a pattern deletes
/// the same keys on either backend. Iterative with single-`*` backtracking.
fn glob_match(pattern: &str, key: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let k: Vec<char> = key.chars().collect();

    let (mut pi, mut ki) = (0usize, 0usize);
    let mut backtrack: Option<(usize, usize)> = None;

    while ki < k.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == k[ki]) {
            pi += 1;
            ki += 1;
        } else if pi < p.len() && p[pi] == '*' {
            // Try the empty expansion first; remember where to grow it
            backtrack = Some((pi, ki));
            pi += 1;
        } else if let Some((star_pi, star_ki)) = backtrack {
            // Grow the last '*' by one character and retry
            backtrack = Some((star_pi, star_ki + 1));
            pi = star_pi + 1;
            ki = star_ki + 1;
        } else {
            return false;
        }
    }

    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}

#[async_trait]
impl CacheBackend for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.cache.get(key).await.map(|entry| entry.data.clone()))
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let entry = CacheEntry {
            data: value,
            ttl,
            created_at: Instant::now(),
        };
        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let existed = self.cache.contains_key(key);
        self.cache.invalidate(key).await;
        Ok(existed)
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<u64, CacheError> {
        let mut count = 0u64;

        // Collect keys first to avoid invalidating while iterating
        let keys_to_delete: Vec<String> = self
            .cache
            .iter()
            .filter(|(k, _)| glob_match(pattern, k))
            .map(|(k, _)| (*k).clone())
            .collect();

        for key in keys_to_delete {
            self.cache.invalidate(&key).await;
            count += 1;
        }

        // Counters matching the pattern are flushed too
        self.counters.retain(|k, _| {
            if glob_match(pattern, k) {
                count += 1;
                false
            } else {
                true
            }
        });

        Ok(count)
    }

    async fn incr(&self, key: &str, ttl: Option<Duration>) -> Result<i64, CacheError> {
        use dashmap::mapref::entry::Entry;

        let now = Instant::now();
        let ttl_duration = ttl.unwrap_or(Duration::from_secs(60));
        let expires_at = now + ttl_duration;

        // Entry API gives exclusive access, preventing a TOCTOU race between
        // the expiry check and the reset
        let count = match self.counters.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                let counter = occupied.get_mut();
                if now >= counter.expires_at {
                    counter.count.store(1, Ordering::SeqCst);
                    counter.expires_at = expires_at;
                    1
                } else {
                    counter.count.fetch_add(1, Ordering::SeqCst) + 1
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(CounterEntry {
                    count: AtomicI64::new(1),
                    expires_at,
                });
                1
            }
        };

        // Expired counters are swept every 256 operations
        let ops = self.cleanup_ops.fetch_add(1, Ordering::Relaxed);
        if ops.is_multiple_of(256) {
            self.cleanup_expired_counters();
        }

        Ok(count)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, CacheError> {
        // Counters first (rate limiting)
        if let Some(entry) = self.counters.get(key) {
            let remaining = entry.expires_at.saturating_duration_since(Instant::now());
            if remaining > Duration::ZERO {
                return Ok(Some(remaining));
            }
            return Ok(None);
        }

        // Regular entries: remaining TTL computed from stored values
        if let Some(entry) = self.cache.get(key).await {
            if let Some(ttl) = entry.ttl {
                let elapsed = entry.created_at.elapsed();
                if let Some(remaining) = ttl.checked_sub(elapsed)
                    && remaining > Duration::ZERO
                {
                    return Ok(Some(remaining));
                }
                // Expired but not yet evicted
                return Ok(None);
            }
            // No TTL (infinite)
            return Ok(None);
        }

        Ok(None)
    }

    async fn health_check(&self) -> Result<(), CacheError> {
        // In-memory is always healthy
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::CacheBackendType;

    fn test_config() -> CacheConfig {
        CacheConfig {
            backend: CacheBackendType::Memory,
            max_entries: 1000,
            redis_url: None,
        }
    }

    #[tokio::test]
    async fn test_set_get_roundtrip() {
        let cache = InMemoryCache::new(&test_config());

        cache.set("key1", b"value1".to_vec(), None).await.unwrap();
        let result = cache.get("key1").await.unwrap();
        assert_eq!(result, Some(b"value1".to_vec()));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let cache = InMemoryCache::new(&test_config());

        let result = cache.get("nonexistent").await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = InMemoryCache::new(&test_config());

        cache.set("key1", b"value1".to_vec(), None).await.unwrap();
        assert!(cache.delete("key1").await.unwrap());
        assert_eq!(cache.get("key1").await.unwrap(), None);

        assert!(!cache.delete("nonexistent").await.unwrap());
    }

    #[tokio::test]
    async fn test_ttl_expiration() {
        let cache = InMemoryCache::new(&test_config());

        cache
            .set("key1", b"value1".to_vec(), Some(Duration::from_millis(50)))
            .await
            .unwrap();
        assert!(cache.get("key1").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(100)).await;
        cache.cache.run_pending_tasks().await;

        assert_eq!(cache.get("key1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_pattern() {
        let cache = InMemoryCache::new(&test_config());

        cache
            .set("sessions_list_page_1", b"a".to_vec(), None)
            .await
            .unwrap();
        cache
            .set("sessions_list_page_2", b"b".to_vec(), None)
            .await
            .unwrap();
        cache
            .set("global_summary", b"c".to_vec(), None)
            .await
            .unwrap();

        let deleted = cache.delete_pattern("sessions_list_*").await.unwrap();
        assert_eq!(deleted, 2);

        assert_eq!(cache.get("sessions_list_page_1").await.unwrap(), None);
        assert!(cache.get("global_summary").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_pattern_suffix_and_inner_star() {
        let cache = InMemoryCache::new(&test_config());

        cache
            .set("sessions_list_page_1", b"a".to_vec(), None)
            .await
            .unwrap();
        cache
            .set("session_details:abc:page_1", b"b".to_vec(), None)
            .await
            .unwrap();
        cache
            .set("sessions_list_page_2", b"c".to_vec(), None)
            .await
            .unwrap();

        let deleted = cache.delete_pattern("*_page_1").await.unwrap();
        assert_eq!(deleted, 2);
        assert!(cache.get("sessions_list_page_2").await.unwrap().is_some());

        let deleted = cache.delete_pattern("sessions_*_page_2").await.unwrap();
        assert_eq!(deleted, 1);
    }

    #[test]
    fn test_glob_match() {
        assert!(glob_match("sessions_list_*", "sessions_list_page_1"));
        assert!(glob_match("*_page_1", "sessions_list_page_1"));
        assert!(glob_match("session_details:*:page_1", "session_details:abc:page_1"));
        assert!(glob_match("*", "anything"));
        assert!(glob_match("global_summary", "global_summary"));
        assert!(glob_match("page_?", "page_1"));

        assert!(!glob_match("*_page_1", "sessions_list_page_2"));
        assert!(!glob_match("sessions_list_*", "session_details:abc"));
        assert!(!glob_match("page_?", "page_12"));
        assert!(!glob_match("global_summary", "global"));
    }

    #[tokio::test]
    async fn test_incr_atomic() {
        let cache = InMemoryCache::new(&test_config());
        let ttl = Some(Duration::from_secs(60));

        assert_eq!(cache.incr("counter", ttl).await.unwrap(), 1);
        assert_eq!(cache.incr("counter", ttl).await.unwrap(), 2);
        assert_eq!(cache.incr("counter", ttl).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_incr_expired_resets() {
        let cache = InMemoryCache::new(&test_config());

        let count1 = cache
            .incr("counter", Some(Duration::from_millis(1)))
            .await
            .unwrap();
        assert_eq!(count1, 1);

        tokio::time::sleep(Duration::from_millis(10)).await;

        let count2 = cache
            .incr("counter", Some(Duration::from_secs(60)))
            .await
            .unwrap();
        assert_eq!(count2, 1);
    }

    #[tokio::test]
    async fn test_ttl_for_cache_entry() {
        let cache = InMemoryCache::new(&test_config());

        cache
            .set("key1", b"value1".to_vec(), Some(Duration::from_secs(60)))
            .await
            .unwrap();

        let ttl = cache.ttl("key1").await.unwrap().unwrap();
        assert!((58..=60).contains(&ttl.as_secs()));
    }

    #[tokio::test]
    async fn test_ttl_for_infinite_entry() {
        let cache = InMemoryCache::new(&test_config());

        cache.set("key1", b"value1".to_vec(), None).await.unwrap();
        assert!(cache.ttl("key1").await.unwrap().is_none());
        assert!(cache.ttl("nonexistent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_health_check() {
        let cache = InMemoryCache::new(&test_config());
        assert!(cache.health_check().await.is_ok());
        assert_eq!(cache.backend_name(), "memory");
    }
}
