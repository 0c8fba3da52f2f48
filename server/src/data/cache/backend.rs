//! Cache backend trait definition

use std::time::Duration;

use async_trait::async_trait;

use super::error::CacheError;

/// Cache backend trait
///
/// Defines the key-value store interface consumed by the query layer, the
/// rate limiter and the flush utility. Both the in-memory and Redis backends
/// implement this trait.
///
/// Operations on individual keys are atomic; TTL expiry is enforced by the
/// backend. The facade treats the cache as an optimization only, so backends
/// may be eventually consistent under concurrent access.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Get a value from the cache
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Set a value in the cache with optional TTL
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>)
    -> Result<(), CacheError>;

    /// Delete a key from the cache
    ///
    /// Returns `true` if the key existed before deletion (best effort under
    /// concurrent access).
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Delete keys matching a glob pattern (e.g. "sessions_list_*")
    ///
    /// Used by the explicit flush utility. O(n) for the memory backend,
    /// SCAN-based for Redis.
    async fn delete_pattern(&self, pattern: &str) -> Result<u64, CacheError>;

    /// Atomic increment with TTL (creates the key if absent)
    ///
    /// Used for rate limiting. Must be atomic to ensure correctness.
    async fn incr(&self, key: &str, ttl: Option<Duration>) -> Result<i64, CacheError>;

    /// Get the TTL remaining for a key
    async fn ttl(&self, key: &str) -> Result<Option<Duration>, CacheError>;

    /// Health check (validates connection)
    async fn health_check(&self) -> Result<(), CacheError>;

    /// Backend name for debugging/logging
    fn backend_name(&self) -> &'static str;
}
