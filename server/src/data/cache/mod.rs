//! Cache module
//!
//! Caching infrastructure with pluggable backends:
//! - In-memory (default) - uses moka + dashmap
//! - Redis (optional) - uses deadpool-redis
//!
//! Also provides rate limiting on top of the cache backend.

mod backend;
mod error;
mod key;
mod memory;
pub mod rate_limiter;
mod redis;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use backend::CacheBackend;
pub use error::CacheError;
pub use key::CacheKey;
pub use rate_limiter::{RateLimitBucket, RateLimitResult, RateLimiter};

use memory::InMemoryCache;

use crate::core::config::{CacheBackendType, CacheConfig};

/// Cache service providing typed access to the cache backend
///
/// Wraps the backend with the result codec: cached values are JSON text, so
/// optional record fields round-trip as absent, temporal fields as RFC 3339
/// strings, and entries written by older codec revisions surface as
/// `Serialization` errors (handled upstream as a miss) rather than wrong data.
pub struct CacheService {
    backend: Arc<dyn CacheBackend>,
}

impl std::fmt::Debug for CacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheService")
            .field("backend", &self.backend.backend_name())
            .finish()
    }
}

impl CacheService {
    /// Create a new cache service from configuration
    pub async fn new(config: &CacheConfig) -> Result<Self, CacheError> {
        let backend: Arc<dyn CacheBackend> = match config.backend {
            CacheBackendType::Memory => {
                tracing::debug!(
                    max_entries = config.max_entries,
                    "Initializing in-memory cache"
                );
                Arc::new(InMemoryCache::new(config))
            }
            CacheBackendType::Redis => {
                let url = config.redis_url.as_ref().ok_or_else(|| {
                    CacheError::Config("redis_url required for Redis backend".into())
                })?;
                // Note: RedisCache::new logs sanitized URL internally
                Arc::new(redis::RedisCache::new(url).await?)
            }
        };

        Ok(Self { backend })
    }

    /// Get the backend name
    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    // =========================================================================
    // Raw bytes API
    // =========================================================================

    /// Get raw bytes from cache
    pub async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.backend.get(key).await
    }

    /// Set raw bytes in cache
    pub async fn set_raw(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        self.backend.set(key, value, ttl).await
    }

    // =========================================================================
    // Typed API (JSON text envelopes)
    // =========================================================================

    /// Get a typed value from cache
    ///
    /// Structurally invalid payloads return `CacheError::Serialization`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.get_raw(key).await? {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes)
                    .map_err(|e| CacheError::Serialization(e.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Set a typed value in cache
    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let bytes =
            serde_json::to_vec(value).map_err(|e| CacheError::Serialization(e.to_string()))?;
        self.set_raw(key, bytes, ttl).await
    }

    // =========================================================================
    // Other operations
    // =========================================================================

    /// Delete a key from cache
    pub async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        self.backend.delete(key).await
    }

    /// Delete keys matching a glob pattern (explicit flush)
    pub async fn flush_pattern(&self, pattern: &str) -> Result<u64, CacheError> {
        self.backend.delete_pattern(pattern).await
    }

    /// Atomic increment (for rate limiting)
    pub async fn incr(&self, key: &str, ttl: Option<Duration>) -> Result<i64, CacheError> {
        self.backend.incr(key, ttl).await
    }

    /// Get TTL remaining for a key
    pub async fn ttl(&self, key: &str) -> Result<Option<Duration>, CacheError> {
        self.backend.ttl(key).await
    }

    /// Health check
    pub async fn health_check(&self) -> Result<(), CacheError> {
        self.backend.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde::Deserialize;

    pub(crate) fn test_config() -> CacheConfig {
        CacheConfig {
            backend: CacheBackendType::Memory,
            max_entries: 1000,
            redis_url: None,
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        id: String,
        distance: Option<f64>,
        recorded_at: chrono::DateTime<Utc>,
    }

    #[tokio::test]
    async fn test_cache_service_backend_name() {
        let service = CacheService::new(&test_config()).await.unwrap();
        assert_eq!(service.backend_name(), "memory");
    }

    #[tokio::test]
    async fn test_typed_roundtrip_preserves_absent_fields() {
        let service = CacheService::new(&test_config()).await.unwrap();

        let record = Sample {
            id: "s1".to_string(),
            distance: None,
            recorded_at: Utc.with_ymd_and_hms(2023, 1, 1, 10, 0, 0).unwrap(),
        };

        service.set("sample:1", &record, None).await.unwrap();
        let fetched: Option<Sample> = service.get("sample:1").await.unwrap();
        assert_eq!(fetched, Some(record));
    }

    #[tokio::test]
    async fn test_stored_payload_is_text_json() {
        let service = CacheService::new(&test_config()).await.unwrap();

        let record = Sample {
            id: "s1".to_string(),
            distance: Some(5000.0),
            recorded_at: Utc.with_ymd_and_hms(2023, 1, 1, 10, 0, 0).unwrap(),
        };
        service.set("sample:1", &record, None).await.unwrap();

        let raw = service.get_raw("sample:1").await.unwrap().unwrap();
        let text = String::from_utf8(raw).unwrap();
        assert!(text.contains("\"id\":\"s1\""));
        assert!(text.contains("2023-01-01T10:00:00Z"));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_serialization_error() {
        let service = CacheService::new(&test_config()).await.unwrap();

        service
            .set_raw("sample:1", b"not json at all".to_vec(), None)
            .await
            .unwrap();

        let err = service.get::<Sample>("sample:1").await.unwrap_err();
        assert!(err.is_decode());
    }

    #[tokio::test]
    async fn test_flush_pattern() {
        let service = CacheService::new(&test_config()).await.unwrap();

        service
            .set_raw("daily_metrics:a:b", b"a".to_vec(), None)
            .await
            .unwrap();
        service
            .set_raw("daily_metrics:c:d", b"b".to_vec(), None)
            .await
            .unwrap();
        service
            .set_raw("global_summary", b"c".to_vec(), None)
            .await
            .unwrap();

        let deleted = service.flush_pattern("daily_metrics:*").await.unwrap();
        assert_eq!(deleted, 2);
        assert!(service.get_raw("global_summary").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_health_check() {
        let service = CacheService::new(&test_config()).await.unwrap();
        assert!(service.health_check().await.is_ok());
    }
}
