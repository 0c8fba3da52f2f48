//! Rate limiter using the cache backend
//!
//! Fixed window counter with burst allowance. Each window starts when the
//! first request arrives and resets when the window TTL expires. Fixed
//! windows allow up to 2x the limit across a window boundary; acceptable for
//! a per-client request gate in front of a read-only API.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::CacheService;
use super::key::CacheKey;
use crate::core::constants::DEFAULT_RATE_LIMIT_WINDOW_SECS;

/// Rate limit bucket configuration
#[derive(Debug, Clone)]
pub struct RateLimitBucket {
    /// Bucket name (e.g. "api")
    pub name: &'static str,
    /// Maximum requests per window
    pub requests_per_window: u32,
    /// Window duration in seconds
    pub window_secs: u64,
    /// Burst allowance (additional requests above limit)
    pub burst: u32,
}

impl RateLimitBucket {
    /// The API bucket gating all query endpoints
    pub fn api(rpm: u32) -> Self {
        Self {
            name: "api",
            requests_per_window: rpm,
            window_secs: DEFAULT_RATE_LIMIT_WINDOW_SECS,
            burst: rpm / 20, // 5% burst
        }
    }

    /// Total limit (requests + burst)
    pub fn total_limit(&self) -> u32 {
        self.requests_per_window.saturating_add(self.burst)
    }
}

/// Rate limit check result
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    /// Whether the request is allowed
    pub allowed: bool,
    /// Requests remaining in window
    pub remaining: u32,
    /// Total limit (rpm + burst)
    pub limit: u32,
    /// Unix timestamp when window resets
    pub reset_at: u64,
    /// Seconds until retry (only if blocked)
    pub retry_after: Option<u64>,
}

/// Rate limiter using cache backend
pub struct RateLimiter {
    cache: Arc<CacheService>,
}

impl RateLimiter {
    pub fn new(cache: Arc<CacheService>) -> Self {
        Self { cache }
    }

    /// Check rate limit for identifier in bucket
    pub async fn check(&self, bucket: &RateLimitBucket, identifier: &str) -> RateLimitResult {
        let key = CacheKey::rate_limit(bucket.name, identifier);
        let window_duration = Duration::from_secs(bucket.window_secs);

        // Capture time before the increment to keep reset_at consistent
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "System clock is before UNIX epoch");
                0
            });

        let count = match self.cache.incr(&key, Some(window_duration)).await {
            Ok(c) => c,
            Err(e) => {
                // Cache failures must not block traffic
                tracing::error!(
                    bucket = bucket.name,
                    %identifier,
                    error = %e,
                    "Rate limit cache increment failed, allowing request"
                );
                1
            }
        };

        let limit = bucket.total_limit();
        let limit_i64 = i64::from(limit);
        let allowed = count <= limit_i64;
        let remaining = limit_i64.saturating_sub(count).try_into().unwrap_or(0u32);

        let ttl = self.cache.ttl(&key).await.ok().flatten();
        let reset_at = now.saturating_add(ttl.map(|d| d.as_secs()).unwrap_or(bucket.window_secs));

        tracing::trace!(
            bucket = bucket.name,
            %identifier,
            count,
            limit,
            allowed,
            "Rate limit check"
        );

        RateLimitResult {
            allowed,
            remaining,
            limit,
            reset_at,
            retry_after: if allowed {
                None
            } else {
                Some(reset_at.saturating_sub(now))
            },
        }
    }
}
