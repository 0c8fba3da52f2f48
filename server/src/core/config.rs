//! Application configuration
//!
//! Loaded from environment variables (after `dotenvy::dotenv()`), with CLI
//! flags overriding host/port. Defaults live in `core::constants`.

use std::env;
use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use super::cli::CliConfig;
use super::constants::{
    DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CACHE_TTL_DETAILS, DEFAULT_CACHE_TTL_METRICS,
    DEFAULT_CACHE_TTL_SESSIONS, DEFAULT_CACHE_TTL_SUMMARY, DEFAULT_CLICKHOUSE_DATABASE,
    DEFAULT_CLICKHOUSE_URL, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_RATE_LIMIT_RPM,
    DEFAULT_WAREHOUSE_TIMEOUT_SECS, ENV_CACHE_BACKEND, ENV_CACHE_MAX_ENTRIES,
    ENV_CACHE_TTL_DETAILS, ENV_CACHE_TTL_METRICS, ENV_CACHE_TTL_SESSIONS, ENV_CACHE_TTL_SUMMARY,
    ENV_CLICKHOUSE_DATABASE, ENV_CLICKHOUSE_PASSWORD, ENV_CLICKHOUSE_URL, ENV_CLICKHOUSE_USER,
    ENV_HOST, ENV_PORT, ENV_RATE_LIMIT_ENABLED, ENV_RATE_LIMIT_RPM, ENV_REDIS_URL,
    ENV_WAREHOUSE_TIMEOUT_SECS,
};

// =============================================================================
// Cache Backend Enum
// =============================================================================

/// Cache backend type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendType {
    #[default]
    Memory,
    Redis,
}

impl fmt::Display for CacheBackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheBackendType::Memory => write!(f, "memory"),
            CacheBackendType::Redis => write!(f, "redis"),
        }
    }
}

impl FromStr for CacheBackendType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(CacheBackendType::Memory),
            "redis" => Ok(CacheBackendType::Redis),
            other => bail!("Unknown cache backend '{other}' (expected 'memory' or 'redis')"),
        }
    }
}

// =============================================================================
// Config Sections
// =============================================================================

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Cache backend type
    pub backend: CacheBackendType,
    /// Maximum entries (memory backend)
    pub max_entries: u64,
    /// Redis URL (redis backend)
    pub redis_url: Option<String>,
}

/// Per-query-shape cache TTL policy (seconds)
#[derive(Debug, Clone, Copy)]
pub struct TtlConfig {
    /// Session list and session-by-id results
    pub sessions_secs: u64,
    /// Session detail results
    pub details_secs: u64,
    /// Global and periodic activity summaries
    pub summary_secs: u64,
    /// Daily metrics and metrics summaries
    pub metrics_secs: u64,
}

impl Default for TtlConfig {
    fn default() -> Self {
        Self {
            sessions_secs: DEFAULT_CACHE_TTL_SESSIONS,
            details_secs: DEFAULT_CACHE_TTL_DETAILS,
            summary_secs: DEFAULT_CACHE_TTL_SUMMARY,
            metrics_secs: DEFAULT_CACHE_TTL_METRICS,
        }
    }
}

/// Warehouse (ClickHouse) configuration
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    /// ClickHouse HTTP URL
    pub url: String,
    /// Database holding the fitness tables
    pub database: String,
    /// Optional username
    pub user: Option<String>,
    /// Optional password
    pub password: Option<String>,
    /// Per-query deadline in seconds
    pub query_timeout_secs: u64,
}

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Enable per-IP rate limiting on the API routes
    pub enabled: bool,
    /// Requests per minute per client
    pub rpm: u32,
}

/// Top-level application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub ttl: TtlConfig,
    pub warehouse: WarehouseConfig,
    pub rate_limit: RateLimitConfig,
}

impl AppConfig {
    /// Load configuration from the environment, applying CLI overrides
    pub fn load(cli: &CliConfig) -> Result<Self> {
        let host = cli
            .host
            .clone()
            .or_else(|| env_string(ENV_HOST))
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match cli.port {
            Some(p) => p,
            None => env_parse(ENV_PORT)?.unwrap_or(DEFAULT_PORT),
        };

        let backend = match env_string(ENV_CACHE_BACKEND) {
            Some(s) => s.parse()?,
            None => CacheBackendType::default(),
        };
        let redis_url = env_string(ENV_REDIS_URL);
        if backend == CacheBackendType::Redis && redis_url.is_none() {
            bail!("{ENV_REDIS_URL} is required when {ENV_CACHE_BACKEND}=redis");
        }

        Ok(Self {
            server: ServerConfig { host, port },
            cache: CacheConfig {
                backend,
                max_entries: env_parse(ENV_CACHE_MAX_ENTRIES)?
                    .unwrap_or(DEFAULT_CACHE_MAX_ENTRIES),
                redis_url,
            },
            ttl: TtlConfig {
                sessions_secs: env_parse(ENV_CACHE_TTL_SESSIONS)?
                    .unwrap_or(DEFAULT_CACHE_TTL_SESSIONS),
                details_secs: env_parse(ENV_CACHE_TTL_DETAILS)?
                    .unwrap_or(DEFAULT_CACHE_TTL_DETAILS),
                summary_secs: env_parse(ENV_CACHE_TTL_SUMMARY)?
                    .unwrap_or(DEFAULT_CACHE_TTL_SUMMARY),
                metrics_secs: env_parse(ENV_CACHE_TTL_METRICS)?
                    .unwrap_or(DEFAULT_CACHE_TTL_METRICS),
            },
            warehouse: WarehouseConfig {
                url: env_string(ENV_CLICKHOUSE_URL)
                    .unwrap_or_else(|| DEFAULT_CLICKHOUSE_URL.to_string()),
                database: env_string(ENV_CLICKHOUSE_DATABASE)
                    .unwrap_or_else(|| DEFAULT_CLICKHOUSE_DATABASE.to_string()),
                user: env_string(ENV_CLICKHOUSE_USER),
                password: env_string(ENV_CLICKHOUSE_PASSWORD),
                query_timeout_secs: env_parse(ENV_WAREHOUSE_TIMEOUT_SECS)?
                    .unwrap_or(DEFAULT_WAREHOUSE_TIMEOUT_SECS),
            },
            rate_limit: RateLimitConfig {
                enabled: env_parse(ENV_RATE_LIMIT_ENABLED)?.unwrap_or(true),
                rpm: env_parse(ENV_RATE_LIMIT_RPM)?.unwrap_or(DEFAULT_RATE_LIMIT_RPM),
            },
        })
    }
}

/// Read an environment variable, treating empty values as unset
fn env_string(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.trim().is_empty())
}

/// Read and parse an environment variable, erroring on malformed values
fn env_parse<T: FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env_string(name) {
        Some(s) => {
            let value = s
                .parse::<T>()
                .with_context(|| format!("Invalid value '{s}' for {name}"))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_backend_parse() {
        assert_eq!(
            "memory".parse::<CacheBackendType>().unwrap(),
            CacheBackendType::Memory
        );
        assert_eq!(
            "Redis".parse::<CacheBackendType>().unwrap(),
            CacheBackendType::Redis
        );
        assert!("memcached".parse::<CacheBackendType>().is_err());
    }

    #[test]
    fn test_ttl_defaults() {
        let ttl = TtlConfig::default();
        assert_eq!(ttl.sessions_secs, 300);
        assert_eq!(ttl.details_secs, 600);
        assert_eq!(ttl.summary_secs, 3600);
        assert_eq!(ttl.metrics_secs, 900);
    }
}
