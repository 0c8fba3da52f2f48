// =============================================================================
// Application Identity
// =============================================================================

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "fitgate";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "FITGATE_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "FITGATE_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "FITGATE_LOG";

// =============================================================================
// Environment Variables - Cache
// =============================================================================

/// Environment variable for cache backend selection ("memory" or "redis")
pub const ENV_CACHE_BACKEND: &str = "FITGATE_CACHE_BACKEND";

/// Environment variable for the Redis URL (redis backend)
pub const ENV_REDIS_URL: &str = "FITGATE_REDIS_URL";

/// Environment variable for max cached entries (memory backend)
pub const ENV_CACHE_MAX_ENTRIES: &str = "FITGATE_CACHE_MAX_ENTRIES";

/// Environment variables for per-shape cache TTLs (seconds)
pub const ENV_CACHE_TTL_SESSIONS: &str = "FITGATE_CACHE_TTL_SESSIONS";
pub const ENV_CACHE_TTL_DETAILS: &str = "FITGATE_CACHE_TTL_DETAILS";
pub const ENV_CACHE_TTL_SUMMARY: &str = "FITGATE_CACHE_TTL_SUMMARY";
pub const ENV_CACHE_TTL_METRICS: &str = "FITGATE_CACHE_TTL_METRICS";

// =============================================================================
// Environment Variables - Warehouse
// =============================================================================

/// Environment variable for the ClickHouse URL
pub const ENV_CLICKHOUSE_URL: &str = "FITGATE_CLICKHOUSE_URL";

/// Environment variable for the ClickHouse database
pub const ENV_CLICKHOUSE_DATABASE: &str = "FITGATE_CLICKHOUSE_DATABASE";

/// Environment variable for the ClickHouse user
pub const ENV_CLICKHOUSE_USER: &str = "FITGATE_CLICKHOUSE_USER";

/// Environment variable for the ClickHouse password
pub const ENV_CLICKHOUSE_PASSWORD: &str = "FITGATE_CLICKHOUSE_PASSWORD";

/// Environment variable for the per-query warehouse deadline (seconds)
pub const ENV_WAREHOUSE_TIMEOUT_SECS: &str = "FITGATE_WAREHOUSE_TIMEOUT_SECS";

// =============================================================================
// Environment Variables - Rate Limiting
// =============================================================================

/// Environment variable to enable/disable per-IP rate limiting
pub const ENV_RATE_LIMIT_ENABLED: &str = "FITGATE_RATE_LIMIT_ENABLED";

/// Environment variable for requests per minute per client
pub const ENV_RATE_LIMIT_RPM: &str = "FITGATE_RATE_LIMIT_RPM";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 8380;

// =============================================================================
// Cache Defaults
// =============================================================================

/// Default max entries for the in-memory cache backend
pub const DEFAULT_CACHE_MAX_ENTRIES: u64 = 100_000;

/// Default TTL for session list / session-by-id results (seconds)
pub const DEFAULT_CACHE_TTL_SESSIONS: u64 = 300;

/// Default TTL for session detail results (seconds)
pub const DEFAULT_CACHE_TTL_DETAILS: u64 = 600;

/// Default TTL for global and periodic summary results (seconds)
pub const DEFAULT_CACHE_TTL_SUMMARY: u64 = 3600;

/// Default TTL for daily metrics results (seconds)
pub const DEFAULT_CACHE_TTL_METRICS: u64 = 900;

// =============================================================================
// Warehouse Defaults
// =============================================================================

/// Default ClickHouse URL
pub const DEFAULT_CLICKHOUSE_URL: &str = "http://localhost:8123";

/// Default ClickHouse database holding the fitness tables
pub const DEFAULT_CLICKHOUSE_DATABASE: &str = "fitness_data";

/// Default per-query warehouse deadline (seconds)
pub const DEFAULT_WAREHOUSE_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Rate Limiting Defaults
// =============================================================================

/// Default requests per minute per client IP
pub const DEFAULT_RATE_LIMIT_RPM: u32 = 30;

/// Default rate limit window duration (seconds)
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;

// =============================================================================
// Query Shape Constants
// =============================================================================

/// Sentinel token substituted for absent optional cache-key parameters
pub const NONE_TOKEN: &str = "none";

/// Sessions returned per page
pub const SESSIONS_PAGE_SIZE: u32 = 10;

/// Detail records returned per page
pub const DETAILS_PAGE_SIZE: u32 = 500;

/// Default page number
pub const DEFAULT_PAGE: u32 = 1;

/// Maximum page number to prevent expensive OFFSET queries
pub const MAX_PAGE: u32 = 1000;
