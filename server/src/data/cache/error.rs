//! Cache error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache configuration error: {0}")]
    Config(String),

    #[error("Cache connection error: {0}")]
    Connection(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Redis error: {0}")]
    Redis(#[from] deadpool_redis::redis::RedisError),

    #[error("Redis pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),
}

impl CacheError {
    /// True when a stored payload failed to decode into the target shape
    ///
    /// The query layer treats this distinctly (miss) from connectivity
    /// failures (degrade to warehouse-only), though both leave the request
    /// serviceable.
    pub fn is_decode(&self) -> bool {
        matches!(self, CacheError::Serialization(_))
    }
}
