//! Warehouse error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WarehouseError {
    #[error("Warehouse query error: {0}")]
    Query(#[from] clickhouse::error::Error),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query timeout after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_display() {
        let err = WarehouseError::Connection("connection refused".to_string());
        assert_eq!(err.to_string(), "Connection error: connection refused");
    }

    #[test]
    fn test_timeout_error_display() {
        let err = WarehouseError::Timeout { timeout_secs: 30 };
        assert_eq!(err.to_string(), "Query timeout after 30s");
    }
}
