//! ClickHouse warehouse service
//!
//! Read-only access to the fitness data warehouse over async HTTP with LZ4
//! compression. The warehouse is the source of truth; this service never
//! writes to it (ingestion is a separate pipeline).

pub mod error;
pub mod repositories;
mod repository_impl;

pub use error::WarehouseError;

use std::future::Future;
use std::time::Duration;

use clickhouse::Client;

use crate::core::config::WarehouseConfig;

/// Warehouse query service
///
/// Wraps the ClickHouse client (hyper with HTTP keep-alive pooling
/// internally) and enforces the configured per-query deadline.
pub struct WarehouseService {
    client: Client,
    query_timeout: Duration,
}

impl WarehouseService {
    /// Initialize the warehouse connection from configuration
    pub fn init(config: &WarehouseConfig) -> Self {
        let mut client = Client::default()
            .with_url(&config.url)
            .with_database(&config.database)
            .with_compression(clickhouse::Compression::Lz4);

        if let Some(ref user) = config.user {
            client = client.with_user(user);
        }
        if let Some(ref password) = config.password {
            client = client.with_password(password);
        }

        tracing::debug!(
            url = %config.url,
            database = %config.database,
            timeout_secs = config.query_timeout_secs,
            "WarehouseService initialized"
        );

        Self {
            client,
            query_timeout: Duration::from_secs(config.query_timeout_secs),
        }
    }

    /// Get the ClickHouse client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Run a warehouse query under the configured deadline
    pub(crate) async fn with_timeout<T>(
        &self,
        fut: impl Future<Output = Result<T, WarehouseError>>,
    ) -> Result<T, WarehouseError> {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(WarehouseError::Timeout {
                timeout_secs: self.query_timeout.as_secs(),
            }),
        }
    }

    /// Health check - verify connection to the warehouse
    pub async fn health_check(&self) -> Result<(), WarehouseError> {
        self.with_timeout(async {
            self.client
                .query("SELECT 1")
                .execute()
                .await
                .map_err(WarehouseError::from)
        })
        .await
    }
}
