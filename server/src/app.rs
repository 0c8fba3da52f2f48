//! Core application

use std::sync::Arc;

use anyhow::Result;

use crate::api::ApiServer;
use crate::core::cli::{self, CacheCommands, CliConfig, Commands};
use crate::core::config::{AppConfig, CacheBackendType};
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::data::cache::{CacheService, RateLimiter};
use crate::data::traits::WarehouseRepository;
use crate::data::warehouse::WarehouseService;
use crate::domain::queries::QueryService;

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub cache: Arc<CacheService>,
    pub warehouse: Arc<WarehouseService>,
    pub queries: Arc<QueryService>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();

        match command {
            Some(Commands::Cache { command }) => {
                return Self::handle_cache_command(&cli_config, command).await;
            }
            Some(Commands::Start) | None => {}
        }

        let app = Self::init(&cli_config).await?;
        Self::start_server(app).await
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;

        let cache = Arc::new(
            CacheService::new(&config.cache)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to initialize cache service: {}", e))?,
        );
        tracing::debug!(backend = cache.backend_name(), "Cache initialized");

        let rate_limiter = Arc::new(RateLimiter::new(cache.clone()));

        let warehouse = Arc::new(WarehouseService::init(&config.warehouse));

        // The ClickHouse client is lazy; probe it once so a misconfigured URL
        // surfaces at startup instead of on the first request.
        if let Err(e) = warehouse.health_check().await {
            tracing::warn!(error = %e, "Warehouse unreachable at startup, queries will fail until it recovers");
        }

        let repository: Arc<dyn WarehouseRepository> = Arc::new(warehouse.clone());
        let queries = Arc::new(QueryService::new(repository, cache.clone(), config.ttl));

        let shutdown = ShutdownService::new();

        Ok(Self {
            shutdown,
            config,
            cache,
            warehouse,
            queries,
            rate_limiter,
        })
    }

    async fn handle_cache_command(cli: &CliConfig, cmd: CacheCommands) -> Result<()> {
        let config = AppConfig::load(cli)?;

        match cmd {
            CacheCommands::Flush { pattern } => {
                if config.cache.backend == CacheBackendType::Memory {
                    println!(
                        "Note: the memory backend is per-process; flushing here does not \
                         affect a running server."
                    );
                }

                let cache = CacheService::new(&config.cache)
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to initialize cache service: {}", e))?;
                let deleted = cache
                    .flush_pattern(&pattern)
                    .await
                    .map_err(|e| anyhow::anyhow!("Cache flush failed: {}", e))?;
                println!("Flushed {} entries matching '{}'", deleted, pattern);
                Ok(())
            }
        }
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        app.shutdown.listen_for_ctrl_c();

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.trigger();

        tracing::info!("Shutdown complete");
        Ok(())
    }
}
