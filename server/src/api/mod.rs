//! HTTP API layer

pub mod extractors;
pub mod openapi;
pub mod rate_limit;
pub mod routes;
pub mod server;
pub mod types;

use std::sync::Arc;

use crate::data::cache::CacheService;
use crate::data::warehouse::WarehouseService;
use crate::domain::queries::QueryService;

pub use server::ApiServer;

/// Shared state for the API route handlers
#[derive(Clone)]
pub struct ApiState {
    pub queries: Arc<QueryService>,
    pub cache: Arc<CacheService>,
    pub warehouse: Arc<WarehouseService>,
}
