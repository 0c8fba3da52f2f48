//! Health check endpoint

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::ApiState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub cache: ComponentHealth,
    pub warehouse: ComponentHealth,
}

#[derive(Serialize, ToSchema)]
pub struct ComponentHealth {
    pub backend: &'static str,
    pub healthy: bool,
}

/// Health check endpoint
///
/// Reports per-component health; a degraded cache or warehouse still answers
/// 200 so load balancers keep routing to the warehouse-only degraded path.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health report", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let cache_healthy = match state.cache.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Cache health check failed");
            false
        }
    };
    let warehouse_healthy = match state.warehouse.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Warehouse health check failed");
            false
        }
    };

    let status = if cache_healthy && warehouse_healthy {
        "ok"
    } else {
        "degraded"
    };

    (
        StatusCode::OK,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            cache: ComponentHealth {
                backend: state.cache.backend_name(),
                healthy: cache_healthy,
            },
            warehouse: ComponentHealth {
                backend: "clickhouse",
                healthy: warehouse_healthy,
            },
        }),
    )
}
