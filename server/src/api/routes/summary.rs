//! Global summary endpoint

use axum::Json;
use axum::extract::State;

use crate::api::ApiState;
use crate::api::types::ApiError;
use crate::data::types::GlobalSummary;
use crate::domain::queries::Sourced;

/// Aggregate totals over all sessions
#[utoipa::path(
    get,
    path = "/api/summary",
    tag = "summary",
    responses(
        (status = 200, description = "Global session totals")
    )
)]
pub async fn global_summary(
    State(state): State<ApiState>,
) -> Result<Json<Sourced<GlobalSummary>>, ApiError> {
    let result = state.queries.global_summary().await?;
    Ok(Json(result))
}
