//! Daily metrics endpoints

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use validator::Validate;

use crate::api::ApiState;
use crate::api::extractors::ValidatedQuery;
use crate::api::types::{ApiError, parse_date_param};
use crate::data::types::{DailyMetrics, MetricsQuery, MetricsSummary};
use crate::domain::queries::Sourced;

/// Query parameters for the daily metrics endpoints
#[derive(Debug, Deserialize, Validate)]
pub struct DailyMetricsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl DailyMetricsQuery {
    fn into_query(self) -> Result<MetricsQuery, ApiError> {
        Ok(MetricsQuery {
            start_date: parse_date_param(&self.start_date)?,
            end_date: parse_date_param(&self.end_date)?,
        })
    }
}

/// Daily biometric snapshots, newest first
///
/// When both date bounds are given, dates without warehouse rows are filled
/// with zeroed placeholder records so charts render a continuous range.
#[utoipa::path(
    get,
    path = "/api/daily-metrics",
    tag = "metrics",
    params(
        ("start_date" = Option<String>, Query, description = "Earliest date (YYYY-MM-DD)"),
        ("end_date" = Option<String>, Query, description = "Latest date (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Daily metric records, newest first"),
        (status = 400, description = "Invalid date parameter")
    )
)]
pub async fn daily_metrics(
    State(state): State<ApiState>,
    ValidatedQuery(params): ValidatedQuery<DailyMetricsQuery>,
) -> Result<Json<Sourced<Vec<DailyMetrics>>>, ApiError> {
    let query = params.into_query()?;
    let result = state.queries.daily_metrics(&query).await?;
    Ok(Json(result))
}

/// Aggregate statistics over a daily metrics date range
#[utoipa::path(
    get,
    path = "/api/daily-metrics/summary",
    tag = "metrics",
    params(
        ("start_date" = Option<String>, Query, description = "Earliest date (YYYY-MM-DD)"),
        ("end_date" = Option<String>, Query, description = "Latest date (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Metric aggregates for the range"),
        (status = 400, description = "Invalid date parameter")
    )
)]
pub async fn metrics_summary(
    State(state): State<ApiState>,
    ValidatedQuery(params): ValidatedQuery<DailyMetricsQuery>,
) -> Result<Json<Sourced<MetricsSummary>>, ApiError> {
    let query = params.into_query()?;
    let result = state.queries.metrics_summary(&query).await?;
    Ok(Json(result))
}
