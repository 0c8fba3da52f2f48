//! Period-bucketed activity summary endpoints

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use validator::Validate;

use crate::api::ApiState;
use crate::api::extractors::ValidatedQuery;
use crate::api::types::{ApiError, parse_date_param};
use crate::data::types::{ActivityPeriod, ActivityQuery, ActivitySummary};
use crate::domain::queries::Sourced;

/// Query parameters shared by the daily/weekly/monthly summary endpoints
#[derive(Debug, Deserialize, Validate)]
pub struct ActivitySummaryQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sport: Option<String>,
}

impl ActivitySummaryQuery {
    fn into_query(self) -> Result<ActivityQuery, ApiError> {
        Ok(ActivityQuery {
            start_date: parse_date_param(&self.start_date)?,
            end_date: parse_date_param(&self.end_date)?,
            sport: self.sport,
        })
    }
}

async fn activity_summary(
    state: ApiState,
    period: ActivityPeriod,
    params: ActivitySummaryQuery,
) -> Result<Json<Sourced<Vec<ActivitySummary>>>, ApiError> {
    let query = params.into_query()?;
    let result = state.queries.activity_summary(period, &query).await?;
    Ok(Json(result))
}

/// Per-day activity totals grouped by sport
#[utoipa::path(
    get,
    path = "/api/daily-summary",
    tag = "summary",
    params(
        ("start_date" = Option<String>, Query, description = "Earliest date (YYYY-MM-DD)"),
        ("end_date" = Option<String>, Query, description = "Latest date (YYYY-MM-DD)"),
        ("sport" = Option<String>, Query, description = "Filter by sport")
    ),
    responses(
        (status = 200, description = "Daily activity buckets, newest first")
    )
)]
pub async fn daily_summary(
    State(state): State<ApiState>,
    ValidatedQuery(params): ValidatedQuery<ActivitySummaryQuery>,
) -> Result<Json<Sourced<Vec<ActivitySummary>>>, ApiError> {
    activity_summary(state, ActivityPeriod::Daily, params).await
}

/// Per-week activity totals grouped by sport
#[utoipa::path(
    get,
    path = "/api/weekly-summary",
    tag = "summary",
    params(
        ("start_date" = Option<String>, Query, description = "Earliest date (YYYY-MM-DD)"),
        ("end_date" = Option<String>, Query, description = "Latest date (YYYY-MM-DD)"),
        ("sport" = Option<String>, Query, description = "Filter by sport")
    ),
    responses(
        (status = 200, description = "Weekly activity buckets, newest first")
    )
)]
pub async fn weekly_summary(
    State(state): State<ApiState>,
    ValidatedQuery(params): ValidatedQuery<ActivitySummaryQuery>,
) -> Result<Json<Sourced<Vec<ActivitySummary>>>, ApiError> {
    activity_summary(state, ActivityPeriod::Weekly, params).await
}

/// Per-month activity totals grouped by sport
#[utoipa::path(
    get,
    path = "/api/monthly-summary",
    tag = "summary",
    params(
        ("start_date" = Option<String>, Query, description = "Earliest date (YYYY-MM-DD)"),
        ("end_date" = Option<String>, Query, description = "Latest date (YYYY-MM-DD)"),
        ("sport" = Option<String>, Query, description = "Filter by sport")
    ),
    responses(
        (status = 200, description = "Monthly activity buckets, newest first")
    )
)]
pub async fn monthly_summary(
    State(state): State<ApiState>,
    ValidatedQuery(params): ValidatedQuery<ActivitySummaryQuery>,
) -> Result<Json<Sourced<Vec<ActivitySummary>>>, ApiError> {
    activity_summary(state, ActivityPeriod::Monthly, params).await
}
