//! Session API endpoints

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use validator::Validate;

use crate::api::ApiState;
use crate::api::extractors::ValidatedQuery;
use crate::api::types::{
    ApiError, default_page, parse_date_param, parse_fields_param, validate_page,
};
use crate::data::types::{SessionDetail, SessionQuery, SessionSummary};
use crate::domain::queries::Sourced;

/// Query parameters for the sessions list endpoint
#[derive(Debug, Deserialize, Validate)]
pub struct ListSessionsQuery {
    #[serde(default = "default_page")]
    #[validate(custom(function = "validate_page"))]
    pub page: u32,
    pub sport: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub min_distance: Option<f64>,
    pub max_distance: Option<f64>,
    pub fields: Option<String>,
}

/// Query parameters for single-session endpoints
#[derive(Debug, Deserialize, Validate)]
pub struct GetSessionQuery {
    pub fields: Option<String>,
}

/// Query parameters for the session details endpoint
#[derive(Debug, Deserialize, Validate)]
pub struct SessionDetailsQuery {
    #[serde(default = "default_page")]
    #[validate(custom(function = "validate_page"))]
    pub page: u32,
}

/// List session summaries, newest first
#[utoipa::path(
    get,
    path = "/api/sessions",
    tag = "sessions",
    params(
        ("page" = Option<u32>, Query, description = "Page number (1-1000)"),
        ("sport" = Option<String>, Query, description = "Filter by sport"),
        ("start_date" = Option<String>, Query, description = "Earliest start date (YYYY-MM-DD)"),
        ("end_date" = Option<String>, Query, description = "Latest start date (YYYY-MM-DD)"),
        ("min_distance" = Option<f64>, Query, description = "Minimum total distance in meters"),
        ("max_distance" = Option<f64>, Query, description = "Maximum total distance in meters"),
        ("fields" = Option<String>, Query, description = "Comma-separated field names to project")
    ),
    responses(
        (status = 200, description = "One page of session summaries"),
        (status = 400, description = "Invalid query parameter")
    )
)]
pub async fn list_sessions(
    State(state): State<ApiState>,
    ValidatedQuery(params): ValidatedQuery<ListSessionsQuery>,
) -> Result<Json<Sourced<Vec<SessionSummary>>>, ApiError> {
    let fields = parse_fields_param(&params.fields)?;
    let query = SessionQuery {
        page: params.page,
        sport: params.sport,
        start_date: parse_date_param(&params.start_date)?,
        end_date: parse_date_param(&params.end_date)?,
        min_distance: params.min_distance,
        max_distance: params.max_distance,
    };

    let result = state.queries.list_sessions(&query, fields.as_deref()).await?;
    Ok(Json(result))
}

/// Get a single session by ID
#[utoipa::path(
    get,
    path = "/api/sessions/{session_id}",
    tag = "sessions",
    params(
        ("session_id" = String, Path, description = "Session ID"),
        ("fields" = Option<String>, Query, description = "Comma-separated field names to project")
    ),
    responses(
        (status = 200, description = "Session summary"),
        (status = 404, description = "Session not found")
    )
)]
pub async fn get_session(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
    ValidatedQuery(params): ValidatedQuery<GetSessionQuery>,
) -> Result<Json<Sourced<SessionSummary>>, ApiError> {
    let fields = parse_fields_param(&params.fields)?;

    let result = state
        .queries
        .get_session(&session_id, fields.as_deref())
        .await?;
    Ok(Json(result))
}

/// Get time-sample records for a session, timestamp ascending
#[utoipa::path(
    get,
    path = "/api/sessions/{session_id}/details",
    tag = "sessions",
    params(
        ("session_id" = String, Path, description = "Session ID"),
        ("page" = Option<u32>, Query, description = "Page number (1-1000)")
    ),
    responses(
        (status = 200, description = "One page of session records"),
        (status = 400, description = "Invalid query parameter")
    )
)]
pub async fn session_details(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
    ValidatedQuery(params): ValidatedQuery<SessionDetailsQuery>,
) -> Result<Json<Sourced<Vec<SessionDetail>>>, ApiError> {
    let result = state
        .queries
        .session_details(&session_id, params.page)
        .await?;
    Ok(Json(result))
}
