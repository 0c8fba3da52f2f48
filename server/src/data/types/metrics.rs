//! Daily biometric/wellness snapshot types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Daily biometric snapshot
///
/// Identity: the date of `timestamp` + `file_hash`. Gap-filled placeholder
/// rows carry `file_hash = "none"` and zeroed numeric fields so callers can
/// tell them apart from genuine warehouse rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DailyMetrics {
    pub timestamp: DateTime<Utc>,
    pub file_hash: String,
    pub sleep_score: Option<f64>,
    pub sleep_duration_hours: Option<f64>,
    pub avg_stress: Option<f64>,
    pub max_stress: Option<i32>,
    pub body_battery_high: Option<i32>,
    pub body_battery_low: Option<i32>,
    pub resting_heart_rate: Option<i32>,
    pub steps: Option<i64>,
    pub weight_kg: Option<f64>,
}

/// Aggregate statistics over a DailyMetrics date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MetricsSummary {
    pub days_with_data: u64,
    pub avg_sleep_score: Option<f64>,
    pub avg_sleep_duration_hours: Option<f64>,
    pub avg_stress: Option<f64>,
    pub avg_resting_heart_rate: Option<f64>,
    pub min_resting_heart_rate: Option<i32>,
    pub max_resting_heart_rate: Option<i32>,
    pub avg_weight_kg: Option<f64>,
}

/// Normalized parameters for the daily metrics query shapes
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricsQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
