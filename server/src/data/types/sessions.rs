//! Session record types
//!
//! Immutable value records projected from the warehouse `sessions` and
//! `session_records` tables. Optional numeric fields are `None` (not zero)
//! when the source recording lacked that sensor.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Aggregate metrics for one recorded fitness session
///
/// Identity: `session_id` + `file_hash` (both non-empty).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SessionSummary {
    pub file_hash: String,
    pub filename: String,
    pub session_id: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub start_time: Option<DateTime<Utc>>,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial_number: Option<i64>,
    pub sport: Option<String>,
    pub sub_sport: Option<String>,
    pub total_elapsed_time: Option<f64>,
    pub total_timer_time: Option<f64>,
    pub total_distance: Option<f64>,
    pub avg_speed: Option<f64>,
    pub max_speed: Option<f64>,
    pub avg_cadence: Option<i32>,
    pub max_cadence: Option<i32>,
    pub min_heart_rate: Option<i32>,
    pub avg_heart_rate: Option<i32>,
    pub max_heart_rate: Option<i32>,
    pub avg_power: Option<i32>,
    pub max_power: Option<i32>,
    pub normalized_power: Option<i32>,
    pub threshold_power: Option<i32>,
    pub total_work: Option<i64>,
    pub total_calories: Option<i32>,
    pub min_altitude: Option<f64>,
    pub avg_altitude: Option<f64>,
    pub max_altitude: Option<f64>,
    pub total_ascent: Option<i32>,
    pub total_descent: Option<i32>,
    pub avg_grade: Option<f64>,
    pub max_pos_grade: Option<f64>,
    pub max_neg_grade: Option<f64>,
    pub avg_temperature: Option<i32>,
    pub max_temperature: Option<i32>,
    pub training_stress_score: Option<f64>,
    pub intensity_factor: Option<f64>,
    pub num_laps: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// One time-sample record within a session
///
/// Identity: `session_id` + `record_id`. Ordered timestamp ascending within
/// a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SessionDetail {
    pub session_id: String,
    pub record_id: i64,
    pub timestamp: DateTime<Utc>,
    pub position_lat: Option<f64>,
    pub position_long: Option<f64>,
    pub distance: Option<f64>,
    pub altitude: Option<f64>,
    pub speed: Option<f64>,
    pub heart_rate: Option<i32>,
    pub cadence: Option<i32>,
    pub power: Option<i32>,
    pub temperature: Option<i32>,
}

/// Single aggregate row over all sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GlobalSummary {
    pub total_sessions: u64,
    pub total_distance_km: f64,
    pub total_duration_hours: f64,
    pub last_updated: DateTime<Utc>,
}

/// Normalized parameters for the sessions list query shape
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionQuery {
    pub page: u32,
    pub sport: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub min_distance: Option<f64>,
    pub max_distance: Option<f64>,
}

impl SessionQuery {
    /// True when any optional filter is set
    pub fn has_filters(&self) -> bool {
        self.sport.is_some()
            || self.start_date.is_some()
            || self.end_date.is_some()
            || self.min_distance.is_some()
            || self.max_distance.is_some()
    }
}
