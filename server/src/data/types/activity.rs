//! Period-bucketed activity summary types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Aggregates for one (period, sport) bucket
///
/// `period_start` is the first date of the bucket: the day itself for daily
/// summaries, the Monday of the week for weekly, the first of the month for
/// monthly. Result sets are ordered period descending, then sport ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ActivitySummary {
    pub period_start: NaiveDate,
    pub sport: String,
    pub session_count: u64,
    pub total_distance_km: f64,
    pub total_duration_hours: f64,
    pub total_calories: i64,
}

/// Bucket granularity for activity summary queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityPeriod {
    Daily,
    Weekly,
    Monthly,
}

impl ActivityPeriod {
    /// Cache-key namespace for this granularity
    pub fn key_prefix(&self) -> &'static str {
        match self {
            ActivityPeriod::Daily => "daily_activity",
            ActivityPeriod::Weekly => "weekly_activity",
            ActivityPeriod::Monthly => "monthly_activity",
        }
    }
}

/// Normalized parameters for the activity summary query shapes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sport: Option<String>,
}
