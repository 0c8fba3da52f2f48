//! Gap-filling for date-ranged daily metric queries
//!
//! Wearables miss days (device off, not synced). Callers charting a date
//! range want one row per day, so missing days are synthesized as placeholder
//! rows: `file_hash = "none"`, every numeric field zero. Genuine rows keep
//! their `file_hash`, which is how consumers tell the two apart.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveTime};

use crate::core::constants::NONE_TOKEN;
use crate::data::types::DailyMetrics;

/// Placeholder row for a day with no recorded metrics
fn placeholder(date: NaiveDate) -> DailyMetrics {
    DailyMetrics {
        timestamp: date.and_time(NaiveTime::MIN).and_utc(),
        file_hash: NONE_TOKEN.to_string(),
        sleep_score: Some(0.0),
        sleep_duration_hours: Some(0.0),
        avg_stress: Some(0.0),
        max_stress: Some(0),
        body_battery_high: Some(0),
        body_battery_low: Some(0),
        resting_heart_rate: Some(0),
        steps: Some(0),
        weight_kg: Some(0.0),
    }
}

/// Fill every date in the closed range `[start, end]` that has no record
///
/// Returns the combined set sorted by timestamp descending. Idempotent:
/// dates already covered (by a genuine row or an earlier placeholder) are
/// left alone. An inverted range fills nothing.
pub fn fill_daily_gaps(
    mut records: Vec<DailyMetrics>,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<DailyMetrics> {
    let covered: HashSet<NaiveDate> = records.iter().map(|r| r.timestamp.date_naive()).collect();

    let mut day = start;
    while day <= end {
        if !covered.contains(&day) {
            records.push(placeholder(day));
        }
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    records
}
