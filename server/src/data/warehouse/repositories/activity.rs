//! Period-bucketed activity aggregates over the `sessions` table

use chrono::NaiveDate;
use clickhouse::{Client, Row};
use serde::Deserialize;

use crate::data::types::{ActivityPeriod, ActivityQuery, ActivitySummary};
use crate::data::warehouse::WarehouseError;

use super::ConditionBuilder;

#[derive(Row, Deserialize)]
struct ChActivityRow {
    period_start: String,
    sport: String,
    session_count: u64,
    total_distance_km: f64,
    total_duration_hours: f64,
    total_calories: i64,
}

impl From<ChActivityRow> for ActivitySummary {
    fn from(row: ChActivityRow) -> Self {
        Self {
            period_start: NaiveDate::parse_from_str(&row.period_start, "%Y-%m-%d")
                .unwrap_or_default(),
            sport: row.sport,
            session_count: row.session_count,
            total_distance_km: row.total_distance_km,
            total_duration_hours: row.total_duration_hours,
            total_calories: row.total_calories,
        }
    }
}

/// Bucket expression for a granularity, applied to the session start time
fn bucket_expr(period: ActivityPeriod) -> &'static str {
    match period {
        ActivityPeriod::Daily => "toDate(start_time)",
        ActivityPeriod::Weekly => "toMonday(toDate(start_time))",
        ActivityPeriod::Monthly => "toStartOfMonth(toDate(start_time))",
    }
}

/// Aggregate sessions per (period, sport) bucket, newest period first
///
/// Sessions without a start time cannot be bucketed and are excluded.
pub async fn activity_summary(
    client: &Client,
    period: ActivityPeriod,
    query: &ActivityQuery,
) -> Result<Vec<ActivitySummary>, WarehouseError> {
    let mut cb = ConditionBuilder::new();
    cb.add_raw("start_time IS NOT NULL");
    if let Some(ref sport) = query.sport {
        cb.add_eq("sport", sport);
    }
    if let Some(ref from) = query.start_date {
        cb.add_date_gte("start_time", from);
    }
    if let Some(ref to) = query.end_date {
        cb.add_date_lte("start_time", to);
    }

    let sql = format!(
        r#"
        SELECT
            toString({bucket}) as period_start,
            coalesce(sport, 'unknown') as sport,
            count() as session_count,
            coalesce(sum(total_distance), 0) / 1000 as total_distance_km,
            coalesce(sum(total_timer_time), 0) / 3600 as total_duration_hours,
            toInt64(coalesce(sum(total_calories), 0)) as total_calories
        FROM sessions
        WHERE {where_clause}
        GROUP BY period_start, sport
        ORDER BY period_start DESC, sport ASC
        "#,
        bucket = bucket_expr(period),
        where_clause = cb.build()
    );

    let rows: Vec<ChActivityRow> = cb.bind_to(client.query(&sql)).fetch_all().await?;
    Ok(rows.into_iter().map(ActivitySummary::from).collect())
}
