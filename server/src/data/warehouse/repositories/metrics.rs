//! Daily biometric queries against the `daily_metrics` table

use chrono::DateTime;
use clickhouse::{Client, Row};
use serde::Deserialize;

use crate::data::types::{DailyMetrics, MetricsQuery, MetricsSummary};
use crate::data::warehouse::WarehouseError;

use super::ConditionBuilder;

#[derive(Row, Deserialize)]
struct ChMetricsRow {
    timestamp: i64,
    file_hash: String,
    sleep_score: Option<f64>,
    sleep_duration_hours: Option<f64>,
    avg_stress: Option<f64>,
    max_stress: Option<i32>,
    body_battery_high: Option<i32>,
    body_battery_low: Option<i32>,
    resting_heart_rate: Option<i32>,
    steps: Option<i64>,
    weight_kg: Option<f64>,
}

impl From<ChMetricsRow> for DailyMetrics {
    fn from(row: ChMetricsRow) -> Self {
        Self {
            timestamp: DateTime::from_timestamp_micros(row.timestamp)
                .unwrap_or(DateTime::UNIX_EPOCH),
            file_hash: row.file_hash,
            sleep_score: row.sleep_score,
            sleep_duration_hours: row.sleep_duration_hours,
            avg_stress: row.avg_stress,
            max_stress: row.max_stress,
            body_battery_high: row.body_battery_high,
            body_battery_low: row.body_battery_low,
            resting_heart_rate: row.resting_heart_rate,
            steps: row.steps,
            weight_kg: row.weight_kg,
        }
    }
}

fn date_conditions(query: &MetricsQuery) -> ConditionBuilder {
    let mut cb = ConditionBuilder::new();
    if let Some(ref from) = query.start_date {
        cb.add_date_gte("timestamp", from);
    }
    if let Some(ref to) = query.end_date {
        cb.add_date_lte("timestamp", to);
    }
    cb
}

/// List daily metric snapshots, newest first
pub async fn daily_metrics(
    client: &Client,
    query: &MetricsQuery,
) -> Result<Vec<DailyMetrics>, WarehouseError> {
    let cb = date_conditions(query);

    let sql = format!(
        r#"
        SELECT
            toInt64(toUnixTimestamp64Micro(timestamp)) as timestamp,
            file_hash,
            sleep_score,
            sleep_duration_hours,
            avg_stress,
            max_stress,
            body_battery_high,
            body_battery_low,
            resting_heart_rate,
            steps,
            weight_kg
        FROM daily_metrics
        WHERE {}
        ORDER BY timestamp DESC
        "#,
        cb.build()
    );

    let rows: Vec<ChMetricsRow> = cb.bind_to(client.query(&sql)).fetch_all().await?;
    Ok(rows.into_iter().map(DailyMetrics::from).collect())
}

#[derive(Row, Deserialize)]
struct ChMetricsSummaryRow {
    days_with_data: u64,
    avg_sleep_score: Option<f64>,
    avg_sleep_duration_hours: Option<f64>,
    avg_stress: Option<f64>,
    avg_resting_heart_rate: Option<f64>,
    min_resting_heart_rate: Option<i32>,
    max_resting_heart_rate: Option<i32>,
    avg_weight_kg: Option<f64>,
}

/// Aggregate statistics over a daily metrics date range
///
/// ClickHouse aggregate functions over Nullable columns skip NULLs, so a
/// range with no readings for a given metric yields NULL rather than zero.
pub async fn metrics_summary(
    client: &Client,
    query: &MetricsQuery,
) -> Result<MetricsSummary, WarehouseError> {
    let cb = date_conditions(query);

    let sql = format!(
        r#"
        SELECT
            count(DISTINCT toDate(timestamp)) as days_with_data,
            avg(sleep_score) as avg_sleep_score,
            avg(sleep_duration_hours) as avg_sleep_duration_hours,
            avg(avg_stress) as avg_stress,
            avg(toFloat64(resting_heart_rate)) as avg_resting_heart_rate,
            min(resting_heart_rate) as min_resting_heart_rate,
            max(resting_heart_rate) as max_resting_heart_rate,
            avg(weight_kg) as avg_weight_kg
        FROM daily_metrics
        WHERE {}
        "#,
        cb.build()
    );

    let row: ChMetricsSummaryRow = cb.bind_to(client.query(&sql)).fetch_one().await?;

    Ok(MetricsSummary {
        days_with_data: row.days_with_data,
        avg_sleep_score: row.avg_sleep_score,
        avg_sleep_duration_hours: row.avg_sleep_duration_hours,
        avg_stress: row.avg_stress,
        avg_resting_heart_rate: row.avg_resting_heart_rate,
        min_resting_heart_rate: row.min_resting_heart_rate,
        max_resting_heart_rate: row.max_resting_heart_rate,
        avg_weight_kg: row.avg_weight_kg,
    })
}
