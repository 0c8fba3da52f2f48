//! Global summary aggregate over the `sessions` table

use chrono::Utc;
use clickhouse::{Client, Row};
use serde::Deserialize;

use crate::data::types::GlobalSummary;
use crate::data::warehouse::WarehouseError;

#[derive(Row, Deserialize)]
struct ChGlobalSummaryRow {
    total_sessions: u64,
    total_distance_km: f64,
    total_duration_hours: f64,
}

/// Single aggregate row over all sessions
///
/// Distances are stored in meters and durations in seconds; this query
/// converts to kilometers and hours. `last_updated` is stamped at fetch
/// time, so consumers can tell how stale a cached summary is.
pub async fn global_summary(client: &Client) -> Result<GlobalSummary, WarehouseError> {
    let sql = r#"
        SELECT
            count() as total_sessions,
            coalesce(sum(total_distance), 0) / 1000 as total_distance_km,
            coalesce(sum(total_timer_time), 0) / 3600 as total_duration_hours
        FROM sessions
    "#;

    let row: ChGlobalSummaryRow = client.query(sql).fetch_one().await?;

    Ok(GlobalSummary {
        total_sessions: row.total_sessions,
        total_distance_km: row.total_distance_km,
        total_duration_hours: row.total_duration_hours,
        last_updated: Utc::now(),
    })
}
