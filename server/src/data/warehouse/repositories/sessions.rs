//! Session queries against the `sessions` and `session_records` tables

use chrono::DateTime;
use clickhouse::{Client, Row};
use serde::Deserialize;

use crate::core::constants::{DETAILS_PAGE_SIZE, SESSIONS_PAGE_SIZE};
use crate::data::types::{SessionDetail, SessionQuery, SessionSummary};
use crate::data::warehouse::WarehouseError;

use super::ConditionBuilder;

/// ClickHouse row for session summary queries
#[derive(Row, Deserialize)]
struct ChSessionRow {
    file_hash: String,
    filename: String,
    session_id: String,
    timestamp: Option<i64>,
    start_time: Option<i64>,
    manufacturer: Option<String>,
    product: Option<String>,
    serial_number: Option<i64>,
    sport: Option<String>,
    sub_sport: Option<String>,
    total_elapsed_time: Option<f64>,
    total_timer_time: Option<f64>,
    total_distance: Option<f64>,
    avg_speed: Option<f64>,
    max_speed: Option<f64>,
    avg_cadence: Option<i32>,
    max_cadence: Option<i32>,
    min_heart_rate: Option<i32>,
    avg_heart_rate: Option<i32>,
    max_heart_rate: Option<i32>,
    avg_power: Option<i32>,
    max_power: Option<i32>,
    normalized_power: Option<i32>,
    threshold_power: Option<i32>,
    total_work: Option<i64>,
    total_calories: Option<i32>,
    min_altitude: Option<f64>,
    avg_altitude: Option<f64>,
    max_altitude: Option<f64>,
    total_ascent: Option<i32>,
    total_descent: Option<i32>,
    avg_grade: Option<f64>,
    max_pos_grade: Option<f64>,
    max_neg_grade: Option<f64>,
    avg_temperature: Option<i32>,
    max_temperature: Option<i32>,
    training_stress_score: Option<f64>,
    intensity_factor: Option<f64>,
    num_laps: Option<i32>,
    created_at: i64,
}

impl From<ChSessionRow> for SessionSummary {
    fn from(row: ChSessionRow) -> Self {
        Self {
            file_hash: row.file_hash,
            filename: row.filename,
            session_id: row.session_id,
            timestamp: row.timestamp.and_then(DateTime::from_timestamp_micros),
            start_time: row.start_time.and_then(DateTime::from_timestamp_micros),
            manufacturer: row.manufacturer,
            product: row.product,
            serial_number: row.serial_number,
            sport: row.sport,
            sub_sport: row.sub_sport,
            total_elapsed_time: row.total_elapsed_time,
            total_timer_time: row.total_timer_time,
            total_distance: row.total_distance,
            avg_speed: row.avg_speed,
            max_speed: row.max_speed,
            avg_cadence: row.avg_cadence,
            max_cadence: row.max_cadence,
            min_heart_rate: row.min_heart_rate,
            avg_heart_rate: row.avg_heart_rate,
            max_heart_rate: row.max_heart_rate,
            avg_power: row.avg_power,
            max_power: row.max_power,
            normalized_power: row.normalized_power,
            threshold_power: row.threshold_power,
            total_work: row.total_work,
            total_calories: row.total_calories,
            min_altitude: row.min_altitude,
            avg_altitude: row.avg_altitude,
            max_altitude: row.max_altitude,
            total_ascent: row.total_ascent,
            total_descent: row.total_descent,
            avg_grade: row.avg_grade,
            max_pos_grade: row.max_pos_grade,
            max_neg_grade: row.max_neg_grade,
            avg_temperature: row.avg_temperature,
            max_temperature: row.max_temperature,
            training_stress_score: row.training_stress_score,
            intensity_factor: row.intensity_factor,
            num_laps: row.num_laps,
            created_at: DateTime::from_timestamp_micros(row.created_at)
                .unwrap_or(DateTime::UNIX_EPOCH),
        }
    }
}

/// Column projection shared by the sessions list and point lookup
const SESSION_COLUMNS: &str = r#"
    file_hash,
    filename,
    session_id,
    if(timestamp IS NOT NULL, toInt64(toUnixTimestamp64Micro(timestamp)), NULL) as timestamp,
    if(start_time IS NOT NULL, toInt64(toUnixTimestamp64Micro(start_time)), NULL) as start_time,
    manufacturer,
    product,
    serial_number,
    sport,
    sub_sport,
    total_elapsed_time,
    total_timer_time,
    total_distance,
    avg_speed,
    max_speed,
    avg_cadence,
    max_cadence,
    min_heart_rate,
    avg_heart_rate,
    max_heart_rate,
    avg_power,
    max_power,
    normalized_power,
    threshold_power,
    total_work,
    total_calories,
    min_altitude,
    avg_altitude,
    max_altitude,
    total_ascent,
    total_descent,
    avg_grade,
    max_pos_grade,
    max_neg_grade,
    avg_temperature,
    max_temperature,
    training_stress_score,
    intensity_factor,
    num_laps,
    toInt64(toUnixTimestamp64Micro(created_at)) as created_at"#;

/// List session summaries, newest first, with optional filters
pub async fn list_sessions(
    client: &Client,
    query: &SessionQuery,
) -> Result<Vec<SessionSummary>, WarehouseError> {
    let mut cb = ConditionBuilder::new();
    if let Some(ref sport) = query.sport {
        cb.add_eq("sport", sport);
    }
    if let Some(ref from) = query.start_date {
        cb.add_date_gte("start_time", from);
    }
    if let Some(ref to) = query.end_date {
        cb.add_date_lte("start_time", to);
    }
    if let Some(min) = query.min_distance {
        cb.add_f64_gte("total_distance", min);
    }
    if let Some(max) = query.max_distance {
        cb.add_f64_lte("total_distance", max);
    }

    let offset = u64::from(query.page.saturating_sub(1)) * u64::from(SESSIONS_PAGE_SIZE);

    let sql = format!(
        "SELECT {} FROM sessions WHERE {} ORDER BY start_time DESC LIMIT {} OFFSET {}",
        SESSION_COLUMNS,
        cb.build(),
        SESSIONS_PAGE_SIZE,
        offset
    );

    let rows: Vec<ChSessionRow> = cb.bind_to(client.query(&sql)).fetch_all().await?;
    Ok(rows.into_iter().map(SessionSummary::from).collect())
}

/// Get a single session summary by id
pub async fn get_session(
    client: &Client,
    session_id: &str,
) -> Result<Option<SessionSummary>, WarehouseError> {
    let sql = format!(
        "SELECT {} FROM sessions WHERE session_id = ? LIMIT 1",
        SESSION_COLUMNS
    );

    let row: Option<ChSessionRow> = client.query(&sql).bind(session_id).fetch_optional().await?;
    Ok(row.map(SessionSummary::from))
}

/// ClickHouse row for per-sample detail queries
#[derive(Row, Deserialize)]
struct ChDetailRow {
    session_id: String,
    record_id: i64,
    timestamp: i64,
    position_lat: Option<f64>,
    position_long: Option<f64>,
    distance: Option<f64>,
    altitude: Option<f64>,
    speed: Option<f64>,
    heart_rate: Option<i32>,
    cadence: Option<i32>,
    power: Option<i32>,
    temperature: Option<i32>,
}

impl From<ChDetailRow> for SessionDetail {
    fn from(row: ChDetailRow) -> Self {
        Self {
            session_id: row.session_id,
            record_id: row.record_id,
            timestamp: DateTime::from_timestamp_micros(row.timestamp)
                .unwrap_or(DateTime::UNIX_EPOCH),
            position_lat: row.position_lat,
            position_long: row.position_long,
            distance: row.distance,
            altitude: row.altitude,
            speed: row.speed,
            heart_rate: row.heart_rate,
            cadence: row.cadence,
            power: row.power,
            temperature: row.temperature,
        }
    }
}

/// Get one page of time-sample records for a session, oldest first
pub async fn session_details(
    client: &Client,
    session_id: &str,
    page: u32,
) -> Result<Vec<SessionDetail>, WarehouseError> {
    let offset = u64::from(page.saturating_sub(1)) * u64::from(DETAILS_PAGE_SIZE);

    let sql = format!(
        r#"
        SELECT
            session_id,
            record_id,
            toInt64(toUnixTimestamp64Micro(timestamp)) as timestamp,
            position_lat,
            position_long,
            distance,
            altitude,
            speed,
            heart_rate,
            cadence,
            power,
            temperature
        FROM session_records
        WHERE session_id = ?
        ORDER BY timestamp ASC
        LIMIT {} OFFSET {}
        "#,
        DETAILS_PAGE_SIZE, offset
    );

    let rows: Vec<ChDetailRow> = client.query(&sql).bind(session_id).fetch_all().await?;
    Ok(rows.into_iter().map(SessionDetail::from).collect())
}
