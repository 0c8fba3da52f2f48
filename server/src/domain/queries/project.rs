//! Post-hoc field projection for session summaries
//!
//! Clients plotting one metric can request a subset of fields. The cache
//! always stores full records; projection happens after the cache read (or
//! after the write-back on a miss), so the same cached entry serves any
//! field combination. Identifiers and `timestamp` are always kept.

use std::str::FromStr;

use thiserror::Error;

use crate::data::types::SessionSummary;

/// Error for a `fields` value outside the allow-list
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown session field '{0}'")]
pub struct UnknownSessionField(pub String);

/// Projectable session summary fields (allow-list)
///
/// Identifier fields (`session_id`, `file_hash`, `filename`, `created_at`)
/// and `timestamp` parse but are no-ops: projection keeps them regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionField {
    SessionId,
    FileHash,
    Filename,
    CreatedAt,
    Timestamp,
    StartTime,
    Manufacturer,
    Product,
    SerialNumber,
    Sport,
    SubSport,
    TotalElapsedTime,
    TotalTimerTime,
    TotalDistance,
    AvgSpeed,
    MaxSpeed,
    AvgCadence,
    MaxCadence,
    MinHeartRate,
    AvgHeartRate,
    MaxHeartRate,
    AvgPower,
    MaxPower,
    NormalizedPower,
    ThresholdPower,
    TotalWork,
    TotalCalories,
    MinAltitude,
    AvgAltitude,
    MaxAltitude,
    TotalAscent,
    TotalDescent,
    AvgGrade,
    MaxPosGrade,
    MaxNegGrade,
    AvgTemperature,
    MaxTemperature,
    TrainingStressScore,
    IntensityFactor,
    NumLaps,
}

impl FromStr for SessionField {
    type Err = UnknownSessionField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "session_id" => Ok(Self::SessionId),
            "file_hash" => Ok(Self::FileHash),
            "filename" => Ok(Self::Filename),
            "created_at" => Ok(Self::CreatedAt),
            "timestamp" => Ok(Self::Timestamp),
            "start_time" => Ok(Self::StartTime),
            "manufacturer" => Ok(Self::Manufacturer),
            "product" => Ok(Self::Product),
            "serial_number" => Ok(Self::SerialNumber),
            "sport" => Ok(Self::Sport),
            "sub_sport" => Ok(Self::SubSport),
            "total_elapsed_time" => Ok(Self::TotalElapsedTime),
            "total_timer_time" => Ok(Self::TotalTimerTime),
            "total_distance" => Ok(Self::TotalDistance),
            "avg_speed" => Ok(Self::AvgSpeed),
            "max_speed" => Ok(Self::MaxSpeed),
            "avg_cadence" => Ok(Self::AvgCadence),
            "max_cadence" => Ok(Self::MaxCadence),
            "min_heart_rate" => Ok(Self::MinHeartRate),
            "avg_heart_rate" => Ok(Self::AvgHeartRate),
            "max_heart_rate" => Ok(Self::MaxHeartRate),
            "avg_power" => Ok(Self::AvgPower),
            "max_power" => Ok(Self::MaxPower),
            "normalized_power" => Ok(Self::NormalizedPower),
            "threshold_power" => Ok(Self::ThresholdPower),
            "total_work" => Ok(Self::TotalWork),
            "total_calories" => Ok(Self::TotalCalories),
            "min_altitude" => Ok(Self::MinAltitude),
            "avg_altitude" => Ok(Self::AvgAltitude),
            "max_altitude" => Ok(Self::MaxAltitude),
            "total_ascent" => Ok(Self::TotalAscent),
            "total_descent" => Ok(Self::TotalDescent),
            "avg_grade" => Ok(Self::AvgGrade),
            "max_pos_grade" => Ok(Self::MaxPosGrade),
            "max_neg_grade" => Ok(Self::MaxNegGrade),
            "avg_temperature" => Ok(Self::AvgTemperature),
            "max_temperature" => Ok(Self::MaxTemperature),
            "training_stress_score" => Ok(Self::TrainingStressScore),
            "intensity_factor" => Ok(Self::IntensityFactor),
            "num_laps" => Ok(Self::NumLaps),
            other => Err(UnknownSessionField(other.to_string())),
        }
    }
}

/// Parse a comma-separated `fields` parameter
///
/// Empty segments are skipped, so trailing commas are harmless.
pub fn parse_fields(raw: &str) -> Result<Vec<SessionField>, UnknownSessionField> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(SessionField::from_str)
        .collect()
}

/// Project one session summary to the requested fields
///
/// Keeps identifiers and `timestamp` unconditionally, keeps requested
/// fields, resets every other optional field to `None`.
pub fn project_session(s: SessionSummary, fields: &[SessionField]) -> SessionSummary {
    let keep = |f: SessionField| fields.contains(&f);
    SessionSummary {
        file_hash: s.file_hash,
        filename: s.filename,
        session_id: s.session_id,
        timestamp: s.timestamp,
        start_time: s.start_time.filter(|_| keep(SessionField::StartTime)),
        manufacturer: s.manufacturer.filter(|_| keep(SessionField::Manufacturer)),
        product: s.product.filter(|_| keep(SessionField::Product)),
        serial_number: s.serial_number.filter(|_| keep(SessionField::SerialNumber)),
        sport: s.sport.filter(|_| keep(SessionField::Sport)),
        sub_sport: s.sub_sport.filter(|_| keep(SessionField::SubSport)),
        total_elapsed_time: s
            .total_elapsed_time
            .filter(|_| keep(SessionField::TotalElapsedTime)),
        total_timer_time: s
            .total_timer_time
            .filter(|_| keep(SessionField::TotalTimerTime)),
        total_distance: s
            .total_distance
            .filter(|_| keep(SessionField::TotalDistance)),
        avg_speed: s.avg_speed.filter(|_| keep(SessionField::AvgSpeed)),
        max_speed: s.max_speed.filter(|_| keep(SessionField::MaxSpeed)),
        avg_cadence: s.avg_cadence.filter(|_| keep(SessionField::AvgCadence)),
        max_cadence: s.max_cadence.filter(|_| keep(SessionField::MaxCadence)),
        min_heart_rate: s
            .min_heart_rate
            .filter(|_| keep(SessionField::MinHeartRate)),
        avg_heart_rate: s
            .avg_heart_rate
            .filter(|_| keep(SessionField::AvgHeartRate)),
        max_heart_rate: s
            .max_heart_rate
            .filter(|_| keep(SessionField::MaxHeartRate)),
        avg_power: s.avg_power.filter(|_| keep(SessionField::AvgPower)),
        max_power: s.max_power.filter(|_| keep(SessionField::MaxPower)),
        normalized_power: s
            .normalized_power
            .filter(|_| keep(SessionField::NormalizedPower)),
        threshold_power: s
            .threshold_power
            .filter(|_| keep(SessionField::ThresholdPower)),
        total_work: s.total_work.filter(|_| keep(SessionField::TotalWork)),
        total_calories: s
            .total_calories
            .filter(|_| keep(SessionField::TotalCalories)),
        min_altitude: s.min_altitude.filter(|_| keep(SessionField::MinAltitude)),
        avg_altitude: s.avg_altitude.filter(|_| keep(SessionField::AvgAltitude)),
        max_altitude: s.max_altitude.filter(|_| keep(SessionField::MaxAltitude)),
        total_ascent: s.total_ascent.filter(|_| keep(SessionField::TotalAscent)),
        total_descent: s
            .total_descent
            .filter(|_| keep(SessionField::TotalDescent)),
        avg_grade: s.avg_grade.filter(|_| keep(SessionField::AvgGrade)),
        max_pos_grade: s.max_pos_grade.filter(|_| keep(SessionField::MaxPosGrade)),
        max_neg_grade: s.max_neg_grade.filter(|_| keep(SessionField::MaxNegGrade)),
        avg_temperature: s
            .avg_temperature
            .filter(|_| keep(SessionField::AvgTemperature)),
        max_temperature: s
            .max_temperature
            .filter(|_| keep(SessionField::MaxTemperature)),
        training_stress_score: s
            .training_stress_score
            .filter(|_| keep(SessionField::TrainingStressScore)),
        intensity_factor: s
            .intensity_factor
            .filter(|_| keep(SessionField::IntensityFactor)),
        num_laps: s.num_laps.filter(|_| keep(SessionField::NumLaps)),
        created_at: s.created_at,
    }
}

/// Project a record set when fields were requested; pass through otherwise
pub fn project_sessions(
    rows: Vec<SessionSummary>,
    fields: Option<&[SessionField]>,
) -> Vec<SessionSummary> {
    match fields {
        Some(fields) => rows
            .into_iter()
            .map(|row| project_session(row, fields))
            .collect(),
        None => rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample() -> SessionSummary {
        SessionSummary {
            file_hash: "abc123".to_string(),
            filename: "ride.fit".to_string(),
            session_id: "s-1".to_string(),
            timestamp: Some(Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap()),
            start_time: Some(Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 5).unwrap()),
            manufacturer: Some("garmin".to_string()),
            product: None,
            serial_number: Some(12345),
            sport: Some("cycling".to_string()),
            sub_sport: Some("road".to_string()),
            total_elapsed_time: Some(5400.0),
            total_timer_time: Some(5200.0),
            total_distance: Some(42_000.0),
            avg_speed: Some(8.1),
            max_speed: Some(16.4),
            avg_cadence: Some(85),
            max_cadence: Some(110),
            min_heart_rate: Some(95),
            avg_heart_rate: Some(142),
            max_heart_rate: Some(178),
            avg_power: Some(210),
            max_power: Some(650),
            normalized_power: Some(225),
            threshold_power: Some(260),
            total_work: Some(1_100_000),
            total_calories: Some(1100),
            min_altitude: Some(12.0),
            avg_altitude: Some(88.0),
            max_altitude: Some(240.0),
            total_ascent: Some(560),
            total_descent: Some(548),
            avg_grade: Some(0.4),
            max_pos_grade: Some(9.8),
            max_neg_grade: Some(-8.2),
            avg_temperature: Some(18),
            max_temperature: Some(24),
            training_stress_score: Some(145.0),
            intensity_factor: Some(0.86),
            num_laps: Some(4),
            created_at: Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_projection_keeps_identifiers_and_timestamp() {
        let projected = project_session(sample(), &[SessionField::Sport]);
        assert_eq!(projected.session_id, "s-1");
        assert_eq!(projected.file_hash, "abc123");
        assert_eq!(projected.filename, "ride.fit");
        assert!(projected.timestamp.is_some());
        assert_eq!(
            projected.created_at,
            Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_projection_resets_unrequested_fields() {
        let projected = project_session(
            sample(),
            &[SessionField::Sport, SessionField::TotalDistance],
        );
        assert_eq!(projected.sport.as_deref(), Some("cycling"));
        assert_eq!(projected.total_distance, Some(42_000.0));
        assert_eq!(projected.avg_heart_rate, None);
        assert_eq!(projected.start_time, None);
        assert_eq!(projected.num_laps, None);
    }

    #[test]
    fn test_projection_with_empty_fields_keeps_only_mandatory() {
        let projected = project_session(sample(), &[]);
        assert_eq!(projected.sport, None);
        assert_eq!(projected.total_distance, None);
        assert!(projected.timestamp.is_some());
    }

    #[test]
    fn test_parse_fields_allow_list() {
        let fields = parse_fields("sport,avg_heart_rate, total_distance,").unwrap();
        assert_eq!(
            fields,
            vec![
                SessionField::Sport,
                SessionField::AvgHeartRate,
                SessionField::TotalDistance
            ]
        );

        let err = parse_fields("sport,password").unwrap_err();
        assert_eq!(err, UnknownSessionField("password".to_string()));
    }
}
