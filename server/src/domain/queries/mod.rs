//! Cache-aside query orchestration
//!
//! The heart of the service: one method per query shape, each deriving a
//! deterministic cache key, consulting the cache, falling back to the
//! warehouse on a miss, and writing the result back under the shape's TTL.
//!
//! Cache problems never fail a request. Backend and decode errors on read
//! are logged and treated as misses; write failures are logged and the
//! response is served uncached. Concurrent misses are not coalesced: each
//! request queries the warehouse and races the write-back (last write wins,
//! the values are semantically identical).
//!
//! Ordering within a request is fixed: gap-filling runs before the cache
//! write (placeholders are cached with genuine rows), field projection runs
//! after it (the cache always holds full records).

mod gap_fill;
mod project;

pub use project::{SessionField, UnknownSessionField, parse_fields};

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::config::TtlConfig;
use crate::data::cache::{CacheKey, CacheService};
use crate::data::traits::WarehouseRepository;
use crate::data::types::{
    ActivityPeriod, ActivityQuery, ActivitySummary, DailyMetrics, GlobalSummary, MetricsQuery,
    MetricsSummary, SessionDetail, SessionQuery, SessionSummary,
};
use crate::data::warehouse::WarehouseError;

/// Where a response was served from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Cache,
    Warehouse,
}

/// Query result tagged with its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sourced<T> {
    pub data: T,
    pub source: Source,
}

/// Errors surfaced by the query layer
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Session not found")]
    NotFound,

    #[error(transparent)]
    Warehouse(#[from] WarehouseError),
}

/// Cache-aside query service
pub struct QueryService {
    warehouse: Arc<dyn WarehouseRepository>,
    cache: Arc<CacheService>,
    ttl: TtlConfig,
}

impl QueryService {
    pub fn new(
        warehouse: Arc<dyn WarehouseRepository>,
        cache: Arc<CacheService>,
        ttl: TtlConfig,
    ) -> Self {
        Self {
            warehouse,
            cache,
            ttl,
        }
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// One page of session summaries, optionally filtered and projected
    pub async fn list_sessions(
        &self,
        query: &SessionQuery,
        fields: Option<&[SessionField]>,
    ) -> Result<Sourced<Vec<SessionSummary>>, QueryError> {
        let key = CacheKey::sessions_list(query);

        if let Some(rows) = self.cache_get::<Vec<SessionSummary>>(&key).await {
            return Ok(Sourced {
                data: project::project_sessions(rows, fields),
                source: Source::Cache,
            });
        }

        let rows = self.warehouse.list_sessions(query).await?;
        if !rows.is_empty() {
            self.cache_set(&key, &rows, self.ttl.sessions_secs).await;
        }

        Ok(Sourced {
            data: project::project_sessions(rows, fields),
            source: Source::Warehouse,
        })
    }

    /// Point lookup of a single session by id
    pub async fn get_session(
        &self,
        session_id: &str,
        fields: Option<&[SessionField]>,
    ) -> Result<Sourced<SessionSummary>, QueryError> {
        let key = CacheKey::session(session_id);

        if let Some(row) = self.cache_get::<SessionSummary>(&key).await {
            let data = match fields {
                Some(fields) => project::project_session(row, fields),
                None => row,
            };
            return Ok(Sourced {
                data,
                source: Source::Cache,
            });
        }

        // Absence is not cached: a session ingested right after a lookup
        // must be visible on the next request.
        let row = self
            .warehouse
            .get_session(session_id)
            .await?
            .ok_or(QueryError::NotFound)?;

        self.cache_set(&key, &row, self.ttl.sessions_secs).await;

        let data = match fields {
            Some(fields) => project::project_session(row, fields),
            None => row,
        };
        Ok(Sourced {
            data,
            source: Source::Warehouse,
        })
    }

    /// One page of a session's time-sample records
    pub async fn session_details(
        &self,
        session_id: &str,
        page: u32,
    ) -> Result<Sourced<Vec<SessionDetail>>, QueryError> {
        let key = CacheKey::session_details(session_id, page);

        if let Some(rows) = self.cache_get::<Vec<SessionDetail>>(&key).await {
            return Ok(Sourced {
                data: rows,
                source: Source::Cache,
            });
        }

        let rows = self.warehouse.session_details(session_id, page).await?;
        if !rows.is_empty() {
            self.cache_set(&key, &rows, self.ttl.details_secs).await;
        }

        Ok(Sourced {
            data: rows,
            source: Source::Warehouse,
        })
    }

    // =========================================================================
    // Summaries
    // =========================================================================

    /// Aggregate totals over all sessions
    pub async fn global_summary(&self) -> Result<Sourced<GlobalSummary>, QueryError> {
        let key = CacheKey::global_summary();

        if let Some(row) = self.cache_get::<GlobalSummary>(&key).await {
            return Ok(Sourced {
                data: row,
                source: Source::Cache,
            });
        }

        let row = self.warehouse.global_summary().await?;
        self.cache_set(&key, &row, self.ttl.summary_secs).await;

        Ok(Sourced {
            data: row,
            source: Source::Warehouse,
        })
    }

    /// Per-(period, sport) activity aggregates for one granularity
    pub async fn activity_summary(
        &self,
        period: ActivityPeriod,
        query: &ActivityQuery,
    ) -> Result<Sourced<Vec<ActivitySummary>>, QueryError> {
        let key = CacheKey::activity(period, query);

        if let Some(rows) = self.cache_get::<Vec<ActivitySummary>>(&key).await {
            return Ok(Sourced {
                data: rows,
                source: Source::Cache,
            });
        }

        let rows = self.warehouse.activity_summary(period, query).await?;
        if !rows.is_empty() {
            self.cache_set(&key, &rows, self.ttl.summary_secs).await;
        }

        Ok(Sourced {
            data: rows,
            source: Source::Warehouse,
        })
    }

    // =========================================================================
    // Daily metrics
    // =========================================================================

    /// Daily biometric snapshots, gap-filled when both bounds are given
    pub async fn daily_metrics(
        &self,
        query: &MetricsQuery,
    ) -> Result<Sourced<Vec<DailyMetrics>>, QueryError> {
        let key = CacheKey::daily_metrics(query);

        if let Some(rows) = self.cache_get::<Vec<DailyMetrics>>(&key).await {
            return Ok(Sourced {
                data: rows,
                source: Source::Cache,
            });
        }

        let mut rows = self.warehouse.daily_metrics(query).await?;

        // Placeholders are cached with the genuine rows; data arriving for a
        // placeholder date stays invisible until TTL expiry or explicit flush.
        if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
            rows = gap_fill::fill_daily_gaps(rows, start, end);
        }

        if !rows.is_empty() {
            self.cache_set(&key, &rows, self.ttl.metrics_secs).await;
        }

        Ok(Sourced {
            data: rows,
            source: Source::Warehouse,
        })
    }

    /// Aggregate statistics over a daily metrics range
    pub async fn metrics_summary(
        &self,
        query: &MetricsQuery,
    ) -> Result<Sourced<MetricsSummary>, QueryError> {
        let key = CacheKey::metrics_summary(query);

        if let Some(row) = self.cache_get::<MetricsSummary>(&key).await {
            return Ok(Sourced {
                data: row,
                source: Source::Cache,
            });
        }

        let row = self.warehouse.metrics_summary(query).await?;
        self.cache_set(&key, &row, self.ttl.metrics_secs).await;

        Ok(Sourced {
            data: row,
            source: Source::Warehouse,
        })
    }

    // =========================================================================
    // Cache helpers
    // =========================================================================

    /// Cache read that degrades to a miss on any backend or decode error
    async fn cache_get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.cache.get::<T>(key).await {
            Ok(Some(value)) => {
                tracing::debug!(key = %key, "Cache hit");
                Some(value)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    /// Cache write that logs and continues on failure
    async fn cache_set<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) {
        if let Err(e) = self
            .cache
            .set(key, value, Some(Duration::from_secs(ttl_secs)))
            .await
        {
            tracing::warn!(key = %key, error = %e, "Cache write failed, serving uncached");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone, Utc};

    use crate::core::config::{CacheBackendType, CacheConfig};

    /// Scripted warehouse that counts queries per shape
    #[derive(Default)]
    struct MockWarehouse {
        calls: AtomicUsize,
        sessions: Vec<SessionSummary>,
        session: Option<SessionSummary>,
        details: Vec<SessionDetail>,
        metrics: Vec<DailyMetrics>,
        activity: Vec<ActivitySummary>,
    }

    impl MockWarehouse {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WarehouseRepository for MockWarehouse {
        async fn list_sessions(
            &self,
            _query: &SessionQuery,
        ) -> Result<Vec<SessionSummary>, WarehouseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.sessions.clone())
        }

        async fn get_session(
            &self,
            _session_id: &str,
        ) -> Result<Option<SessionSummary>, WarehouseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.session.clone())
        }

        async fn session_details(
            &self,
            _session_id: &str,
            _page: u32,
        ) -> Result<Vec<SessionDetail>, WarehouseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.details.clone())
        }

        async fn global_summary(&self) -> Result<GlobalSummary, WarehouseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(GlobalSummary {
                total_sessions: 7,
                total_distance_km: 321.5,
                total_duration_hours: 18.25,
                last_updated: Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap(),
            })
        }

        async fn activity_summary(
            &self,
            _period: ActivityPeriod,
            _query: &ActivityQuery,
        ) -> Result<Vec<ActivitySummary>, WarehouseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.activity.clone())
        }

        async fn daily_metrics(
            &self,
            _query: &MetricsQuery,
        ) -> Result<Vec<DailyMetrics>, WarehouseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.metrics.clone())
        }

        async fn metrics_summary(
            &self,
            _query: &MetricsQuery,
        ) -> Result<MetricsSummary, WarehouseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(MetricsSummary {
                days_with_data: 2,
                avg_sleep_score: Some(80.0),
                avg_sleep_duration_hours: Some(7.2),
                avg_stress: Some(30.0),
                avg_resting_heart_rate: Some(49.0),
                min_resting_heart_rate: Some(46),
                max_resting_heart_rate: Some(52),
                avg_weight_kg: Some(71.0),
            })
        }
    }

    fn sample_session(id: &str) -> SessionSummary {
        SessionSummary {
            file_hash: format!("hash-{id}"),
            filename: format!("{id}.fit"),
            session_id: id.to_string(),
            timestamp: Some(Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap()),
            start_time: Some(Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 5).unwrap()),
            manufacturer: None,
            product: None,
            serial_number: None,
            sport: Some("cycling".to_string()),
            sub_sport: None,
            total_elapsed_time: None,
            total_timer_time: None,
            total_distance: Some(42_000.0),
            avg_speed: None,
            max_speed: None,
            avg_cadence: None,
            max_cadence: None,
            min_heart_rate: None,
            avg_heart_rate: Some(142),
            max_heart_rate: None,
            avg_power: None,
            max_power: None,
            normalized_power: None,
            threshold_power: None,
            total_work: None,
            total_calories: None,
            min_altitude: None,
            avg_altitude: None,
            max_altitude: None,
            total_ascent: None,
            total_descent: None,
            avg_grade: None,
            max_pos_grade: None,
            max_neg_grade: None,
            avg_temperature: None,
            max_temperature: None,
            training_stress_score: None,
            intensity_factor: None,
            num_laps: None,
            created_at: Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap(),
        }
    }

    fn sample_metrics(day: u32) -> DailyMetrics {
        DailyMetrics {
            timestamp: Utc.with_ymd_and_hms(2024, 1, day, 7, 30, 0).unwrap(),
            file_hash: "m-hash".to_string(),
            sleep_score: Some(82.0),
            sleep_duration_hours: Some(7.5),
            avg_stress: Some(28.0),
            max_stress: Some(71),
            body_battery_high: Some(95),
            body_battery_low: Some(30),
            resting_heart_rate: Some(48),
            steps: Some(10_234),
            weight_kg: Some(71.2),
        }
    }

    async fn build(mock: MockWarehouse) -> (QueryService, Arc<MockWarehouse>, Arc<CacheService>) {
        let cache = Arc::new(
            CacheService::new(&CacheConfig {
                backend: CacheBackendType::Memory,
                max_entries: 1000,
                redis_url: None,
            })
            .await
            .unwrap(),
        );
        let warehouse = Arc::new(mock);
        let service = QueryService::new(
            warehouse.clone() as Arc<dyn WarehouseRepository>,
            cache.clone(),
            TtlConfig::default(),
        );
        (service, warehouse, cache)
    }

    #[tokio::test]
    async fn test_cold_then_warm_list_sessions() {
        let (service, warehouse, cache) = build(MockWarehouse {
            sessions: vec![sample_session("s-1")],
            ..Default::default()
        })
        .await;

        let query = SessionQuery {
            page: 1,
            ..Default::default()
        };

        let cold = service.list_sessions(&query, None).await.unwrap();
        assert_eq!(cold.source, Source::Warehouse);
        assert_eq!(cold.data.len(), 1);
        assert_eq!(warehouse.calls(), 1);

        // The unfiltered first page lands under the short key verbatim
        assert!(
            cache
                .get_raw("sessions_list_page_1")
                .await
                .unwrap()
                .is_some()
        );

        let warm = service.list_sessions(&query, None).await.unwrap();
        assert_eq!(warm.source, Source::Cache);
        assert_eq!(warm.data, cold.data);
        assert_eq!(warehouse.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_result_is_not_cached() {
        let (service, warehouse, _cache) = build(MockWarehouse::default()).await;

        let query = SessionQuery {
            page: 1,
            ..Default::default()
        };

        let first = service.list_sessions(&query, None).await.unwrap();
        assert!(first.data.is_empty());
        let second = service.list_sessions(&query, None).await.unwrap();
        assert_eq!(second.source, Source::Warehouse);
        assert_eq!(warehouse.calls(), 2);
    }

    #[tokio::test]
    async fn test_get_session_found_is_cached() {
        let (service, warehouse, _cache) = build(MockWarehouse {
            session: Some(sample_session("s-1")),
            ..Default::default()
        })
        .await;

        let cold = service.get_session("s-1", None).await.unwrap();
        assert_eq!(cold.source, Source::Warehouse);

        let warm = service.get_session("s-1", None).await.unwrap();
        assert_eq!(warm.source, Source::Cache);
        assert_eq!(warm.data.session_id, "s-1");
        assert_eq!(warehouse.calls(), 1);
    }

    #[tokio::test]
    async fn test_get_session_missing_is_not_found_and_not_cached() {
        let (service, warehouse, cache) = build(MockWarehouse::default()).await;

        let err = service.get_session("nope", None).await.unwrap_err();
        assert!(matches!(err, QueryError::NotFound));
        assert!(cache.get_raw("session:nope").await.unwrap().is_none());

        // Next lookup consults the warehouse again
        let _ = service.get_session("nope", None).await;
        assert_eq!(warehouse.calls(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_cached_payload_falls_back_to_warehouse() {
        let (service, warehouse, cache) = build(MockWarehouse {
            sessions: vec![sample_session("s-1")],
            ..Default::default()
        })
        .await;

        cache
            .set_raw("sessions_list_page_1", b"{not-json".to_vec(), None)
            .await
            .unwrap();

        let query = SessionQuery {
            page: 1,
            ..Default::default()
        };
        let result = service.list_sessions(&query, None).await.unwrap();
        assert_eq!(result.source, Source::Warehouse);
        assert_eq!(warehouse.calls(), 1);

        // Write-back replaces the corrupt entry
        let warm = service.list_sessions(&query, None).await.unwrap();
        assert_eq!(warm.source, Source::Cache);
        assert_eq!(warehouse.calls(), 1);
    }

    #[tokio::test]
    async fn test_daily_metrics_gap_fill_and_placeholder_caching() {
        let (service, warehouse, _cache) = build(MockWarehouse {
            metrics: vec![sample_metrics(2)],
            ..Default::default()
        })
        .await;

        let query = MetricsQuery {
            start_date: Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            end_date: Some(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()),
        };

        let cold = service.daily_metrics(&query).await.unwrap();
        assert_eq!(cold.data.len(), 3);
        assert_eq!(cold.data[0].file_hash, "none");
        assert_eq!(cold.data[1].file_hash, "m-hash");
        assert_eq!(cold.data[2].file_hash, "none");

        // Placeholders were written back with the genuine row
        let warm = service.daily_metrics(&query).await.unwrap();
        assert_eq!(warm.source, Source::Cache);
        assert_eq!(warm.data.len(), 3);
        assert_eq!(warehouse.calls(), 1);
    }

    #[tokio::test]
    async fn test_daily_metrics_no_gap_fill_without_both_bounds() {
        let (service, _warehouse, _cache) = build(MockWarehouse {
            metrics: vec![sample_metrics(2)],
            ..Default::default()
        })
        .await;

        let query = MetricsQuery {
            start_date: Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            end_date: None,
        };

        let result = service.daily_metrics(&query).await.unwrap();
        assert_eq!(result.data.len(), 1);
    }

    #[tokio::test]
    async fn test_projection_applies_on_both_paths_but_cache_stores_full() {
        let (service, _warehouse, _cache) = build(MockWarehouse {
            sessions: vec![sample_session("s-1")],
            ..Default::default()
        })
        .await;

        let query = SessionQuery {
            page: 1,
            ..Default::default()
        };
        let fields = [SessionField::Sport];

        let cold = service.list_sessions(&query, Some(&fields)).await.unwrap();
        assert_eq!(cold.data[0].sport.as_deref(), Some("cycling"));
        assert_eq!(cold.data[0].avg_heart_rate, None);

        // A later unprojected request gets the full cached record
        let warm = service.list_sessions(&query, None).await.unwrap();
        assert_eq!(warm.source, Source::Cache);
        assert_eq!(warm.data[0].avg_heart_rate, Some(142));

        // And a projected request on the warm path projects the cached copy
        let warm_projected = service.list_sessions(&query, Some(&fields)).await.unwrap();
        assert_eq!(warm_projected.data[0].avg_heart_rate, None);
    }

    #[tokio::test]
    async fn test_global_summary_cached() {
        let (service, warehouse, _cache) = build(MockWarehouse::default()).await;

        let cold = service.global_summary().await.unwrap();
        assert_eq!(cold.source, Source::Warehouse);
        assert_eq!(cold.data.total_sessions, 7);

        let warm = service.global_summary().await.unwrap();
        assert_eq!(warm.source, Source::Cache);
        assert_eq!(warm.data, cold.data);
        assert_eq!(warehouse.calls(), 1);
    }

    #[tokio::test]
    async fn test_metrics_summary_cached() {
        let (service, warehouse, _cache) = build(MockWarehouse::default()).await;

        let cold = service.metrics_summary(&MetricsQuery::default()).await.unwrap();
        assert_eq!(cold.source, Source::Warehouse);

        let warm = service.metrics_summary(&MetricsQuery::default()).await.unwrap();
        assert_eq!(warm.source, Source::Cache);
        assert_eq!(warehouse.calls(), 1);
    }

    #[tokio::test]
    async fn test_session_details_non_empty_cached() {
        let (service, warehouse, _cache) = build(MockWarehouse {
            details: vec![SessionDetail {
                session_id: "s-1".to_string(),
                record_id: 1,
                timestamp: Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 5).unwrap(),
                position_lat: Some(52.52),
                position_long: Some(13.405),
                distance: Some(10.0),
                altitude: Some(34.0),
                speed: Some(8.2),
                heart_rate: Some(120),
                cadence: Some(85),
                power: Some(200),
                temperature: Some(18),
            }],
            ..Default::default()
        })
        .await;

        let cold = service.session_details("s-1", 1).await.unwrap();
        assert_eq!(cold.source, Source::Warehouse);

        let warm = service.session_details("s-1", 1).await.unwrap();
        assert_eq!(warm.source, Source::Cache);
        assert_eq!(warehouse.calls(), 1);
    }

    #[test]
    fn test_source_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Source::Cache).unwrap(), "\"cache\"");
        assert_eq!(
            serde_json::to_string(&Source::Warehouse).unwrap(),
            "\"warehouse\""
        );
    }
}
