//! Repository traits for the warehouse backend
//!
//! The query orchestrator depends on this trait rather than the ClickHouse
//! service directly, so tests can substitute a scripted warehouse.

use async_trait::async_trait;

use crate::data::types::{
    ActivityPeriod, ActivityQuery, ActivitySummary, DailyMetrics, GlobalSummary, MetricsQuery,
    MetricsSummary, SessionDetail, SessionQuery, SessionSummary,
};
use crate::data::warehouse::WarehouseError;

/// Repository trait for warehouse read queries, one method per query shape
#[async_trait]
pub trait WarehouseRepository: Send + Sync {
    /// List session summaries, newest first, with optional filters
    async fn list_sessions(
        &self,
        query: &SessionQuery,
    ) -> Result<Vec<SessionSummary>, WarehouseError>;

    /// Get a single session summary by id
    async fn get_session(&self, session_id: &str)
    -> Result<Option<SessionSummary>, WarehouseError>;

    /// Get one page of time-sample records for a session, oldest first
    async fn session_details(
        &self,
        session_id: &str,
        page: u32,
    ) -> Result<Vec<SessionDetail>, WarehouseError>;

    /// Aggregate totals over all sessions
    async fn global_summary(&self) -> Result<GlobalSummary, WarehouseError>;

    /// Aggregate sessions per (period, sport) bucket, newest period first
    async fn activity_summary(
        &self,
        period: ActivityPeriod,
        query: &ActivityQuery,
    ) -> Result<Vec<ActivitySummary>, WarehouseError>;

    /// List daily metric snapshots, newest first
    async fn daily_metrics(&self, query: &MetricsQuery)
    -> Result<Vec<DailyMetrics>, WarehouseError>;

    /// Aggregate statistics over a daily metrics date range
    async fn metrics_summary(&self, query: &MetricsQuery)
    -> Result<MetricsSummary, WarehouseError>;
}
