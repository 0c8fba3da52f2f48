//! WarehouseRepository trait implementation for ClickHouse
//!
//! Implements the trait for `Arc<WarehouseService>`. Every query runs under
//! the service's configured deadline.

use std::sync::Arc;

use async_trait::async_trait;

use crate::data::traits::WarehouseRepository;
use crate::data::types::{
    ActivityPeriod, ActivityQuery, ActivitySummary, DailyMetrics, GlobalSummary, MetricsQuery,
    MetricsSummary, SessionDetail, SessionQuery, SessionSummary,
};

use super::repositories::{activity, metrics, sessions, summary};
use super::{WarehouseError, WarehouseService};

#[async_trait]
impl WarehouseRepository for Arc<WarehouseService> {
    async fn list_sessions(
        &self,
        query: &SessionQuery,
    ) -> Result<Vec<SessionSummary>, WarehouseError> {
        self.with_timeout(sessions::list_sessions(self.client(), query))
            .await
    }

    async fn get_session(
        &self,
        session_id: &str,
    ) -> Result<Option<SessionSummary>, WarehouseError> {
        self.with_timeout(sessions::get_session(self.client(), session_id))
            .await
    }

    async fn session_details(
        &self,
        session_id: &str,
        page: u32,
    ) -> Result<Vec<SessionDetail>, WarehouseError> {
        self.with_timeout(sessions::session_details(self.client(), session_id, page))
            .await
    }

    async fn global_summary(&self) -> Result<GlobalSummary, WarehouseError> {
        self.with_timeout(summary::global_summary(self.client()))
            .await
    }

    async fn activity_summary(
        &self,
        period: ActivityPeriod,
        query: &ActivityQuery,
    ) -> Result<Vec<ActivitySummary>, WarehouseError> {
        self.with_timeout(activity::activity_summary(self.client(), period, query))
            .await
    }

    async fn daily_metrics(
        &self,
        query: &MetricsQuery,
    ) -> Result<Vec<DailyMetrics>, WarehouseError> {
        self.with_timeout(metrics::daily_metrics(self.client(), query))
            .await
    }

    async fn metrics_summary(&self, query: &MetricsQuery) -> Result<MetricsSummary, WarehouseError> {
        self.with_timeout(metrics::metrics_summary(self.client(), query))
            .await
    }
}
