//! Domain record types shared across the data and query layers

mod activity;
mod metrics;
mod sessions;

pub use activity::{ActivityPeriod, ActivityQuery, ActivitySummary};
pub use metrics::{DailyMetrics, MetricsQuery, MetricsSummary};
pub use sessions::{GlobalSummary, SessionDetail, SessionQuery, SessionSummary};
