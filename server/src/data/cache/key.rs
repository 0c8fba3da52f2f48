//! Deterministic cache key builder
//!
//! Each query shape derives its key from the logical query name plus every
//! parameter in a fixed order, substituting the `"none"` sentinel for absent
//! optionals. Identical normalized parameter sets always collide; sets
//! differing in any parameter never do.
//!
//! Keys carry no version prefix: the persisted layout is plain text keys
//! namespaced by query shape, and a codec change invalidates old entries
//! through the decode-failure-as-miss path.

use chrono::NaiveDate;
use std::fmt::Display;

use crate::core::constants::NONE_TOKEN;
use crate::data::types::{ActivityPeriod, ActivityQuery, MetricsQuery, SessionQuery};

/// Cache key builder, one constructor per query shape
pub struct CacheKey;

impl CacheKey {
    /// Key for the sessions list shape
    ///
    /// Unfiltered pages keep the short historical form
    /// (`sessions_list_page_1`); once any filter is set, every filter is
    /// appended in fixed order with sentinels, so the short form can never
    /// collide with a filtered request.
    pub fn sessions_list(query: &SessionQuery) -> String {
        if !query.has_filters() {
            return format!("sessions_list_page_{}", query.page);
        }
        format!(
            "sessions_list_page_{}_sport_{}_from_{}_to_{}_dist_{}_{}",
            query.page,
            opt(&query.sport),
            opt_date(&query.start_date),
            opt_date(&query.end_date),
            opt(&query.min_distance),
            opt(&query.max_distance),
        )
    }

    /// Key for a session-by-id point lookup
    pub fn session(session_id: &str) -> String {
        format!("session:{session_id}")
    }

    /// Key for one page of a session's detail records
    pub fn session_details(session_id: &str, page: u32) -> String {
        format!("session_details:{session_id}:page_{page}")
    }

    /// Key for the global summary (parameterless)
    pub fn global_summary() -> String {
        "global_summary".to_string()
    }

    /// Key for a periodic activity summary
    pub fn activity(period: ActivityPeriod, query: &ActivityQuery) -> String {
        format!(
            "{}:{}:{}:{}",
            period.key_prefix(),
            opt_date(&query.start_date),
            opt_date(&query.end_date),
            opt(&query.sport),
        )
    }

    /// Key for the daily metrics shape
    pub fn daily_metrics(query: &MetricsQuery) -> String {
        format!(
            "daily_metrics:{}:{}",
            opt_date(&query.start_date),
            opt_date(&query.end_date),
        )
    }

    /// Key for the metrics summary shape
    pub fn metrics_summary(query: &MetricsQuery) -> String {
        format!(
            "metrics_summary:{}:{}",
            opt_date(&query.start_date),
            opt_date(&query.end_date),
        )
    }

    /// Key for a rate limit counter (not a data key; no sentinel handling)
    pub fn rate_limit(bucket: &str, identifier: &str) -> String {
        format!("rl:{bucket}:{identifier}")
    }
}

fn opt<T: Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => NONE_TOKEN.to_string(),
    }
}

fn opt_date(value: &Option<NaiveDate>) -> String {
    match value {
        Some(d) => d.format("%Y-%m-%d").to_string(),
        None => NONE_TOKEN.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_sessions_list_unfiltered() {
        let query = SessionQuery {
            page: 1,
            ..Default::default()
        };
        assert_eq!(CacheKey::sessions_list(&query), "sessions_list_page_1");
    }

    #[test]
    fn test_sessions_list_filtered_uses_sentinels() {
        let query = SessionQuery {
            page: 2,
            sport: Some("cycling".to_string()),
            start_date: Some(date("2023-01-01")),
            ..Default::default()
        };
        assert_eq!(
            CacheKey::sessions_list(&query),
            "sessions_list_page_2_sport_cycling_from_2023-01-01_to_none_dist_none_none"
        );
    }

    #[test]
    fn test_sessions_list_deterministic() {
        let a = SessionQuery {
            page: 3,
            sport: Some("running".to_string()),
            min_distance: Some(5000.0),
            ..Default::default()
        };
        let b = a.clone();
        assert_eq!(CacheKey::sessions_list(&a), CacheKey::sessions_list(&b));
    }

    #[test]
    fn test_sessions_list_distinct_params_distinct_keys() {
        let base = SessionQuery {
            page: 1,
            sport: Some("running".to_string()),
            ..Default::default()
        };
        let mut changed = base.clone();
        changed.max_distance = Some(10_000.0);
        assert_ne!(
            CacheKey::sessions_list(&base),
            CacheKey::sessions_list(&changed)
        );

        let mut other_page = base.clone();
        other_page.page = 2;
        assert_ne!(
            CacheKey::sessions_list(&base),
            CacheKey::sessions_list(&other_page)
        );
    }

    #[test]
    fn test_point_lookup_keys() {
        assert_eq!(CacheKey::session("abc"), "session:abc");
        assert_eq!(
            CacheKey::session_details("abc", 2),
            "session_details:abc:page_2"
        );
        assert_eq!(CacheKey::global_summary(), "global_summary");
    }

    #[test]
    fn test_activity_keys() {
        let query = ActivityQuery {
            start_date: Some(date("2023-06-01")),
            end_date: None,
            sport: Some("cycling".to_string()),
        };
        assert_eq!(
            CacheKey::activity(ActivityPeriod::Daily, &query),
            "daily_activity:2023-06-01:none:cycling"
        );
        assert_eq!(
            CacheKey::activity(ActivityPeriod::Weekly, &query),
            "weekly_activity:2023-06-01:none:cycling"
        );
        assert_eq!(
            CacheKey::activity(ActivityPeriod::Monthly, &query),
            "monthly_activity:2023-06-01:none:cycling"
        );
    }

    #[test]
    fn test_metrics_keys() {
        let query = MetricsQuery {
            start_date: None,
            end_date: Some(date("2023-01-31")),
        };
        assert_eq!(
            CacheKey::daily_metrics(&query),
            "daily_metrics:none:2023-01-31"
        );
        assert_eq!(
            CacheKey::metrics_summary(&query),
            "metrics_summary:none:2023-01-31"
        );
    }

    #[test]
    fn test_rate_limit_key() {
        assert_eq!(
            CacheKey::rate_limit("api", "192.168.1.1"),
            "rl:api:192.168.1.1"
        );
    }
}
