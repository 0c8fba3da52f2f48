//! Warehouse query repositories
//!
//! One module per table family: `sessions` / `session_records` /
//! `daily_metrics`, plus cross-table summaries. All functions take the
//! ClickHouse client and return domain records.

pub mod activity;
pub mod metrics;
pub mod sessions;
pub mod summary;

use chrono::NaiveDate;

/// Query parameter that can be bound to ClickHouse queries.
/// All user-controllable values MUST go through this enum for SQL injection
/// safety.
#[derive(Clone)]
pub(crate) enum QueryParam {
    /// String parameter (bound as-is)
    String(String),
    /// Float parameter (distance thresholds)
    Float64(f64),
}

/// Builder for constructing parameterized SQL WHERE clauses.
///
/// Collects conditions and their parameter values, then binds all parameters
/// to a ClickHouse query in order. Table and column names are never
/// parameterized; they come from static strings only.
#[derive(Default)]
pub(crate) struct ConditionBuilder {
    conditions: Vec<String>,
    params: Vec<QueryParam>,
}

impl ConditionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality condition: `column = ?`
    pub fn add_eq(&mut self, column: &str, value: &str) {
        self.conditions.push(format!("{} = ?", column));
        self.params.push(QueryParam::String(value.to_string()));
    }

    /// Add a raw condition without parameters (for static conditions only)
    ///
    /// # Safety
    /// The condition string must NOT contain any user input.
    pub fn add_raw(&mut self, condition: &str) {
        self.conditions.push(condition.to_string());
    }

    /// Add a `date(column) >= ?` condition, binding the date as `YYYY-MM-DD`
    pub fn add_date_gte(&mut self, column: &str, date: &NaiveDate) {
        self.conditions
            .push(format!("toDate({}) >= toDate(?)", column));
        self.params.push(QueryParam::String(date.to_string()));
    }

    /// Add a `date(column) <= ?` condition, binding the date as `YYYY-MM-DD`
    pub fn add_date_lte(&mut self, column: &str, date: &NaiveDate) {
        self.conditions
            .push(format!("toDate({}) <= toDate(?)", column));
        self.params.push(QueryParam::String(date.to_string()));
    }

    /// Add a `column >= ?` condition for a float threshold
    pub fn add_f64_gte(&mut self, column: &str, value: f64) {
        self.conditions.push(format!("{} >= ?", column));
        self.params.push(QueryParam::Float64(value));
    }

    /// Add a `column <= ?` condition for a float threshold
    pub fn add_f64_lte(&mut self, column: &str, value: f64) {
        self.conditions.push(format!("{} <= ?", column));
        self.params.push(QueryParam::Float64(value));
    }

    /// Build the WHERE clause (without the "WHERE" keyword)
    ///
    /// Returns "1 = 1" when no conditions were added so callers can always
    /// interpolate the result after WHERE.
    pub fn build(&self) -> String {
        if self.conditions.is_empty() {
            "1 = 1".to_string()
        } else {
            self.conditions.join(" AND ")
        }
    }

    /// Bind all collected parameters to a query, in insertion order
    pub fn bind_to(&self, mut query: clickhouse::query::Query) -> clickhouse::query::Query {
        for param in &self.params {
            query = match param {
                QueryParam::String(s) => query.bind(s),
                QueryParam::Float64(f) => query.bind(f),
            };
        }
        query
    }
}
