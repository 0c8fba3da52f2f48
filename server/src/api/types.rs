//! Shared API types
//!
//! Error responses and query-parameter parsing helpers used across all
//! endpoints.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;
use validator::ValidationError;

use crate::core::constants::{DEFAULT_PAGE, MAX_PAGE};
use crate::domain::queries::{QueryError, SessionField, parse_fields};

/// Parse an optional date parameter (`YYYY-MM-DD`)
pub fn parse_date_param(s: &Option<String>) -> Result<Option<NaiveDate>, ApiError> {
    match s {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                ApiError::bad_request(
                    "INVALID_DATE",
                    format!("Invalid date '{}'. Use YYYY-MM-DD.", raw),
                )
            }),
        None => Ok(None),
    }
}

/// Parse an optional comma-separated `fields` parameter against the allow-list
pub fn parse_fields_param(s: &Option<String>) -> Result<Option<Vec<SessionField>>, ApiError> {
    match s {
        Some(raw) => parse_fields(raw)
            .map(Some)
            .map_err(|e| ApiError::bad_request("UNKNOWN_FIELD", e.to_string())),
        None => Ok(None),
    }
}

/// Validator function for page parameters
pub fn validate_page(page: u32) -> Result<(), ValidationError> {
    if page < 1 {
        return Err(ValidationError::new("page_min").with_message("Page must be >= 1".into()));
    }
    if page > MAX_PAGE {
        return Err(ValidationError::new("page_max").with_message(
            format!("Page must be <= {} to prevent expensive queries", MAX_PAGE).into(),
        ));
    }
    Ok(())
}

pub fn default_page() -> u32 {
    DEFAULT_PAGE
}

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: String, message: String },
    NotFound { code: String, message: String },
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::NotFound => Self::not_found("SESSION_NOT_FOUND", "Session not found"),
            QueryError::Warehouse(e) => {
                // Warehouse details are logged, not leaked to clients
                tracing::error!(error = %e, "Warehouse error");
                Self::internal("Warehouse query failed")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, code, message) = match self {
            Self::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, "bad_request", code, message)
            }
            Self::NotFound { code, message } => (StatusCode::NOT_FOUND, "not_found", code, message),
            Self::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "INTERNAL".to_string(),
                message,
            ),
        };
        (
            status,
            Json(serde_json::json!({
                "error": error_type,
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_param() {
        assert_eq!(
            parse_date_param(&Some("2024-03-01".to_string())).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(parse_date_param(&None).unwrap(), None);
        assert!(parse_date_param(&Some("03/01/2024".to_string())).is_err());
    }

    #[test]
    fn test_parse_fields_param_rejects_unknown() {
        let fields = parse_fields_param(&Some("sport,avg_speed".to_string())).unwrap();
        assert_eq!(fields.map(|f| f.len()), Some(2));
        assert!(parse_fields_param(&Some("sport,password".to_string())).is_err());
    }

    #[test]
    fn test_validate_page_bounds() {
        assert!(validate_page(0).is_err());
        assert!(validate_page(1).is_ok());
        assert!(validate_page(MAX_PAGE).is_ok());
        assert!(validate_page(MAX_PAGE + 1).is_err());
    }

    #[test]
    fn test_query_error_mapping() {
        let not_found: ApiError = QueryError::NotFound.into();
        assert_eq!(
            not_found.into_response().status(),
            StatusCode::NOT_FOUND
        );
    }
}
