//! OpenAPI specification and Swagger UI

use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{activity, health, metrics, sessions, summary};
use crate::data::types::{
    ActivitySummary, DailyMetrics, GlobalSummary, MetricsSummary, SessionDetail, SessionSummary,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Fitgate API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Read-only fitness warehouse query and caching API"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "sessions", description = "Session queries"),
        (name = "summary", description = "Aggregate activity summaries"),
        (name = "metrics", description = "Daily biometric metrics")
    ),
    paths(
        health::health,
        sessions::list_sessions,
        sessions::get_session,
        sessions::session_details,
        summary::global_summary,
        activity::daily_summary,
        activity::weekly_summary,
        activity::monthly_summary,
        metrics::daily_metrics,
        metrics::metrics_summary,
    ),
    components(schemas(
        health::HealthResponse,
        health::ComponentHealth,
        SessionSummary,
        SessionDetail,
        GlobalSummary,
        ActivitySummary,
        DailyMetrics,
        MetricsSummary,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}

/// Serve Swagger UI from CDN
pub async fn swagger_ui_html() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Fitgate API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        html { box-sizing: border-box; overflow-y: scroll; }
        *, *:before, *:after { box-sizing: inherit; }
        body { margin: 0; background: #fafafa; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: "/api/openapi.json",
                dom_id: '#swagger-ui',
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout",
                deepLinking: true
            });
        };
    </script>
</body>
</html>"#;
