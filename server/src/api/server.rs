//! API server initialization

use std::net::SocketAddr;

use anyhow::Result;
use axum::Router;
use axum::http::Method;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::ApiState;
use super::openapi::{openapi_json, swagger_ui_html};
use super::rate_limit::{RateLimitState, rate_limit_middleware};
use super::routes::{activity, health, metrics, sessions, summary};
use crate::core::CoreApp;
use crate::data::cache::RateLimitBucket;

pub struct ApiServer {
    app: CoreApp,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        Self { app }
    }

    /// Returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let app = self.app;

        // Clone shutdown before moving app
        let shutdown = app.shutdown.clone();

        let host = app.config.server.host.clone();
        let port = app.config.server.port;
        let addr = SocketAddr::new(host.parse()?, port);

        let state = ApiState {
            queries: app.queries.clone(),
            cache: app.cache.clone(),
            warehouse: app.warehouse.clone(),
        };

        let api_routes = Router::new()
            .route("/sessions", get(sessions::list_sessions))
            .route("/sessions/{session_id}", get(sessions::get_session))
            .route(
                "/sessions/{session_id}/details",
                get(sessions::session_details),
            )
            .route("/summary", get(summary::global_summary))
            .route("/daily-summary", get(activity::daily_summary))
            .route("/weekly-summary", get(activity::weekly_summary))
            .route("/monthly-summary", get(activity::monthly_summary))
            .route("/daily-metrics", get(metrics::daily_metrics))
            .route("/daily-metrics/summary", get(metrics::metrics_summary));

        // Per-IP rate limiting on the data routes only; /health stays open
        // for load balancer probes.
        let api_routes = if app.config.rate_limit.enabled {
            api_routes.layer(axum::middleware::from_fn_with_state(
                RateLimitState {
                    limiter: app.rate_limiter.clone(),
                    bucket: RateLimitBucket::api(app.config.rate_limit.rpm),
                },
                rate_limit_middleware,
            ))
        } else {
            api_routes
        };

        let router = Router::new()
            .route("/health", get(health::health))
            .route("/api/openapi.json", get(openapi_json))
            .route("/api/docs", get(swagger_ui_html))
            .nest("/api", api_routes)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
            .layer(cors());

        tracing::info!(%addr, "API server listening");

        let listener = TcpListener::bind(addr).await?;
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move { shutdown.wait().await })
        .await?;

        Ok(app)
    }
}

/// CORS layer for the read-only API: any origin, GET only
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any)
}
