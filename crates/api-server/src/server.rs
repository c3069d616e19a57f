//! API server — HTTP (REST) endpoints plus the Prometheus exporter.

use crate::rest::{self, AppState};
use crate::swagger::ApiDoc;
use crate::{library_rest, recommendation_rest};
use axum::routing::{get, patch, post};
use axum::Router;
use shelf_core::config::AppConfig;
use std::net::SocketAddr;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Build the full router. Exposed separately so tests can drive it without
/// binding a socket.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Recommendations
        .route("/recommendations", get(recommendation_rest::handle_recommendations))
        .route(
            "/recommendations/genres",
            get(recommendation_rest::handle_genre_recommendations),
        )
        .route(
            "/recommendations/refresh",
            post(recommendation_rest::handle_refresh),
        )
        // Library
        .route("/library", post(library_rest::handle_add_book))
        .route(
            "/library/:book_id",
            patch(library_rest::handle_update_entry).delete(library_rest::handle_remove_book),
        )
        .route(
            "/favorites/:book_id",
            post(library_rest::handle_add_favorite).delete(library_rest::handle_remove_favorite),
        )
        // Operational endpoints
        .route("/health", get(rest::health_check))
        .route("/ready", get(rest::readiness))
        .route("/live", get(rest::liveness))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Main API server.
pub struct ApiServer {
    config: AppConfig,
    state: AppState,
}

impl ApiServer {
    pub fn new(config: AppConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Start the HTTP REST server.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let app = build_router(self.state.clone());

        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(addr = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Start the metrics server on a separate port.
    pub async fn start_metrics(&self) -> anyhow::Result<()> {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");
        Ok(())
    }
}
