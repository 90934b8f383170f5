//! Built-in stub server
//!
//! Serves the documented happy-path response for every endpoint the
//! built-in suite covers, so the harness can be exercised end-to-end
//! without the real application. Integration tests reuse `router()` on an
//! ephemeral port.

pub mod routes;

use anyhow::Result;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;

/// Mock server configuration
pub struct MockConfig {
    pub port: u16,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self { port: 8001 }
    }
}

/// Build the mock application router
pub fn router() -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api", get(routes::api_status))
        .route("/api/admin/login", post(routes::admin_login))
        .route("/api/dealer/login", post(routes::dealer_login))
        .route("/api/dealer/request-reset", post(routes::request_reset))
        .route("/api/dealer/reset-passcode", post(routes::reset_passcode))
        .route("/api/public/qrcode/:dealer_id", get(routes::qrcode))
        .route("/api/admin/export/:collection", get(routes::export))
        .route("/api/admin/vehicles/bulk-update", post(routes::bulk_update))
        .route("/api/admin/check-alerts", post(routes::check_alerts))
        .route("/api/public/dealer/:dealer_id", get(routes::dealer_profile))
        .route(
            "/api/public/dealer/:dealer_id/vehicles",
            get(routes::dealer_vehicles),
        )
        .route(
            "/api/public/checkout/session",
            post(routes::checkout_session),
        )
        .layer(CorsLayer::permissive())
}

/// Mock server for manual runs (`wirecheck mock`)
pub struct MockServer {
    config: MockConfig,
}

impl MockServer {
    pub fn new(config: MockConfig) -> Self {
        Self { config }
    }

    /// Start the server and serve until the process is stopped
    pub async fn start(&self) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let listener = tokio::net::TcpListener::bind(addr).await?;

        println!("\n🧪 Mock API started!");
        println!("   Base URL: http://localhost:{}", self.config.port);
        println!("\n   Press Ctrl+C to stop.\n");

        axum::serve(listener, router()).await?;

        Ok(())
    }
}
