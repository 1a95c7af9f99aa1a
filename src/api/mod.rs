//! HTTP and WebSocket surface of the hub
//!
//! Thin plumbing around the [`AlertCoordinator`](crate::coordinator::AlertCoordinator):
//! the WebSocket stream is the transport for triggers, cancels and broadcasts,
//! the REST endpoints only expose read-only views.
//!
//! ## Endpoints
//!
//! - `GET /` - Service identity and version
//! - `GET /api/v1/health` - Health check
//! - `GET /api/v1/stats` - Alert and connection counters
//! - `GET /api/v1/alerts` - List active alerts
//! - `GET /api/v1/alerts/{id}` - Single active alert
//! - `WS /api/v1/stream` - Alert triggers, cancels and broadcasts

#[cfg(feature = "api")]
pub mod error;
#[cfg(feature = "api")]
pub mod routes;
#[cfg(feature = "api")]
pub mod state;
#[cfg(feature = "api")]
pub mod types;
#[cfg(feature = "api")]
pub mod websocket;

#[cfg(feature = "api")]
pub use error::{ApiError, ApiResult};
#[cfg(feature = "api")]
pub use state::{ApiState, StreamSettings};
#[cfg(feature = "api")]
pub use types::{AlertsResponse, HealthResponse, ServiceInfoResponse, StatsResponse};

#[cfg(feature = "api")]
use axum::{Router, routing::get};
use std::net::SocketAddr;
#[cfg(feature = "api")]
use tracing::info;

use crate::config::Config;

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind address (e.g., "0.0.0.0:5000")
    pub bind_addr: SocketAddr,

    /// Enable CORS for dashboards served from other origins
    pub enable_cors: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(crate::util::get_default_addr(), crate::util::get_default_port()),
            enable_cors: true,
        }
    }
}

impl From<&Config> for ApiConfig {
    fn from(config: &Config) -> Self {
        Self {
            bind_addr: config.bind_addr(),
            enable_cors: config.enable_cors,
        }
    }
}

/// Build the router with all routes and layers
#[cfg(feature = "api")]
pub fn create_router(state: ApiState, enable_cors: bool) -> Router {
    use tower::ServiceBuilder;
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::trace::TraceLayer;

    let app = Router::new()
        .route("/", get(routes::health::service_info))
        .route("/api/v1/health", get(routes::health::health_check))
        .route("/api/v1/stats", get(routes::stats::get_stats))
        .route("/api/v1/alerts", get(routes::alerts::list_alerts))
        .route("/api/v1/alerts/:id", get(routes::alerts::get_alert))
        .route("/api/v1/stream", get(websocket::websocket_handler))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    if enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app.layer(cors)
    } else {
        app
    }
}

/// Spawn the API server
///
/// This starts an Axum HTTP server in a background task.
/// Returns the server's local address.
#[cfg(feature = "api")]
pub async fn spawn_api_server(config: ApiConfig, state: ApiState) -> anyhow::Result<SocketAddr> {
    info!("starting API server on {}", config.bind_addr);

    let app = create_router(state, config.enable_cors);

    // Bind and serve
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    let addr = listener.local_addr()?;

    info!("API server listening on {}", addr);

    // Spawn server in background
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("API server error: {}", e);
        }
    });

    Ok(addr)
}
