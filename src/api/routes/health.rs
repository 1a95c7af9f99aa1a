//! Health check and service identity endpoints

use crate::api::types::{HealthResponse, ServiceInfoResponse};
use axum::Json;

/// GET /
///
/// Returns the static service identity and version
pub async fn service_info() -> Json<ServiceInfoResponse> {
    Json(ServiceInfoResponse {
        status: crate::SERVICE_NAME.to_string(),
        version: crate::VERSION.to_string(),
    })
}

/// GET /api/v1/health
///
/// Returns a simple health check response
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
