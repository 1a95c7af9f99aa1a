//! Active alert endpoints (read-only)

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::debug;

use crate::{
    Alert, AlertId,
    api::{
        error::{ApiError, ApiResult},
        state::ApiState,
        types::AlertsResponse,
    },
};

/// GET /api/v1/alerts
///
/// Lists all active alerts, oldest first
pub async fn list_alerts(State(state): State<ApiState>) -> ApiResult<Json<AlertsResponse>> {
    let alerts = state.coordinator.active_alerts().await;

    Ok(Json(AlertsResponse {
        count: alerts.len(),
        alerts,
    }))
}

/// GET /api/v1/alerts/:id
pub async fn get_alert(
    State(state): State<ApiState>,
    Path(alert_id): Path<String>,
) -> ApiResult<Json<Alert>> {
    debug!("fetching alert {alert_id}");

    state
        .coordinator
        .get_alert(&AlertId::from(alert_id.as_str()))
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("no active alert with id {alert_id}")))
}
