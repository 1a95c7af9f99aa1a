//! System statistics endpoint

use axum::{Json, extract::State};

use crate::api::{error::ApiResult, state::ApiState, types::StatsResponse};

/// GET /api/v1/stats
///
/// Returns alert counters and the number of attached peers
pub async fn get_stats(State(state): State<ApiState>) -> ApiResult<Json<StatsResponse>> {
    let store = state.coordinator.store();

    Ok(Json(StatsResponse {
        timestamp: chrono::Utc::now().to_rfc3339(),
        active_alerts: store.len().await,
        total_alerts: store.total_created().await,
        connections: state.coordinator.registry().connection_count().await,
    }))
}
