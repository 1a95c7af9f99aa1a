//! HTTP response types

use serde::{Deserialize, Serialize};

use crate::Alert;

/// Response for GET /
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfoResponse {
    pub status: String,
    pub version: String,
}

/// Response for GET /api/v1/health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

/// Response for GET /api/v1/alerts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsResponse {
    pub alerts: Vec<Alert>,
    pub count: usize,
}

/// Response for GET /api/v1/stats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub timestamp: String,

    /// Alerts currently active
    pub active_alerts: usize,

    /// Alerts created since startup
    pub total_alerts: u64,

    /// Peers attached to the stream
    pub connections: usize,
}
