//! In-memory alert store (no persistence)
//!
//! Alerts exist here if and only if they are active. Cancelling an alert
//! removes it; there is no cancelled record kept around.
//!
//! ## Identity
//!
//! Alert ids are derived from a strictly increasing sequence number that is
//! never rewound, so an id is never handed out twice during the lifetime of
//! the process, even after the alert it named has been removed.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, trace};

use super::error::{AlertError, AlertResult};
use crate::{Alert, AlertId, AlertStatus, Location};

/// State guarded by the store's lock
#[derive(Debug, Default)]
struct Inner {
    /// Active alerts keyed by creation sequence (keeps `list` in creation order)
    alerts: BTreeMap<u64, Alert>,

    /// Index from alert id to creation sequence
    index: HashMap<AlertId, u64>,

    /// Last sequence number handed out (0 = none yet)
    sequence: u64,

    /// Timestamp of the most recently created alert
    last_timestamp: Option<DateTime<Utc>>,
}

/// Authoritative mapping from alert id to active alert
#[derive(Debug, Default)]
pub struct AlertStore {
    inner: RwLock<Inner>,
}

impl AlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a trigger and insert a new active alert
    pub async fn create(&self, user_id: &str, location: Option<Location>) -> AlertResult<Alert> {
        let location = validate(user_id, location)?;

        let mut inner = self.inner.write().await;

        inner.sequence += 1;
        let seq = inner.sequence;

        // wall clock may step backwards; never issue an older timestamp
        let now = Utc::now();
        let timestamp = match inner.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        };
        inner.last_timestamp = Some(timestamp);

        let alert = Alert {
            alert_id: AlertId::generate(user_id, seq),
            user_id: user_id.to_string(),
            location,
            timestamp,
            status: AlertStatus::Active,
        };

        inner.index.insert(alert.alert_id.clone(), seq);
        inner.alerts.insert(seq, alert.clone());

        debug!("created alert {} (active: {})", alert.alert_id, inner.alerts.len());

        Ok(alert)
    }

    /// Remove an active alert and return it
    pub async fn remove(&self, alert_id: &AlertId) -> AlertResult<Alert> {
        let mut inner = self.inner.write().await;

        let Some(seq) = inner.index.remove(alert_id) else {
            trace!("remove: {alert_id} not present");
            return Err(AlertError::not_found(alert_id.as_str()));
        };

        let alert = inner
            .alerts
            .remove(&seq)
            .ok_or_else(|| AlertError::not_found(alert_id.as_str()))?;

        debug!("removed alert {alert_id} (active: {})", inner.alerts.len());

        Ok(alert)
    }

    /// Look up an active alert
    pub async fn get(&self, alert_id: &AlertId) -> Option<Alert> {
        let inner = self.inner.read().await;
        inner
            .index
            .get(alert_id)
            .and_then(|seq| inner.alerts.get(seq))
            .cloned()
    }

    /// Snapshot of all active alerts, oldest first
    pub async fn list(&self) -> Vec<Alert> {
        self.inner.read().await.alerts.values().cloned().collect()
    }

    /// Number of active alerts
    pub async fn len(&self) -> usize {
        self.inner.read().await.alerts.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of alerts ever created (the current sequence value)
    pub async fn total_created(&self) -> u64 {
        self.inner.read().await.sequence
    }
}

fn validate(user_id: &str, location: Option<Location>) -> AlertResult<Location> {
    if user_id.trim().is_empty() {
        return Err(AlertError::validation("user_id must not be empty"));
    }

    let Some(location) = location else {
        return Err(AlertError::validation("location is required"));
    };

    if !location.is_finite() {
        return Err(AlertError::validation(format!(
            "location must contain finite coordinates, got {location}"
        )));
    }

    Ok(location)
}
