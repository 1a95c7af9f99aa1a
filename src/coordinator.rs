//! AlertCoordinator - the alert lifecycle state machine
//!
//! Mediates trigger and cancel requests between the [`AlertStore`] and the
//! [`ConnectionRegistry`].
//!
//! ## Lifecycle (per alert id)
//!
//! ```text
//! NONE ──trigger──▶ ACTIVE ──cancel──▶ NONE
//!                     │
//!                     └─ cancel again → no-op (stays NONE, no broadcast)
//! ```
//!
//! A trigger is committed once the store insert succeeds; the broadcast
//! follows directly inside the same call. Broadcast delivery outcomes never
//! change the result returned to the caller.
//!
//! Each state change (store mutation plus its broadcast enqueue) runs under a
//! single transition lock, so peers observe `sos_broadcast` and
//! `sos_cancelled` for an id in the same order the store applied them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::{
    Alert, AlertId, Location,
    protocol::{CancelledPayload, SOS_BROADCAST, SOS_CANCELLED, SYSTEM_STATUS, SystemStatus},
    registry::{Connection, ConnectionRegistry},
    storage::{AlertError, AlertStore},
};

/// Direct acknowledgement for a trigger request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TriggerResult {
    /// Alert created and broadcast
    Success { alert_id: AlertId },

    /// Trigger rejected; nothing was stored or broadcast
    Error { error: String },
}

impl TriggerResult {
    pub fn is_success(&self) -> bool {
        matches!(self, TriggerResult::Success { .. })
    }

    pub fn alert_id(&self) -> Option<&AlertId> {
        match self {
            TriggerResult::Success { alert_id } => Some(alert_id),
            TriggerResult::Error { .. } => None,
        }
    }
}

/// Direct acknowledgement for a cancel request
///
/// Both variants are successful outcomes from the caller's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CancelResult {
    /// Alert removed and removal broadcast
    Cancelled { alert_id: AlertId },

    /// No such active alert; nothing happened
    Noop { alert_id: AlertId },
}

impl CancelResult {
    pub fn was_cancelled(&self) -> bool {
        matches!(self, CancelResult::Cancelled { .. })
    }
}

/// Composes the alert store and connection registry
#[derive(Debug, Clone)]
pub struct AlertCoordinator {
    store: Arc<AlertStore>,
    registry: Arc<ConnectionRegistry>,

    /// Held from store mutation until the matching broadcast is enqueued
    transitions: Arc<Mutex<()>>,
}

impl AlertCoordinator {
    pub fn new(store: Arc<AlertStore>, registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            store,
            registry,
            transitions: Arc::new(Mutex::new(())),
        }
    }

    pub fn store(&self) -> &Arc<AlertStore> {
        &self.store
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Create an alert and broadcast it to every connected peer
    #[instrument(skip(self, location))]
    pub async fn handle_trigger(&self, user_id: &str, location: Option<Location>) -> TriggerResult {
        let _transition = self.transitions.lock().await;

        let alert = match self.store.create(user_id, location).await {
            Ok(alert) => alert,
            Err(e) => {
                debug!("rejected trigger: {e}");
                return TriggerResult::Error {
                    error: e.to_string(),
                };
            }
        };

        info!(
            "SOS triggered by {} at {} ({})",
            alert.user_id, alert.location, alert.alert_id
        );

        let report = self.registry.broadcast(SOS_BROADCAST, &alert).await;
        if report.dropped > 0 {
            warn!(
                "{}: broadcast dropped for {} of {} peers",
                alert.alert_id, report.dropped, report.recipients
            );
        }

        TriggerResult::Success {
            alert_id: alert.alert_id,
        }
    }

    /// Remove an alert and broadcast the removal
    ///
    /// Cancelling an unknown or already cancelled alert is a benign no-op.
    #[instrument(skip(self), fields(alert_id = %alert_id))]
    pub async fn handle_cancel(&self, alert_id: &AlertId) -> CancelResult {
        let _transition = self.transitions.lock().await;

        match self.store.remove(alert_id).await {
            Ok(alert) => {
                info!("alert {} cancelled", alert.alert_id);

                let payload = CancelledPayload {
                    alert_id: alert.alert_id.clone(),
                };
                self.registry.broadcast(SOS_CANCELLED, &payload).await;

                CancelResult::Cancelled {
                    alert_id: alert.alert_id,
                }
            }
            Err(AlertError::NotFound(_)) => {
                warn!("cancel for unknown alert {alert_id}, ignoring");
                CancelResult::Noop {
                    alert_id: alert_id.clone(),
                }
            }
            Err(e) => {
                warn!("cancel for {alert_id} failed: {e}");
                CancelResult::Noop {
                    alert_id: alert_id.clone(),
                }
            }
        }
    }

    /// Attach a peer and greet it with the current system status
    pub async fn connect(&self, connection: Arc<Connection>) {
        let id = connection.id.clone();
        self.registry.register(connection).await;
        self.registry
            .send_to(&id, SYSTEM_STATUS, &SystemStatus::online())
            .await;
        info!("client {id} connected");
    }

    /// Detach a peer
    pub async fn disconnect(&self, connection_id: &str) {
        self.registry.unregister(connection_id).await;
        info!("client {connection_id} disconnected");
    }

    pub async fn get_alert(&self, alert_id: &AlertId) -> Option<Alert> {
        self.store.get(alert_id).await
    }

    pub async fn active_alerts(&self) -> Vec<Alert> {
        self.store.list().await
    }
}

impl Default for AlertCoordinator {
    fn default() -> Self {
        Self::new(
            Arc::new(AlertStore::new()),
            Arc::new(ConnectionRegistry::new()),
        )
    }
}
