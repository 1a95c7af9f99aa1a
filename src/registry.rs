//! Connection registry and broadcast fan-out
//!
//! Tracks every attached peer and delivers serialized events to them.
//! Each [`Connection`] owns a bounded outbound queue that is drained by the
//! transport's writer task, so delivery here is a non-blocking enqueue and a
//! slow peer can never stall a broadcast.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, trace, warn};

use crate::protocol::{encode_event, encode_reply};

/// Default number of dropped frames before a slow peer is disconnected
pub const DEFAULT_MAX_DROPPED_EVENTS: u64 = 64;

/// Opaque session identity assigned by the transport
pub type ConnectionId = String;

/// Outcome of a single enqueue attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Queued,
    Dropped,
    Closed,
}

/// One attached peer
#[derive(Debug)]
pub struct Connection {
    pub id: ConnectionId,
    sender: mpsc::Sender<Arc<str>>,
    dropped: AtomicU64,
}

impl Connection {
    pub fn new(id: impl Into<ConnectionId>, sender: mpsc::Sender<Arc<str>>) -> Self {
        Self {
            id: id.into(),
            sender,
            dropped: AtomicU64::new(0),
        }
    }

    /// Create a connection together with the receiving end of its queue
    pub fn channel(
        id: impl Into<ConnectionId>,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<Arc<str>>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(id, tx), rx)
    }

    /// Total frames dropped because the queue was full
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn deliver(&self, frame: Arc<str>) -> Delivery {
        match self.sender.try_send(frame) {
            Ok(()) => Delivery::Queued,
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                Delivery::Dropped
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Delivery::Closed,
        }
    }
}

/// Summary of one broadcast
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Connections in the snapshot
    pub recipients: usize,

    /// Frames successfully queued
    pub delivered: usize,

    /// Frames dropped because a queue was full
    pub dropped: usize,

    /// Connections removed after this broadcast (closed or too slow)
    pub evicted: Vec<ConnectionId>,
}

/// Set of currently attached peers
#[derive(Debug)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<ConnectionId, Arc<Connection>>>,
    max_dropped_events: u64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::with_max_dropped_events(DEFAULT_MAX_DROPPED_EVENTS)
    }

    /// Create a registry that evicts peers after `max_dropped_events` drops
    pub fn with_max_dropped_events(max_dropped_events: u64) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            max_dropped_events,
        }
    }

    /// Add a connection (no-op if the id is already registered)
    pub async fn register(&self, connection: Arc<Connection>) {
        let mut conns = self.connections.write().await;
        if conns.contains_key(&connection.id) {
            trace!("connection {} already registered", connection.id);
            return;
        }

        debug!("registered connection {} (total: {})", connection.id, conns.len() + 1);
        conns.insert(connection.id.clone(), connection);
    }

    /// Remove a connection (no-op if absent)
    pub async fn unregister(&self, connection_id: &str) {
        let mut conns = self.connections.write().await;
        if conns.remove(connection_id).is_some() {
            debug!("unregistered connection {connection_id} (total: {})", conns.len());
        } else {
            trace!("unregister: connection {connection_id} not present");
        }
    }

    /// Deliver an event to every registered connection, best-effort
    ///
    /// The connection set is snapshotted under the read lock and delivery
    /// happens after the lock is released.
    pub async fn broadcast<T: Serialize + ?Sized>(&self, event: &str, payload: &T) -> BroadcastReport {
        let frame = match encode_event(event, payload) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("failed to serialize {event} payload: {e}");
                return BroadcastReport::default();
            }
        };

        let snapshot: Vec<Arc<Connection>> =
            self.connections.read().await.values().cloned().collect();

        let mut report = BroadcastReport {
            recipients: snapshot.len(),
            ..Default::default()
        };

        for conn in &snapshot {
            match conn.deliver(Arc::clone(&frame)) {
                Delivery::Queued => report.delivered += 1,
                Delivery::Dropped => {
                    report.dropped += 1;
                    let drops = conn.dropped_count();
                    if drops >= self.max_dropped_events {
                        warn!("{}: disconnecting slow client after {drops} dropped events", conn.id);
                        report.evicted.push(conn.id.clone());
                    } else {
                        warn!("{}: outbound queue full, dropped {event} ({drops} total)", conn.id);
                    }
                }
                Delivery::Closed => {
                    debug!("{}: outbound queue closed, removing connection", conn.id);
                    report.evicted.push(conn.id.clone());
                }
            }
        }

        if !report.evicted.is_empty() {
            let mut conns = self.connections.write().await;
            for id in &report.evicted {
                conns.remove(id);
            }
        }

        debug!(
            "broadcast {event}: {}/{} delivered, {} dropped, {} evicted",
            report.delivered,
            report.recipients,
            report.dropped,
            report.evicted.len()
        );

        report
    }

    /// Deliver an event to a single connection
    ///
    /// Returns `false` when the connection is unknown or its queue did not
    /// accept the frame.
    pub async fn send_to<T: Serialize + ?Sized>(
        &self,
        connection_id: &str,
        event: &str,
        payload: &T,
    ) -> bool {
        self.reply(connection_id, event, payload, None).await
    }

    /// Deliver a reply to a single connection, echoing the request id
    pub async fn reply<T: Serialize + ?Sized>(
        &self,
        connection_id: &str,
        event: &str,
        payload: &T,
        request_id: Option<u64>,
    ) -> bool {
        let Some(conn) = self.connections.read().await.get(connection_id).cloned() else {
            trace!("reply: connection {connection_id} not present");
            return false;
        };

        let frame = match encode_reply(event, payload, request_id) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("failed to serialize {event} payload: {e}");
                return false;
            }
        };

        match conn.deliver(frame) {
            Delivery::Queued => true,
            Delivery::Dropped => {
                warn!("{connection_id}: outbound queue full, dropped {event}");
                false
            }
            Delivery::Closed => {
                self.unregister(connection_id).await;
                false
            }
        }
    }

    /// Number of registered connections
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn connection_ids(&self) -> Vec<ConnectionId> {
        self.connections.read().await.keys().cloned().collect()
    }

    pub async fn contains(&self, connection_id: &str) -> bool {
        self.connections.read().await.contains_key(connection_id)
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
