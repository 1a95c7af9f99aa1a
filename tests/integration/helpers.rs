//! Helper functions for integration tests

use std::sync::Arc;

use durga_guardian::{Location, coordinator::AlertCoordinator, registry::Connection};
use serde_json::Value;
use tokio::sync::mpsc;

pub fn bangalore() -> Location {
    Location::new(12.9, 77.6)
}

/// An in-process peer attached directly to the registry
pub struct TestPeer {
    pub id: String,
    rx: mpsc::Receiver<Arc<str>>,
}

impl TestPeer {
    /// Everything queued for this peer so far
    pub fn drain(&mut self) -> Vec<Value> {
        let mut frames = vec![];
        while let Ok(frame) = self.rx.try_recv() {
            frames.push(serde_json::from_str(&frame).unwrap());
        }
        frames
    }

    /// Event names queued for this peer so far
    pub fn drain_events(&mut self) -> Vec<String> {
        self.drain()
            .into_iter()
            .map(|frame| frame["event"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

pub async fn attach_peer(coordinator: &AlertCoordinator, id: &str) -> TestPeer {
    attach_peer_with_capacity(coordinator, id, 256).await
}

pub async fn attach_peer_with_capacity(
    coordinator: &AlertCoordinator,
    id: &str,
    capacity: usize,
) -> TestPeer {
    let (conn, rx) = Connection::channel(id, capacity);
    coordinator.registry().register(Arc::new(conn)).await;
    TestPeer {
        id: id.to_string(),
        rx,
    }
}
