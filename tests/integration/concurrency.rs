//! Concurrency and race condition tests
//!
//! These tests verify thread-safety and concurrent operation:
//! - Concurrent triggers never share an alert id
//! - Concurrent cancels of one alert broadcast exactly once
//! - Connect/disconnect churn during broadcasts
//! - A stalled peer does not hold up the others

use std::collections::HashSet;
use std::sync::Arc;

use durga_guardian::{
    Location,
    coordinator::{AlertCoordinator, CancelResult},
    registry::ConnectionRegistry,
    storage::AlertStore,
};

use super::helpers::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_triggers_unique_ids() {
    let coordinator = AlertCoordinator::default();
    let mut peer = attach_peer(&coordinator, "observer").await;

    let mut tasks = vec![];
    for i in 0..200 {
        let coordinator = coordinator.clone();
        tasks.push(tokio::spawn(async move {
            // only a handful of users so ids would collide without the sequence
            let user = format!("user{}", i % 3);
            coordinator
                .handle_trigger(&user, Some(Location::new(i as f64, 0.0)))
                .await
        }));
    }

    let mut ids = HashSet::new();
    for task in tasks {
        let result = task.await.unwrap();
        ids.insert(result.alert_id().cloned().unwrap());
    }

    assert_eq!(ids.len(), 200);
    assert_eq!(coordinator.active_alerts().await.len(), 200);
    assert_eq!(peer.drain_events().len(), 200);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_cancels_broadcast_once() {
    let coordinator = AlertCoordinator::default();
    let result = coordinator.handle_trigger("u1", Some(bangalore())).await;
    let alert_id = result.alert_id().cloned().unwrap();
    let mut peer = attach_peer(&coordinator, "observer").await;

    let mut tasks = vec![];
    for _ in 0..16 {
        let coordinator = coordinator.clone();
        let alert_id = alert_id.clone();
        tasks.push(tokio::spawn(async move { coordinator.handle_cancel(&alert_id).await }));
    }

    let mut cancelled = 0;
    for task in tasks {
        if let CancelResult::Cancelled { .. } = task.await.unwrap() {
            cancelled += 1;
        }
    }

    assert_eq!(cancelled, 1);
    assert_eq!(peer.drain_events(), vec!["sos_cancelled"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_trigger_cancel_churn_with_reconnecting_peers() {
    let coordinator = AlertCoordinator::new(
        Arc::new(AlertStore::new()),
        Arc::new(ConnectionRegistry::new()),
    );

    let churn = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move {
            for i in 0..100 {
                let id = format!("churn-{i}");
                let peer = attach_peer(&coordinator, &id).await;
                tokio::task::yield_now().await;
                coordinator.disconnect(&peer.id).await;
            }
        })
    };

    let mut tasks = vec![];
    for i in 0..50 {
        let coordinator = coordinator.clone();
        tasks.push(tokio::spawn(async move {
            let result = coordinator
                .handle_trigger(&format!("u{i}"), Some(bangalore()))
                .await;
            let alert_id = result.alert_id().cloned().unwrap();
            coordinator.handle_cancel(&alert_id).await
        }));
    }

    for task in tasks {
        assert!(task.await.unwrap().was_cancelled());
    }
    churn.await.unwrap();

    assert!(coordinator.active_alerts().await.is_empty());
    assert_eq!(coordinator.store().total_created().await, 50);
    assert_eq!(coordinator.registry().connection_count().await, 0);
}

#[tokio::test]
async fn test_stalled_peer_does_not_block_others() {
    let coordinator = AlertCoordinator::new(
        Arc::new(AlertStore::new()),
        Arc::new(ConnectionRegistry::with_max_dropped_events(3)),
    );
    // capacity 1 and never drained
    let _stalled = attach_peer_with_capacity(&coordinator, "stalled", 1).await;
    let mut healthy = attach_peer(&coordinator, "healthy").await;

    for i in 0..10 {
        let result = coordinator
            .handle_trigger(&format!("u{i}"), Some(bangalore()))
            .await;
        assert!(result.is_success());
    }

    assert_eq!(healthy.drain_events().len(), 10);
    assert!(!coordinator.registry().contains("stalled").await);
    assert!(coordinator.registry().contains("healthy").await);
}
