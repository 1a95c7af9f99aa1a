//! End-to-end lifecycle tests against the coordinator
//!
//! These tests verify that:
//! - A trigger stores an active alert and reaches every peer
//! - A cancel removes the alert and reaches every peer
//! - A repeated cancel is a silent no-op
//! - Rejected triggers leave no trace

use durga_guardian::{
    AlertStatus, Location,
    coordinator::{AlertCoordinator, CancelResult, TriggerResult},
};
use pretty_assertions::assert_eq;
use serde_json::json;

use super::helpers::*;

#[tokio::test]
async fn test_trigger_cancel_scenario() {
    let coordinator = AlertCoordinator::default();
    let mut guardian = attach_peer(&coordinator, "guardian").await;
    let mut dashboard = attach_peer(&coordinator, "dashboard").await;

    // Trigger
    let result = coordinator.handle_trigger("u1", Some(bangalore())).await;
    let TriggerResult::Success { alert_id } = result else {
        panic!("trigger should succeed");
    };

    let active = coordinator.active_alerts().await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].alert_id, alert_id);
    assert_eq!(active[0].status, AlertStatus::Active);

    for peer in [&mut guardian, &mut dashboard] {
        let frames = peer.drain();
        assert_eq!(frames.len(), 1, "{} should see one broadcast", peer.id);
        assert_eq!(frames[0]["event"], "sos_broadcast");
        assert_eq!(frames[0]["data"]["alert_id"], alert_id.as_str());
        assert_eq!(frames[0]["data"]["user_id"], "u1");
        assert_eq!(frames[0]["data"]["location"], json!({"lat": 12.9, "lng": 77.6}));
    }

    // Cancel
    let cancelled = coordinator.handle_cancel(&alert_id).await;
    assert_eq!(
        cancelled,
        CancelResult::Cancelled {
            alert_id: alert_id.clone()
        }
    );
    assert!(coordinator.active_alerts().await.is_empty());

    for peer in [&mut guardian, &mut dashboard] {
        assert_eq!(
            peer.drain(),
            vec![json!({"event": "sos_cancelled", "data": {"alert_id": alert_id.as_str()}})]
        );
    }

    // Cancel again
    let again = coordinator.handle_cancel(&alert_id).await;
    assert_eq!(again, CancelResult::Noop { alert_id });
    assert!(guardian.drain().is_empty());
    assert!(dashboard.drain().is_empty());
}

#[tokio::test]
async fn test_rejected_trigger_leaves_no_trace() {
    let coordinator = AlertCoordinator::default();
    let mut peer = attach_peer(&coordinator, "peer").await;

    let cases = [
        ("", Some(bangalore())),
        ("u1", None),
        ("u1", Some(Location::new(f64::NAN, 77.6))),
        ("u1", Some(Location::new(12.9, f64::INFINITY))),
    ];

    for (user_id, location) in cases {
        let result = coordinator.handle_trigger(user_id, location).await;
        assert!(
            matches!(result, TriggerResult::Error { .. }),
            "trigger({user_id:?}, {location:?}) should fail"
        );
    }

    assert!(coordinator.active_alerts().await.is_empty());
    assert_eq!(coordinator.store().total_created().await, 0);
    assert!(peer.drain().is_empty());
}

#[tokio::test]
async fn test_cancel_of_never_created_alert() {
    let coordinator = AlertCoordinator::default();
    let mut peer = attach_peer(&coordinator, "peer").await;

    let result = coordinator.handle_cancel(&"alert_nobody_1".into()).await;

    assert!(!result.was_cancelled());
    assert!(peer.drain().is_empty());
}

#[tokio::test]
async fn test_late_peer_only_sees_later_events() {
    let coordinator = AlertCoordinator::default();
    let mut early = attach_peer(&coordinator, "early").await;

    let first = coordinator.handle_trigger("u1", Some(bangalore())).await;

    let mut late = attach_peer(&coordinator, "late").await;
    let first_id = first.alert_id().cloned().unwrap();
    coordinator.handle_cancel(&first_id).await;

    assert_eq!(early.drain_events(), vec!["sos_broadcast", "sos_cancelled"]);
    assert_eq!(late.drain_events(), vec!["sos_cancelled"]);
}

#[tokio::test]
async fn test_disconnected_peer_stops_receiving() {
    let coordinator = AlertCoordinator::default();
    let mut stays = attach_peer(&coordinator, "stays").await;
    let mut leaves = attach_peer(&coordinator, "leaves").await;

    coordinator.disconnect("leaves").await;
    // disconnecting twice is harmless
    coordinator.disconnect("leaves").await;

    coordinator.handle_trigger("u1", Some(bangalore())).await;

    assert_eq!(stays.drain_events(), vec!["sos_broadcast"]);
    assert!(leaves.drain().is_empty());
}
