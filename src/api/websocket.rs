//! WebSocket transport for alert triggers and broadcasts
//!
//! Each socket becomes one registered [`Connection`]. A writer task drains the
//! connection's outbound queue to the socket; the reader task decodes
//! inbound requests and hands them to the [`AlertCoordinator`].

use std::sync::Arc;

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, stream::StreamExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    api::state::ApiState,
    coordinator::{AlertCoordinator, TriggerResult},
    protocol::{
        CANCEL_ACK, ClientMessage, ClientRequest, ERROR, ErrorPayload, ProtocolError, TRIGGER_ACK,
        TRIGGER_SOS,
    },
    registry::Connection,
};

/// WebSocket upgrade handler
///
/// GET /api/v1/stream
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<ApiState>) -> Response {
    ws.on_upgrade(|socket| handle_websocket(socket, state))
}

/// Handle WebSocket connection
async fn handle_websocket(socket: WebSocket, state: ApiState) {
    let connection_id = Uuid::new_v4().to_string();
    let (connection, mut outbound_rx) =
        Connection::channel(connection_id.clone(), state.stream.buffer);

    let coordinator = state.coordinator.clone();
    coordinator.connect(Arc::new(connection)).await;

    let (mut sender, mut receiver) = socket.split();
    let send_timeout = state.stream.send_timeout;

    // Forward queued frames to the socket; ends when the registry drops the connection
    let writer_id = connection_id.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            let send = sender.send(Message::Text(frame.to_string()));
            match tokio::time::timeout(send_timeout, send).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    debug!("{writer_id}: WebSocket send failed, client disconnected: {e}");
                    break;
                }
                Err(_) => {
                    warn!("{writer_id}: WebSocket send timed out after {send_timeout:?}");
                    break;
                }
            }
        }

        let _ = sender.close().await;
    });

    let reader_coordinator = coordinator.clone();
    let reader_id = connection_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => dispatch(&reader_coordinator, &reader_id, &text).await,
                Message::Close(_) => break,
                Message::Ping(_) => {
                    // Pong is automatically sent by axum
                    debug!("{reader_id}: received ping");
                }
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
        }
    }

    coordinator.disconnect(&connection_id).await;
}

/// Decode one inbound frame and route it to the coordinator
///
/// Replies (acknowledgements and decode errors) go only to the sender.
pub async fn dispatch(coordinator: &AlertCoordinator, connection_id: &str, text: &str) {
    let registry = coordinator.registry();

    let request = match ClientRequest::decode(text) {
        Ok(request) => request,
        Err(ProtocolError::InvalidPayload { event, id, reason }) if event == TRIGGER_SOS => {
            debug!("{connection_id}: malformed trigger: {reason}");
            let result = TriggerResult::Error {
                error: format!("invalid trigger: {reason}"),
            };
            registry.reply(connection_id, TRIGGER_ACK, &result, id).await;
            return;
        }
        Err(e) => {
            warn!("{connection_id}: {e}");
            let payload = ErrorPayload {
                error: e.to_string(),
            };
            registry.reply(connection_id, ERROR, &payload, e.request_id()).await;
            return;
        }
    };

    match request.message {
        ClientMessage::TriggerSos(payload) => {
            let user_id = payload.user_id.as_deref().unwrap_or_default();
            let result = coordinator.handle_trigger(user_id, payload.location()).await;
            registry.reply(connection_id, TRIGGER_ACK, &result, request.id).await;
        }
        ClientMessage::CancelSos(payload) => {
            let result = coordinator.handle_cancel(&payload.alert_id).await;
            registry.reply(connection_id, CANCEL_ACK, &result, request.id).await;
        }
    }
}
