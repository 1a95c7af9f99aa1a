//! Wire messages exchanged with connected peers
//!
//! Every frame is a JSON envelope:
//!
//! ```text
//! { "event": "<name>", "data": <payload>, "id": <optional request id> }
//! ```
//!
//! Inbound frames carry `trigger_sos` / `cancel_sos` requests. Outbound
//! frames are either broadcasts (`sos_broadcast`, `sos_cancelled`) or direct
//! replies to one peer (`trigger_ack`, `cancel_ack`, `system_status`, `error`).
//! A request `id`, when present, is echoed on the matching reply.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{AlertId, Location};

// Inbound events
pub const TRIGGER_SOS: &str = "trigger_sos";
pub const CANCEL_SOS: &str = "cancel_sos";

// Outbound broadcasts
pub const SOS_BROADCAST: &str = "sos_broadcast";
pub const SOS_CANCELLED: &str = "sos_cancelled";

// Outbound direct replies
pub const TRIGGER_ACK: &str = "trigger_ack";
pub const CANCEL_ACK: &str = "cancel_ack";
pub const SYSTEM_STATUS: &str = "system_status";
pub const ERROR: &str = "error";

#[derive(Serialize)]
struct OutboundEnvelope<'a, T: ?Sized> {
    event: &'a str,
    data: &'a T,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
}

/// Serialize an event into a shareable text frame
pub fn encode_event<T: Serialize + ?Sized>(event: &str, payload: &T) -> serde_json::Result<Arc<str>> {
    encode_reply(event, payload, None)
}

/// Serialize a reply, echoing the request id if there was one
pub fn encode_reply<T: Serialize + ?Sized>(
    event: &str,
    payload: &T,
    id: Option<u64>,
) -> serde_json::Result<Arc<str>> {
    let text = serde_json::to_string(&OutboundEnvelope {
        event,
        data: payload,
        id,
    })?;
    Ok(Arc::from(text))
}

/// Coordinates as they arrive on the wire, before validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLocation {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

/// Payload of `trigger_sos`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TriggerPayload {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub location: Option<RawLocation>,
}

impl TriggerPayload {
    /// The location, if both coordinates were supplied
    pub fn location(&self) -> Option<Location> {
        let raw = self.location.as_ref()?;
        Some(Location::new(raw.lat?, raw.lng?))
    }
}

/// Payload of `cancel_sos`
#[derive(Debug, Clone, Deserialize)]
pub struct CancelPayload {
    pub alert_id: AlertId,
}

/// Payload of `sos_cancelled`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelledPayload {
    pub alert_id: AlertId,
}

/// Payload of `system_status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub status: String,
}

impl SystemStatus {
    pub fn online() -> Self {
        Self {
            status: "online".to_string(),
        }
    }
}

/// Payload of `error`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
}

#[derive(Debug, Deserialize)]
struct InboundEnvelope {
    event: String,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    id: Option<u64>,
}

/// A decoded inbound request
#[derive(Debug, Clone)]
pub enum ClientMessage {
    TriggerSos(TriggerPayload),
    CancelSos(CancelPayload),
}

/// Request together with its optional correlation id
#[derive(Debug, Clone)]
pub struct ClientRequest {
    pub id: Option<u64>,
    pub message: ClientMessage,
}

/// Reasons an inbound frame could not be decoded
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// Not a JSON envelope at all
    InvalidFrame(String),

    /// Envelope named an event we do not handle
    UnknownEvent { event: String, id: Option<u64> },

    /// Known event, but its payload did not match
    InvalidPayload {
        event: String,
        id: Option<u64>,
        reason: String,
    },
}

impl ProtocolError {
    /// Request id of the offending frame, if it could be read
    pub fn request_id(&self) -> Option<u64> {
        match self {
            ProtocolError::InvalidFrame(_) => None,
            ProtocolError::UnknownEvent { id, .. } | ProtocolError::InvalidPayload { id, .. } => *id,
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::InvalidFrame(msg) => write!(f, "invalid frame: {}", msg),
            ProtocolError::UnknownEvent { event, .. } => write!(f, "unknown event: {}", event),
            ProtocolError::InvalidPayload { event, reason, .. } => {
                write!(f, "invalid {} payload: {}", event, reason)
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

impl ClientRequest {
    /// Decode a text frame into a request
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let envelope: InboundEnvelope =
            serde_json::from_str(text).map_err(|e| ProtocolError::InvalidFrame(e.to_string()))?;

        let InboundEnvelope { event, data, id } = envelope;

        let invalid = |event: &str, e: serde_json::Error| ProtocolError::InvalidPayload {
            event: event.to_string(),
            id,
            reason: e.to_string(),
        };

        let message = match event.as_str() {
            TRIGGER_SOS => {
                // a bare `"data": null` is still a (failing) trigger
                let payload = if data.is_null() {
                    TriggerPayload::default()
                } else {
                    serde_json::from_value(data).map_err(|e| invalid(&event, e))?
                };
                ClientMessage::TriggerSos(payload)
            }
            CANCEL_SOS => {
                ClientMessage::CancelSos(serde_json::from_value(data).map_err(|e| invalid(&event, e))?)
            }
            _ => return Err(ProtocolError::UnknownEvent { event, id }),
        };

        Ok(Self { id, message })
    }
}
