pub mod api;
pub mod config;
pub mod coordinator;
pub mod protocol;
pub mod registry;
pub mod storage;
pub mod util;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Service identity reported by the root endpoint
pub const SERVICE_NAME: &str = "DURGA Guardian System Online";

/// Crate version reported by the root endpoint
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Opaque identity of an alert (format: "alert_<user_id>_<seq>")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertId(String);

impl AlertId {
    /// Build an id from the triggering user and the global sequence number.
    ///
    /// The sequence number is always the suffix after the last `_`, so two ids
    /// can only collide if their sequence numbers do.
    pub fn generate(user_id: &str, seq: u64) -> Self {
        Self(format!("alert_{user_id}_{seq}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for AlertId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for AlertId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertStatus {
    Active,
    Cancelled,
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertStatus::Active => write!(f, "ACTIVE"),
            AlertStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// One emergency event, tracked from trigger to cancellation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub alert_id: AlertId,
    pub user_id: String,
    pub location: Location,
    pub timestamp: DateTime<Utc>,
    pub status: AlertStatus,
}
