//! Error types for alert operations

use std::fmt;

/// Result type alias for alert operations
pub type AlertResult<T> = Result<T, AlertError>;

/// Errors that can occur while creating or removing alerts
///
/// Neither variant is fatal: validation failures are reported to the
/// originating caller, and a missing alert is an expected race.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertError {
    /// Malformed trigger payload
    Validation(String),

    /// No active alert with the given id
    NotFound(String),
}

impl AlertError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AlertError::Validation(msg.into())
    }

    pub fn not_found(alert_id: impl Into<String>) -> Self {
        AlertError::NotFound(alert_id.into())
    }
}

impl fmt::Display for AlertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertError::Validation(msg) => write!(f, "invalid trigger: {}", msg),
            AlertError::NotFound(id) => write!(f, "no active alert with id {}", id),
        }
    }
}

impl std::error::Error for AlertError {}
