//! API shared state

use std::time::Duration;

use crate::{config::Config, coordinator::AlertCoordinator};

/// Per-connection stream settings
#[derive(Debug, Clone, Copy)]
pub struct StreamSettings {
    /// Outbound frames buffered per connection
    pub buffer: usize,

    /// Upper bound for writing one frame to the socket
    pub send_timeout: Duration,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for StreamSettings {
    fn from(config: &Config) -> Self {
        Self {
            buffer: config.connection_buffer,
            send_timeout: config.send_timeout(),
        }
    }
}

/// Shared state passed to all API handlers
#[derive(Debug, Clone)]
pub struct ApiState {
    /// Alert lifecycle coordinator (owns the store and registry)
    pub coordinator: AlertCoordinator,

    /// Settings applied to each stream connection
    pub stream: StreamSettings,
}

impl ApiState {
    pub fn new(coordinator: AlertCoordinator, stream: StreamSettings) -> Self {
        Self { coordinator, stream }
    }
}
