use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tracing::trace;

use crate::registry::DEFAULT_MAX_DROPPED_EVENTS;

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Full listen socket address; takes precedence over `addr` and `port`
    pub bind_addr: Option<SocketAddr>,

    /// Listen address (falls back to `DURGA_ADDR`, then 0.0.0.0)
    pub addr: Option<IpAddr>,

    /// Listen port (falls back to `DURGA_PORT`, then 5000)
    pub port: Option<u16>,

    /// Allow cross-origin requests from any origin
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,

    /// Outbound frames buffered per connection before drops start
    #[serde(default = "default_connection_buffer")]
    pub connection_buffer: usize,

    /// Dropped frames tolerated before a slow connection is closed
    #[serde(default = "default_max_dropped_events")]
    pub max_dropped_events: u64,

    /// Upper bound for writing one frame to a socket
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: None,
            addr: None,
            port: None,
            enable_cors: default_enable_cors(),
            connection_buffer: default_connection_buffer(),
            max_dropped_events: default_max_dropped_events(),
            send_timeout_ms: default_send_timeout_ms(),
        }
    }
}

impl Config {
    /// Resolve the listen address, consulting the environment for unset parts
    pub fn bind_addr(&self) -> SocketAddr {
        if let Some(bind_addr) = self.bind_addr {
            return bind_addr;
        }

        let addr = self.addr.unwrap_or_else(crate::util::get_addr);
        let port = self.port.unwrap_or_else(crate::util::get_port);
        SocketAddr::new(addr, port)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}

fn default_enable_cors() -> bool {
    true
}

fn default_connection_buffer() -> usize {
    64
}

fn default_max_dropped_events() -> u64 {
    DEFAULT_MAX_DROPPED_EVENTS
}

fn default_send_timeout_ms() -> u64 {
    5_000
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)?;
    serde_json::from_str(&file_content)
        .map_err(|e| anyhow::anyhow!("Invalid configuration file provided: {e}"))
        .inspect(|config| trace!("loaded config: {config:?}"))
}
