//! Configuration defaults for the callprobe client.

use std::env;
use std::time::Duration;

/// Default signaling server address.
pub const DEFAULT_SERVER_ADDR: &str = "localhost";

/// Default signaling server port.
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default number to call.
pub const DEFAULT_PHONE_NUMBER: &str = "0938220136";

/// Bound on each receive wait; also the stop-flag check granularity.
pub const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_secs(1);

/// Emit a running-stats line every this many media packets.
pub const STATS_INTERVAL: u64 = 50;

/// Payload bytes shown in the per-packet dump.
pub const PAYLOAD_PREVIEW_LEN: usize = 16;

/// Returns the server address from `CALLPROBE_SERVER` env var or default.
#[must_use]
pub fn server_addr() -> String {
    env::var("CALLPROBE_SERVER").unwrap_or_else(|_| DEFAULT_SERVER_ADDR.to_string())
}

/// Returns the server port from `CALLPROBE_PORT` env var or default.
#[must_use]
pub fn server_port() -> u16 {
    env::var("CALLPROBE_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_SERVER_PORT)
}

/// Returns the number to call from `CALLPROBE_NUMBER` env var or default.
#[must_use]
pub fn phone_number() -> String {
    env::var("CALLPROBE_NUMBER").unwrap_or_else(|_| DEFAULT_PHONE_NUMBER.to_string())
}

/// Connection parameters for one diagnostic session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub server_addr: String,
    pub server_port: u16,
    pub phone_number: String,
    pub recv_timeout: Duration,
}

impl SessionConfig {
    #[must_use]
    pub fn new(server_addr: String, server_port: u16, phone_number: String) -> Self {
        Self {
            server_addr,
            server_port,
            phone_number,
            recv_timeout: DEFAULT_RECV_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_recv_timeout(mut self, recv_timeout: Duration) -> Self {
        self.recv_timeout = recv_timeout;
        self
    }
}
