use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_TURN_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Wall-clock limit for one chat turn; exceeding it answers 504.
    pub turn_timeout: Duration,
    pub max_body_bytes: usize,
    /// Concurrent requests admitted before callers wait. `None` is unlimited.
    pub max_concurrent_requests: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            turn_timeout: DEFAULT_TURN_TIMEOUT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            max_concurrent_requests: None,
        }
    }
}
