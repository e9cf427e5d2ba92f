//! Server configuration.

use std::time::Duration;

/// Default idle time after which a room's coordinator is evicted
pub const DEFAULT_IDLE_EVICTION_SECS: u64 = 30;

/// Runtime settings resolved from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 最後のイベントからこの時間が経過したコーディネーターは破棄される
    pub idle_eviction: Duration,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16, idle_eviction_secs: u64) -> Self {
        Self {
            host: host.into(),
            port,
            idle_eviction: Duration::from_secs(idle_eviction_secs),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new("127.0.0.1", 8080, DEFAULT_IDLE_EVICTION_SECS)
    }
}
