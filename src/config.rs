//! Server configuration
//!
//! Bind address comes from the first command-line argument, the tick
//! interval from `TICK_INTERVAL_MS`. Both fall back to defaults.

use std::env;
use std::time::Duration;

use tracing::warn;

/// Default server address
pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";

/// Default time between room ticks
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 50;

/// Environment variable overriding the tick interval
pub const TICK_INTERVAL_ENV: &str = "TICK_INTERVAL_MS";

/// Runtime settings for the binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to
    pub addr: String,
    /// Time between room ticks
    pub tick_interval: Duration,
}

impl ServerConfig {
    /// Read settings from the process arguments and environment
    pub fn from_env() -> Self {
        let tick = env::var(TICK_INTERVAL_ENV).ok();
        Self::from_parts(env::args().nth(1), tick.as_deref())
    }

    /// Build settings from raw values, falling back to defaults
    ///
    /// An unparsable or zero tick interval is logged and replaced with the
    /// default.
    pub fn from_parts(addr: Option<String>, tick_ms: Option<&str>) -> Self {
        let tick_ms = match tick_ms.map(str::parse::<u64>) {
            None => DEFAULT_TICK_INTERVAL_MS,
            Some(Ok(ms)) if ms > 0 => ms,
            Some(_) => {
                warn!(
                    "Ignoring invalid {}={:?}, using {} ms",
                    TICK_INTERVAL_ENV, tick_ms, DEFAULT_TICK_INTERVAL_MS
                );
                DEFAULT_TICK_INTERVAL_MS
            }
        };

        Self {
            addr: addr.unwrap_or_else(|| DEFAULT_ADDR.to_string()),
            tick_interval: Duration::from_millis(tick_ms),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_parts(None, None)
    }
}
