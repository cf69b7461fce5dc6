//! Connection timing configuration
//!
//! These values are advisory: they are surfaced to operators and display
//! clients (which drive their own ping cadence and offline fallback), and
//! the server does not evict connections based on them. Liveness is
//! determined by the WebSocket close handshake alone.

use crate::{parse_env, ConfigResult};

/// Advisory timing knobs for display clients
#[derive(Debug, Clone)]
pub struct TimingConfig {
    /// Suggested interval between client liveness pings, in milliseconds
    pub ping_interval_ms: u64,

    /// Suggested client-side inactivity window before showing fallback
    /// content, in milliseconds
    pub connection_timeout_ms: u64,
}

impl TimingConfig {
    /// Load timing configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            ping_interval_ms: parse_env("PING_INTERVAL_MS", 5_000)?,
            connection_timeout_ms: parse_env("CONNECTION_TIMEOUT_MS", 30_000)?,
        })
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            ping_interval_ms: 5_000,
            connection_timeout_ms: 30_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timing() {
        let config = TimingConfig::default();
        assert_eq!(config.ping_interval_ms, 5_000);
        assert_eq!(config.connection_timeout_ms, 30_000);
    }
}
