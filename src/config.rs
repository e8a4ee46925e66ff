//! Configuration Module
//!
//! Loads cache construction parameters from environment variables.

use std::env;
use std::time::Duration;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default TTL in seconds for entries set with `Expiration::Default` (0 = never expire)
    pub default_ttl: u64,
    /// Background sweep interval in seconds (0 = no sweeper)
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        Self {
            default_ttl: env::var("DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
        }
    }

    /// Default TTL as a Duration; `Duration::ZERO` means never expire.
    pub fn default_expiration(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }

    /// Sweep interval as a Duration; `Duration::ZERO` disables the sweeper.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: 300,
            cleanup_interval: 1,
        }
    }
}
