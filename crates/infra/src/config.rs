//! Runtime configuration for the inventory subsystem.
//!
//! Everything has a default; `from_env()` overrides from `STOREFRONT_*`
//! variables. Unparseable values keep the default and log a warning.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

pub const ENV_RESERVATION_TTL_SECS: &str = "STOREFRONT_RESERVATION_TTL_SECS";
pub const ENV_SWEEP_INTERVAL_SECS: &str = "STOREFRONT_SWEEP_INTERVAL_SECS";
pub const ENV_EXPIRY_POLL_MILLIS: &str = "STOREFRONT_EXPIRY_POLL_MILLIS";
pub const ENV_DATA_DIR: &str = "STOREFRONT_DATA_DIR";
pub const ENV_TELEMETRY_URL: &str = "STOREFRONT_TELEMETRY_URL";
pub const ENV_BIND_ADDR: &str = "STOREFRONT_BIND_ADDR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryConfig {
    /// How long a reservation holds stock before auto-release.
    pub reservation_ttl: Duration,
    /// Period of the threshold drift sweep.
    pub sweep_interval: Duration,
    /// How often the expiry runner looks for due reservations.
    pub expiry_poll: Duration,
    /// Directory for the JSON record log; `None` keeps records in memory.
    pub data_dir: Option<PathBuf>,
    /// Analytics collector endpoint; `None` disables telemetry.
    pub telemetry_url: Option<String>,
    pub bind_addr: String,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            reservation_ttl: Duration::from_secs(900),
            sweep_interval: Duration::from_secs(60),
            expiry_poll: Duration::from_millis(1000),
            data_dir: None,
            telemetry_url: None,
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

impl InventoryConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            reservation_ttl: parse_positive(ENV_RESERVATION_TTL_SECS, non_empty(ENV_RESERVATION_TTL_SECS))
                .map(Duration::from_secs)
                .unwrap_or(defaults.reservation_ttl),
            sweep_interval: parse_positive(ENV_SWEEP_INTERVAL_SECS, non_empty(ENV_SWEEP_INTERVAL_SECS))
                .map(Duration::from_secs)
                .unwrap_or(defaults.sweep_interval),
            expiry_poll: parse_positive(ENV_EXPIRY_POLL_MILLIS, non_empty(ENV_EXPIRY_POLL_MILLIS))
                .map(Duration::from_millis)
                .unwrap_or(defaults.expiry_poll),
            data_dir: non_empty(ENV_DATA_DIR).map(PathBuf::from),
            telemetry_url: non_empty(ENV_TELEMETRY_URL),
            bind_addr: non_empty(ENV_BIND_ADDR).unwrap_or(defaults.bind_addr),
        }
    }

    /// Reservation TTL as a domain duration.
    pub fn reservation_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.reservation_ttl)
            .unwrap_or_else(|_| chrono::Duration::seconds(storefront_inventory::DEFAULT_RESERVATION_TTL_SECS))
    }
}

fn parse_positive(key: &str, raw: Option<String>) -> Option<u64> {
    let raw = raw?;
    match raw.parse::<u64>() {
        Ok(v) if v > 0 => Some(v),
        _ => {
            warn!(variable = key, value = %raw, "invalid value, using default");
            None
        }
    }
}
