//! Store connection configuration.
//!
//! Settings arrive as environment-style strings; the coercion rules here
//! are part of the deployment contract: the database index falls back to 0
//! when unparseable, auto-pipelining is enabled only by the exact string
//! `"true"`, and a malformed sentinel entry aborts startup.

use fred::types::Server;

use redbridge_common::{Error, Result};

/// Default master group name used by sentinel deployments
pub const DEFAULT_SENTINEL_MASTER: &str = "mymaster";

/// Connection settings for the backing store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Store host (single-endpoint mode)
    pub host: String,
    /// Store port (single-endpoint mode)
    pub port: u16,
    /// Selected database index
    pub database: u8,
    /// Password for the store (master password in sentinel mode)
    pub password: Option<String>,
    /// Comma-separated `host:port` sentinel list; presence selects
    /// sentinel mode
    pub sentinels: Option<String>,
    /// Master group name monitored by the sentinels
    pub sentinel_master: String,
    /// Password for the sentinel nodes themselves
    pub sentinel_password: Option<String>,
    /// Enable client-side automatic pipelining
    pub auto_pipelining: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            database: 0,
            password: None,
            sentinels: None,
            sentinel_master: DEFAULT_SENTINEL_MASTER.to_string(),
            sentinel_password: None,
            auto_pipelining: false,
        }
    }
}

impl StoreConfig {
    /// Whether this configuration selects the sentinel topology
    #[must_use]
    pub fn uses_sentinel(&self) -> bool {
        self.sentinels
            .as_deref()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Coerce a database index setting. Unparseable values select database 0.
#[must_use]
pub fn parse_database(raw: &str) -> u8 {
    raw.trim().parse().unwrap_or(0)
}

/// Auto-pipelining is opt-in by the exact string `"true"`; anything else,
/// including `"True"` and `"1"`, leaves it disabled.
#[must_use]
pub fn parse_auto_pipelining(raw: &str) -> bool {
    raw == "true"
}

/// Validate and split a comma-separated sentinel list.
///
/// Each entry must be exactly a non-empty host and a numeric port.
/// The error names the offending entry so a bad deployment manifest is
/// diagnosable from the startup log alone.
pub fn parse_sentinel_list(raw: &str) -> Result<Vec<Server>> {
    raw.split(',')
        .map(|entry| {
            let entry = entry.trim();
            let (host, port) = entry.split_once(':').ok_or_else(|| {
                Error::Config(format!(
                    "malformed sentinel entry '{entry}': expected host:port"
                ))
            })?;
            if host.is_empty() {
                return Err(Error::Config(format!(
                    "malformed sentinel entry '{entry}': host must not be empty"
                )));
            }
            let port: u16 = port.parse().map_err(|_| {
                Error::Config(format!(
                    "malformed sentinel entry '{entry}': port must be numeric"
                ))
            })?;
            Ok(Server::new(host, port))
        })
        .collect()
}
