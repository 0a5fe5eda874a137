//! Runtime configuration
//!
//! Read from environment variables at startup.

use std::path::PathBuf;
use std::time::Duration;

/// Database path override
pub const DATABASE_PATH_VAR: &str = "TIMBERSTOCK_DATABASE_PATH";
/// Base URL of the remote category unit service
pub const UNITS_URL_VAR: &str = "TIMBERSTOCK_UNITS_URL";
/// Remote unit service timeout in seconds
pub const UNITS_TIMEOUT_VAR: &str = "TIMBERSTOCK_UNITS_TIMEOUT_SECS";

const DEFAULT_UNITS_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub units_service_url: Option<String>,
    pub units_service_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (environment in production, a map in tests)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = lookup(DATABASE_PATH_VAR)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let units_service_url = lookup(UNITS_URL_VAR)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let timeout_secs = match lookup(UNITS_TIMEOUT_VAR) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(
                    "Ignoring invalid {}={:?}, using {}s",
                    UNITS_TIMEOUT_VAR,
                    raw,
                    DEFAULT_UNITS_TIMEOUT_SECS
                );
                DEFAULT_UNITS_TIMEOUT_SECS
            }),
            None => DEFAULT_UNITS_TIMEOUT_SECS,
        };

        Self {
            database_path,
            units_service_url,
            units_service_timeout: Duration::from_secs(timeout_secs),
        }
    }
}

/// `<project>/data/timberstock.db`, next to the executable's target directory
pub fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("data");
    path.push("timberstock.db");
    path
}
