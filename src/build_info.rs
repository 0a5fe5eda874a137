//! Build metadata embedded at compile time, and the startup banner.

use serde::Serialize;

use crate::config::Config;

pub const BUILD_NUMBER: u64 = match option_env!("TIMBERSTOCK_BUILD_NUMBER") {
    Some(s) => match parse_build_number(s) {
        Some(n) => n,
        None => 0,
    },
    None => 0,
};

/// UTC, ISO 8601
pub const BUILD_TIMESTAMP: &str = match option_env!("TIMBERSTOCK_BUILD_TIMESTAMP") {
    Some(s) => s,
    None => "unknown",
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Decimal digits only; usable in const context
const fn parse_build_number(s: &str) -> Option<u64> {
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return None;
    }
    let mut n: u64 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let digit = bytes[i].wrapping_sub(b'0');
        if digit > 9 {
            return None;
        }
        n = match n.checked_mul(10) {
            Some(v) => match v.checked_add(digit as u64) {
                Some(v) => v,
                None => return None,
            },
            None => return None,
        };
        i += 1;
    }
    Some(n)
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub build_number: u64,
    pub build_timestamp: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            name: NAME,
            version: VERSION,
            build_number: BUILD_NUMBER,
            build_timestamp: BUILD_TIMESTAMP,
        }
    }

    /// e.g. "timberstock 1.0.0 (build 42, 2026-01-01T00:00:00Z)"
    pub fn describe(&self) -> String {
        format!(
            "{} {} (build {}, {})",
            self.name, self.version, self.build_number, self.build_timestamp
        )
    }
}

/// Print the startup banner to stderr
pub fn print_startup_banner(config: &Config) {
    let units_source = config
        .units_service_url
        .as_deref()
        .unwrap_or("local catalog");
    eprintln!("===============================================");
    eprintln!("  Timber Stock Manager");
    eprintln!("  {}", BuildInfo::current().describe());
    eprintln!("  Database: {}", config.database_path.display());
    eprintln!("  Units:    {}", units_source);
    eprintln!("===============================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_number() {
        assert_eq!(parse_build_number("0"), Some(0));
        assert_eq!(parse_build_number("1234"), Some(1234));
        assert_eq!(parse_build_number(""), None);
        assert_eq!(parse_build_number("12a"), None);
        assert_eq!(parse_build_number("-3"), None);
        assert_eq!(parse_build_number("99999999999999999999999"), None);
    }

    #[test]
    fn test_describe() {
        let info = BuildInfo {
            name: "timberstock",
            version: "1.0.0",
            build_number: 7,
            build_timestamp: "2026-01-01T00:00:00Z",
        };
        assert_eq!(info.describe(), "timberstock 1.0.0 (build 7, 2026-01-01T00:00:00Z)");
    }
}
