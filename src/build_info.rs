//! Build metadata
//!
//! `build.rs` stamps a build counter and UTC timestamp into the binary; both
//! surfaces report them in the startup banner and the status probe.

use serde::Serialize;

pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// ISO 8601, or `unknown` when built without `build.rs`
pub const BUILD_TIMESTAMP: &str = match option_env!("HMS_BUILD_TIMESTAMP") {
    Some(s) => s,
    None => "unknown",
};

const BUILD_NUMBER: Option<&str> = option_env!("HMS_BUILD_NUMBER");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
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
            build_number: parse_build_number(BUILD_NUMBER),
            build_timestamp: BUILD_TIMESTAMP,
        }
    }

    /// `hms-reports 1.0.0 (build 12)`
    pub fn label(&self) -> String {
        format!("{} {} (build {})", self.name, self.version, self.build_number)
    }

    fn banner(&self, surface: &str) -> Vec<String> {
        let rule = "=".repeat(47);
        vec![
            rule.clone(),
            format!("  HMS Report Service - {} surface", surface),
            format!("  {}", self.label()),
            format!("  Compiled: {}", self.build_timestamp),
            rule,
        ]
    }
}

fn parse_build_number(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(0)
}

/// Print the startup banner to stderr; stdout belongs to the MCP transport
pub fn print_startup_banner(surface: &str) {
    for line in BuildInfo::current().banner(surface) {
        eprintln!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_number() {
        assert_eq!(parse_build_number(Some("42")), 42);
        assert_eq!(parse_build_number(Some(" 7\n")), 7);
        assert_eq!(parse_build_number(Some("4x")), 0);
        assert_eq!(parse_build_number(None), 0);
    }

    #[test]
    fn test_banner_names_surface_and_build() {
        let info = BuildInfo {
            name: "hms-reports",
            version: "1.0.0",
            build_number: 12,
            build_timestamp: "2026-10-17T08:00:00Z",
        };
        let banner = info.banner("MCP");
        assert_eq!(banner.len(), 5);
        assert_eq!(banner[1], "  HMS Report Service - MCP surface");
        assert_eq!(banner[2], "  hms-reports 1.0.0 (build 12)");
        assert!(banner[3].ends_with("2026-10-17T08:00:00Z"));
    }
}
