// =============================================================================
// Engine Configuration — JSON settings with serde defaults
// =============================================================================
//
// Every field carries a serde default so that an older config file missing
// new fields still deserialises. Callers fall back to `Default` with a
// warning when the file is absent.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_gamma_base_url() -> String {
    "https://gamma-api.polymarket.com".to_string()
}

fn default_ruleset_path() -> String {
    "rules.yaml".to_string()
}

fn default_reasoner_version() -> String {
    "v1".to_string()
}

fn default_scan_interval_secs() -> u64 {
    60
}

fn default_scan_event_limit() -> u32 {
    25
}

fn default_scan_max_markets() -> usize {
    200
}

fn default_scan_peer_count() -> usize {
    5
}

fn default_history_window() -> usize {
    32
}

/// Top-level runtime configuration for the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Address the HTTP API binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Base URL of the Gamma market-data API.
    #[serde(default = "default_gamma_base_url")]
    pub gamma_base_url: String,

    /// Path to the YAML ruleset file (also used by hot reload).
    #[serde(default = "default_ruleset_path")]
    pub ruleset_path: String,

    /// Version label stamped into every intent output.
    #[serde(default = "default_reasoner_version")]
    pub reasoner_version: String,

    /// Seconds between market scans.
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,

    /// Events requested from the provider per scan.
    #[serde(default = "default_scan_event_limit")]
    pub scan_event_limit: u32,

    /// Upper bound on markets processed per scan.
    #[serde(default = "default_scan_max_markets")]
    pub scan_max_markets: usize,

    /// Peers (by liquidity) used for the dispersion feature.
    #[serde(default = "default_scan_peer_count")]
    pub scan_peer_count: usize,

    /// Observations retained per market for the volatility window.
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            gamma_base_url: default_gamma_base_url(),
            ruleset_path: default_ruleset_path(),
            reasoner_version: default_reasoner_version(),
            scan_interval_secs: default_scan_interval_secs(),
            scan_event_limit: default_scan_event_limit(),
            scan_max_markets: default_scan_max_markets(),
            scan_peer_count: default_scan_peer_count(),
            history_window: default_history_window(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing file is an error so the caller can fall back to defaults
    /// with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse engine config from {}", path.display()))?;

        info!(
            path = %path.display(),
            bind_addr = %config.bind_addr,
            ruleset = %config.ruleset_path,
            scan_interval_secs = config.scan_interval_secs,
            "engine config loaded"
        );

        Ok(config)
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080");
        assert_eq!(cfg.gamma_base_url, "https://gamma-api.polymarket.com");
        assert_eq!(cfg.ruleset_path, "rules.yaml");
        assert_eq!(cfg.reasoner_version, "v1");
        assert_eq!(cfg.scan_interval_secs, 60);
        assert_eq!(cfg.scan_peer_count, 5);
        assert_eq!(cfg.history_window, 32);
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080");
        assert_eq!(cfg.scan_event_limit, 25);
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "bind_addr": "127.0.0.1:9090", "scan_interval_secs": 10 }"#;
        let cfg: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.bind_addr, "127.0.0.1:9090");
        assert_eq!(cfg.scan_interval_secs, 10);
        assert_eq!(cfg.ruleset_path, "rules.yaml");
    }

    #[test]
    fn roundtrip_serialisation() {
        let cfg = EngineConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let cfg2: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.bind_addr, cfg2.bind_addr);
        assert_eq!(cfg.scan_max_markets, cfg2.scan_max_markets);
    }
}
