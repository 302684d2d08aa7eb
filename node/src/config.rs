//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use econexus_governance::{RateLimitProfile, RateLimits, StorageBudget, StoreParams};
use econexus_utils::LogFormat;

use crate::NodeError;

/// Configuration for an EcoNexus node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Directory holding the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Upper bound of the LMDB memory map, in MiB.
    #[serde(default = "default_map_size_mb")]
    pub map_size_mb: usize,

    /// Named rate-limit preset. Ignored when `rate_limits` is set.
    #[serde(default = "default_rate_limit_profile")]
    pub rate_limit_profile: RateLimitProfile,

    /// Days an expired proposal lingers before the expiry sweep removes it.
    #[serde(default = "default_retention_days")]
    pub retention_days: u64,

    /// Seconds between background maintenance passes. Zero disables them.
    #[serde(default = "default_maintenance_interval_secs")]
    pub maintenance_interval_secs: u64,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter (e.g. "info", "econexus_governance=debug").
    #[serde(default = "default_log_level")]
    pub log_level: String,

    // Tables must come after plain values for TOML serialization.
    /// Explicit limits overriding `rate_limit_profile`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limits: Option<RateLimits>,

    #[serde(default)]
    pub storage: StorageBudget,
}

// ── Defaults ───────────────────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./econexus_data")
}

fn default_map_size_mb() -> usize {
    64
}

fn default_rate_limit_profile() -> RateLimitProfile {
    RateLimitProfile::Standard
}

fn default_retention_days() -> u64 {
    StoreParams::DEFAULT_RETENTION_DAYS
}

fn default_maintenance_interval_secs() -> u64 {
    3600
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| NodeError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Rate limits in effect: the explicit table if present, else the profile.
    pub fn effective_rate_limits(&self) -> RateLimits {
        self.rate_limits
            .unwrap_or_else(|| self.rate_limit_profile.limits())
    }

    pub fn store_params(&self) -> StoreParams {
        StoreParams {
            rate_limits: self.effective_rate_limits(),
            storage: self.storage,
            retention_days: self.retention_days,
        }
    }

    pub fn map_size_bytes(&self) -> usize {
        self.map_size_mb.saturating_mul(1024 * 1024)
    }

    /// `None` when periodic maintenance is disabled.
    pub fn maintenance_interval(&self) -> Option<Duration> {
        (self.maintenance_interval_secs > 0)
            .then(|| Duration::from_secs(self.maintenance_interval_secs))
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            map_size_mb: default_map_size_mb(),
            rate_limit_profile: default_rate_limit_profile(),
            retention_days: default_retention_days(),
            maintenance_interval_secs: default_maintenance_interval_secs(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            rate_limits: None,
            storage: StorageBudget::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = NodeConfig::default();
        let toml_str = config.to_toml_string().expect("should serialize");
        let parsed = NodeConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn explicit_limits_round_trip_through_toml() {
        let config = NodeConfig {
            rate_limits: Some(RateLimits::DEVELOPMENT),
            ..NodeConfig::default()
        };
        let toml_str = config.to_toml_string().expect("should serialize");
        let parsed = NodeConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.rate_limits, Some(RateLimits::DEVELOPMENT));
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = NodeConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.data_dir, PathBuf::from("./econexus_data"));
        assert_eq!(config.retention_days, 7);
        assert_eq!(config.log_format, LogFormat::Human);
        assert_eq!(config.effective_rate_limits(), RateLimits::STANDARD);
        assert_eq!(config.store_params(), StoreParams::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            rate_limit_profile = "development"
            retention_days = 3
            maintenance_interval_secs = 0
            log_format = "json"

            [storage]
            max_proposals = 10
        "#;
        let config = NodeConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.effective_rate_limits(), RateLimits::DEVELOPMENT);
        assert_eq!(config.store_params().retention_days, 3);
        assert_eq!(config.maintenance_interval(), None);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.storage.max_proposals, 10);
        assert_eq!(config.storage.max_votes, 50); // default
    }

    #[test]
    fn limits_table_wins_over_profile() {
        let toml = r#"
            rate_limit_profile = "development"

            [rate_limits]
            max_per_user = 2
            max_per_day = 1
            min_time_between_ms = 5000
        "#;
        let config = NodeConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.effective_rate_limits().max_per_user, 2);
        assert_eq!(config.store_params().rate_limits.min_time_between_ms, 5000);
    }

    #[test]
    fn map_size_in_bytes() {
        assert_eq!(NodeConfig::default().map_size_bytes(), 64 * 1024 * 1024);
        assert_eq!(
            NodeConfig::default().maintenance_interval(),
            Some(Duration::from_secs(3600))
        );
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = NodeConfig::from_toml_file("/nonexistent/econexus.toml");
        assert!(matches!(result, Err(NodeError::Config(_))));
    }
}
