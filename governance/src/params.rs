//! Tunable limits of the proposal store.
//!
//! Two rate-limit constant sets exist in the wild: the conservative one shown
//! to users (10 total / 3 per day / 30 minutes apart) and a permissive one
//! used while testing (50 / 20 / 1 minute). Both are exposed as named
//! [`RateLimitProfile`]s; the integrator picks one and the store applies it
//! consistently to submission checks and limit snapshots.

use econexus_types::time::{MS_PER_DAY, MS_PER_MINUTE};
use serde::{Deserialize, Serialize};

/// Per-address submission limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimits {
    /// Maximum proposals one address may have in the store at once.
    pub max_per_user: u32,
    /// Maximum proposals one address may create within a trailing 24h window.
    pub max_per_day: u32,
    /// Minimum spacing between two submissions by the same address.
    pub min_time_between_ms: u64,
}

impl RateLimits {
    /// Limits advertised to users.
    pub const STANDARD: Self = Self {
        max_per_user: 10,
        max_per_day: 3,
        min_time_between_ms: 30 * MS_PER_MINUTE,
    };

    /// Relaxed limits for development and demos.
    pub const DEVELOPMENT: Self = Self {
        max_per_user: 50,
        max_per_day: 20,
        min_time_between_ms: MS_PER_MINUTE,
    };
}

/// Named rate-limit presets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitProfile {
    Standard,
    Development,
}

impl RateLimitProfile {
    pub fn limits(&self) -> RateLimits {
        match self {
            Self::Standard => RateLimits::STANDARD,
            Self::Development => RateLimits::DEVELOPMENT,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Development => "development",
        }
    }
}

impl std::str::FromStr for RateLimitProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "development" | "dev" => Ok(Self::Development),
            other => Err(format!(
                "unknown rate limit profile '{other}' (expected standard or development)"
            )),
        }
    }
}

/// Storage budget enforced by compaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageBudget {
    /// Nominal capacity of the storage medium in bytes.
    #[serde(default = "default_capacity_bytes")]
    pub capacity_bytes: usize,
    /// Compaction triggers above this fraction of capacity (basis points).
    #[serde(default = "default_cleanup_threshold_bps")]
    pub cleanup_threshold_bps: u32,
    /// Proposals kept by compaction (most recently created first).
    #[serde(default = "default_max_proposals")]
    pub max_proposals: usize,
    /// Vote-log entries kept by compaction (most recent).
    #[serde(default = "default_max_votes")]
    pub max_votes: usize,
    /// User-history entries kept by compaction (most recent).
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

fn default_capacity_bytes() -> usize {
    200 * 1024
}

fn default_cleanup_threshold_bps() -> u32 {
    9000 // 90%
}

fn default_max_proposals() -> usize {
    30
}

fn default_max_votes() -> usize {
    50
}

fn default_max_history() -> usize {
    20
}

impl StorageBudget {
    /// Size in bytes above which compaction runs.
    pub fn cleanup_threshold_bytes(&self) -> usize {
        let bytes = self.capacity_bytes as u128 * self.cleanup_threshold_bps as u128 / 10_000;
        usize::try_from(bytes).unwrap_or(usize::MAX)
    }
}

impl Default for StorageBudget {
    fn default() -> Self {
        Self {
            capacity_bytes: default_capacity_bytes(),
            cleanup_threshold_bps: default_cleanup_threshold_bps(),
            max_proposals: default_max_proposals(),
            max_votes: default_max_votes(),
            max_history: default_max_history(),
        }
    }
}

/// Everything the proposal store needs to know about its limits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreParams {
    pub rate_limits: RateLimits,
    pub storage: StorageBudget,
    /// How long expired proposals linger before the expiry sweep removes them.
    pub retention_days: u64,
}

impl StoreParams {
    pub const DEFAULT_RETENTION_DAYS: u64 = 7;

    pub fn new(rate_limits: RateLimits) -> Self {
        Self {
            rate_limits,
            storage: StorageBudget::default(),
            retention_days: Self::DEFAULT_RETENTION_DAYS,
        }
    }

    pub fn for_profile(profile: RateLimitProfile) -> Self {
        Self::new(profile.limits())
    }

    pub fn retention_ms(&self) -> u64 {
        self.retention_days.saturating_mul(MS_PER_DAY)
    }
}

/// Defaults to the [`RateLimitProfile::Standard`] limits.
impl Default for StoreParams {
    fn default() -> Self {
        Self::for_profile(RateLimitProfile::Standard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_threshold_is_ninety_percent_of_200k() {
        assert_eq!(StorageBudget::default().cleanup_threshold_bytes(), 184_320);
    }

    #[test]
    fn profiles_map_to_constant_sets() {
        assert_eq!(RateLimitProfile::Standard.limits().max_per_day, 3);
        assert_eq!(RateLimitProfile::Development.limits().max_per_user, 50);
        assert_eq!(
            "dev".parse::<RateLimitProfile>(),
            Ok(RateLimitProfile::Development)
        );
        assert!("strict".parse::<RateLimitProfile>().is_err());
    }

    #[test]
    fn retention_in_millis() {
        assert_eq!(StoreParams::default().retention_ms(), 7 * 86_400_000);
    }
}
