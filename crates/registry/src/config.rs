//! Registry configuration
//!
//! Layered with the `config` crate: an optional TOML file, then environment
//! variables under a prefix (`ARBOR_ROOT_OWNER`, `ARBOR_RENEWAL__MODE`,
//! `ARBOR_RENEWAL__PERIOD_SECS`, ...). Values are validated after loading.

use crate::errors::ConfigError;
use arbor_types::Identity;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Environment prefix used by [`RegistryConfig::load`].
pub const ENV_PREFIX: &str = "ARBOR";

/// 52 weeks.
pub const DEFAULT_LEASE_PERIOD_SECS: u64 = 52 * 7 * 24 * 60 * 60;

const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 1024;

/// How a successful claim sets a node's expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RenewalPolicy {
    /// Expiry moves to `now + period_secs` on every successful claim.
    Lease { period_secs: u64 },
    /// Claimed nodes never lapse on their own; only forced expiry ends them.
    Permanent,
}

impl RenewalPolicy {
    pub fn renewed_expiry(&self, now: u64) -> u64 {
        match self {
            RenewalPolicy::Lease { period_secs } => now.saturating_add(*period_secs),
            RenewalPolicy::Permanent => u64::MAX,
        }
    }
}

impl Default for RenewalPolicy {
    fn default() -> Self {
        RenewalPolicy::Lease {
            period_secs: DEFAULT_LEASE_PERIOD_SECS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenewalMode {
    #[default]
    Lease,
    Permanent,
}

/// Flat, loader-friendly form of [`RenewalPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewalConfig {
    #[serde(default)]
    pub mode: RenewalMode,
    /// Ignored in permanent mode.
    #[serde(default = "default_period_secs")]
    pub period_secs: u64,
}

impl RenewalConfig {
    pub fn policy(&self) -> RenewalPolicy {
        match self.mode {
            RenewalMode::Lease => RenewalPolicy::Lease {
                period_secs: self.period_secs,
            },
            RenewalMode::Permanent => RenewalPolicy::Permanent,
        }
    }
}

impl Default for RenewalConfig {
    fn default() -> Self {
        Self {
            mode: RenewalMode::Lease,
            period_secs: DEFAULT_LEASE_PERIOD_SECS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Controller of the implicit root namespace.
    pub root_owner: Identity,
    #[serde(default)]
    pub renewal: RenewalConfig,
    /// Buffer size of the live event channel.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_period_secs() -> u64 {
    DEFAULT_LEASE_PERIOD_SECS
}

fn default_event_channel_capacity() -> usize {
    DEFAULT_EVENT_CHANNEL_CAPACITY
}

fn default_log_level() -> String {
    "info".to_string()
}

impl RegistryConfig {
    /// Defaults for everything except the root authority.
    pub fn new(root_owner: Identity) -> Self {
        Self {
            root_owner,
            renewal: RenewalConfig::default(),
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }

    pub fn with_renewal(mut self, policy: RenewalPolicy) -> Self {
        self.renewal = match policy {
            RenewalPolicy::Lease { period_secs } => RenewalConfig {
                mode: RenewalMode::Lease,
                period_secs,
            },
            RenewalPolicy::Permanent => RenewalConfig {
                mode: RenewalMode::Permanent,
                ..RenewalConfig::default()
            },
        };
        self
    }

    pub fn renewal_policy(&self) -> RenewalPolicy {
        self.renewal.policy()
    }

    /// Load from an optional file plus `ARBOR_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    pub fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::Invalid(format!(
                    "configuration file {} not found",
                    path.display()
                )));
            }
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator("__"),
        );

        let config: RegistryConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        info!(
            root_owner = %config.root_owner,
            renewal = ?config.renewal_policy(),
            "registry configuration loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root_owner.is_zero() {
            return Err(ConfigError::Invalid(
                "root_owner must not be the zero identity".to_string(),
            ));
        }
        if self.renewal.mode == RenewalMode::Lease && self.renewal.period_secs == 0 {
            return Err(ConfigError::Invalid(
                "renewal.period_secs must be positive in lease mode".to_string(),
            ));
        }
        if self.event_channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "event_channel_capacity must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const OWNER_HEX: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn lease_policy_adds_period() {
        let policy = RenewalPolicy::Lease { period_secs: 10 };
        assert_eq!(policy.renewed_expiry(100), 110);
        assert_eq!(policy.renewed_expiry(u64::MAX - 1), u64::MAX);
        assert_eq!(RenewalPolicy::Permanent.renewed_expiry(5), u64::MAX);
    }

    #[test]
    fn loads_file_with_defaults() {
        let file = write_config(&format!("root_owner = \"{OWNER_HEX}\"\n"));
        let config =
            RegistryConfig::load_with_prefix(Some(file.path()), "ARBOR_TEST_DEFAULTS").unwrap();
        assert_eq!(config.root_owner, Identity::new([0xaa; 32]));
        assert_eq!(config.renewal_policy(), RenewalPolicy::default());
        assert_eq!(config.event_channel_capacity, DEFAULT_EVENT_CHANNEL_CAPACITY);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn loads_permanent_mode() {
        let file = write_config(&format!(
            "root_owner = \"{OWNER_HEX}\"\nlog_format = \"json\"\n\n[renewal]\nmode = \"permanent\"\n"
        ));
        let config =
            RegistryConfig::load_with_prefix(Some(file.path()), "ARBOR_TEST_PERMANENT").unwrap();
        assert_eq!(config.renewal_policy(), RenewalPolicy::Permanent);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn environment_overrides_file() {
        let file = write_config(&format!(
            "root_owner = \"{OWNER_HEX}\"\n\n[renewal]\nperiod_secs = 60\n"
        ));
        std::env::set_var("ARBOR_TEST_ENV_RENEWAL__PERIOD_SECS", "120");
        let config = RegistryConfig::load_with_prefix(Some(file.path()), "ARBOR_TEST_ENV").unwrap();
        std::env::remove_var("ARBOR_TEST_ENV_RENEWAL__PERIOD_SECS");
        assert_eq!(
            config.renewal_policy(),
            RenewalPolicy::Lease { period_secs: 120 }
        );
    }

    #[test]
    fn rejects_missing_file_and_bad_values() {
        let missing = Path::new("/nonexistent/arbor.toml");
        assert!(matches!(
            RegistryConfig::load_with_prefix(Some(missing), "ARBOR_TEST_MISSING"),
            Err(ConfigError::Invalid(_))
        ));

        let zero_owner = write_config(&format!("root_owner = \"{}\"\n", "0".repeat(64)));
        assert!(matches!(
            RegistryConfig::load_with_prefix(Some(zero_owner.path()), "ARBOR_TEST_ZERO"),
            Err(ConfigError::Invalid(_))
        ));

        let zero_period = write_config(&format!(
            "root_owner = \"{OWNER_HEX}\"\n\n[renewal]\nperiod_secs = 0\n"
        ));
        assert!(matches!(
            RegistryConfig::load_with_prefix(Some(zero_period.path()), "ARBOR_TEST_PERIOD"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn with_renewal_roundtrips_policy() {
        let owner = Identity::new([1u8; 32]);
        let config = RegistryConfig::new(owner).with_renewal(RenewalPolicy::Permanent);
        assert_eq!(config.renewal_policy(), RenewalPolicy::Permanent);
        let config = config.with_renewal(RenewalPolicy::Lease { period_secs: 5 });
        assert_eq!(config.renewal_policy(), RenewalPolicy::Lease { period_secs: 5 });
        assert!(config.validate().is_ok());
    }
}
