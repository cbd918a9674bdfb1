use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Error types for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config build error: {0}")]
    Build(#[source] config::ConfigError),

    #[error("config deserialize error: {0}")]
    Deserialize(#[source] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ConfigError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ControllerConfig {
    #[serde(default)]
    pub reconciler: ReconcilerConfig,
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.reconciler.validate()
    }
}

/// Timings for the provider revision reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Delay before retrying after a transient list or apply failure.
    #[serde(default = "default_short_wait_secs")]
    pub short_wait_secs: u64,
    /// Upper bound on a single reconcile.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_short_wait_secs() -> u64 {
    30
}
fn default_timeout_secs() -> u64 {
    60
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            short_wait_secs: default_short_wait_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ReconcilerConfig {
    pub fn short_wait(&self) -> Duration {
        Duration::from_secs(self.short_wait_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.short_wait_secs == 0 {
            return Err(ConfigError::validation("reconciler.short_wait_secs must be > 0"));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::validation("reconciler.timeout_secs must be > 0"));
        }
        if self.short_wait_secs >= self.timeout_secs {
            return Err(ConfigError::validation(
                "reconciler.short_wait_secs must be < reconciler.timeout_secs",
            ));
        }
        Ok(())
    }
}

pub mod loader {
    use super::{ConfigError, ControllerConfig};
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub const DEFAULT_CONFIG_PATH: &str = "rolesync.toml";
    pub const ENV_PREFIX: &str = "ROLESYNC";

    /// Loads configuration from an optional TOML file, then applies
    /// environment overrides such as `ROLESYNC__RECONCILER__SHORT_WAIT_SECS=10`.
    pub fn load_config(path: Option<&str>) -> Result<ControllerConfig, ConfigError> {
        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_PATH));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder.build().map_err(ConfigError::Build)?;
        let merged: ControllerConfig = cfg.try_deserialize().map_err(ConfigError::Deserialize)?;
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ReconcilerConfig::default();
        assert_eq!(cfg.short_wait(), Duration::from_secs(30));
        assert_eq!(cfg.timeout(), Duration::from_secs(60));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let zero = ReconcilerConfig {
            short_wait_secs: 0,
            ..Default::default()
        };
        assert!(matches!(zero.validate(), Err(ConfigError::Validation(_))));

        let inverted = ReconcilerConfig {
            short_wait_secs: 90,
            timeout_secs: 60,
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_partial_section_uses_defaults() {
        let json = serde_json::json!({"reconciler": {"short_wait_secs": 5}});
        let cfg: ControllerConfig = serde_json::from_value(json).unwrap();
        assert_eq!(cfg.reconciler.short_wait_secs, 5);
        assert_eq!(cfg.reconciler.timeout_secs, 60);
    }
}
