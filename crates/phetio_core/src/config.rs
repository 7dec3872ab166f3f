//! Session configuration.
//!
//! Maps to a `phetio.toml` file. Every section is optional; missing values
//! fall back to the `Default` impls.
//!
//! ## Example `phetio.toml`
//!
//! ```toml
//! [assertions]
//! enabled = false
//!
//! [state]
//! apply_zero_index = true
//!
//! [logging]
//! level = "debug"
//! ```

use crate::assertions::Assertions;
use crate::indexed_node::IndexedNodeOptions;
use serde::{Deserialize, Serialize};

/// Whether failed checks are raised (development, testing) or logged and
/// tolerated (production).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AssertionConfig {
    pub enabled: bool,
}

impl Default for AssertionConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct StateConfig {
    /// Restore IndexedNodeIO indices of 0. Off keeps the historical
    /// behavior of leaving such nodes in place.
    pub apply_zero_index: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` level filter: error, warn, info, debug or trace.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PhetioConfig {
    pub assertions: AssertionConfig,
    pub state: StateConfig,
    pub logging: LoggingConfig,
}

impl PhetioConfig {
    /// Configuration for a production session.
    #[must_use]
    pub fn production() -> Self {
        Self {
            assertions: AssertionConfig { enabled: false },
            ..Default::default()
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let level = self.logging.level.to_ascii_lowercase();
        anyhow::ensure!(
            LOG_LEVELS.contains(&level.as_str()),
            "Log level must be one of {:?}, got {}",
            LOG_LEVELS,
            self.logging.level
        );
        Ok(())
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn assertions(&self) -> Assertions {
        Assertions::from_enabled(self.assertions.enabled)
    }

    #[must_use]
    pub fn indexed_node_options(&self) -> IndexedNodeOptions {
        IndexedNodeOptions {
            apply_zero_index: self.state.apply_zero_index,
        }
    }

    /// Hash of the settings that change how state is applied. Saved
    /// snapshots record it so a mismatch can be reported on load.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.assertions).as_bytes());
        hasher.update(format!("{:?}", self.state).as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = PhetioConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.assertions(), Assertions::Enabled);
        assert!(!config.indexed_node_options().apply_zero_index);
    }

    #[test]
    fn test_partial_toml() {
        let config = PhetioConfig::from_toml("[state]\napply_zero_index = true\n").unwrap();
        assert!(config.state.apply_zero_index);
        assert!(config.assertions.enabled);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_log_level() {
        assert!(PhetioConfig::from_toml("[logging]\nlevel = \"loud\"\n").is_err());
    }

    #[test]
    fn test_fingerprint_tracks_state_settings() {
        let base = PhetioConfig::default();
        let mut quiet = base.clone();
        quiet.logging.level = "warn".to_string();
        assert_eq!(base.fingerprint(), quiet.fingerprint());
        assert_ne!(base.fingerprint(), PhetioConfig::production().fingerprint());
    }
}
