//! Lifecycle configuration.

use serde::{Deserialize, Serialize};

use bulletin_rbac::ConfigError;

/// Default suffix appended to the name of a clone.
pub const DEFAULT_CLONE_SUFFIX: &str = " (clon)";

/// Master/version lifecycle settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LifecycleConfig {
    /// Appended to the source name when a clone is not given a name.
    pub clone_suffix: String,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            clone_suffix: DEFAULT_CLONE_SUFFIX.to_string(),
        }
    }
}

impl LifecycleConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `BULLETIN_CLONE_SUFFIX`: clone name suffix (default: " (clon)")
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            clone_suffix: std::env::var("BULLETIN_CLONE_SUFFIX").unwrap_or(default.clone_suffix),
        }
    }

    /// Set the clone suffix.
    pub fn with_clone_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.clone_suffix = suffix.into();
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clone_suffix.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "BULLETIN_CLONE_SUFFIX".to_string(),
                message: "suffix must contain visible characters".to_string(),
            });
        }
        Ok(())
    }

    /// Name for a clone of `source_name`.
    pub fn clone_name(&self, source_name: &str) -> String {
        format!("{source_name}{}", self.clone_suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LifecycleConfig::default();
        assert_eq!(config.clone_name("Monthly outlook"), "Monthly outlook (clon)");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_suffix_is_rejected() {
        let config = LifecycleConfig::default().with_clone_suffix("  ");
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue { .. })));
    }
}
