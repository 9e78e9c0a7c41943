//! Authorization policy configuration.
//!
//! Names the roles the permission model treats specially. Loaded from
//! environment variables with defaults matching the stock role catalog.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default global admin role name.
pub const DEFAULT_GLOBAL_ADMIN_ROLE: &str = "superadmin";

/// Default group admin role name.
pub const DEFAULT_GROUP_ADMIN_ROLE: &str = "admin";

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Missing required configuration value.
    #[error("Missing required configuration value: {0}")]
    MissingValue(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Role names with special meaning to the resolver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyConfig {
    /// Role names that bypass every per-module check, in every group.
    pub global_admin_roles: Vec<String>,

    /// Role name that administers membership of the group it is held in.
    pub group_admin_role: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            global_admin_roles: vec![DEFAULT_GLOBAL_ADMIN_ROLE.to_string()],
            group_admin_role: DEFAULT_GROUP_ADMIN_ROLE.to_string(),
        }
    }
}

impl PolicyConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `BULLETIN_GLOBAL_ADMIN_ROLES`: comma-separated role names (default: superadmin)
    /// - `BULLETIN_GROUP_ADMIN_ROLE`: group admin role name (default: admin)
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            global_admin_roles: std::env::var("BULLETIN_GLOBAL_ADMIN_ROLES")
                .map(|s| parse_role_list(&s))
                .unwrap_or(default.global_admin_roles),
            group_admin_role: std::env::var("BULLETIN_GROUP_ADMIN_ROLE")
                .map(|s| s.trim().to_string())
                .unwrap_or(default.group_admin_role),
        }
    }

    /// Check if a role name is a global admin role.
    pub fn is_global_admin_role(&self, role_name: &str) -> bool {
        self.global_admin_roles.iter().any(|r| r == role_name)
    }

    /// Check if a role name is the group admin role.
    pub fn is_group_admin_role(&self, role_name: &str) -> bool {
        self.group_admin_role == role_name
    }

    /// Validate the configuration.
    ///
    /// At least one global admin role must exist, and the group admin role
    /// must be distinct from all of them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.global_admin_roles.iter().all(|r| r.is_empty()) {
            return Err(ConfigError::MissingValue("BULLETIN_GLOBAL_ADMIN_ROLES".to_string()));
        }
        if self.group_admin_role.is_empty() {
            return Err(ConfigError::MissingValue("BULLETIN_GROUP_ADMIN_ROLE".to_string()));
        }
        if self.is_global_admin_role(&self.group_admin_role) {
            return Err(ConfigError::InvalidValue {
                key: "BULLETIN_GROUP_ADMIN_ROLE".to_string(),
                message: format!("'{}' is already a global admin role", self.group_admin_role),
            });
        }
        Ok(())
    }
}

fn parse_role_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
