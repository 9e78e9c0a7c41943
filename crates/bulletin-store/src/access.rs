//! Access configuration sub-document
//!
//! Every access-controlled resource embeds an [`AccessConfig`] that says
//! whether it is public or restricted to an explicit list of groups.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Visibility of an access-controlled resource.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccessType {
    /// Visible to every active actor.
    #[default]
    Public,
    /// Visible only to members of the allowed groups.
    Restricted,
}

impl AccessType {
    /// Get the string representation of the access type.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessType::Public => "public",
            AccessType::Restricted => "restricted",
        }
    }

    /// Parse access type from string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "public" => Some(AccessType::Public),
            "restricted" | "private" => Some(AccessType::Restricted),
            _ => None,
        }
    }
}

/// Access-control descriptor embedded in templates, bulletins, cards and
/// visual resources.
///
/// `allowed_groups` is meaningful only when `access_type` is
/// [`AccessType::Restricted`].
///
/// # Examples
///
/// ```
/// use bulletin_store::AccessConfig;
/// use uuid::Uuid;
///
/// let group = Uuid::now_v7();
/// let config = AccessConfig::restricted([group]);
/// assert!(config.is_restricted());
/// assert_eq!(config.write_groups(), &[group]);
///
/// assert!(AccessConfig::public().write_groups().is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AccessConfig {
    /// Public or restricted.
    pub access_type: AccessType,

    /// Groups whose members may see the resource (restricted only).
    #[serde(default)]
    pub allowed_groups: Vec<Uuid>,
}

impl AccessConfig {
    /// A public access configuration.
    pub fn public() -> Self {
        Self {
            access_type: AccessType::Public,
            allowed_groups: Vec::new(),
        }
    }

    /// A configuration restricted to the given groups.
    ///
    /// Duplicate group ids are dropped, first occurrence wins.
    pub fn restricted(groups: impl IntoIterator<Item = Uuid>) -> Self {
        let mut seen = HashSet::new();
        let allowed_groups = groups.into_iter().filter(|g| seen.insert(*g)).collect();
        Self {
            access_type: AccessType::Restricted,
            allowed_groups,
        }
    }

    /// Check if the resource is public.
    pub fn is_public(&self) -> bool {
        self.access_type == AccessType::Public
    }

    /// Check if the resource is restricted.
    pub fn is_restricted(&self) -> bool {
        self.access_type == AccessType::Restricted
    }

    /// Groups in which a writer must be authorized.
    ///
    /// Empty for public resources, whatever `allowed_groups` holds.
    pub fn write_groups(&self) -> &[Uuid] {
        if self.is_public() {
            &[]
        } else {
            &self.allowed_groups
        }
    }

    /// Check if any of the actor's groups grants read visibility.
    pub fn is_visible_to(&self, actor_groups: &HashSet<Uuid>) -> bool {
        self.is_public() || self.allowed_groups.iter().any(|g| actor_groups.contains(g))
    }

    /// Return a copy with the public/restricted invariant enforced.
    ///
    /// Public configurations drop their group list; restricted ones drop
    /// duplicate groups.
    pub fn normalized(&self) -> Self {
        match self.access_type {
            AccessType::Public => Self::public(),
            AccessType::Restricted => Self::restricted(self.allowed_groups.iter().copied()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_config_has_no_write_groups() {
        let stray = Uuid::now_v7();
        let config = AccessConfig {
            access_type: AccessType::Public,
            allowed_groups: vec![stray],
        };
        assert!(config.write_groups().is_empty());
        assert!(config.normalized().allowed_groups.is_empty());
    }

    #[test]
    fn test_restricted_dedupes_groups() {
        let g1 = Uuid::now_v7();
        let g2 = Uuid::now_v7();
        let config = AccessConfig::restricted([g1, g2, g1]);
        assert_eq!(config.allowed_groups, vec![g1, g2]);
    }

    #[test]
    fn test_visibility() {
        let g1 = Uuid::now_v7();
        let g2 = Uuid::now_v7();
        let config = AccessConfig::restricted([g1]);

        assert!(config.is_visible_to(&HashSet::from([g1, g2])));
        assert!(!config.is_visible_to(&HashSet::from([g2])));
        assert!(AccessConfig::public().is_visible_to(&HashSet::new()));
    }

    #[test]
    fn test_access_type_parse() {
        assert_eq!(AccessType::parse("PUBLIC"), Some(AccessType::Public));
        assert_eq!(AccessType::parse("restricted"), Some(AccessType::Restricted));
        assert_eq!(AccessType::parse("secret"), None);
    }

    #[test]
    fn test_serde_shape() {
        let g = Uuid::now_v7();
        let json = serde_json::to_value(AccessConfig::restricted([g])).unwrap();
        assert_eq!(json["access_type"], "restricted");
        assert_eq!(json["allowed_groups"][0], g.to_string());

        let parsed: AccessConfig =
            serde_json::from_value(serde_json::json!({"access_type": "public"})).unwrap();
        assert!(parsed.is_public());
        assert!(parsed.allowed_groups.is_empty());
    }
}
