//! # Modules
//!
//! Defines the functional modules of the bulletin builder. A role grants
//! actions per module; every access-controlled resource kind belongs to
//! exactly one module.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Functional area a permission applies to.
///
/// - **Administration**: GroupManagement, AccessControl
/// - **Authoring**: BulletinsComposer, TemplateManagement, CardManagement
/// - **Publishing**: DashboardBulletins, Review
/// - **Integrations**: ExternalIntegrations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    /// Creating and editing groups.
    GroupManagement,
    /// Membership and role assignment inside groups.
    AccessControl,
    /// Bulletin authoring.
    BulletinsComposer,
    /// Template authoring.
    TemplateManagement,
    /// Published bulletin dashboard.
    DashboardBulletins,
    /// Review workflow.
    Review,
    /// Card authoring (also covers visual resources).
    CardManagement,
    /// Outbound integrations.
    ExternalIntegrations,
}

impl Module {
    /// Get the string representation of the module.
    ///
    /// # Returns
    ///
    /// The snake_case name used as key in role permission maps.
    pub fn as_str(&self) -> &'static str {
        match self {
            Module::GroupManagement => "group_management",
            Module::AccessControl => "access_control",
            Module::BulletinsComposer => "bulletins_composer",
            Module::TemplateManagement => "template_management",
            Module::DashboardBulletins => "dashboard_bulletins",
            Module::Review => "review",
            Module::CardManagement => "card_management",
            Module::ExternalIntegrations => "external_integrations",
        }
    }

    /// Parse module from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - Module name (case-insensitive, `-` accepted for `_`)
    ///
    /// # Returns
    ///
    /// `Some(Module)` if valid, `None` otherwise
    ///
    /// # Example
    ///
    /// ```
    /// use bulletin_rbac::modules::Module;
    ///
    /// assert_eq!(Module::parse("access_control"), Some(Module::AccessControl));
    /// assert_eq!(Module::parse("Template-Management"), Some(Module::TemplateManagement));
    /// assert_eq!(Module::parse("billing"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "group_management" | "groups" => Some(Module::GroupManagement),
            "access_control" => Some(Module::AccessControl),
            "bulletins_composer" | "bulletins" => Some(Module::BulletinsComposer),
            "template_management" | "templates" => Some(Module::TemplateManagement),
            "dashboard_bulletins" | "dashboard" => Some(Module::DashboardBulletins),
            "review" => Some(Module::Review),
            "card_management" | "cards" => Some(Module::CardManagement),
            "external_integrations" | "integrations" => Some(Module::ExternalIntegrations),
            _ => None,
        }
    }

    /// Get all modules.
    pub fn all() -> Vec<Self> {
        vec![
            Module::GroupManagement,
            Module::AccessControl,
            Module::BulletinsComposer,
            Module::TemplateManagement,
            Module::DashboardBulletins,
            Module::Review,
            Module::CardManagement,
            Module::ExternalIntegrations,
        ]
    }

    /// Check if this module governs groups and memberships rather than content.
    pub fn is_administrative(&self) -> bool {
        matches!(self, Module::GroupManagement | Module::AccessControl)
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_roundtrip() {
        for module in Module::all() {
            assert_eq!(Module::parse(module.as_str()), Some(module));
        }
    }

    #[test]
    fn test_module_aliases() {
        assert_eq!(Module::parse("cards"), Some(Module::CardManagement));
        assert_eq!(Module::parse("CARD-MANAGEMENT"), Some(Module::CardManagement));
        assert_eq!(Module::parse("unknown"), None);
    }

    #[test]
    fn test_serde_matches_as_str() {
        for module in Module::all() {
            assert_eq!(serde_json::to_value(module).unwrap(), serde_json::json!(module.as_str()));
        }
    }

    #[test]
    fn test_administrative_modules() {
        assert!(Module::AccessControl.is_administrative());
        assert!(Module::GroupManagement.is_administrative());
        assert!(!Module::TemplateManagement.is_administrative());
    }
}
