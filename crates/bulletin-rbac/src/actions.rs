//! # Actions
//!
//! Defines the actions a role may be granted on a module.
//! Roles store actions in their compact single-letter form (`c`, `r`, `u`, `d`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Actions that can be performed within a module.
///
/// - **Create**: Create new resources (also required to clone)
/// - **Read**: View resources
/// - **Update**: Modify existing resources
/// - **Delete**: Remove resources or memberships
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    /// Create new resource.
    #[serde(rename = "c", alias = "create")]
    Create,

    /// Read/view resource.
    #[serde(rename = "r", alias = "read")]
    Read,

    /// Update existing resource.
    #[serde(rename = "u", alias = "update")]
    Update,

    /// Delete resource.
    #[serde(rename = "d", alias = "delete")]
    Delete,
}

impl Action {
    /// Get the string representation of the action.
    ///
    /// # Returns
    ///
    /// A static string representation of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    /// Get the single-letter code used in stored role permissions.
    pub fn code(&self) -> char {
        match self {
            Action::Create => 'c',
            Action::Read => 'r',
            Action::Update => 'u',
            Action::Delete => 'd',
        }
    }

    /// Parse action from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive, supports codes and aliases)
    ///
    /// # Returns
    ///
    /// `Some(Action)` if valid, `None` otherwise
    ///
    /// # Example
    ///
    /// ```
    /// use bulletin_rbac::actions::Action;
    ///
    /// assert_eq!(Action::parse("c"), Some(Action::Create));
    /// assert_eq!(Action::parse("view"), Some(Action::Read)); // Alias
    /// assert_eq!(Action::parse("edit"), Some(Action::Update)); // Alias
    /// assert_eq!(Action::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "c" | "create" | "add" | "new" => Some(Action::Create),
            "r" | "read" | "view" | "get" => Some(Action::Read),
            "u" | "update" | "edit" | "write" | "modify" => Some(Action::Update),
            "d" | "delete" | "remove" => Some(Action::Delete),
            _ => None,
        }
    }

    /// Parse a compact action string such as `"crud"` or `"cr"`.
    ///
    /// Returns `None` if any character is not an action code.
    pub fn parse_codes(codes: &str) -> Option<Vec<Self>> {
        codes
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| Action::parse(&c.to_string()))
            .collect()
    }

    /// Get all actions.
    pub fn all() -> Vec<Self> {
        vec![Action::Create, Action::Read, Action::Update, Action::Delete]
    }

    /// Check if this action modifies data.
    pub fn is_write(&self) -> bool {
        !matches!(self, Action::Read)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
