//! # Permissions
//!
//! A permission combines a module with an action. Roles hold their
//! permissions as a [`PermissionMatrix`]: a map from module to the set of
//! granted actions, stored the same way the role documents are persisted
//! (`{"template_management": ["c", "r"]}`).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::actions::Action;
use crate::modules::Module;

/// A single module + action pair.
///
/// # Example
///
/// ```
/// use bulletin_rbac::{Action, Module, Permission};
///
/// let perm = Permission::new(Module::CardManagement, Action::Update);
/// assert_eq!(perm.to_string(), "card_management:update");
/// assert_eq!(Permission::from_string("card_management:u"), Some(perm));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Permission {
    /// The module this permission applies to.
    pub module: Module,
    /// The action allowed in the module.
    pub action: Action,
}

impl Permission {
    /// Create a new permission.
    pub fn new(module: Module, action: Action) -> Self {
        Self { module, action }
    }

    /// Parse from string (e.g., "template_management:create" or "review:r").
    ///
    /// # Returns
    ///
    /// `Some(Permission)` if both parts are valid, `None` otherwise
    pub fn from_string(s: &str) -> Option<Self> {
        let (module, action) = s.split_once(':')?;
        Some(Self {
            module: Module::parse(module)?,
            action: Action::parse(action)?,
        })
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module.as_str(), self.action.as_str())
    }
}

/// Module-to-actions grant table of a role.
///
/// Lookups are exact: there is no action implication and no wildcard, and a
/// module absent from the matrix grants nothing.
///
/// # Example
///
/// ```
/// use bulletin_rbac::{Action, Module, PermissionMatrix};
///
/// let mut matrix = PermissionMatrix::new();
/// matrix.grant(Module::TemplateManagement, [Action::Create, Action::Read]);
///
/// assert!(matrix.allows(Module::TemplateManagement, Action::Create));
/// assert!(!matrix.allows(Module::TemplateManagement, Action::Update));
/// assert!(!matrix.allows(Module::Review, Action::Read));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct PermissionMatrix {
    grants: BTreeMap<Module, BTreeSet<Action>>,
}

impl PermissionMatrix {
    /// Create an empty matrix (denies everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// A matrix granting every action on every module.
    pub fn full() -> Self {
        let mut matrix = Self::new();
        for module in Module::all() {
            matrix.grant(module, Action::all());
        }
        matrix
    }

    /// Grant actions on a module.
    ///
    /// # Arguments
    ///
    /// * `module` - The module to grant on
    /// * `actions` - Actions to add to the module's grant set
    pub fn grant(&mut self, module: Module, actions: impl IntoIterator<Item = Action>) {
        self.grants.entry(module).or_default().extend(actions);
    }

    /// Builder form of [`PermissionMatrix::grant`].
    pub fn with(mut self, module: Module, actions: impl IntoIterator<Item = Action>) -> Self {
        self.grant(module, actions);
        self
    }

    /// Revoke one action on a module.
    ///
    /// # Returns
    ///
    /// `true` if the action was granted before, `false` otherwise
    pub fn revoke(&mut self, module: Module, action: Action) -> bool {
        let Some(actions) = self.grants.get_mut(&module) else {
            return false;
        };
        let removed = actions.remove(&action);
        if actions.is_empty() {
            self.grants.remove(&module);
        }
        removed
    }

    /// Check whether `action` is granted on `module`.
    pub fn allows(&self, module: Module, action: Action) -> bool {
        self.grants
            .get(&module)
            .is_some_and(|actions| actions.contains(&action))
    }

    /// Check whether a permission is granted.
    pub fn has(&self, permission: &Permission) -> bool {
        self.allows(permission.module, permission.action)
    }

    /// Actions granted on a module.
    pub fn actions(&self, module: Module) -> impl Iterator<Item = Action> + '_ {
        self.grants.get(&module).into_iter().flatten().copied()
    }

    /// Every granted permission, ordered by module then action.
    pub fn permissions(&self) -> Vec<Permission> {
        self.grants
            .iter()
            .flat_map(|(module, actions)| actions.iter().map(|action| Permission::new(*module, *action)))
            .collect()
    }

    /// Merge another matrix into this one.
    pub fn merge(&mut self, other: &PermissionMatrix) {
        for (module, actions) in &other.grants {
            self.grant(*module, actions.iter().copied());
        }
    }

    /// Create from a list of permission strings.
    ///
    /// Unparseable entries are skipped.
    ///
    /// # Example
    ///
    /// ```
    /// use bulletin_rbac::PermissionMatrix;
    ///
    /// let matrix = PermissionMatrix::from_strings(&["review:read", "review:u", "bogus"]);
    /// assert_eq!(matrix.len(), 2);
    /// ```
    pub fn from_strings(perms: &[&str]) -> Self {
        perms
            .iter()
            .filter_map(|s| Permission::from_string(s))
            .collect()
    }

    /// Number of granted (module, action) pairs.
    pub fn len(&self) -> usize {
        self.grants.values().map(BTreeSet::len).sum()
    }

    /// Check if the matrix grants nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<Permission> for PermissionMatrix {
    fn from_iter<T: IntoIterator<Item = Permission>>(iter: T) -> Self {
        let mut matrix = PermissionMatrix::new();
        for perm in iter {
            matrix.grant(perm.module, [perm.action]);
        }
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_permission_parsing() {
        let perm = Permission::from_string("access_control:c").unwrap();
        assert_eq!(perm, Permission::new(Module::AccessControl, Action::Create));

        assert!(Permission::from_string("access_control").is_none());
        assert!(Permission::from_string("nope:read").is_none());
        assert!(Permission::from_string("review:explode").is_none());
    }

    #[test]
    fn test_matrix_exact_lookup() {
        let matrix = PermissionMatrix::new().with(Module::BulletinsComposer, [Action::Update]);

        assert!(matrix.allows(Module::BulletinsComposer, Action::Update));
        // No implication: update does not grant read.
        assert!(!matrix.allows(Module::BulletinsComposer, Action::Read));
        assert!(!matrix.allows(Module::Review, Action::Update));
    }

    #[test]
    fn test_revoke_drops_empty_modules() {
        let mut matrix = PermissionMatrix::new().with(Module::Review, [Action::Read]);
        assert!(matrix.revoke(Module::Review, Action::Read));
        assert!(!matrix.revoke(Module::Review, Action::Read));
        assert!(matrix.is_empty());
        assert_eq!(serde_json::to_value(&matrix).unwrap(), json!({}));
    }

    #[test]
    fn test_full_matrix() {
        let matrix = PermissionMatrix::full();
        assert_eq!(matrix.len(), Module::all().len() * Action::all().len());
        for module in Module::all() {
            for action in Action::all() {
                assert!(matrix.allows(module, action));
            }
        }
    }

    #[test]
    fn test_merge() {
        let mut a = PermissionMatrix::from_strings(&["review:read"]);
        let b = PermissionMatrix::from_strings(&["review:update", "card_management:create"]);
        a.merge(&b);
        assert_eq!(a.len(), 3);
        assert_eq!(
            a.actions(Module::Review).collect::<Vec<_>>(),
            vec![Action::Read, Action::Update]
        );
    }

    #[test]
    fn test_stored_shape() {
        let stored = json!({
            "template_management": ["c", "r", "u"],
            "review": ["read"]
        });
        let matrix: PermissionMatrix = serde_json::from_value(stored).unwrap();
        assert!(matrix.allows(Module::TemplateManagement, Action::Update));
        assert!(matrix.allows(Module::Review, Action::Read));
        assert!(!matrix.allows(Module::TemplateManagement, Action::Delete));

        let out = serde_json::to_value(&matrix).unwrap();
        assert_eq!(out["review"], json!(["r"]));
    }

    #[test]
    fn test_unknown_module_in_stored_role_is_rejected() {
        let stored = json!({"billing": ["c"]});
        assert!(serde_json::from_value::<PermissionMatrix>(stored).is_err());
    }
}
