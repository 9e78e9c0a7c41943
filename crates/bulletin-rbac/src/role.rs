//! # Roles
//!
//! A role is a named [`PermissionMatrix`]. Roles are shared across groups:
//! a membership references a role by id, and the same role can be held in
//! many groups.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bulletin_store::{AuditLog, Collection, Document};

use crate::actions::Action;
use crate::config::PolicyConfig;
use crate::modules::Module;
use crate::permissions::PermissionMatrix;

/// A named permission matrix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Role {
    /// Unique role identifier.
    pub id: Uuid,

    /// Role name (e.g., "superadmin", "admin", "editor").
    #[serde(rename = "role_name")]
    pub name: String,

    /// Actions granted per module.
    #[serde(default)]
    pub permissions: PermissionMatrix,

    /// Audit log (absent on seeded roles).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<AuditLog>,
}

impl Role {
    /// Create a new role with no permissions.
    ///
    /// # Arguments
    ///
    /// * `name` - Role name
    ///
    /// # Example
    ///
    /// ```
    /// use bulletin_rbac::{Action, Module, Role};
    ///
    /// let role = Role::new("editor")
    ///     .with_permission(Module::TemplateManagement, [Action::Create, Action::Read]);
    /// assert_eq!(role.name, "editor");
    /// assert!(role.permissions.allows(Module::TemplateManagement, Action::Read));
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            permissions: PermissionMatrix::new(),
            log: None,
        }
    }

    /// Builder method to grant actions on a module.
    pub fn with_permission(mut self, module: Module, actions: impl IntoIterator<Item = Action>) -> Self {
        self.permissions.grant(module, actions);
        self
    }

    /// Builder method to replace the whole matrix.
    pub fn with_permissions(mut self, permissions: PermissionMatrix) -> Self {
        self.permissions = permissions;
        self
    }

    /// Builder method to record the creator.
    pub fn with_creator(mut self, creator: Uuid) -> Self {
        self.log = Some(AuditLog::new(creator));
        self
    }

    /// Check if this role is a global admin role under `policy`.
    pub fn is_global_admin(&self, policy: &PolicyConfig) -> bool {
        policy.is_global_admin_role(&self.name)
    }

    /// Check if this role is the group admin role under `policy`.
    pub fn is_group_admin(&self, policy: &PolicyConfig) -> bool {
        policy.is_group_admin_role(&self.name)
    }
}

impl Document for Role {
    const COLLECTION: Collection = Collection::Roles;

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Check whether a role grants `action` on `module`.
///
/// True iff the role name is a global admin role, or the role's matrix
/// grants the action. Combinations the matrix does not mention are denied.
///
/// # Example
///
/// ```
/// use bulletin_rbac::{has_permission, Action, Module, PolicyConfig, Role};
///
/// let policy = PolicyConfig::default();
/// let root = Role::new("superadmin");
/// let viewer = Role::new("viewer").with_permission(Module::Review, [Action::Read]);
///
/// assert!(has_permission(&root, Module::AccessControl, Action::Delete, &policy));
/// assert!(has_permission(&viewer, Module::Review, Action::Read, &policy));
/// assert!(!has_permission(&viewer, Module::Review, Action::Update, &policy));
/// ```
pub fn has_permission(role: &Role, module: Module, action: Action, policy: &PolicyConfig) -> bool {
    role.is_global_admin(policy) || role.permissions.allows(module, action)
}
