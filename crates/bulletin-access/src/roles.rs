//! Role catalog
//!
//! Listing and administering roles. Global admin roles are hidden from
//! callers who are not global admins themselves, so they cannot be
//! discovered (or handed out) by anyone else.

use tracing::instrument;
use uuid::Uuid;

use bulletin_rbac::{Action, Module, PermissionMatrix, Role};
use bulletin_store::{AuditLog, Collection, DocumentStore, Filter, Patch};

use crate::error::{CoreError, CoreResult};
use crate::resolver::AccessResolver;

/// Role listing and administration.
pub struct RoleCatalog<S> {
    access: AccessResolver<S>,
}

impl<S> Clone for RoleCatalog<S> {
    fn clone(&self) -> Self {
        Self {
            access: self.access.clone(),
        }
    }
}

impl<S: DocumentStore> RoleCatalog<S> {
    /// Create the role catalog.
    pub fn new(access: AccessResolver<S>) -> Self {
        Self { access }
    }

    /// Every role the caller may see.
    pub async fn list_roles(&self, caller_id: Uuid) -> CoreResult<Vec<Role>> {
        self.visible(caller_id, &Filter::All).await
    }

    /// Roles whose name contains `fragment`, case-insensitively.
    pub async fn find_by_name(&self, caller_id: Uuid, fragment: &str) -> CoreResult<Vec<Role>> {
        self.visible(caller_id, &Filter::contains_text("role_name", fragment))
            .await
    }

    /// A single role the caller may see.
    pub async fn get_role(&self, caller_id: Uuid, role_id: Uuid) -> CoreResult<Role> {
        self.visible(caller_id, &Filter::id(role_id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::not_found(Collection::Roles.as_str(), role_id))
    }

    /// Create a role. Only a global admin may do this.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a blank name, `Conflict` if the name is taken.
    #[instrument(skip(self, permissions), fields(%caller_id))]
    pub async fn create_role(&self, caller_id: Uuid, name: &str, permissions: PermissionMatrix) -> CoreResult<Role> {
        self.access
            .require_global_admin(caller_id, Module::AccessControl, Action::Create)
            .await?;

        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::InvalidArgument("role name must not be empty".to_string()));
        }
        let taken: Vec<Role> = self.access.store().find(&Filter::eq("role_name", name)).await?;
        if !taken.is_empty() {
            return Err(CoreError::Conflict(format!("role '{name}' already exists")));
        }

        let role = Role::new(name).with_permissions(permissions).with_creator(caller_id);
        self.access.store().insert(&role).await?;
        tracing::info!(role_id = %role.id, role = %role.name, "Role created");
        Ok(role)
    }

    /// Replace a role's permission matrix. Only a global admin may do this.
    #[instrument(skip(self, permissions), fields(%caller_id, %role_id))]
    pub async fn set_permissions(
        &self,
        caller_id: Uuid,
        role_id: Uuid,
        permissions: PermissionMatrix,
    ) -> CoreResult<Role> {
        self.access
            .require_global_admin(caller_id, Module::AccessControl, Action::Update)
            .await?;

        let current: Role = self.access.store().require(role_id).await?;
        let log = match &current.log {
            Some(log) => log.touched_by(caller_id),
            None => AuditLog::new(caller_id),
        };

        let patch = Patch::new()
            .when("permissions", serde_json::to_value(&current.permissions)?)
            .set_serialized("permissions", &permissions)?
            .set_serialized("log", &log)?;
        let updated: Role = self.access.store().update(role_id, &patch).await?;
        tracing::info!(grants = updated.permissions.len(), "Role permissions replaced");
        Ok(updated)
    }

    async fn visible(&self, caller_id: Uuid, filter: &Filter) -> CoreResult<Vec<Role>> {
        self.access
            .active_actor(caller_id, Module::AccessControl, Action::Read)
            .await?;
        let roles: Vec<Role> = self.access.store().find(filter).await?;
        if self.access.is_global_admin(caller_id).await? {
            return Ok(roles);
        }
        let policy = self.access.policy();
        Ok(roles.into_iter().filter(|r| !r.is_global_admin(policy)).collect())
    }
}
