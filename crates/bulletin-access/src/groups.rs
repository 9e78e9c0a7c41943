//! Group administration
//!
//! Creating and editing groups, and the membership primitives: add a
//! member, remove a member, change a member's role. Each mutation loads the
//! group, derives the new value, and persists the diff guarded by the old
//! values, so two concurrent edits of the same group cannot silently
//! overwrite each other.

use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use bulletin_org::{normalize_country, Group, GroupRole, UserAccess};
use bulletin_rbac::{Action, Module, Role};
use bulletin_store::{Collection, DocumentStore, Patch};

use crate::error::{CoreError, CoreResult};
use crate::resolver::AccessResolver;

/// Input for [`GroupAdministration::create_group`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewGroup {
    /// Group name
    pub group_name: String,
    /// Optional description
    pub description: Option<String>,
    /// ISO country code
    pub country: Option<String>,
}

/// Field changes for [`GroupAdministration::update_group`].
///
/// `None` leaves a field untouched; an empty country clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupUpdate {
    /// New name
    pub group_name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New ISO country code
    pub country: Option<String>,
}

/// Group and membership administration.
pub struct GroupAdministration<S> {
    access: AccessResolver<S>,
}

impl<S> Clone for GroupAdministration<S> {
    fn clone(&self) -> Self {
        Self {
            access: self.access.clone(),
        }
    }
}

impl<S: DocumentStore> GroupAdministration<S> {
    /// Create the group administration service.
    pub fn new(access: AccessResolver<S>) -> Self {
        Self { access }
    }

    /// Create a group. Only a global admin may do this.
    #[instrument(skip(self, input), fields(%actor_id, group_name = %input.group_name))]
    pub async fn create_group(&self, actor_id: Uuid, input: NewGroup) -> CoreResult<Group> {
        self.access
            .require_global_admin(actor_id, Module::GroupManagement, Action::Create)
            .await?;

        let name = input.group_name.trim();
        if name.is_empty() {
            return Err(CoreError::InvalidArgument("group name must not be empty".to_string()));
        }

        let mut group = Group::new(name, actor_id);
        group.description = input.description;
        group.country = input.country.as_deref().and_then(normalize_country);

        self.access.store().insert(&group).await?;
        tracing::info!(group_id = %group.id, "Group created");
        Ok(group)
    }

    /// Edit a group's name, description or country.
    ///
    /// Allowed for a global admin, `access_control:update` in the group, or
    /// the group's admin.
    #[instrument(skip(self, update), fields(%actor_id, %group_id))]
    pub async fn update_group(&self, actor_id: Uuid, group_id: Uuid, update: GroupUpdate) -> CoreResult<Group> {
        self.access.require_group_admin(actor_id, Action::Update, group_id).await?;
        let current = self.group(group_id).await?;

        let mut next = current.clone();
        if let Some(name) = update.group_name {
            let name = name.trim();
            if name.is_empty() {
                return Err(CoreError::InvalidArgument("group name must not be empty".to_string()));
            }
            next.group_name = name.to_string();
        }
        if let Some(description) = update.description {
            next.description = Some(description);
        }
        if let Some(country) = update.country {
            next.country = normalize_country(&country);
        }

        let updated = self.persist(&current, next.touched_by(actor_id)).await?;
        tracing::info!("Group updated");
        Ok(updated)
    }

    /// Delete a group. Only a global admin may do this.
    ///
    /// Resources restricted to the group keep its id in their allowed
    /// groups; nobody is a member there any more, so only global admins
    /// still pass for it.
    #[instrument(skip(self), fields(%actor_id, %group_id))]
    pub async fn delete_group(&self, actor_id: Uuid, group_id: Uuid) -> CoreResult<()> {
        self.access
            .require_global_admin(actor_id, Module::GroupManagement, Action::Delete)
            .await?;
        self.access.store().delete::<Group>(group_id).await?;
        tracing::info!("Group deleted");
        Ok(())
    }

    /// Add `member_id` to the group with `role_id`.
    ///
    /// # Errors
    ///
    /// - `Forbidden` unless global admin, `access_control:create` in the
    ///   group, or group admin; assigning a global admin role additionally
    ///   requires a global admin
    /// - `NotFound` for a missing group, role or member actor
    /// - `Conflict` if the actor is already a member
    #[instrument(skip(self), fields(%actor_id, %group_id, %member_id, %role_id))]
    pub async fn add_member(&self, actor_id: Uuid, group_id: Uuid, member_id: Uuid, role_id: Uuid) -> CoreResult<Group> {
        self.access.require_group_admin(actor_id, Action::Create, group_id).await?;
        let current = self.group(group_id).await?;
        let role = self.role(role_id).await?;
        self.access
            .guard_role_assignment(actor_id, &role, Action::Create, group_id)
            .await?;
        self.access.actor(member_id).await?;

        let next = current.with_member(member_id, role_id)?.touched_by(actor_id);
        let updated = self.persist(&current, next).await?;
        tracing::info!(role = %role.name, "Member added");
        Ok(updated)
    }

    /// Remove `member_id` from the group.
    ///
    /// # Errors
    ///
    /// - `Forbidden` unless global admin, `access_control:delete` in the
    ///   group, or group admin
    /// - `NotFound` for a missing group or if the actor is not a member
    #[instrument(skip(self), fields(%actor_id, %group_id, %member_id))]
    pub async fn remove_member(&self, actor_id: Uuid, group_id: Uuid, member_id: Uuid) -> CoreResult<Group> {
        self.access.require_group_admin(actor_id, Action::Delete, group_id).await?;
        let current = self.group(group_id).await?;

        let next = current.without_member(member_id)?.touched_by(actor_id);
        let updated = self.persist(&current, next).await?;
        tracing::info!("Member removed");
        Ok(updated)
    }

    /// Change the role `member_id` holds in the group.
    ///
    /// # Errors
    ///
    /// - `Forbidden` unless global admin, `access_control:update` in the
    ///   group, or group admin; assigning a global admin role additionally
    ///   requires a global admin
    /// - `NotFound` for a missing group or role, or if the actor is not a
    ///   member
    #[instrument(skip(self), fields(%actor_id, %group_id, %member_id, %role_id))]
    pub async fn update_member_role(
        &self,
        actor_id: Uuid,
        group_id: Uuid,
        member_id: Uuid,
        role_id: Uuid,
    ) -> CoreResult<Group> {
        self.access.require_group_admin(actor_id, Action::Update, group_id).await?;
        let current = self.group(group_id).await?;
        let role = self.role(role_id).await?;
        self.access
            .guard_role_assignment(actor_id, &role, Action::Update, group_id)
            .await?;

        let next = current.with_member_role(member_id, role_id)?.touched_by(actor_id);
        let updated = self.persist(&current, next).await?;
        tracing::info!(role = %role.name, "Member role changed");
        Ok(updated)
    }

    /// Members of a group, in insertion order.
    pub async fn list_members(&self, group_id: Uuid) -> CoreResult<Vec<UserAccess>> {
        Ok(self.group(group_id).await?.users_access)
    }

    /// Every (group, role) pair of an actor.
    pub async fn memberships_of(&self, actor_id: Uuid) -> CoreResult<Vec<GroupRole>> {
        Ok(self.access.members().memberships(actor_id).await?)
    }

    /// Check whether an actor holds exactly `role_id` in a group.
    pub async fn has_role_in_group(&self, group_id: Uuid, actor_id: Uuid, role_id: Uuid) -> CoreResult<bool> {
        self.group(group_id).await?;
        Ok(self
            .access
            .members()
            .has_role_in_group(group_id, actor_id, role_id)
            .await?)
    }

    /// Fetch a group that must exist.
    pub async fn group(&self, group_id: Uuid) -> CoreResult<Group> {
        Ok(self.access.members().group(group_id).await?)
    }

    /// Groups whose name contains `fragment`, case-insensitively.
    pub async fn groups_by_name(&self, fragment: &str) -> CoreResult<Vec<Group>> {
        Ok(self.access.members().groups_by_name(fragment).await?)
    }

    /// Groups registered under a country code, case-insensitively.
    pub async fn groups_by_country(&self, country: &str) -> CoreResult<Vec<Group>> {
        Ok(self.access.members().groups_by_country(country).await?)
    }

    async fn role(&self, role_id: Uuid) -> CoreResult<Role> {
        self.access
            .members()
            .role(role_id)
            .await?
            .ok_or_else(|| CoreError::not_found(Collection::Roles.as_str(), role_id))
    }

    async fn persist(&self, current: &Group, next: Group) -> CoreResult<Group> {
        let old = serde_json::to_value(current)?;
        let new = serde_json::to_value(&next)?;
        let patch = Patch::between(&old, &new)?;
        Ok(self.access.store().update::<Group>(current.id, &patch).await?)
    }
}
