//! Membership lookups
//!
//! Read-only projections over group documents: which groups an actor is
//! in, what role they hold there, and whether they are a global or group
//! admin.
//!
//! Nothing is cached. Every call goes to the store, so a decision always
//! reflects the latest committed membership.

use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use bulletin_rbac::{PolicyConfig, Role};
use bulletin_store::{DocumentStore, Filter};

use crate::error::OrgResult;
use crate::group::{normalize_country, Group, GroupRole, UserAccess};

/// Path of a member's actor id inside a group document.
pub const MEMBER_PATH: &str = "users_access.user_id";

/// Filter matching every group an actor belongs to.
pub fn member_filter(actor_id: Uuid) -> Filter {
    Filter::uuid_eq(MEMBER_PATH, actor_id)
}

/// Group membership queries over a [`DocumentStore`].
pub struct MembershipStore<S> {
    store: Arc<S>,
    policy: Arc<PolicyConfig>,
}

impl<S> Clone for MembershipStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            policy: Arc::clone(&self.policy),
        }
    }
}

impl<S: DocumentStore> MembershipStore<S> {
    /// Create a membership store.
    ///
    /// # Arguments
    ///
    /// * `store` - Document store holding groups and roles
    /// * `policy` - Names of the global admin and group admin roles
    pub fn new(store: Arc<S>, policy: Arc<PolicyConfig>) -> Self {
        Self { store, policy }
    }

    /// The underlying document store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The role policy in force.
    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Every group document listing the actor as a member.
    pub async fn groups_containing(&self, actor_id: Uuid) -> OrgResult<Vec<Group>> {
        Ok(self.store.find::<Group>(&member_filter(actor_id)).await?)
    }

    /// Ids of all groups the actor belongs to.
    #[instrument(skip(self))]
    pub async fn groups_of(&self, actor_id: Uuid) -> OrgResult<HashSet<Uuid>> {
        let groups: HashSet<Uuid> = self
            .groups_containing(actor_id)
            .await?
            .iter()
            .map(|g| g.id)
            .collect();
        tracing::debug!(count = groups.len(), "Resolved actor groups");
        Ok(groups)
    }

    /// Map from group id to the role the actor holds in it.
    pub async fn roles_by_group(&self, actor_id: Uuid) -> OrgResult<HashMap<Uuid, Uuid>> {
        Ok(self
            .groups_containing(actor_id)
            .await?
            .iter()
            .filter_map(|g| g.role_of(actor_id).map(|role| (g.id, role)))
            .collect())
    }

    /// Role id the actor holds in a group.
    ///
    /// `None` if the actor is not a member or the group does not exist.
    pub async fn role_of(&self, actor_id: Uuid, group_id: Uuid) -> OrgResult<Option<Uuid>> {
        let group = self.store.get::<Group>(group_id).await?;
        Ok(group.and_then(|g| g.role_of(actor_id)))
    }

    /// Fetch a role document.
    pub async fn role(&self, role_id: Uuid) -> OrgResult<Option<Role>> {
        Ok(self.store.get::<Role>(role_id).await?)
    }

    /// The role document the actor holds in a group.
    ///
    /// A membership pointing at a deleted role resolves to `None`.
    pub async fn role_in(&self, actor_id: Uuid, group_id: Uuid) -> OrgResult<Option<Role>> {
        match self.role_of(actor_id, group_id).await? {
            Some(role_id) => self.role(role_id).await,
            None => Ok(None),
        }
    }

    /// Check if any of the actor's memberships resolves to a global admin
    /// role.
    #[instrument(skip(self))]
    pub async fn is_global_admin(&self, actor_id: Uuid) -> OrgResult<bool> {
        let role_ids: HashSet<Uuid> = self.roles_by_group(actor_id).await?.into_values().collect();
        if role_ids.is_empty() {
            return Ok(false);
        }

        let admin_names = self
            .policy
            .global_admin_roles
            .iter()
            .map(|name| Value::String(name.clone()))
            .collect();
        let filter = Filter::uuid_in("id", &role_ids).and(Filter::any_in("role_name", admin_names));
        let admin_roles: Vec<Role> = self.store.find(&filter).await?;

        let is_admin = !admin_roles.is_empty();
        tracing::debug!(is_admin, "Resolved global admin status");
        Ok(is_admin)
    }

    /// Check if the actor holds the group admin role in this specific group.
    pub async fn is_group_admin(&self, actor_id: Uuid, group_id: Uuid) -> OrgResult<bool> {
        Ok(self
            .role_in(actor_id, group_id)
            .await?
            .is_some_and(|role| role.is_group_admin(&self.policy)))
    }

    /// Check if the actor holds the group admin role in at least one group.
    pub async fn is_group_admin_anywhere(&self, actor_id: Uuid) -> OrgResult<bool> {
        let role_ids: HashSet<Uuid> = self.roles_by_group(actor_id).await?.into_values().collect();
        if role_ids.is_empty() {
            return Ok(false);
        }
        let filter = Filter::uuid_in("id", &role_ids)
            .and(Filter::eq("role_name", self.policy.group_admin_role.as_str()));
        Ok(!self.store.find::<Role>(&filter).await?.is_empty())
    }

    /// Check if the actor holds exactly `role_id` in the group.
    pub async fn has_role_in_group(&self, group_id: Uuid, actor_id: Uuid, role_id: Uuid) -> OrgResult<bool> {
        Ok(self.role_of(actor_id, group_id).await? == Some(role_id))
    }

    /// Every (group, role) pair of the actor.
    pub async fn memberships(&self, actor_id: Uuid) -> OrgResult<Vec<GroupRole>> {
        Ok(self
            .groups_containing(actor_id)
            .await?
            .iter()
            .filter_map(|g| g.as_seen_by(actor_id))
            .collect())
    }

    /// Members of a group, in insertion order.
    ///
    /// Fails with a store `NotFound` if the group does not exist.
    pub async fn members(&self, group_id: Uuid) -> OrgResult<Vec<UserAccess>> {
        Ok(self.group(group_id).await?.users_access)
    }

    /// Fetch a group that must exist.
    pub async fn group(&self, group_id: Uuid) -> OrgResult<Group> {
        Ok(self.store.require::<Group>(group_id).await?)
    }

    /// Groups whose name contains `fragment`, case-insensitively.
    pub async fn groups_by_name(&self, fragment: &str) -> OrgResult<Vec<Group>> {
        Ok(self
            .store
            .find::<Group>(&Filter::contains_text("group_name", fragment))
            .await?)
    }

    /// Groups registered under a country code (case-insensitive).
    pub async fn groups_by_country(&self, country: &str) -> OrgResult<Vec<Group>> {
        let Some(code) = normalize_country(country) else {
            return Ok(Vec::new());
        };
        Ok(self.store.find::<Group>(&Filter::eq("country", code)).await?)
    }
}
