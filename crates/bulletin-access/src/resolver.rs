//! Access resolution
//!
//! The single decision point for write authorization. Every check runs in
//! the same order:
//!
//! 1. The actor must exist and be active.
//! 2. A global admin is allowed unconditionally.
//! 3. Otherwise the actor's role must grant the (module, action) pair in
//!    **every** required group; the first failing group is reported.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use bulletin_org::{Actor, MembershipStore};
use bulletin_rbac::{has_permission, Action, Module, PolicyConfig, Role};
use bulletin_store::{Collection, DocumentStore};

use crate::error::{CoreError, CoreResult, Denial, DenialReason};

/// Outcome of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Access granted
    Allow,
    /// Access denied, with diagnostics
    Deny(Denial),
}

impl Decision {
    /// Check if access was granted.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Convert into a result, mapping a denial to [`CoreError::Forbidden`].
    pub fn into_result(self) -> CoreResult<()> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(denial) => Err(CoreError::Forbidden(denial)),
        }
    }
}

/// Authorization decisions over group memberships and roles.
pub struct AccessResolver<S> {
    members: MembershipStore<S>,
}

impl<S> Clone for AccessResolver<S> {
    fn clone(&self) -> Self {
        Self {
            members: self.members.clone(),
        }
    }
}

impl<S: DocumentStore> AccessResolver<S> {
    /// Create a resolver over membership lookups.
    pub fn new(members: MembershipStore<S>) -> Self {
        Self { members }
    }

    /// Create a resolver directly from a store and policy.
    pub fn from_store(store: Arc<S>, policy: Arc<PolicyConfig>) -> Self {
        Self::new(MembershipStore::new(store, policy))
    }

    /// Membership lookups backing this resolver.
    pub fn members(&self) -> &MembershipStore<S> {
        &self.members
    }

    /// The underlying document store.
    pub fn store(&self) -> &Arc<S> {
        self.members.store()
    }

    /// The role policy in force.
    pub fn policy(&self) -> &PolicyConfig {
        self.members.policy()
    }

    /// Fetch an actor that must exist.
    pub async fn actor(&self, actor_id: Uuid) -> CoreResult<Actor> {
        self.store()
            .get::<Actor>(actor_id)
            .await?
            .ok_or_else(|| CoreError::not_found(Collection::Users.as_str(), actor_id))
    }

    /// Fetch an actor and require it to be active.
    ///
    /// `module` and `action` describe the operation being attempted and end
    /// up in the denial.
    pub async fn active_actor(&self, actor_id: Uuid, module: Module, action: Action) -> CoreResult<Actor> {
        let actor = self.actor(actor_id).await?;
        if !actor.is_active {
            tracing::warn!(%actor_id, %module, %action, "Inactive actor denied");
            return Err(Denial::new(actor_id, module, action, DenialReason::InactiveActor).into());
        }
        Ok(actor)
    }

    /// Check if the actor holds a global admin role in any group.
    pub async fn is_global_admin(&self, actor_id: Uuid) -> CoreResult<bool> {
        Ok(self.members.is_global_admin(actor_id).await?)
    }

    /// Decide whether an actor may perform `action` on `module` in every
    /// group of `group_ids`.
    ///
    /// An empty group list grants any active actor access; callers gating
    /// public resources must decide whether that is acceptable.
    ///
    /// # Errors
    ///
    /// `NotFound` if the actor does not exist; store failures.
    #[instrument(skip(self, group_ids), fields(%actor_id, %module, %action, groups = group_ids.len()))]
    pub async fn decide(
        &self,
        actor_id: Uuid,
        module: Module,
        action: Action,
        group_ids: &[Uuid],
    ) -> CoreResult<Decision> {
        let actor = self.actor(actor_id).await?;
        let denial = |reason| Denial::new(actor_id, module, action, reason);

        if !actor.is_active {
            return Ok(Decision::Deny(denial(DenialReason::InactiveActor)));
        }
        if self.is_global_admin(actor_id).await? {
            tracing::debug!("Global admin bypass");
            return Ok(Decision::Allow);
        }

        let roles_by_group = self.members.roles_by_group(actor_id).await?;
        let mut roles: HashMap<Uuid, Option<Role>> = HashMap::new();

        for &group_id in group_ids {
            let Some(&role_id) = roles_by_group.get(&group_id) else {
                return Ok(Decision::Deny(denial(DenialReason::NoRoleInGroup).in_group(group_id)));
            };
            if !roles.contains_key(&role_id) {
                let role = self.members.role(role_id).await?;
                roles.insert(role_id, role);
            }
            match roles.get(&role_id).and_then(Option::as_ref) {
                None => {
                    tracing::warn!(%group_id, %role_id, "Membership references a missing role");
                    return Ok(Decision::Deny(denial(DenialReason::NoRoleInGroup).in_group(group_id)));
                }
                Some(role) if !has_permission(role, module, action, self.policy()) => {
                    return Ok(Decision::Deny(denial(DenialReason::MissingPermission).in_group(group_id)));
                }
                Some(_) => {}
            }
        }

        Ok(Decision::Allow)
    }

    /// Boolean form of [`AccessResolver::decide`].
    pub async fn authorize(
        &self,
        actor_id: Uuid,
        module: Module,
        action: Action,
        group_ids: &[Uuid],
    ) -> CoreResult<bool> {
        Ok(self.decide(actor_id, module, action, group_ids).await?.is_allowed())
    }

    /// Like [`AccessResolver::decide`], but a denial is returned as
    /// [`CoreError::Forbidden`].
    pub async fn require(&self, actor_id: Uuid, module: Module, action: Action, group_ids: &[Uuid]) -> CoreResult<()> {
        let decision = self.decide(actor_id, module, action, group_ids).await?;
        if let Decision::Deny(denial) = &decision {
            tracing::warn!(%denial, "Access denied");
        }
        decision.into_result()
    }

    /// Decide a group administration operation.
    ///
    /// Allowed for a global admin, an actor whose role grants
    /// `access_control:<action>` in the group, or the group's admin.
    /// Inactive actors are denied even if they are group admins.
    pub async fn decide_group_admin(&self, actor_id: Uuid, action: Action, group_id: Uuid) -> CoreResult<Decision> {
        let decision = self.decide(actor_id, Module::AccessControl, action, &[group_id]).await?;
        let Decision::Deny(denial) = &decision else {
            return Ok(decision);
        };
        if denial.reason == DenialReason::InactiveActor {
            return Ok(decision);
        }

        if self.members.is_group_admin(actor_id, group_id).await? {
            tracing::debug!(%actor_id, %group_id, "Group admin allowed");
            return Ok(Decision::Allow);
        }
        Ok(decision)
    }

    /// Like [`AccessResolver::decide_group_admin`], but a denial is returned as
    /// [`CoreError::Forbidden`].
    pub async fn require_group_admin(&self, actor_id: Uuid, action: Action, group_id: Uuid) -> CoreResult<()> {
        let decision = self.decide_group_admin(actor_id, action, group_id).await?;
        if let Decision::Deny(denial) = &decision {
            tracing::warn!(%denial, "Group administration denied");
        }
        decision.into_result()
    }

    /// Require the actor to be an active global admin.
    pub async fn require_global_admin(&self, actor_id: Uuid, module: Module, action: Action) -> CoreResult<()> {
        self.active_actor(actor_id, module, action).await?;
        if self.is_global_admin(actor_id).await? {
            return Ok(());
        }
        let denial = Denial::new(actor_id, module, action, DenialReason::GlobalAdminRequired);
        tracing::warn!(%denial, "Global admin required");
        Err(denial.into())
    }

    /// Guard the assignment of `role` to a member of `group_id`.
    ///
    /// Only a global admin may hand out a global admin role.
    pub async fn guard_role_assignment(
        &self,
        actor_id: Uuid,
        role: &Role,
        action: Action,
        group_id: Uuid,
    ) -> CoreResult<()> {
        if !role.is_global_admin(self.policy()) || self.is_global_admin(actor_id).await? {
            return Ok(());
        }
        let denial = Denial::new(actor_id, Module::AccessControl, action, DenialReason::GlobalAdminRequired)
            .in_group(group_id);
        tracing::warn!(%denial, role = %role.name, "Global admin role assignment denied");
        Err(denial.into())
    }
}
