//! Actor directory
//!
//! Registration of actors coming from the identity provider, profile
//! visibility, and activation. Actors are never deleted.

use tracing::instrument;
use uuid::Uuid;

use bulletin_org::{Actor, ActorProfile};
use bulletin_rbac::{Action, Module};
use bulletin_store::{Collection, DocumentStore, Filter, Patch};

use crate::error::{CoreError, CoreResult, Denial, DenialReason};
use crate::resolver::AccessResolver;

/// Actor registration and lookup.
pub struct ActorDirectory<S> {
    access: AccessResolver<S>,
}

impl<S> Clone for ActorDirectory<S> {
    fn clone(&self) -> Self {
        Self {
            access: self.access.clone(),
        }
    }
}

impl<S: DocumentStore> ActorDirectory<S> {
    /// Create the actor directory.
    pub fn new(access: AccessResolver<S>) -> Self {
        Self { access }
    }

    /// Return the actor registered under `ext_id`, creating it on first
    /// sight.
    ///
    /// Called after the identity provider has authenticated the subject.
    /// An existing actor is returned as is, active or not.
    ///
    /// Two first logins of the same subject may both insert. After inserting,
    /// the directory re-reads the subject and keeps the earliest actor; a
    /// later duplicate is deleted and the earliest returned. A backend with a
    /// unique index on `ext_id` rejects the second insert instead, which is
    /// answered with the stored actor. Without such an index, a duplicate
    /// whose id sorts first but is inserted after the other writer already
    /// returned can survive.
    #[instrument(skip(self, profile))]
    pub async fn register(&self, ext_id: &str, profile: ActorProfile) -> CoreResult<Actor> {
        let ext_id = ext_id.trim();
        if ext_id.is_empty() {
            return Err(CoreError::InvalidArgument("external id must not be empty".to_string()));
        }
        if let Some(actor) = self.by_ext_id(ext_id).await? {
            return Ok(actor);
        }

        let actor = Actor::new(ext_id, profile);
        match self.access.store().insert(&actor).await {
            Ok(()) => {}
            Err(err) if err.is_conflict() => {
                tracing::warn!(error = %err, "Concurrent registration, using stored actor");
                return self
                    .by_ext_id(ext_id)
                    .await?
                    .ok_or_else(|| CoreError::Conflict(format!("actor '{ext_id}' registered concurrently")));
            }
            Err(err) => return Err(err.into()),
        }

        let Some(earliest) = self.by_ext_id(ext_id).await? else {
            return Ok(actor);
        };
        if earliest.id != actor.id {
            tracing::warn!(actor_id = %actor.id, kept = %earliest.id, "Duplicate registration removed");
            self.access.store().delete::<Actor>(actor.id).await?;
            return Ok(earliest);
        }
        tracing::info!(actor_id = %actor.id, "Actor registered");
        Ok(actor)
    }

    /// Look up an actor by identity provider subject.
    ///
    /// If the subject was registered more than once, the earliest actor is
    /// returned.
    pub async fn by_ext_id(&self, ext_id: &str) -> CoreResult<Option<Actor>> {
        let found: Vec<Actor> = self.access.store().find(&Filter::eq("ext_id", ext_id)).await?;
        Ok(found.into_iter().min_by_key(|actor| actor.id))
    }

    /// Fetch `target_id` on behalf of `caller_id`.
    ///
    /// Allowed for the actor themself, a global admin, or an actor who is
    /// group admin somewhere. Group admins cannot see global admins; that
    /// case is answered as `NotFound`.
    #[instrument(skip(self), fields(%caller_id, %target_id))]
    pub async fn get_for(&self, caller_id: Uuid, target_id: Uuid) -> CoreResult<Actor> {
        self.access
            .active_actor(caller_id, Module::AccessControl, Action::Read)
            .await?;
        let target = self.access.actor(target_id).await?;

        if caller_id == target_id || self.access.is_global_admin(caller_id).await? {
            return Ok(target);
        }
        if self.access.members().is_group_admin_anywhere(caller_id).await? {
            if self.access.is_global_admin(target_id).await? {
                return Err(CoreError::not_found(Collection::Users.as_str(), target_id));
            }
            return Ok(target);
        }

        let denial = Denial::new(caller_id, Module::AccessControl, Action::Read, DenialReason::MissingPermission);
        tracing::warn!(%denial, "Actor lookup denied");
        Err(denial.into())
    }

    /// Actors whose first or last name contains `fragment`. Global admin only.
    pub async fn search_by_name(&self, caller_id: Uuid, fragment: &str) -> CoreResult<Vec<Actor>> {
        self.access
            .require_global_admin(caller_id, Module::AccessControl, Action::Read)
            .await?;
        Ok(self
            .access
            .store()
            .find(&Filter::search(&[fragment], &["first_name", "last_name"]))
            .await?)
    }

    /// Actors with the given activation state. Global admin only.
    pub async fn list_by_status(&self, caller_id: Uuid, is_active: bool) -> CoreResult<Vec<Actor>> {
        self.access
            .require_global_admin(caller_id, Module::AccessControl, Action::Read)
            .await?;
        Ok(self
            .access
            .store()
            .find(&Filter::eq("is_active", is_active))
            .await?)
    }

    /// Activate or deactivate an actor. Global admin only.
    ///
    /// Deactivated actors are denied by every check from then on.
    #[instrument(skip(self), fields(%caller_id, %target_id))]
    pub async fn set_active(&self, caller_id: Uuid, target_id: Uuid, is_active: bool) -> CoreResult<Actor> {
        self.access
            .require_global_admin(caller_id, Module::AccessControl, Action::Update)
            .await?;
        let target = self.access.actor(target_id).await?;
        if target.is_active == is_active {
            return Ok(target);
        }

        let patch = Patch::new()
            .when("is_active", target.is_active)
            .set("is_active", is_active)
            .set_serialized("log", &target.log.touched_by(caller_id))?;
        let updated: Actor = self.access.store().update(target_id, &patch).await?;
        tracing::info!(is_active, "Actor activation changed");
        Ok(updated)
    }
}
