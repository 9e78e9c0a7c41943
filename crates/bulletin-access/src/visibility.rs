//! Visibility filtering
//!
//! The single gate for every read of an access-controlled resource, list
//! and get-by-id alike. A resource is visible when it is public, or when
//! it is restricted and at least one of its `allowed_groups` contains the
//! actor. Global admins see everything.

use std::collections::HashSet;
use tracing::instrument;
use uuid::Uuid;

use bulletin_rbac::{Action, Module};
use bulletin_store::{AccessType, Document, DocumentStore, Filter, HasAccessConfig};

use crate::error::{CoreError, CoreResult};
use crate::resolver::AccessResolver;

/// Path of the access type inside a resource document.
pub const ACCESS_TYPE_PATH: &str = "access_config.access_type";

/// Path of the allowed groups inside a resource document.
pub const ALLOWED_GROUPS_PATH: &str = "access_config.allowed_groups";

/// An access-controlled document belonging to a permission module.
pub trait Guarded: Document + HasAccessConfig {
    /// Module whose permissions govern writes to this resource.
    const MODULE: Module;
}

/// Computes the subset of a collection an actor may read.
pub struct VisibilityResolver<S> {
    access: AccessResolver<S>,
}

impl<S> Clone for VisibilityResolver<S> {
    fn clone(&self) -> Self {
        Self {
            access: self.access.clone(),
        }
    }
}

impl<S: DocumentStore> VisibilityResolver<S> {
    /// Create a visibility resolver.
    pub fn new(access: AccessResolver<S>) -> Self {
        Self { access }
    }

    /// Access resolver backing this one.
    pub fn access(&self) -> &AccessResolver<S> {
        &self.access
    }

    /// Every resource of kind `R` matching `filter` that the actor may read.
    ///
    /// Public matches come first, then restricted ones, each in storage
    /// order. A resource matched by both queries is returned once.
    ///
    /// # Errors
    ///
    /// `Forbidden` for an inactive actor, `NotFound` for an unknown one.
    #[instrument(skip(self, filter), fields(%actor_id, collection = %R::COLLECTION))]
    pub async fn accessible_resources<R: Guarded>(&self, actor_id: Uuid, filter: &Filter) -> CoreResult<Vec<R>> {
        self.access.active_actor(actor_id, R::MODULE, Action::Read).await?;
        let store = self.access.store();

        if self.access.is_global_admin(actor_id).await? {
            return Ok(store.find::<R>(filter).await?);
        }

        let groups = self.access.members().groups_of(actor_id).await?;
        let public = Filter::eq(ACCESS_TYPE_PATH, AccessType::Public.as_str()).and(filter.clone());
        let mut resources = store.find::<R>(&public).await?;

        if !groups.is_empty() {
            let restricted = restricted_to(&groups).and(filter.clone());
            resources.extend(store.find::<R>(&restricted).await?);
        }

        let mut seen = HashSet::new();
        resources.retain(|r| seen.insert(r.id()));
        tracing::debug!(count = resources.len(), "Resolved visible resources");
        Ok(resources)
    }

    /// A single resource, if it exists and the actor may read it.
    pub async fn find_visible<R: Guarded>(&self, actor_id: Uuid, id: Uuid) -> CoreResult<Option<R>> {
        Ok(self
            .accessible_resources::<R>(actor_id, &Filter::id(id))
            .await?
            .into_iter()
            .next())
    }

    /// A single resource the actor may read.
    ///
    /// An existing resource the actor may not see is reported as
    /// `NotFound`, the same as a missing one.
    pub async fn get_visible<R: Guarded>(&self, actor_id: Uuid, id: Uuid) -> CoreResult<R> {
        self.find_visible::<R>(actor_id, id)
            .await?
            .ok_or_else(|| CoreError::not_found(R::COLLECTION.as_str(), id))
    }

    /// Check whether an already loaded resource is visible to the actor.
    pub async fn can_see<R: Guarded>(&self, actor_id: Uuid, resource: &R) -> CoreResult<bool> {
        self.access.active_actor(actor_id, R::MODULE, Action::Read).await?;
        if self.access.is_global_admin(actor_id).await? {
            return Ok(true);
        }
        let groups = self.access.members().groups_of(actor_id).await?;
        Ok(resource.access_config().is_visible_to(&groups))
    }
}

/// Filter matching resources restricted to any of `groups`.
pub fn restricted_to<'a>(groups: impl IntoIterator<Item = &'a Uuid>) -> Filter {
    Filter::eq(ACCESS_TYPE_PATH, AccessType::Restricted.as_str())
        .and(Filter::uuid_in(ALLOWED_GROUPS_PATH, groups))
}
