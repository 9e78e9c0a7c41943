//! Master/version lifecycle
//!
//! [`LifecycleManager`] owns every write to masters and their version
//! chains for one resource kind:
//!
//! - masters are created and edited under the kind's permission module
//! - versions are appended: numbered from the previous live version and
//!   linked back to it, then the master's pointer is advanced
//! - clones copy a master and only its live version
//!
//! Every read goes through the visibility resolver; a master the actor may
//! not see is reported as missing.
//!
//! ## Version creation
//!
//! ```text
//! lock(master)
//!   master visible?                       no  -> NotFound
//!   restricted and create denied?         yes -> Forbidden
//!   previous = master.current_version_id
//!   previous missing or foreign?          yes -> Inconsistent
//!   insert version(num = previous + 1 or 1)
//!   pointer still == previous?            no  -> Conflict (version orphaned)
//!   pointer = version
//! unlock(master)
//! ```
//!
//! The lock makes concurrent writers in this process take turns; the
//! compare-and-set on the pointer catches writers in other processes. A
//! version inserted by a writer that then loses the pointer race stays in
//! storage, unreachable from the master but listed by its history. It is
//! logged and never rolled back.

use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use bulletin_access::{AccessResolver, CoreError, CoreResult, VisibilityResolver};
use bulletin_rbac::Action;
use bulletin_store::{AccessConfig, AuditLog, DocumentStore, Filter, Patch};

use crate::config::LifecycleConfig;
use crate::kinds::{Card, Details, MasterKind, Status, VisualResource};
use crate::locks::MasterLocks;
use crate::record::{CloneOverrides, MasterPatch, MasterRecord, NewMaster, NewVersion, VersionRecord};

const POINTER_FIELD: &str = "current_version_id";

/// Lifecycle operations for one resource kind.
pub struct LifecycleManager<S, K> {
    visibility: VisibilityResolver<S>,
    locks: MasterLocks,
    config: Arc<LifecycleConfig>,
    kind: PhantomData<fn() -> K>,
}

impl<S, K> Clone for LifecycleManager<S, K> {
    fn clone(&self) -> Self {
        Self {
            visibility: self.visibility.clone(),
            locks: self.locks.clone(),
            config: self.config.clone(),
            kind: PhantomData,
        }
    }
}

impl<S: DocumentStore, K: MasterKind> LifecycleManager<S, K> {
    /// Create a lifecycle manager with its own lock registry.
    pub fn new(access: AccessResolver<S>, config: LifecycleConfig) -> Self {
        Self {
            visibility: VisibilityResolver::new(access),
            locks: MasterLocks::new(),
            config: Arc::new(config),
            kind: PhantomData,
        }
    }

    /// Share a lock registry with other managers of the same store.
    pub fn with_locks(mut self, locks: MasterLocks) -> Self {
        self.locks = locks;
        self
    }

    /// Visibility resolver used for reads.
    pub fn visibility(&self) -> &VisibilityResolver<S> {
        &self.visibility
    }

    /// Configuration in use.
    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    fn access(&self) -> &AccessResolver<S> {
        self.visibility.access()
    }

    fn store(&self) -> &Arc<S> {
        self.access().store()
    }

    // ========================================================================
    // Masters
    // ========================================================================

    /// Create a master with no version.
    ///
    /// A restricted master requires `create` in every one of its groups.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a blank name or a restricted configuration
    /// without groups; `Forbidden` if the actor may not create.
    #[instrument(skip(self, input), fields(%actor_id, kind = K::LABEL))]
    pub async fn create_master(&self, actor_id: Uuid, input: NewMaster<K>) -> CoreResult<MasterRecord<K>> {
        let access_config = input.access_config.normalized();
        validate_access(&access_config)?;
        let mut details = input.details;
        let name = validated_name(details.name())?;
        details.set_name(name);

        self.access()
            .require(actor_id, K::MODULE, Action::Create, access_config.write_groups())
            .await?;

        let master = MasterRecord {
            id: Uuid::now_v7(),
            details,
            access_config,
            status: input.status.unwrap_or(<K::Status as Status>::INITIAL),
            current_version_id: None,
            log: AuditLog::new(actor_id),
        };
        self.store().insert(&master).await?;
        tracing::info!(master_id = %master.id, name = %master.name(), "Master created");
        Ok(master)
    }

    /// Apply field changes to a master.
    ///
    /// Requires `update` in every group the master is restricted to, before
    /// and after the change. The diff is persisted guarded by the old
    /// values; a concurrent edit of the same fields is a `Conflict`.
    #[instrument(skip(self, patch), fields(%actor_id, %master_id, kind = K::LABEL))]
    pub async fn update_master(
        &self,
        actor_id: Uuid,
        master_id: Uuid,
        patch: MasterPatch<K>,
    ) -> CoreResult<MasterRecord<K>> {
        let current = self.get_master(actor_id, master_id).await?;
        if patch.is_empty() {
            return Ok(current);
        }

        let mut next = patch.applied_to(&current);
        validate_access(&next.access_config)?;
        let name = validated_name(next.name())?;
        next.details.set_name(name);

        let mut groups = current.access_config.write_groups().to_vec();
        for group_id in next.access_config.write_groups() {
            if !groups.contains(group_id) {
                groups.push(*group_id);
            }
        }
        self.access()
            .require(actor_id, K::MODULE, Action::Update, &groups)
            .await?;

        let next = MasterRecord {
            log: current.log.touched_by(actor_id),
            ..next
        };
        let diff = Patch::between(&serde_json::to_value(&current)?, &serde_json::to_value(&next)?)?;
        let updated: MasterRecord<K> = self.store().update(master_id, &diff).await?;
        tracing::info!(fields = diff.sets().len(), "Master updated");
        Ok(updated)
    }

    /// A master the actor may see.
    pub async fn get_master(&self, actor_id: Uuid, master_id: Uuid) -> CoreResult<MasterRecord<K>> {
        self.visibility.get_visible(actor_id, master_id).await
    }

    /// Every master matching `filter` that the actor may see.
    pub async fn list_masters(&self, actor_id: Uuid, filter: &Filter) -> CoreResult<Vec<MasterRecord<K>>> {
        self.visibility.accessible_resources(actor_id, filter).await
    }

    /// The masters among `ids` that the actor may see, in storage order.
    ///
    /// Ids that do not exist or are not visible are skipped.
    pub async fn get_masters(&self, actor_id: Uuid, ids: &[Uuid]) -> CoreResult<Vec<MasterRecord<K>>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.list_masters(actor_id, &Filter::uuid_in("id", ids)).await
    }

    /// Visible masters whose name contains `fragment`, case-insensitively.
    pub async fn find_by_name(&self, actor_id: Uuid, fragment: &str) -> CoreResult<Vec<MasterRecord<K>>> {
        self.list_masters(actor_id, &Filter::contains_text(K::NAME_FIELD, fragment))
            .await
    }

    /// Visible masters with the given status.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `status` is not a status of this kind.
    pub async fn find_by_status(&self, actor_id: Uuid, status: &str) -> CoreResult<Vec<MasterRecord<K>>> {
        let Some(status) = <K::Status as Status>::parse(status) else {
            let allowed: Vec<&str> = <K::Status as Status>::all().iter().map(|s| s.as_str()).collect();
            return Err(CoreError::InvalidArgument(format!(
                "invalid {} status '{status}', allowed: {}",
                K::LABEL,
                allowed.join(", ")
            )));
        };
        self.list_masters(actor_id, &Filter::eq("status", status.as_str()))
            .await
    }

    // ========================================================================
    // Versions
    // ========================================================================

    /// A visible master together with its live version.
    ///
    /// `NotFound` if the master has no version yet.
    pub async fn current_version(
        &self,
        actor_id: Uuid,
        master_id: Uuid,
    ) -> CoreResult<(MasterRecord<K>, VersionRecord<K>)> {
        let master = self.get_master(actor_id, master_id).await?;
        let Some(version_id) = master.current_version_id else {
            return Err(CoreError::not_found(K::VERSIONS.as_str(), format!("current of {master_id}")));
        };
        let version = self.linked_version(&master, version_id).await?;
        Ok((master, version))
    }

    /// A single version, if its master is visible to the actor.
    pub async fn get_version(&self, actor_id: Uuid, version_id: Uuid) -> CoreResult<VersionRecord<K>> {
        let version: VersionRecord<K> = self.store().require(version_id).await?;
        match self.get_master(actor_id, version.master_id).await {
            Ok(_) => Ok(version),
            Err(CoreError::NotFound { .. }) => Err(CoreError::not_found(K::VERSIONS.as_str(), version_id)),
            Err(err) => Err(err),
        }
    }

    /// Append a version to a master and make it the live one.
    ///
    /// Writers on the same master take turns. Restricted masters require
    /// `create` in every allowed group; public masters only require the
    /// actor to be active, so callers must gate those writes themselves.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the master does not exist or is not visible
    /// - `Forbidden` if the actor may not create in the master's groups
    /// - `Inconsistent` if the live version is missing or belongs elsewhere
    /// - `Conflict` if another writer moved the pointer first; the version
    ///   written here is left orphaned
    #[instrument(skip(self, input), fields(%actor_id, %master_id, kind = K::LABEL))]
    pub async fn create_version(
        &self,
        actor_id: Uuid,
        master_id: Uuid,
        input: NewVersion,
    ) -> CoreResult<VersionRecord<K>> {
        let _guard = self.locks.acquire(master_id).await;

        let master = self.get_master(actor_id, master_id).await?;
        if master.access_config.is_restricted() {
            self.access()
                .require(actor_id, K::MODULE, Action::Create, master.access_config.write_groups())
                .await?;
        }

        let version = match master.current_version_id {
            Some(previous_id) => {
                let previous = self.linked_version(&master, previous_id).await?;
                VersionRecord::following(&previous, input.content, actor_id).ok_or_else(|| {
                    CoreError::Inconsistent(format!("version number overflow after {previous_id}"))
                })?
            }
            None => VersionRecord::first(master_id, input.content, actor_id),
        };
        let version = match input.commit_message {
            Some(message) => version.with_commit_message(message),
            None => version,
        };

        self.store().insert(&version).await?;
        self.advance_pointer(&master, &version, actor_id).await?;

        tracing::info!(version_id = %version.id, version_num = version.version_num, "Version created");
        Ok(version)
    }

    /// Every version of a visible master, most recently created first.
    ///
    /// Includes versions no longer reachable from the live one. Ties on
    /// creation time fall back to version number, then to id.
    pub async fn get_history(&self, actor_id: Uuid, master_id: Uuid) -> CoreResult<Vec<VersionRecord<K>>> {
        self.get_master(actor_id, master_id).await?;
        let mut versions: Vec<VersionRecord<K>> = self
            .store()
            .find(&Filter::uuid_eq("master_id", master_id))
            .await?;
        versions.sort_by(|a, b| {
            b.log
                .created_at
                .cmp(&a.log.created_at)
                .then(b.version_num.cmp(&a.version_num))
                .then(b.id.cmp(&a.id))
        });
        Ok(versions)
    }

    // ========================================================================
    // Cloning
    // ========================================================================

    /// Copy a master and its live version.
    ///
    /// Requires `create` in every group the source is restricted to. The
    /// clone keeps every field of the source except id, name (overridden or
    /// suffixed), an overridden description and audit log. Only the live
    /// version is copied: it keeps its version number but starts a new chain.
    #[instrument(skip(self, overrides), fields(%actor_id, %source_id, kind = K::LABEL))]
    pub async fn clone_master(
        &self,
        actor_id: Uuid,
        source_id: Uuid,
        overrides: CloneOverrides,
    ) -> CoreResult<(MasterRecord<K>, Option<VersionRecord<K>>)> {
        let source = self.get_master(actor_id, source_id).await?;
        self.access()
            .require(actor_id, K::MODULE, Action::Create, source.access_config.write_groups())
            .await?;

        let source_version = match source.current_version_id {
            Some(version_id) => Some(self.linked_version(&source, version_id).await?),
            None => None,
        };

        let name = match overrides.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.config.clone_name(source.name()),
        };
        let mut details = source.details.clone();
        details.set_name(name);
        if let Some(description) = overrides.description.filter(|d| !d.trim().is_empty()) {
            details.set_description(description);
        }

        let clone = MasterRecord {
            id: Uuid::now_v7(),
            details,
            access_config: source.access_config.clone(),
            status: source.status,
            current_version_id: None,
            log: AuditLog::new(actor_id),
        };
        self.store().insert(&clone).await?;

        let Some(original) = source_version else {
            tracing::info!(clone_id = %clone.id, "Master cloned without version");
            return Ok((clone, None));
        };

        let message = format!(
            "Cloned from {} {}, original version {}",
            K::LABEL,
            source.id,
            original.id
        );
        let copy = original.cloned_into(clone.id, actor_id, message);
        self.store().insert(&copy).await?;
        let clone = self.advance_pointer(&clone, &copy, actor_id).await?;

        tracing::info!(clone_id = %clone.id, version_id = %copy.id, "Master cloned");
        Ok((clone, Some(copy)))
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Load a version referenced by `master`'s pointer.
    async fn linked_version(&self, master: &MasterRecord<K>, version_id: Uuid) -> CoreResult<VersionRecord<K>> {
        let version: Option<VersionRecord<K>> = self.store().get(version_id).await?;
        let problem = match &version {
            None => "is missing",
            Some(v) if v.master_id != master.id => "belongs to another master",
            Some(v) if v.version_num == 0 => "has no version number",
            Some(_) => "",
        };
        match version {
            Some(version) if problem.is_empty() => Ok(version),
            _ => {
                tracing::error!(master_id = %master.id, %version_id, problem, "Version chain is inconsistent");
                Err(CoreError::Inconsistent(format!(
                    "live version {version_id} of {} {} {problem}",
                    K::LABEL,
                    master.id
                )))
            }
        }
    }

    /// Move `master`'s pointer to `version`, provided nobody moved it since
    /// `master` was read.
    async fn advance_pointer(
        &self,
        master: &MasterRecord<K>,
        version: &VersionRecord<K>,
        actor_id: Uuid,
    ) -> CoreResult<MasterRecord<K>> {
        let expected = match master.current_version_id {
            Some(id) => Value::String(id.to_string()),
            None => Value::Null,
        };
        let patch = Patch::new()
            .when(POINTER_FIELD, expected)
            .set(POINTER_FIELD, version.id.to_string())
            .set_serialized("log", &master.log.touched_by(actor_id))?;

        match self.store().update(master.id, &patch).await {
            Ok(updated) => Ok(updated),
            Err(err) => {
                tracing::error!(
                    master_id = %master.id,
                    version_id = %version.id,
                    error = %err,
                    "Pointer not advanced, version left orphaned"
                );
                if err.is_conflict() {
                    Err(CoreError::Conflict(format!(
                        "{} {} gained a new version concurrently; version {} is orphaned",
                        K::LABEL,
                        master.id,
                        version.id
                    )))
                } else {
                    Err(err.into())
                }
            }
        }
    }
}

impl<S: DocumentStore> LifecycleManager<S, Card> {
    /// Visible cards of the given type.
    pub async fn find_by_type(&self, actor_id: Uuid, card_type: &str) -> CoreResult<Vec<MasterRecord<Card>>> {
        self.list_masters(actor_id, &Filter::eq("card_type", card_type.trim()))
            .await
    }

    /// Visible cards that may be placed in the given template.
    pub async fn find_by_template(
        &self,
        actor_id: Uuid,
        template_master_id: Uuid,
    ) -> CoreResult<Vec<MasterRecord<Card>>> {
        self.list_masters(actor_id, &Filter::uuid_eq("templates_master_ids", template_master_id))
            .await
    }
}

impl<S: DocumentStore> LifecycleManager<S, VisualResource> {
    /// Visible visual resources of the given file type.
    pub async fn find_by_file_type(
        &self,
        actor_id: Uuid,
        file_type: &str,
    ) -> CoreResult<Vec<MasterRecord<VisualResource>>> {
        self.list_masters(actor_id, &Filter::eq("file_type", file_type.trim()))
            .await
    }
}

fn validated_name(name: &str) -> CoreResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::InvalidArgument("name must not be empty".to_string()));
    }
    Ok(name.to_string())
}

fn validate_access(config: &AccessConfig) -> CoreResult<()> {
    if config.is_restricted() && config.allowed_groups.is_empty() {
        return Err(CoreError::InvalidArgument(
            "restricted access requires at least one group".to_string(),
        ));
    }
    Ok(())
}
