//! # Bulletin Versioning
//!
//! This crate owns the master/version lifecycle of the Bulletin Builder's
//! versioned resources: templates, bulletins, cards and visual resources.
//!
//! ## Overview
//!
//! The bulletin-versioning crate handles:
//! - **Kinds**: [`MasterKind`] markers naming each kind's collections,
//!   module, status enum and domain fields
//! - **Records**: [`MasterRecord`] heads and immutable [`VersionRecord`]
//!   snapshots chained through `previous_version_id`
//! - **Lifecycle**: [`LifecycleManager`] creates and edits masters, appends
//!   versions, lists history and clones
//! - **Exclusion**: [`MasterLocks`] serialises version creation per master
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bulletin_access::AccessResolver;
//! use bulletin_rbac::PolicyConfig;
//! use bulletin_store::{AccessConfig, MemoryStore};
//! use bulletin_versioning::{
//!     CloneOverrides, LifecycleConfig, NewMaster, NewVersion, TemplateDetails, TemplateLifecycle,
//! };
//! use serde_json::json;
//! use uuid::Uuid;
//!
//! # async fn example(actor_id: Uuid, group_id: Uuid) -> bulletin_access::CoreResult<()> {
//! let store = Arc::new(MemoryStore::new());
//! let access = AccessResolver::from_store(store, Arc::new(PolicyConfig::from_env()));
//! let templates: TemplateLifecycle<MemoryStore> = TemplateLifecycle::new(access, LifecycleConfig::from_env());
//!
//! let master = templates
//!     .create_master(
//!         actor_id,
//!         NewMaster::new(TemplateDetails::new("Monthly outlook"))
//!             .with_access(AccessConfig::restricted([group_id])),
//!     )
//!     .await?;
//! templates
//!     .create_version(actor_id, master.id, NewVersion::new(json!({"sections": []})))
//!     .await?;
//!
//! let (copy, version) = templates
//!     .clone_master(actor_id, master.id, CloneOverrides::named("Quarterly outlook"))
//!     .await?;
//! # let _ = (copy, version);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod kinds;
pub mod lifecycle;
pub mod locks;
pub mod record;

// Re-export main types for convenience
pub use config::{LifecycleConfig, DEFAULT_CLONE_SUFFIX};
pub use kinds::{
    Bulletin, BulletinDetails, BulletinStatus, Card, CardDetails, CardStatus, Details, MasterKind, Status, Template,
    TemplateDetails, TemplateStatus, VisualResource, VisualResourceDetails, VisualResourceStatus,
};
pub use lifecycle::LifecycleManager;
pub use locks::{MasterGuard, MasterLocks};
pub use record::{CloneOverrides, MasterPatch, MasterRecord, NewMaster, NewVersion, VersionRecord};

/// Lifecycle of templates.
pub type TemplateLifecycle<S> = LifecycleManager<S, Template>;

/// Lifecycle of bulletins.
pub type BulletinLifecycle<S> = LifecycleManager<S, Bulletin>;

/// Lifecycle of cards.
pub type CardLifecycle<S> = LifecycleManager<S, Card>;

/// Lifecycle of visual resources.
pub type VisualResourceLifecycle<S> = LifecycleManager<S, VisualResource>;
