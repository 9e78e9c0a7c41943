//! Master and version records
//!
//! A [`MasterRecord`] is the mutable head of a resource: its name and domain
//! fields, visibility, status and a pointer to the live version. Content
//! lives in [`VersionRecord`]s, which are immutable once written and link
//! back to their predecessor.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::marker::PhantomData;
use uuid::Uuid;

use bulletin_access::Guarded;
use bulletin_rbac::Module;
use bulletin_store::{AccessConfig, AuditLog, Collection, Document, HasAccessConfig, HasAuditLog};

use crate::kinds::{Details, MasterKind};

/// Head record of a versioned resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct MasterRecord<K: MasterKind> {
    /// Unique identifier
    pub id: Uuid,

    /// Kind-specific fields (name, type, links, ...)
    #[serde(flatten)]
    pub details: K::Details,

    /// Who may see and write the resource
    pub access_config: AccessConfig,

    /// Lifecycle status
    pub status: K::Status,

    /// Live version, if any has been created
    #[serde(default)]
    pub current_version_id: Option<Uuid>,

    /// Audit log
    pub log: AuditLog,
}

impl<K: MasterKind> MasterRecord<K> {
    /// Name of the master.
    pub fn name(&self) -> &str {
        self.details.name()
    }

    /// Check if the master has a live version.
    pub fn has_version(&self) -> bool {
        self.current_version_id.is_some()
    }
}

impl<K: MasterKind> Document for MasterRecord<K> {
    const COLLECTION: Collection = K::MASTERS;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl<K: MasterKind> HasAccessConfig for MasterRecord<K> {
    fn access_config(&self) -> &AccessConfig {
        &self.access_config
    }
}

impl<K: MasterKind> HasAuditLog for MasterRecord<K> {
    fn audit_log(&self) -> &AuditLog {
        &self.log
    }
}

impl<K: MasterKind> Guarded for MasterRecord<K> {
    const MODULE: Module = K::MODULE;
}

/// Immutable content snapshot of a master.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct VersionRecord<K: MasterKind> {
    /// Unique identifier
    pub id: Uuid,

    /// Master this version belongs to
    pub master_id: Uuid,

    /// Position in the master's history, starting at 1
    pub version_num: u32,

    /// Version this one was derived from
    #[serde(default)]
    pub previous_version_id: Option<Uuid>,

    /// Kind-specific content payload
    pub content: Value,

    /// Optional note from the author
    #[serde(default)]
    pub commit_message: Option<String>,

    /// Audit log
    pub log: AuditLog,

    #[serde(skip)]
    kind: PhantomData<K>,
}

impl<K: MasterKind> VersionRecord<K> {
    /// Create the first version of a master.
    pub fn first(master_id: Uuid, content: Value, creator: Uuid) -> Self {
        Self {
            id: Uuid::now_v7(),
            master_id,
            version_num: 1,
            previous_version_id: None,
            content,
            commit_message: None,
            log: AuditLog::new(creator),
            kind: PhantomData,
        }
    }

    /// Create the version following `previous`.
    ///
    /// Returns `None` if the version number would overflow.
    pub fn following(previous: &Self, content: Value, creator: Uuid) -> Option<Self> {
        Some(Self {
            version_num: previous.version_num.checked_add(1)?,
            previous_version_id: Some(previous.id),
            ..Self::first(previous.master_id, content, creator)
        })
    }

    /// Copy this version's content into a detached version of another
    /// master, keeping the version number.
    pub fn cloned_into(&self, master_id: Uuid, creator: Uuid, commit_message: String) -> Self {
        Self {
            version_num: self.version_num,
            commit_message: Some(commit_message),
            ..Self::first(master_id, self.content.clone(), creator)
        }
    }

    /// Attach a commit message.
    pub fn with_commit_message(mut self, message: impl Into<String>) -> Self {
        self.commit_message = Some(message.into());
        self
    }
}

impl<K: MasterKind> Document for VersionRecord<K> {
    const COLLECTION: Collection = K::VERSIONS;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl<K: MasterKind> HasAuditLog for VersionRecord<K> {
    fn audit_log(&self) -> &AuditLog {
        &self.log
    }
}

/// Input for creating a master.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct NewMaster<K: MasterKind> {
    /// Kind-specific fields
    #[serde(flatten)]
    pub details: K::Details,

    /// Visibility
    #[serde(default)]
    pub access_config: AccessConfig,

    /// Initial status (defaults to the kind's initial status)
    #[serde(default)]
    pub status: Option<K::Status>,
}

impl<K: MasterKind> NewMaster<K> {
    /// Create input with default visibility (public) and status.
    pub fn new(details: K::Details) -> Self {
        Self {
            details,
            access_config: AccessConfig::public(),
            status: None,
        }
    }

    /// Set the visibility.
    pub fn with_access(mut self, access_config: AccessConfig) -> Self {
        self.access_config = access_config;
        self
    }

    /// Set the initial status.
    pub fn with_status(mut self, status: K::Status) -> Self {
        self.status = Some(status);
        self
    }
}

/// Field changes to apply to a master. Unset fields are left alone.
///
/// The current version pointer is deliberately absent: it only moves
/// through version creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct MasterPatch<K: MasterKind> {
    /// New name
    #[serde(default)]
    pub name: Option<String>,

    /// Replacement kind-specific fields
    #[serde(default)]
    pub details: Option<K::Details>,

    /// Replacement visibility
    #[serde(default)]
    pub access_config: Option<AccessConfig>,

    /// New status
    #[serde(default)]
    pub status: Option<K::Status>,
}

impl<K: MasterKind> Default for MasterPatch<K> {
    fn default() -> Self {
        Self {
            name: None,
            details: None,
            access_config: None,
            status: None,
        }
    }
}

impl<K: MasterKind> MasterPatch<K> {
    /// Check if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.details.is_none() && self.access_config.is_none() && self.status.is_none()
    }

    /// Apply the patch to a copy of `master`.
    ///
    /// Replacement details are applied before the name, so a patch carrying
    /// both keeps the explicit name.
    pub fn applied_to(&self, master: &MasterRecord<K>) -> MasterRecord<K> {
        let mut next = master.clone();
        if let Some(details) = &self.details {
            next.details = details.clone();
        }
        if let Some(name) = &self.name {
            next.details.set_name(name.trim().to_string());
        }
        if let Some(access_config) = &self.access_config {
            next.access_config = access_config.normalized();
        }
        if let Some(status) = self.status {
            next.status = status;
        }
        next
    }
}

/// Overrides applied when cloning a master.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloneOverrides {
    /// Name of the clone; defaults to the source name plus the configured
    /// suffix
    #[serde(default)]
    pub name: Option<String>,

    /// Description of the clone; defaults to the source description
    #[serde(default)]
    pub description: Option<String>,
}

impl CloneOverrides {
    /// Override the clone's name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            description: None,
        }
    }

    /// Override the clone's description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Input for creating a version.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewVersion {
    /// Content payload
    pub content: Value,

    /// Optional note from the author
    #[serde(default)]
    pub commit_message: Option<String>,
}

impl NewVersion {
    /// Create a version input from a content payload.
    pub fn new(content: Value) -> Self {
        Self {
            content,
            commit_message: None,
        }
    }

    /// Attach a commit message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.commit_message = Some(message.into());
        self
    }
}
