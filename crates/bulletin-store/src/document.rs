//! Document types
//!
//! Every persisted entity is a [`Document`]: a serde value that lives in one
//! [`Collection`] and is addressed by a UUID. Capability traits describe the
//! optional sub-documents a resource carries.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::access::AccessConfig;
use crate::audit::AuditLog;

/// Collections known to the store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// Template masters.
    Templates,
    /// Template version snapshots.
    TemplateVersions,
    /// Bulletin masters.
    Bulletins,
    /// Bulletin version snapshots.
    BulletinVersions,
    /// Card masters.
    Cards,
    /// Card version snapshots.
    CardVersions,
    /// Visual resource masters (images, icons, media).
    VisualResources,
    /// Visual resource version snapshots.
    VisualResourceVersions,
    /// Groups and their member lists.
    Groups,
    /// Roles and their permission matrices.
    Roles,
    /// Actors (users) known to the platform.
    Users,
}

impl Collection {
    /// Get the string representation of the collection.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Templates => "templates",
            Collection::TemplateVersions => "template_versions",
            Collection::Bulletins => "bulletins",
            Collection::BulletinVersions => "bulletin_versions",
            Collection::Cards => "cards",
            Collection::CardVersions => "card_versions",
            Collection::VisualResources => "visual_resources",
            Collection::VisualResourceVersions => "visual_resource_versions",
            Collection::Groups => "groups",
            Collection::Roles => "roles",
            Collection::Users => "users",
        }
    }

    /// Get all collections.
    pub fn all() -> Vec<Self> {
        vec![
            Collection::Templates,
            Collection::TemplateVersions,
            Collection::Bulletins,
            Collection::BulletinVersions,
            Collection::Cards,
            Collection::CardVersions,
            Collection::VisualResources,
            Collection::VisualResourceVersions,
            Collection::Groups,
            Collection::Roles,
            Collection::Users,
        ]
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value that can be persisted in a [`crate::DocumentStore`].
///
/// Documents serialize to a JSON object with a top-level `id` field matching
/// [`Document::id`].
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The collection this document type lives in.
    const COLLECTION: Collection;

    /// The document's stable identifier.
    fn id(&self) -> Uuid;
}

/// Resources that embed an [`AccessConfig`].
pub trait HasAccessConfig {
    /// The resource's visibility descriptor.
    fn access_config(&self) -> &AccessConfig;
}

/// Resources that carry an [`AuditLog`].
pub trait HasAuditLog {
    /// The resource's audit log.
    fn audit_log(&self) -> &AuditLog;
}
