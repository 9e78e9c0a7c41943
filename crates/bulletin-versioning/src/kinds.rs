//! Resource kinds
//!
//! The four versioned resource kinds share one lifecycle. Each kind is a
//! zero-sized marker implementing [`MasterKind`], which names its
//! collections, its permission module, its status enum and the
//! domain-specific fields of its master record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use bulletin_rbac::Module;
use bulletin_store::Collection;

/// Lifecycle status of a master record.
pub trait Status:
    Copy + Eq + fmt::Debug + fmt::Display + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Status given to a new master when none is requested.
    const INITIAL: Self;

    /// Get the string representation of the status.
    fn as_str(&self) -> &'static str;

    /// Parse a status from its string representation.
    fn parse(s: &str) -> Option<Self>;

    /// Get all statuses.
    fn all() -> Vec<Self>;
}

/// Domain fields of a master record, stored flattened next to the common
/// fields.
pub trait Details: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Human-readable name of the master.
    fn name(&self) -> &str;

    /// Replace the name.
    fn set_name(&mut self, name: String);

    /// Replace the description. Kinds without one ignore it.
    fn set_description(&mut self, _description: String) {}
}

/// A versioned resource kind.
pub trait MasterKind: Copy + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// Collection holding the masters.
    const MASTERS: Collection;

    /// Collection holding the version snapshots.
    const VERSIONS: Collection;

    /// Permission module governing writes.
    const MODULE: Module;

    /// Stored field holding the master's name.
    const NAME_FIELD: &'static str;

    /// Singular label used in log lines and commit messages.
    const LABEL: &'static str;

    /// Status enum of this kind.
    type Status: Status;

    /// Domain fields of this kind.
    type Details: Details;
}

macro_rules! status_enum {
    (
        $(#[$meta:meta])*
        $name:ident, initial = $initial:ident {
            $($(#[$vmeta:meta])* $variant:ident => $s:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl Status for $name {
            const INITIAL: Self = $name::$initial;

            fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $s),+
                }
            }

            fn parse(s: &str) -> Option<Self> {
                match s.trim().to_lowercase().as_str() {
                    $($s => Some($name::$variant),)+
                    _ => None,
                }
            }

            fn all() -> Vec<Self> {
                vec![$($name::$variant),+]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

status_enum! {
    /// Template status.
    TemplateStatus, initial = Draft {
        /// Being designed, not offered for new bulletins
        Draft => "draft",
        /// Offered for new bulletins
        Active => "active",
        /// Retired
        Archived => "archived",
    }
}

status_enum! {
    /// Bulletin status.
    BulletinStatus, initial = Draft {
        /// Being written
        Draft => "draft",
        /// Waiting for review
        Review => "review",
        /// Published
        Published => "published",
        /// Retired
        Archived => "archived",
    }
}

status_enum! {
    /// Card status.
    CardStatus, initial = Active {
        /// Available to templates
        Active => "active",
        /// Retired
        Archived => "archived",
    }
}

status_enum! {
    /// Visual resource status.
    VisualResourceStatus, initial = Active {
        /// Available for use
        Active => "active",
        /// Retired
        Archived => "archived",
    }
}

/// Template fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDetails {
    /// Template name
    pub template_name: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
}

impl TemplateDetails {
    /// Create template fields with just a name.
    pub fn new(template_name: impl Into<String>) -> Self {
        Self {
            template_name: template_name.into(),
            description: None,
        }
    }
}

impl Details for TemplateDetails {
    fn name(&self) -> &str {
        &self.template_name
    }

    fn set_name(&mut self, name: String) {
        self.template_name = name;
    }

    fn set_description(&mut self, description: String) {
        self.description = Some(description);
    }
}

/// Bulletin fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulletinDetails {
    /// Bulletin name
    pub bulletin_name: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Template master the bulletin was started from
    #[serde(default)]
    pub base_template_master_id: Option<Uuid>,
    /// Template version the bulletin was started from
    #[serde(default)]
    pub base_template_version_id: Option<Uuid>,
}

impl BulletinDetails {
    /// Create bulletin fields with just a name.
    pub fn new(bulletin_name: impl Into<String>) -> Self {
        Self {
            bulletin_name: bulletin_name.into(),
            description: None,
            base_template_master_id: None,
            base_template_version_id: None,
        }
    }

    /// Record the template version the bulletin is based on.
    pub fn based_on(mut self, template_master_id: Uuid, template_version_id: Uuid) -> Self {
        self.base_template_master_id = Some(template_master_id);
        self.base_template_version_id = Some(template_version_id);
        self
    }
}

impl Details for BulletinDetails {
    fn name(&self) -> &str {
        &self.bulletin_name
    }

    fn set_name(&mut self, name: String) {
        self.bulletin_name = name;
    }

    fn set_description(&mut self, description: String) {
        self.description = Some(description);
    }
}

/// Card fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDetails {
    /// Card name
    pub card_name: String,
    /// Card type, free-form (e.g. "climate", "market")
    pub card_type: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Templates the card may be placed in
    #[serde(default)]
    pub templates_master_ids: Vec<Uuid>,
}

impl CardDetails {
    /// Create card fields.
    pub fn new(card_name: impl Into<String>, card_type: impl Into<String>) -> Self {
        Self {
            card_name: card_name.into(),
            card_type: card_type.into(),
            description: None,
            templates_master_ids: Vec::new(),
        }
    }
}

impl Details for CardDetails {
    fn name(&self) -> &str {
        &self.card_name
    }

    fn set_name(&mut self, name: String) {
        self.card_name = name;
    }

    fn set_description(&mut self, description: String) {
        self.description = Some(description);
    }
}

/// Visual resource fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualResourceDetails {
    /// File name
    pub file_name: String,
    /// File type (e.g. "image", "icon")
    pub file_type: String,
    /// Where the file is served from
    pub file_url: String,
}

impl Details for VisualResourceDetails {
    fn name(&self) -> &str {
        &self.file_name
    }

    fn set_name(&mut self, name: String) {
        self.file_name = name;
    }
}

/// Template kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template;

impl MasterKind for Template {
    const MASTERS: Collection = Collection::Templates;
    const VERSIONS: Collection = Collection::TemplateVersions;
    const MODULE: Module = Module::TemplateManagement;
    const NAME_FIELD: &'static str = "template_name";
    const LABEL: &'static str = "template";
    type Status = TemplateStatus;
    type Details = TemplateDetails;
}

/// Bulletin kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bulletin;

impl MasterKind for Bulletin {
    const MASTERS: Collection = Collection::Bulletins;
    const VERSIONS: Collection = Collection::BulletinVersions;
    const MODULE: Module = Module::BulletinsComposer;
    const NAME_FIELD: &'static str = "bulletin_name";
    const LABEL: &'static str = "bulletin";
    type Status = BulletinStatus;
    type Details = BulletinDetails;
}

/// Card kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card;

impl MasterKind for Card {
    const MASTERS: Collection = Collection::Cards;
    const VERSIONS: Collection = Collection::CardVersions;
    const MODULE: Module = Module::CardManagement;
    const NAME_FIELD: &'static str = "card_name";
    const LABEL: &'static str = "card";
    type Status = CardStatus;
    type Details = CardDetails;
}

/// Visual resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualResource;

impl MasterKind for VisualResource {
    const MASTERS: Collection = Collection::VisualResources;
    const VERSIONS: Collection = Collection::VisualResourceVersions;
    const MODULE: Module = Module::TemplateManagement;
    const NAME_FIELD: &'static str = "file_name";
    const LABEL: &'static str = "visual resource";
    type Status = VisualResourceStatus;
    type Details = VisualResourceDetails;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in BulletinStatus::all() {
            assert_eq!(BulletinStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TemplateStatus::parse(" Active "), Some(TemplateStatus::Active));
        assert_eq!(CardStatus::parse("draft"), None);
    }

    #[test]
    fn test_initial_status() {
        assert_eq!(TemplateStatus::INITIAL, TemplateStatus::Draft);
        assert_eq!(CardStatus::INITIAL, CardStatus::Active);
    }

    #[test]
    fn test_status_serde_matches_as_str() {
        let json = serde_json::to_value(BulletinStatus::Published).unwrap();
        assert_eq!(json, serde_json::json!("published"));
    }

    #[test]
    fn test_kinds_use_distinct_collections() {
        let masters = [Template::MASTERS, Bulletin::MASTERS, Card::MASTERS, VisualResource::MASTERS];
        let versions = [Template::VERSIONS, Bulletin::VERSIONS, Card::VERSIONS, VisualResource::VERSIONS];
        for (m, v) in masters.iter().zip(versions.iter()) {
            assert_ne!(m, v);
            assert!(v.as_str().starts_with(m.as_str().trim_end_matches('s')));
        }
    }

    #[test]
    fn test_details_rename() {
        let mut details = CardDetails::new("Rainfall", "climate");
        details.set_name("Rainfall (clon)".to_string());
        assert_eq!(details.name(), "Rainfall (clon)");
        assert_eq!(details.card_type, "climate");
    }

    #[test]
    fn test_description_only_where_supported() {
        let mut card = CardDetails::new("Rainfall", "climate");
        card.set_description("Monthly totals".to_string());
        assert_eq!(card.description.as_deref(), Some("Monthly totals"));

        let mut file = VisualResourceDetails {
            file_name: "logo.png".to_string(),
            file_type: "image".to_string(),
            file_url: "/files/logo.png".to_string(),
        };
        let before = file.clone();
        file.set_description("Institution logo".to_string());
        assert_eq!(file, before);
    }
}
