//! Actor domain model
//!
//! An actor is a user known to the platform. Actors are created on first
//! successful authentication against the external identity provider and
//! are never deleted here, only deactivated.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bulletin_store::{AuditLog, Collection, Document, HasAuditLog};

/// Profile data supplied by the identity provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActorProfile {
    /// Given name
    pub first_name: Option<String>,

    /// Family name
    pub last_name: Option<String>,

    /// Contact email
    pub email: Option<String>,
}

/// A user known to the platform.
///
/// # Examples
///
/// ```
/// use bulletin_org::{Actor, ActorProfile};
///
/// let actor = Actor::new("idp|42", ActorProfile::default());
/// assert!(actor.is_active);
/// assert_eq!(actor.log.creator_user_id, actor.id);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Actor {
    /// Stable actor id
    pub id: Uuid,

    /// Subject id at the external identity provider
    pub ext_id: String,

    /// Given name
    pub first_name: Option<String>,

    /// Family name
    pub last_name: Option<String>,

    /// Contact email
    pub email: Option<String>,

    /// Inactive actors are denied everywhere
    pub is_active: bool,

    /// Audit log
    pub log: AuditLog,
}

impl Actor {
    /// Creates a new active actor.
    ///
    /// The actor is recorded as its own creator.
    ///
    /// # Arguments
    ///
    /// * `ext_id` - Subject id at the identity provider
    /// * `profile` - Profile data from the identity provider
    pub fn new(ext_id: impl Into<String>, profile: ActorProfile) -> Self {
        let id = Uuid::now_v7();
        Self {
            id,
            ext_id: ext_id.into(),
            first_name: profile.first_name,
            last_name: profile.last_name,
            email: profile.email,
            is_active: true,
            log: AuditLog::new(id),
        }
    }

    /// Full display name, if any part of it is known.
    pub fn display_name(&self) -> Option<String> {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(name), None) | (None, Some(name)) => Some(name.clone()),
            (None, None) => None,
        }
    }
}

impl Document for Actor {
    const COLLECTION: Collection = Collection::Users;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl HasAuditLog for Actor {
    fn audit_log(&self) -> &AuditLog {
        &self.log
    }
}
