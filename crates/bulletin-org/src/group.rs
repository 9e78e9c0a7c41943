//! Group domain models
//!
//! A group is the unit of tenancy: it holds an ordered list of
//! (actor, role) pairs, and restricted resources name the groups allowed to
//! see them. Membership changes are expressed as pure transformations that
//! return a new [`Group`] value, leaving persistence to the caller.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bulletin_store::{AuditLog, Collection, Document, HasAuditLog};

use crate::error::{OrgError, OrgResult};

/// One membership entry: an actor holding a role in a group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UserAccess {
    /// Member actor
    #[serde(rename = "user_id")]
    pub actor_id: Uuid,

    /// Role held in the group
    pub role_id: Uuid,
}

/// Projection of a membership as seen from the actor's side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupRole {
    /// Group id
    pub group_id: Uuid,

    /// Group name
    pub group_name: String,

    /// Role held in the group
    pub role_id: Uuid,
}

/// A group of actors.
///
/// `users_access` never holds two entries for the same actor.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use bulletin_org::Group;
///
/// let admin = Uuid::now_v7();
/// let editor = Uuid::now_v7();
/// let role = Uuid::now_v7();
///
/// let group = Group::new("Andean region", admin).with_country("co");
/// let group = group.with_member(editor, role).unwrap();
///
/// assert_eq!(group.country.as_deref(), Some("CO"));
/// assert_eq!(group.role_of(editor), Some(role));
/// assert!(group.with_member(editor, role).is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Group {
    /// Unique identifier
    pub id: Uuid,

    /// Human-readable name
    pub group_name: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,

    /// ISO 3166 country code, upper case
    #[serde(default)]
    pub country: Option<String>,

    /// Members in insertion order
    #[serde(default)]
    pub users_access: Vec<UserAccess>,

    /// Audit log
    pub log: AuditLog,
}

impl Group {
    /// Creates a new group with no members.
    ///
    /// # Arguments
    ///
    /// * `name` - Group name
    /// * `creator` - Actor creating the group
    pub fn new(name: impl Into<String>, creator: Uuid) -> Self {
        Self {
            id: Uuid::now_v7(),
            group_name: name.into(),
            description: None,
            country: None,
            users_access: Vec::new(),
            log: AuditLog::new(creator),
        }
    }

    /// Set the country code (normalized to upper case).
    pub fn with_country(mut self, country: impl AsRef<str>) -> Self {
        self.country = normalize_country(country.as_ref());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Membership entry of an actor, if any.
    pub fn member(&self, actor_id: Uuid) -> Option<&UserAccess> {
        self.users_access.iter().find(|ua| ua.actor_id == actor_id)
    }

    /// Role held by an actor in this group.
    pub fn role_of(&self, actor_id: Uuid) -> Option<Uuid> {
        self.member(actor_id).map(|ua| ua.role_id)
    }

    /// Check if an actor is a member.
    pub fn is_member(&self, actor_id: Uuid) -> bool {
        self.member(actor_id).is_some()
    }

    /// Ids of every member, in insertion order.
    pub fn member_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.users_access.iter().map(|ua| ua.actor_id)
    }

    /// Return a copy with `actor_id` added under `role_id`.
    ///
    /// # Errors
    ///
    /// [`OrgError::AlreadyMember`] if the actor already has an entry.
    pub fn with_member(&self, actor_id: Uuid, role_id: Uuid) -> OrgResult<Self> {
        if self.is_member(actor_id) {
            return Err(OrgError::AlreadyMember {
                group_id: self.id,
                actor_id,
            });
        }
        let mut next = self.clone();
        next.users_access.push(UserAccess { actor_id, role_id });
        Ok(next)
    }

    /// Return a copy with `actor_id` removed.
    ///
    /// # Errors
    ///
    /// [`OrgError::NotMember`] if the actor has no entry.
    pub fn without_member(&self, actor_id: Uuid) -> OrgResult<Self> {
        if !self.is_member(actor_id) {
            return Err(self.not_member(actor_id));
        }
        let mut next = self.clone();
        next.users_access.retain(|ua| ua.actor_id != actor_id);
        Ok(next)
    }

    /// Return a copy where `actor_id` holds `role_id`.
    ///
    /// The member keeps its position in the list.
    ///
    /// # Errors
    ///
    /// [`OrgError::NotMember`] if the actor has no entry.
    pub fn with_member_role(&self, actor_id: Uuid, role_id: Uuid) -> OrgResult<Self> {
        let mut next = self.clone();
        let entry = next
            .users_access
            .iter_mut()
            .find(|ua| ua.actor_id == actor_id)
            .ok_or_else(|| self.not_member(actor_id))?;
        entry.role_id = role_id;
        Ok(next)
    }

    /// Return a copy whose audit log records an update by `updater`.
    pub fn touched_by(mut self, updater: Uuid) -> Self {
        self.log = self.log.touched_by(updater);
        self
    }

    /// Project this group as seen by one of its members.
    pub fn as_seen_by(&self, actor_id: Uuid) -> Option<GroupRole> {
        self.role_of(actor_id).map(|role_id| GroupRole {
            group_id: self.id,
            group_name: self.group_name.clone(),
            role_id,
        })
    }

    fn not_member(&self, actor_id: Uuid) -> OrgError {
        OrgError::NotMember {
            group_id: self.id,
            actor_id,
        }
    }
}

impl Document for Group {
    const COLLECTION: Collection = Collection::Groups;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl HasAuditLog for Group {
    fn audit_log(&self) -> &AuditLog {
        &self.log
    }
}

/// Normalize a country code for storage and lookup.
///
/// Blank input clears the code.
pub fn normalize_country(country: &str) -> Option<String> {
    let code = country.trim();
    (!code.is_empty()).then(|| code.to_uppercase())
}
