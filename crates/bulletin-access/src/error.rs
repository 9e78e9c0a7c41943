//! Error types for access and lifecycle operations
//!
//! This module defines the error taxonomy every core operation returns.
//! Mapping these to transport-level responses is the caller's concern.

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use bulletin_org::OrgError;
use bulletin_rbac::{Action, Module};
use bulletin_store::StoreError;

/// Why an authorization check failed.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// The actor is deactivated
    InactiveActor,
    /// The actor holds no (resolvable) role in the group
    NoRoleInGroup,
    /// The actor's role does not grant the action
    MissingPermission,
    /// Only a global admin may do this
    GlobalAdminRequired,
}

impl DenialReason {
    /// Get the string representation of the reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            DenialReason::InactiveActor => "inactive_actor",
            DenialReason::NoRoleInGroup => "no_role_in_group",
            DenialReason::MissingPermission => "missing_permission",
            DenialReason::GlobalAdminRequired => "global_admin_required",
        }
    }
}

/// Diagnostic detail of a denied check.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Denial {
    /// Actor that was denied
    pub actor_id: Uuid,
    /// Module checked
    pub module: Module,
    /// Action checked
    pub action: Action,
    /// First group the check failed in, if the check was group-scoped
    pub group_id: Option<Uuid>,
    /// Why the check failed
    pub reason: DenialReason,
}

impl Denial {
    /// Create a denial.
    pub fn new(actor_id: Uuid, module: Module, action: Action, reason: DenialReason) -> Self {
        Self {
            actor_id,
            module,
            action,
            group_id: None,
            reason,
        }
    }

    /// Set the failing group.
    pub fn in_group(mut self, group_id: Uuid) -> Self {
        self.group_id = Some(group_id);
        self
    }
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "actor {} may not {} in {}",
            self.actor_id,
            self.action.as_str(),
            self.module.as_str()
        )?;
        if let Some(group_id) = self.group_id {
            write!(f, " (group {group_id})")?;
        }
        write!(f, ": {}", self.reason.as_str())
    }
}

/// Core error types.
///
/// - `Forbidden`: authorization denied; always names module, action and group
/// - `NotFound`: referenced master, version, group, role or actor is absent
/// - `Conflict`: duplicate membership, or a concurrent writer won a race
/// - `InvalidArgument`: malformed id or invalid enum value
/// - `Inconsistent`: stored state violates an invariant (never auto-repaired)
#[derive(Debug, Error)]
pub enum CoreError {
    /// Authorization denied
    #[error("Forbidden: {0}")]
    Forbidden(Denial),

    /// Referenced entity does not exist
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind of entity (collection name or "membership")
        kind: String,
        /// Identifier looked up
        id: String,
    },

    /// Duplicate or lost race
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Malformed input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Persisted state violates an invariant
    #[error("Inconsistent state: {0}")]
    Inconsistent(String),

    /// Store failure not covered by the other variants
    #[error("Store error: {0}")]
    Store(StoreError),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Build a `NotFound` error.
    pub fn not_found(kind: impl Into<String>, id: impl fmt::Display) -> Self {
        CoreError::NotFound {
            kind: kind.into(),
            id: id.to_string(),
        }
    }

    /// Denial detail, if this is a `Forbidden` error.
    pub fn denial(&self) -> Option<&Denial> {
        match self {
            CoreError::Forbidden(denial) => Some(denial),
            _ => None,
        }
    }

    /// Check if this error should be logged at error level.
    ///
    /// Denials, missing entities, conflicts and bad input are expected
    /// outcomes; only broken invariants and backend failures are not.
    pub fn is_server_error(&self) -> bool {
        matches!(self, CoreError::Inconsistent(_) | CoreError::Store(_))
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            CoreError::Forbidden(_) => "FORBIDDEN",
            CoreError::NotFound { .. } => "NOT_FOUND",
            CoreError::Conflict(_) => "CONFLICT",
            CoreError::InvalidArgument(_) => "INVALID_ARGUMENT",
            CoreError::Inconsistent(_) => "INCONSISTENT",
            CoreError::Store(_) => "STORE_ERROR",
        }
    }
}

impl From<Denial> for CoreError {
    fn from(denial: Denial) -> Self {
        CoreError::Forbidden(denial)
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { collection, id } => CoreError::not_found(collection.as_str(), id),
            StoreError::Duplicate { .. } | StoreError::PreconditionFailed { .. } => {
                CoreError::Conflict(err.to_string())
            }
            other => CoreError::Store(other),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Store(StoreError::Serialization(err.to_string()))
    }
}

impl From<OrgError> for CoreError {
    fn from(err: OrgError) -> Self {
        match err {
            OrgError::AlreadyMember { .. } => CoreError::Conflict(err.to_string()),
            OrgError::NotMember { actor_id, .. } => CoreError::not_found("membership", actor_id),
            OrgError::Store(store) => store.into(),
        }
    }
}
