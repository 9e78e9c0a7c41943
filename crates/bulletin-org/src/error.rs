//! Membership error types.

use thiserror::Error;
use uuid::Uuid;

use bulletin_store::StoreError;

/// Group membership error types.
#[derive(Debug, Error)]
pub enum OrgError {
    /// Actor is already a member of the group
    #[error("Actor {actor_id} is already a member of group {group_id}")]
    AlreadyMember {
        /// Target group.
        group_id: Uuid,
        /// Actor being added.
        actor_id: Uuid,
    },

    /// Actor is not a member of the group
    #[error("Actor {actor_id} is not a member of group {group_id}")]
    NotMember {
        /// Target group.
        group_id: Uuid,
        /// Actor looked up.
        actor_id: Uuid,
    },

    /// Underlying store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for membership operations.
pub type OrgResult<T> = Result<T, OrgError>;
