//! Document store abstraction
//!
//! This module defines the persistence contract the core consumes: a
//! key-addressed document collection with query-by-predicate, insert,
//! atomic field update and delete.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::document::{Collection, Document};
use crate::filter::Filter;
use crate::patch::Patch;

/// Document store error types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Document does not exist
    #[error("Document not found: {collection}/{id}")]
    NotFound {
        /// Collection searched.
        collection: Collection,
        /// Missing id.
        id: Uuid,
    },

    /// A document with the same id already exists
    #[error("Duplicate document: {collection}/{id}")]
    Duplicate {
        /// Target collection.
        collection: Collection,
        /// Conflicting id.
        id: Uuid,
    },

    /// A patch precondition did not hold
    #[error("Precondition failed on {collection}/{id}: field '{field}' changed")]
    PreconditionFailed {
        /// Target collection.
        collection: Collection,
        /// Patched document.
        id: Uuid,
        /// First field whose value did not match.
        field: String,
    },

    /// Patch is malformed
    #[error("Invalid patch: {0}")]
    InvalidPatch(String),

    /// Document could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Backend failure (connection, driver, ...)
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations over typed documents.
///
/// Implementations must apply [`DocumentStore::update`] atomically per
/// document: preconditions and assignments are evaluated under the same
/// critical section. Reads are read-committed; they need not observe a
/// write that is still in flight.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by id.
    async fn get<D: Document>(&self, id: Uuid) -> StoreResult<Option<D>>;

    /// Fetch every document matching `filter`, in storage order.
    async fn find<D: Document>(&self, filter: &Filter) -> StoreResult<Vec<D>>;

    /// Insert a new document. Fails with [`StoreError::Duplicate`] if the id
    /// is taken.
    async fn insert<D: Document>(&self, doc: &D) -> StoreResult<()>;

    /// Atomically apply `patch` and return the updated document.
    async fn update<D: Document>(&self, id: Uuid, patch: &Patch) -> StoreResult<D>;

    /// Delete a document by id.
    async fn delete<D: Document>(&self, id: Uuid) -> StoreResult<()>;

    /// Fetch a document that must exist.
    async fn require<D: Document>(&self, id: Uuid) -> StoreResult<D> {
        self.get::<D>(id).await?.ok_or(StoreError::NotFound {
            collection: D::COLLECTION,
            id,
        })
    }
}

impl StoreError {
    /// Check if the error indicates a lost race (another writer got there
    /// first).
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            StoreError::Duplicate { .. } | StoreError::PreconditionFailed { .. }
        )
    }

    /// Get error code for diagnostics.
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::NotFound { .. } => "NOT_FOUND",
            StoreError::Duplicate { .. } => "DUPLICATE",
            StoreError::PreconditionFailed { .. } => "PRECONDITION_FAILED",
            StoreError::InvalidPatch(_) => "INVALID_PATCH",
            StoreError::Serialization(_) => "SERIALIZATION_ERROR",
            StoreError::Backend(_) => "BACKEND_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_classification() {
        let id = Uuid::now_v7();
        assert!(StoreError::Duplicate { collection: Collection::Groups, id }.is_conflict());
        assert!(StoreError::PreconditionFailed {
            collection: Collection::Groups,
            id,
            field: "users_access".to_string(),
        }
        .is_conflict());
        assert!(!StoreError::NotFound { collection: Collection::Groups, id }.is_conflict());
        assert!(!StoreError::Backend("down".to_string()).is_conflict());
    }

    #[test]
    fn test_error_display() {
        let id = Uuid::nil();
        let err = StoreError::NotFound { collection: Collection::Roles, id };
        assert_eq!(
            err.to_string(),
            "Document not found: roles/00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(err.error_code(), "NOT_FOUND");
    }
}
