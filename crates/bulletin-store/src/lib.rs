//! # Bulletin Store
//!
//! This crate provides the persistence contract for the Bulletin Builder
//! core: a key-addressed document collection with query-by-predicate,
//! shared by the access-control and versioning crates.
//!
//! ## Overview
//!
//! The bulletin-store crate handles:
//! - **Documents**: Typed values living in a named [`Collection`]
//! - **Filters**: Storage-agnostic predicates ([`Filter`])
//! - **Patches**: Atomic, precondition-guarded field updates ([`Patch`])
//! - **Sub-documents**: [`AccessConfig`] and [`AuditLog`], embedded in
//!   every access-controlled resource
//!
//! ## Features
//!
//! - `memory` (default): In-memory backend for single-process apps and tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bulletin_store::{DocumentStore, Filter, MemoryStore, Patch};
//! # use bulletin_store::{Collection, Document};
//! # use serde::{Deserialize, Serialize};
//! # use uuid::Uuid;
//! # #[derive(Clone, Serialize, Deserialize)]
//! # struct Card { id: Uuid, status: String }
//! # impl Document for Card {
//! #     const COLLECTION: Collection = Collection::Cards;
//! #     fn id(&self) -> Uuid { self.id }
//! # }
//!
//! async fn example() -> bulletin_store::StoreResult<()> {
//!     let store = MemoryStore::new();
//!     let card = Card { id: Uuid::now_v7(), status: "draft".into() };
//!     store.insert(&card).await?;
//!
//!     let drafts: Vec<Card> = store.find(&Filter::eq("status", "draft")).await?;
//!     let published: Card = store
//!         .update(card.id, &Patch::new().when("status", "draft").set("status", "published"))
//!         .await?;
//!     # let _ = (drafts, published);
//!     Ok(())
//! }
//! ```

pub mod access;
pub mod audit;
pub mod document;
pub mod filter;
pub mod patch;
pub mod store;

#[cfg(feature = "memory")]
pub mod memory;

// Re-export main types
pub use access::{AccessConfig, AccessType};
pub use audit::AuditLog;
pub use document::{Collection, Document, HasAccessConfig, HasAuditLog};
pub use filter::Filter;
pub use patch::Patch;
pub use store::{DocumentStore, StoreError, StoreResult};

#[cfg(feature = "memory")]
pub use memory::MemoryStore;
