//! # Bulletin Organization Management
//!
//! This crate provides actors, groups and group membership for the Bulletin
//! Builder.
//!
//! ## Overview
//!
//! The bulletin-org crate handles:
//! - **Actors**: Users known to the platform, activated or deactivated
//! - **Groups**: Tenancy units holding ordered (actor, role) pairs
//! - **Membership lookups**: Groups of an actor, role in a group, global
//!   admin and group admin status
//!
//! ## Architecture
//!
//! ```text
//! Actor ──< UserAccess >── Group
//!               │
//!               └─ Role (bulletin-rbac)
//! ```
//!
//! Membership changes are pure: [`Group::with_member`],
//! [`Group::without_member`] and [`Group::with_member_role`] return a new
//! value, which the caller persists.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bulletin_org::{Group, MembershipStore};
//! use bulletin_rbac::{PolicyConfig, Role};
//! use bulletin_store::{DocumentStore, MemoryStore};
//! use uuid::Uuid;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::new());
//! let members = MembershipStore::new(store.clone(), Arc::new(PolicyConfig::default()));
//!
//! let editor = Role::new("editor");
//! store.insert(&editor).await?;
//!
//! let actor = Uuid::now_v7();
//! let group = Group::new("Regional Office", actor).with_member(actor, editor.id)?;
//! store.insert(&group).await?;
//!
//! assert_eq!(members.role_of(actor, group.id).await?, Some(editor.id));
//! # Ok(())
//! # }
//! ```
//!
//! ## Cross-Crate Integration
//!
//! This crate is designed to work with:
//! - `bulletin-rbac`: Roles and the admin role policy
//! - `bulletin-access`: Authorization decisions built on these lookups

pub mod actor;
pub mod error;
pub mod group;
pub mod membership;

// Re-export main types for convenience
pub use actor::{Actor, ActorProfile};
pub use error::{OrgError, OrgResult};
pub use group::{normalize_country, Group, GroupRole, UserAccess};
pub use membership::{member_filter, MembershipStore, MEMBER_PATH};
