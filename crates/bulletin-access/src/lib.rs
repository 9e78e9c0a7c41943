//! # Bulletin Access
//!
//! This crate provides access resolution for the Bulletin Builder: who may
//! write which module in which groups, which resources an actor may read,
//! and the group, role and actor administration built on top of those
//! decisions.
//!
//! ## Overview
//!
//! The bulletin-access crate handles:
//! - **Access resolution**: [`AccessResolver`] answers "may actor A do
//!   action X on module M in groups G1..Gn"
//! - **Visibility**: [`VisibilityResolver`] filters any access-controlled
//!   collection down to what an actor may read
//! - **Group administration**: [`GroupAdministration`] creates groups and
//!   adds, removes and re-roles members
//! - **Roles and actors**: [`RoleCatalog`] and [`ActorDirectory`]
//! - **Errors**: the [`CoreError`] taxonomy shared by every core operation
//!
//! ## Decision Order
//!
//! ```text
//! actor exists?           no  -> NotFound
//! actor active?           no  -> Forbidden(inactive_actor)
//! global admin?           yes -> Allow
//! for each required group:
//!     member?             no  -> Forbidden(no_role_in_group, group)
//!     role grants action? no  -> Forbidden(missing_permission, group)
//! Allow
//! ```
//!
//! Writes to a restricted resource need the permission in **every** allowed
//! group; reads need membership in **any** of them.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bulletin_access::AccessResolver;
//! use bulletin_rbac::{Action, Module, PolicyConfig};
//! use bulletin_store::MemoryStore;
//! use uuid::Uuid;
//!
//! # async fn example(actor_id: Uuid, group_id: Uuid) -> bulletin_access::CoreResult<()> {
//! let store = Arc::new(MemoryStore::new());
//! let resolver = AccessResolver::from_store(store, Arc::new(PolicyConfig::from_env()));
//!
//! resolver
//!     .require(actor_id, Module::TemplateManagement, Action::Update, &[group_id])
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod actors;
pub mod error;
pub mod groups;
pub mod ids;
pub mod resolver;
pub mod roles;
pub mod visibility;

// Re-export main types for convenience
pub use actors::ActorDirectory;
pub use error::{CoreError, CoreResult, Denial, DenialReason};
pub use groups::{GroupAdministration, GroupUpdate, NewGroup};
pub use ids::{parse_id, parse_ids};
pub use resolver::{AccessResolver, Decision};
pub use roles::RoleCatalog;
pub use visibility::{restricted_to, Guarded, VisibilityResolver};
