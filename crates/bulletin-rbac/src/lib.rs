//! # Bulletin RBAC (Role-Based Access Control)
//!
//! This crate provides the permission model of the Bulletin Builder: the
//! modules and actions a role can be granted, roles themselves, and the
//! policy naming the roles with special meaning.
//!
//! ## Overview
//!
//! The bulletin-rbac crate handles:
//! - **Modules**: Functional areas (templates, bulletins, cards, groups, ...)
//! - **Actions**: Create, read, update, delete
//! - **Permission Matrices**: Module-to-actions grants held by a role
//! - **Policy**: Global admin and group admin role names
//!
//! ## Architecture
//!
//! ```text
//! Role = name + { module -> {actions} }
//!
//! Examples:
//!   "template_management:create"   - Create templates
//!   "access_control:delete"        - Remove group members
//! ```
//!
//! ## Global Admins
//!
//! A role whose name is listed in [`PolicyConfig::global_admin_roles`]
//! (by default `superadmin`) is granted every action on every module,
//! whatever its matrix says. Everything else fails closed: a module or
//! action the matrix does not mention is denied.
//!
//! ## Usage
//!
//! ```rust
//! use bulletin_rbac::{has_permission, Action, Module, PolicyConfig, Role};
//!
//! let policy = PolicyConfig::default();
//! let editor = Role::new("editor")
//!     .with_permission(Module::TemplateManagement, [Action::Create, Action::Read]);
//!
//! assert!(has_permission(&editor, Module::TemplateManagement, Action::Create, &policy));
//! assert!(!has_permission(&editor, Module::TemplateManagement, Action::Delete, &policy));
//! ```

pub mod actions;
pub mod config;
pub mod modules;
pub mod permissions;
pub mod role;

// Re-export main types for convenience
pub use actions::Action;
pub use config::{ConfigError, PolicyConfig};
pub use modules::Module;
pub use permissions::{Permission, PermissionMatrix};
pub use role::{has_permission, Role};
