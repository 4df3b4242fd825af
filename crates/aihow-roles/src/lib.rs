//! Admin Role Registry for AIhow
//!
//! Provides the coarse-grained half of admin authorization: a fixed table of
//! roles, each carrying a set of capability tokens and a list of route glob
//! patterns. Roles are built once at startup and never mutated.
//!
//! ## Usage
//!
//! ```rust
//! use aihow_roles::{RoleRegistry, CONTENT_ADMIN};
//!
//! let registry = RoleRegistry::builtin().unwrap();
//! assert!(registry.can_access_route(CONTENT_ADMIN, "/admin/content/42").unwrap());
//! assert!(!registry.can_access_route(CONTENT_ADMIN, "/admin/system/flags").unwrap());
//! ```

pub mod error;
pub mod registry;
pub mod role;
pub mod route_pattern;

pub use error::{Result, RoleError};
pub use registry::RoleRegistry;
pub use role::{
    builtin_definitions, Role, RoleDefinition, ALL, CONTENT_ADMIN, SUPER_ADMIN, SYSTEM_ADMIN,
};
pub use route_pattern::RoutePattern;
