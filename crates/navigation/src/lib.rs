//! Role-driven dashboard navigation.
//!
//! Data flows one way: the static [`registry`] feeds [`compose_sidebar`],
//! whose output feeds [`generate_routes`]. Every function is pure; roles are
//! passed explicitly at each call site.

pub mod registry;
pub mod routes;
pub mod sidebar;

pub use registry::{Dashboard, NavItem, NavSection, ViewId, sections_for};
pub use routes::{RouteDefinition, generate_routes};
pub use sidebar::{compose_sidebar, compose_sidebar_for_claims};
