//! `parcelhub-auth`: pure authentication/authorization boundary.
//!
//! Decoupled from HTTP: the client crate fetches identity, this crate decides
//! what that identity may see and do.

pub mod authorize;
pub mod roles;
pub mod session;
pub mod user;

pub use authorize::{
    AuthorizationExplanation, AuthzError, CommandAuthorization, DenialKind, authorize,
    authorize_command, explain_authorization, has_role_access,
};
pub use roles::Role;
pub use session::{IdentityPayload, Session};
pub use user::{AccountStatus, UpdateUser, User};
