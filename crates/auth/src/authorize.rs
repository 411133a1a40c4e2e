use serde::Serialize;
use thiserror::Error;

use crate::{Role, Session};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("not authenticated")]
    Unauthenticated,

    #[error("administrators may only access admin views (required: {required})")]
    AdminOnly { required: Role },

    #[error("forbidden: missing role '{0}'")]
    MissingRole(Role),
}

/// Command-side authorization contract.
///
/// Implemented by commands that may only be issued under a given role. The
/// dashboard checks this before sending the mutation.
pub trait CommandAuthorization {
    fn required_role(&self) -> Role;
}

/// The role-access policy.
///
/// - A holder of SUPER_ADMIN or ADMIN satisfies `required == ADMIN` and nothing
///   else; administrators never reach sender/receiver-gated views.
/// - Everyone else needs `required` in their roles, exactly.
pub fn has_role_access(roles: &[Role], required: Role) -> bool {
    if roles.iter().any(Role::is_administrative) {
        return required == Role::Admin;
    }
    roles.contains(&required)
}

/// Authorize a session against an optional role requirement.
///
/// - No IO
/// - No panics
/// - Authentication is checked before roles
pub fn authorize(session: &Session, required: Option<Role>) -> Result<(), AuthzError> {
    if !session.is_authenticated() {
        return Err(AuthzError::Unauthenticated);
    }

    let Some(required) = required else {
        return Ok(());
    };

    if has_role_access(session.roles(), required) {
        Ok(())
    } else if session.roles().iter().any(Role::is_administrative) {
        Err(AuthzError::AdminOnly { required })
    } else {
        Err(AuthzError::MissingRole(required))
    }
}

/// Authorize a command for the given session.
pub fn authorize_command<C: CommandAuthorization>(
    session: &Session,
    command: &C,
) -> Result<(), AuthzError> {
    authorize(session, Some(command.required_role()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an authorization decision, for logs and debugging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationExplanation {
    pub required_role: Option<Role>,
    pub granted: bool,
    pub reason: String,
    pub roles: Vec<Role>,
    pub denial_reason: Option<DenialReason>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DenialReason {
    pub kind: DenialKind,
    pub message: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    Unauthenticated,
    AdminOnly,
    MissingRole,
}

/// Explain why an authorization decision was made (or would be made).
///
/// Always agrees with [`authorize`]; it only adds the narrative.
pub fn explain_authorization(
    session: &Session,
    required: Option<Role>,
) -> AuthorizationExplanation {
    let roles = session.roles().to_vec();

    let denial_reason = match authorize(session, required) {
        Ok(()) => None,
        Err(AuthzError::Unauthenticated) => Some(DenialReason {
            kind: DenialKind::Unauthenticated,
            message: "No authenticated email in the current session".to_string(),
            suggestions: vec!["Log in before opening a dashboard view".to_string()],
        }),
        Err(AuthzError::AdminOnly { required }) => Some(DenialReason {
            kind: DenialKind::AdminOnly,
            message: format!("Administrative accounts cannot open {required} views"),
            suggestions: vec![
                "Use the admin dashboard".to_string(),
                format!("Use a separate account holding only the {required} role"),
            ],
        }),
        Err(AuthzError::MissingRole(required)) => Some(DenialReason {
            kind: DenialKind::MissingRole,
            message: format!("Missing required role: '{required}'"),
            suggestions: vec![format!("Ask an administrator to grant the {required} role")],
        }),
    };

    let reason = match (&denial_reason, required) {
        (Some(denial), _) => denial.message.clone(),
        (None, None) => "Authenticated; view has no role requirement".to_string(),
        (None, Some(Role::Admin)) if roles.contains(&Role::SuperAdmin) => {
            "Principal holds SUPER_ADMIN, which satisfies ADMIN".to_string()
        }
        (None, Some(required)) => format!("Principal holds role '{required}'"),
    };

    AuthorizationExplanation {
        required_role: required,
        granted: denial_reason.is_none(),
        reason,
        roles,
        denial_reason,
    }
}
