//! Route guard: gates a view behind authentication and an optional role.

use parcelhub_auth::{AuthzError, Role, Session, authorize, explain_authorization};
use parcelhub_client::{ApiError, IdentityApi};

/// Result of the identity lookup as seen by a render.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Pending,
    Resolved(Session),
    Failed(ApiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    Login,
    Unauthorized,
}

impl Redirect {
    pub fn path(&self) -> &'static str {
        match self {
            Redirect::Login => "/login",
            Redirect::Unauthorized => "/unauthorized",
        }
    }
}

/// What a guarded render produces. The inner view only appears in `Mount`.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardOutcome<V> {
    Loading,
    Redirect(Redirect),
    Mount(V),
}

/// A view wrapped with an optional role requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard<V> {
    view: V,
    required: Option<Role>,
}

/// Wrap `view` so it only mounts for sessions satisfying `required`.
pub fn guard<V>(view: V, required: Option<Role>) -> RouteGuard<V> {
    RouteGuard::new(view, required)
}

impl<V> RouteGuard<V> {
    pub fn new(view: V, required: Option<Role>) -> Self {
        Self { view, required }
    }

    pub fn required_role(&self) -> Option<Role> {
        self.required
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Decide the outcome for an identity lookup state. Pure.
    ///
    /// A terminal lookup failure counts as "not logged in"; a transient one
    /// keeps the view loading until the next render.
    pub fn evaluate(&self, state: &SessionState) -> GuardOutcome<&V> {
        let session = match state {
            SessionState::Pending => return GuardOutcome::Loading,
            SessionState::Failed(err) if err.is_terminal() => {
                tracing::debug!(error = %err, "identity lookup failed; redirecting to login");
                return GuardOutcome::Redirect(Redirect::Login);
            }
            SessionState::Failed(err) => {
                tracing::warn!(error = %err, "identity lookup failed transiently");
                return GuardOutcome::Loading;
            }
            SessionState::Resolved(session) => session,
        };

        match authorize(session, self.required) {
            Ok(()) => GuardOutcome::Mount(&self.view),
            Err(AuthzError::Unauthenticated) => GuardOutcome::Redirect(Redirect::Login),
            Err(_) => {
                let explanation = explain_authorization(session, self.required);
                tracing::info!(
                    required = ?self.required,
                    roles = ?explanation.roles,
                    reason = %explanation.reason,
                    "access denied"
                );
                GuardOutcome::Redirect(Redirect::Unauthorized)
            }
        }
    }

    /// Fetch a fresh session and evaluate it.
    pub async fn render(&self, identity: &dyn IdentityApi) -> GuardOutcome<&V> {
        let state = match identity.current_session().await {
            Ok(session) => SessionState::Resolved(session),
            Err(err) => SessionState::Failed(err),
        };
        self.evaluate(&state)
    }
}
