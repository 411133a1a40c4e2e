//! `parcelhub-dashboard`: route guard, route table and page view-models.
//!
//! Views take the client's API traits as trait objects; [`start`] wires them
//! to the HTTP client and installs tracing.

use std::sync::Arc;

use anyhow::Context;
use thiserror::Error;

use parcelhub_auth::AuthzError;
use parcelhub_client::{ApiError, ClientConfig, HttpClient};
use parcelhub_core::DomainError;

pub mod guard;
pub mod notify;
pub mod router;
pub mod views;

pub use guard::{GuardOutcome, Redirect, RouteGuard, SessionState, guard};
pub use notify::{GENERIC_FAILURE, Notification, NotificationLevel};
pub use router::{AppRouter, Navigation, Page, PublicPage};

/// Why a user action did not go through.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ActionError {
    /// The session may not perform this action; nothing was sent.
    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<DomainError> for ActionError {
    fn from(err: DomainError) -> Self {
        ActionError::Api(ApiError::Rejected(err))
    }
}

impl ActionError {
    /// Text to show the user, when the failure carries any.
    pub fn user_message(&self) -> Option<String> {
        match self {
            ActionError::Forbidden(err) => Some(err.to_string()),
            ActionError::Api(err) => err.server_message(),
        }
    }
}

/// A started dashboard: the shared HTTP client plus the route table.
#[derive(Debug, Clone)]
pub struct App {
    client: Arc<HttpClient>,
    router: AppRouter,
}

impl App {
    pub fn client(&self) -> &Arc<HttpClient> {
        &self.client
    }

    pub fn router(&self) -> &AppRouter {
        &self.router
    }

    /// Navigate to `path` using a fresh identity lookup.
    pub async fn navigate(&self, path: &str) -> Navigation {
        self.router.navigate(path, self.client.as_ref()).await
    }
}

/// Install tracing and build the client and route table.
pub fn start(config: ClientConfig) -> anyhow::Result<App> {
    parcelhub_observability::init();

    let base_url = config.base_url.clone();
    let client = HttpClient::new(config)
        .with_context(|| format!("failed to build API client for {base_url}"))?;

    tracing::info!(%base_url, "dashboard started");
    Ok(App {
        client: Arc::new(client),
        router: AppRouter::new(),
    })
}

/// [`start`] with configuration read from the environment.
pub fn start_from_env() -> anyhow::Result<App> {
    parcelhub_observability::init();
    let config = ClientConfig::from_env().context("invalid client configuration")?;
    start(config)
}
