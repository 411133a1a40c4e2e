//! Application route table.
//!
//! Public pages resolve directly. Each dashboard sits behind a [`RouteGuard`]
//! whose children are generated from that dashboard's navigation tree.

use parcelhub_client::IdentityApi;
use parcelhub_core::TrackingId;
use parcelhub_navigation::{Dashboard, RouteDefinition, ViewId, generate_routes};

use crate::guard::{GuardOutcome, RouteGuard, guard};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicPage {
    Home,
    About,
    Contact,
    /// `/track` or `/track/{trackingId}`.
    Track(Option<TrackingId>),
    Login,
    Register,
    Verify,
    Unauthorized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Public(PublicPage),
    /// Bare dashboard path; redirects to the dashboard's index page once the
    /// guard lets the session in.
    DashboardIndex(Dashboard),
    Dashboard { dashboard: Dashboard, view: ViewId },
    NotFound,
}

/// Outcome of navigating to a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(Page),
    Loading,
    Redirect(&'static str),
}

#[derive(Debug, Clone)]
struct DashboardRoutes {
    guard: RouteGuard<Dashboard>,
    children: Vec<RouteDefinition>,
}

#[derive(Debug, Clone)]
pub struct AppRouter {
    dashboards: Vec<DashboardRoutes>,
}

impl Default for AppRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl AppRouter {
    pub fn new() -> Self {
        let dashboards = Dashboard::ALL
            .into_iter()
            .map(|dashboard| DashboardRoutes {
                guard: guard(dashboard, Some(dashboard.required_role())),
                children: generate_routes(&dashboard.sections()),
            })
            .collect();
        Self { dashboards }
    }

    /// Child routes registered under `dashboard`.
    pub fn children(&self, dashboard: Dashboard) -> &[RouteDefinition] {
        self.dashboards
            .iter()
            .find(|d| *d.guard.view() == dashboard)
            .map(|d| d.children.as_slice())
            .unwrap_or(&[])
    }

    /// Map a path to a page without consulting the session.
    pub fn resolve(&self, path: &str) -> Page {
        let path = normalize(path);

        if let Some(page) = resolve_public(path) {
            return Page::Public(page);
        }

        for routes in &self.dashboards {
            let dashboard = *routes.guard.view();
            let base = dashboard.base_path();
            if path == base {
                return Page::DashboardIndex(dashboard);
            }
            if let Some(child) = routes.children.iter().find(|r| r.path == path) {
                return Page::Dashboard {
                    dashboard,
                    view: child.view,
                };
            }
        }

        Page::NotFound
    }

    /// Resolve `path` and run the dashboard guard when the page needs one.
    pub async fn navigate(&self, path: &str, identity: &dyn IdentityApi) -> Navigation {
        let page = self.resolve(path);
        let dashboard = match &page {
            Page::DashboardIndex(d) | Page::Dashboard { dashboard: d, .. } => *d,
            Page::Public(_) | Page::NotFound => return Navigation::Render(page),
        };

        let Some(routes) = self.dashboards.iter().find(|r| *r.guard.view() == dashboard) else {
            return Navigation::Render(Page::NotFound);
        };

        match routes.guard.render(identity).await {
            GuardOutcome::Loading => Navigation::Loading,
            GuardOutcome::Redirect(to) => {
                tracing::debug!(path, to = to.path(), "guard redirect");
                Navigation::Redirect(to.path())
            }
            GuardOutcome::Mount(_) => match page {
                Page::DashboardIndex(d) => Navigation::Redirect(d.index_path()),
                other => Navigation::Render(other),
            },
        }
    }
}

/// Drop query/fragment and trailing slashes; keep `/` as is.
fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

fn resolve_public(path: &str) -> Option<PublicPage> {
    let page = match path {
        "/" => PublicPage::Home,
        "/about" => PublicPage::About,
        "/contact" => PublicPage::Contact,
        "/track" => PublicPage::Track(None),
        "/login" => PublicPage::Login,
        "/register" => PublicPage::Register,
        "/verify" => PublicPage::Verify,
        "/unauthorized" => PublicPage::Unauthorized,
        other => {
            let id = other.strip_prefix("/track/")?;
            if id.contains('/') {
                return None;
            }
            PublicPage::Track(id.parse().ok())
        }
    };
    Some(page)
}
