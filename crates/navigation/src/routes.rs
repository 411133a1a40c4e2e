use serde::Serialize;

use crate::registry::{NavSection, ViewId};

/// A router-consumable pairing of a path with the view it renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RouteDefinition {
    pub path: String,
    pub view: ViewId,
}

/// One route per navigation item, in section then item order.
///
/// Items without a path or view are skipped rather than treated as errors.
pub fn generate_routes(sections: &[NavSection]) -> Vec<RouteDefinition> {
    sections
        .iter()
        .flat_map(|section| section.items.iter())
        .filter_map(|item| {
            let path = item.url.trim();
            match item.view {
                Some(view) if !path.is_empty() => Some(RouteDefinition {
                    path: path.to_string(),
                    view,
                }),
                _ => {
                    tracing::debug!(item = %item.title, "skipping nav item without path or view");
                    None
                }
            }
        })
        .collect()
}
