use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use parcelhub_auth::Role;

use crate::registry::{NavSection, admin_sections, receiver_sections, sender_sections};

/// Merged navigation tree for a user holding `roles`.
///
/// - No roles: empty tree.
/// - Any SUPER_ADMIN/ADMIN: exactly the admin tree, other roles ignored.
/// - Otherwise each role's tree is merged in declaration order. Sections with
///   the same title are combined; within a section the first item with a given
///   title wins.
pub fn compose_sidebar(roles: &[Role]) -> Vec<NavSection> {
    if roles.is_empty() {
        return Vec::new();
    }

    if roles.iter().any(Role::is_administrative) {
        return admin_sections();
    }

    let mut merged: Vec<NavSection> = Vec::new();
    let mut by_title: HashMap<Cow<'static, str>, usize> = HashMap::new();

    for role in roles {
        let sections = match role {
            Role::Sender => sender_sections(),
            Role::Receiver => receiver_sections(),
            Role::SuperAdmin | Role::Admin => continue,
        };

        for section in sections {
            match by_title.get(&section.title) {
                Some(&idx) => merge_items(&mut merged[idx], section),
                None => {
                    by_title.insert(section.title.clone(), merged.len());
                    merged.push(dedup_section(section));
                }
            }
        }
    }

    merged
}

/// Same as [`compose_sidebar`], starting from raw role claims.
///
/// Unrecognised claims contribute no sections.
pub fn compose_sidebar_for_claims<S: AsRef<str>>(claims: &[S]) -> Vec<NavSection> {
    compose_sidebar(&Role::parse_claims(claims))
}

fn merge_items(existing: &mut NavSection, incoming: NavSection) {
    let mut seen: HashSet<Cow<'static, str>> =
        existing.items.iter().map(|i| i.title.clone()).collect();
    for item in incoming.items {
        if seen.insert(item.title.clone()) {
            existing.items.push(item);
        } else {
            tracing::debug!(section = %existing.title, item = %item.title, "suppressing duplicate nav item");
        }
    }
}

fn dedup_section(section: NavSection) -> NavSection {
    let NavSection { title, items } = section;
    let mut out = NavSection { title, items: Vec::new() };
    merge_items(&mut out, NavSection { title: Cow::Borrowed(""), items });
    out
}
