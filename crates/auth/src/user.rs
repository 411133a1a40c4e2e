//! User accounts as managed from the admin dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use parcelhub_core::UserId;

use crate::{CommandAuthorization, Role};

/// Whether an account may log in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountStatus {
    #[default]
    Active,
    Inactive,
}

/// A user as returned by the admin user listing.
///
/// Password hashes and auth provider records are ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub is_active: AccountStatus,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Case-insensitive substring match over name, email and role names.
    ///
    /// A blank query matches everyone.
    pub fn matches_search(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle)
            || self.email.to_lowercase().contains(&needle)
            || self
                .roles
                .iter()
                .any(|r| r.as_str().to_lowercase().contains(&needle))
    }
}

/// Partial update for `PATCH /user/{id}`; only set fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<Role>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<AccountStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
}

impl UpdateUser {
    /// Pre-fill an edit form from the user's current values.
    pub fn from_user(user: &User) -> Self {
        Self {
            name: Some(user.name.clone()),
            email: Some(user.email.clone()),
            roles: Some(user.roles.clone()),
            is_active: Some(user.is_active),
            is_deleted: Some(user.is_deleted),
            is_verified: Some(user.is_verified),
        }
    }

    /// Add `role` if absent, remove it if present.
    ///
    /// Starts from the patch's roles when set, otherwise from `current`.
    pub fn toggle_role(&mut self, current: &[Role], role: Role) {
        let mut roles = self.roles.take().unwrap_or_else(|| current.to_vec());
        if roles.contains(&role) {
            roles.retain(|r| *r != role);
        } else {
            roles.push(role);
        }
        self.roles = Some(roles);
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl CommandAuthorization for UpdateUser {
    fn required_role(&self) -> Role {
        Role::Admin
    }
}
