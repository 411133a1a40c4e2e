//! Authenticated session derived from the remote identity lookup.

use serde::{Deserialize, Serialize};

use parcelhub_core::UserId;

use crate::Role;

/// Body of the identity lookup response: `{ data: { email, roles } }`.
///
/// Roles arrive as raw strings so unknown claims can be dropped instead of
/// failing the whole lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityPayload {
    #[serde(default)]
    pub data: Option<IdentityData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityData {
    #[serde(default, rename = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// The current user's identity as seen by the dashboard.
///
/// Presence of an email means "logged in". Never cached: every guarded render
/// fetches a fresh one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user_id: Option<UserId>,
    email: Option<String>,
    roles: Vec<Role>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(email: impl Into<String>, roles: Vec<Role>) -> Self {
        Self {
            user_id: None,
            email: Some(email.into()),
            roles,
        }
    }

    pub fn with_user_id(mut self, id: UserId) -> Self {
        self.user_id = Some(id);
        self
    }

    pub fn from_payload(payload: IdentityPayload) -> Self {
        let Some(data) = payload.data else {
            return Self::anonymous();
        };
        let email = data.email.filter(|e| !e.trim().is_empty());
        let user_id = data.id.as_deref().and_then(|raw| match raw.parse::<UserId>() {
            Ok(id) => Some(id),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring malformed user id in identity payload");
                None
            }
        });
        Self {
            user_id,
            email,
            roles: Role::parse_claims(&data.roles),
        }
    }

    /// Account id, when the identity lookup reports one.
    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn is_authenticated(&self) -> bool {
        self.email.is_some()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_with_email_is_authenticated() {
        let payload: IdentityPayload = serde_json::from_str(
            r#"{"data":{"email":"ada@example.com","roles":["SENDER","PILOT"],"name":"Ada"}}"#,
        )
        .unwrap();
        let session = Session::from_payload(payload);
        assert!(session.is_authenticated());
        assert_eq!(session.email(), Some("ada@example.com"));
        assert_eq!(session.roles(), &[Role::Sender]);
        assert_eq!(session.user_id(), None);
    }

    #[test]
    fn user_id_is_read_when_well_formed() {
        let payload: IdentityPayload = serde_json::from_str(
            r#"{"data":{"_id":"0123456789ABCDEF01234567","email":"a@b.c","roles":[]}}"#,
        )
        .unwrap();
        let session = Session::from_payload(payload);
        assert_eq!(session.user_id().map(|id| id.as_str()), Some("0123456789abcdef01234567"));

        let bad: IdentityPayload =
            serde_json::from_str(r#"{"data":{"_id":"nope","email":"a@b.c"}}"#).unwrap();
        let session = Session::from_payload(bad);
        assert!(session.is_authenticated());
        assert_eq!(session.user_id(), None);
    }

    #[test]
    fn missing_data_or_blank_email_is_anonymous() {
        let empty: IdentityPayload = serde_json::from_str("{}").unwrap();
        assert!(!Session::from_payload(empty).is_authenticated());

        let blank: IdentityPayload =
            serde_json::from_str(r#"{"data":{"email":"  ","roles":["ADMIN"]}}"#).unwrap();
        let session = Session::from_payload(blank);
        assert!(!session.is_authenticated());
        assert!(session.has_role(Role::Admin));
    }
}
