//! Sender/receiver references on a parcel.

use serde::{Deserialize, Serialize};

use parcelhub_core::UserId;

/// Contact details of a populated party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyProfile {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// A sender or receiver as the API returns it: either a bare id or a populated
/// user document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PartyRef {
    Populated(PartyProfile),
    Reference(UserId),
}

impl PartyRef {
    pub fn id(&self) -> &UserId {
        match self {
            PartyRef::Populated(profile) => &profile.id,
            PartyRef::Reference(id) => id,
        }
    }

    /// Name when populated, otherwise an abbreviated id (`0123abcd...`).
    pub fn display_name(&self) -> String {
        match self {
            PartyRef::Populated(profile) => profile.name.clone(),
            PartyRef::Reference(id) => {
                let short: String = id.as_str().chars().take(8).collect();
                format!("{short}...")
            }
        }
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            PartyRef::Populated(profile) => Some(&profile.email),
            PartyRef::Reference(_) => None,
        }
    }
}

/// Display name for an optional party; absent renders as `N/A`.
pub fn display_name(party: Option<&PartyRef>) -> String {
    party.map_or_else(|| "N/A".to_string(), PartyRef::display_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_id_deserializes_as_reference() {
        let party: PartyRef = serde_json::from_str("\"0123456789abcdef01234567\"").unwrap();
        assert!(matches!(party, PartyRef::Reference(_)));
        assert_eq!(party.display_name(), "01234567...");
        assert_eq!(party.email(), None);
    }

    #[test]
    fn object_deserializes_as_populated() {
        let party: PartyRef = serde_json::from_value(serde_json::json!({
            "_id": "0123456789abcdef01234567",
            "name": "Linus",
            "email": "linus@example.com"
        }))
        .unwrap();
        assert_eq!(party.display_name(), "Linus");
        assert_eq!(party.email(), Some("linus@example.com"));
        assert_eq!(party.id().as_str(), "0123456789abcdef01234567");
    }

    #[test]
    fn missing_party_is_not_available() {
        assert_eq!(display_name(None), "N/A");
    }
}
