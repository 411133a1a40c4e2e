//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Length of a backend object identifier in hex characters.
pub const OBJECT_ID_LEN: usize = 24;

/// A 24-character hexadecimal identifier as issued by the backend.
///
/// Stored lowercase; parsing accepts either case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
    /// Generate a fresh, time-ordered identifier.
    ///
    /// Prefer parsing fixed ids in tests for determinism.
    pub fn generate() -> Self {
        let hex = Uuid::now_v7().simple().to_string();
        Self(hex.chars().take(OBJECT_ID_LEN).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(s: &str) -> bool {
        s.len() == OBJECT_ID_LEN && s.chars().all(|c| c.is_ascii_hexdigit())
    }
}

impl FromStr for ObjectId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != OBJECT_ID_LEN {
            return Err(DomainError::invalid_id(format!(
                "expected {OBJECT_ID_LEN} characters, got {}",
                s.len()
            )));
        }
        if !Self::is_valid(s) {
            return Err(DomainError::invalid_id(format!("'{s}' is not hexadecimal")));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }
}

impl TryFrom<String> for ObjectId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ObjectId> for String {
    fn from(value: ObjectId) -> Self {
        value.0
    }
}

impl core::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a user account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(ObjectId);

/// Identifier of a parcel record (not the public tracking id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParcelId(ObjectId);

macro_rules! impl_object_id_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub fn generate() -> Self {
                Self(ObjectId::generate())
            }

            pub fn from_object_id(id: ObjectId) -> Self {
                Self(id)
            }

            pub fn as_object_id(&self) -> &ObjectId {
                &self.0
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<ObjectId> for $t {
            fn from(value: ObjectId) -> Self {
                Self(value)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let id = ObjectId::from_str(s)
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e.message())))?;
                Ok(Self(id))
            }
        }
    };
}

impl_object_id_newtype!(UserId, "UserId");
impl_object_id_newtype!(ParcelId, "ParcelId");

/// Public tracking identifier; looked up without authentication.
///
/// The default (empty) value only appears on parcels that do not exist yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingId(String);

impl TrackingId {
    /// Generate a tracking id of the form `TRK-YYYYMMDD-XXXXXXXX`.
    pub fn generate(now: DateTime<Utc>) -> Self {
        let suffix: String = Uuid::now_v7()
            .simple()
            .to_string()
            .chars()
            .rev()
            .take(8)
            .collect::<String>()
            .to_ascii_uppercase();
        Self(format!("TRK-{}-{}", now.format("%Y%m%d"), suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TrackingId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_id("tracking id must not be blank"));
        }
        if trimmed.contains('/') {
            return Err(DomainError::invalid_id("tracking id must not contain '/'"));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl core::fmt::Display for TrackingId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
