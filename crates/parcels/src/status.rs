use core::str::FromStr;

use serde::{Deserialize, Serialize};

use parcelhub_core::DomainError;

/// Parcel status lifecycle.
///
/// `Requested → Approved → Dispatched → In Transit → Delivered`, with
/// `Cancelled` reachable from `Requested` only. `Delivered` and `Cancelled`
/// are terminal. Deserialization accepts any casing, like [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ParcelStatus {
    Requested,
    Approved,
    Dispatched,
    #[serde(rename = "In Transit")]
    InTransit,
    Delivered,
    Cancelled,
}

impl ParcelStatus {
    pub const ALL: [ParcelStatus; 6] = [
        ParcelStatus::Requested,
        ParcelStatus::Approved,
        ParcelStatus::Dispatched,
        ParcelStatus::InTransit,
        ParcelStatus::Delivered,
        ParcelStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParcelStatus::Requested => "Requested",
            ParcelStatus::Approved => "Approved",
            ParcelStatus::Dispatched => "Dispatched",
            ParcelStatus::InTransit => "In Transit",
            ParcelStatus::Delivered => "Delivered",
            ParcelStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ParcelStatus::Delivered | ParcelStatus::Cancelled)
    }

    /// Sender-initiated cancellation is only open while `Requested`.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, ParcelStatus::Requested)
    }

    /// Receivers confirm only what is `In Transit`.
    pub fn is_confirmable(&self) -> bool {
        matches!(self, ParcelStatus::InTransit)
    }
}

impl FromStr for ParcelStatus {
    type Err = DomainError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ParcelStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DomainError::validation(format!("unknown parcel status '{wanted}'")))
    }
}

impl TryFrom<String> for ParcelStatus {
    type Error = DomainError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl core::fmt::Display for ParcelStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
