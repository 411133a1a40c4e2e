//! Append-only status history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use parcelhub_core::{DomainError, DomainResult, UserId};

use crate::ParcelStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusLogEntry {
    pub status: ParcelStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl StatusLogEntry {
    pub fn new(status: ParcelStatus, timestamp: DateTime<Utc>) -> Self {
        Self {
            status,
            timestamp,
            updated_by: None,
            location: None,
            note: None,
        }
    }

    pub fn recorded_by(mut self, user: UserId) -> Self {
        self.updated_by = Some(user);
        self
    }

    /// Attach location/note; blank text counts as absent.
    pub fn with_details(mut self, location: Option<&str>, note: Option<&str>) -> Self {
        self.location = non_blank(location);
        self.note = non_blank(note);
        self
    }
}

pub(crate) fn non_blank(text: Option<&str>) -> Option<String> {
    text.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string)
}

/// Ordered status history; timestamps never decrease.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusLog(Vec<StatusLogEntry>);

impl StatusLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log from entries, rejecting out-of-order timestamps.
    pub fn from_entries(entries: Vec<StatusLogEntry>) -> DomainResult<Self> {
        let log = Self(entries);
        log.verify()?;
        Ok(log)
    }

    pub fn entries(&self) -> &[StatusLogEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Most recent entry. Status reconstruction must use this, never an
    /// arbitrary entry.
    pub fn latest(&self) -> Option<&StatusLogEntry> {
        self.0.last()
    }

    pub fn latest_status(&self) -> Option<ParcelStatus> {
        self.latest().map(|e| e.status)
    }

    pub(crate) fn check_append(&self, entry: &StatusLogEntry) -> DomainResult<()> {
        match self.latest() {
            Some(last) if entry.timestamp < last.timestamp => Err(DomainError::invariant(format!(
                "status log entry at {} precedes latest entry at {}",
                entry.timestamp, last.timestamp
            ))),
            _ => Ok(()),
        }
    }

    pub(crate) fn push_unchecked(&mut self, entry: StatusLogEntry) {
        self.0.push(entry);
    }

    /// Append an entry, keeping timestamps monotonic.
    pub fn append(&mut self, entry: StatusLogEntry) -> DomainResult<()> {
        self.check_append(&entry)?;
        self.0.push(entry);
        Ok(())
    }

    /// Check timestamp monotonicity across the whole log.
    pub fn verify(&self) -> DomainResult<()> {
        for pair in self.0.windows(2) {
            if pair[1].timestamp < pair[0].timestamp {
                return Err(DomainError::invariant(format!(
                    "status log out of order: {} after {}",
                    pair[1].timestamp, pair[0].timestamp
                )));
            }
        }
        Ok(())
    }
}
