//! Wire envelopes and request payloads.

use serde::{Deserialize, Serialize};

use parcelhub_auth::{CommandAuthorization, Role};
use parcelhub_core::{Aggregate, DomainResult};
use parcelhub_parcels::{Parcel, ParcelCommand, ParcelEvent, ParcelStatus, StatusLog, UpdateStatus};

/// Standard response envelope: `{ statusCode, success, message, data, meta? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub status_code: u16,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PaginationMeta>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status_code: 200,
            success: true,
            message: message.into(),
            data,
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: PaginationMeta) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// Error bodies only reliably carry `message`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// `meta` of paginated listings. The user listing only sends `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total_pages: u32,
}

impl PaginationMeta {
    pub fn new(total: u64, query: PageQuery) -> Self {
        let limit = query.limit.max(1);
        Self {
            total,
            page: query.page,
            limit,
            total_pages: total.div_ceil(u64::from(limit)) as u32,
        }
    }

    /// Fill fields the server left out from the query that was sent.
    pub(crate) fn completed(self, query: PageQuery) -> Self {
        let filled = Self::new(self.total, query);
        Self {
            total: self.total,
            page: if self.page == 0 { filled.page } else { self.page },
            limit: if self.limit == 0 { filled.limit } else { self.limit },
            total_pages: if self.total_pages == 0 { filled.total_pages } else { self.total_pages },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

/// `page`/`limit` query parameters. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: u32,
    pub limit: u32,
}

impl PageQuery {
    pub const DEFAULT_LIMIT: u32 = 10;

    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Zero-based offset of the first item on this page.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.limit as usize
    }

    pub(crate) fn cache_key(&self, path: &str) -> String {
        format!("{path}?page={}&limit={}", self.page, self.limit)
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_LIMIT)
    }
}

/// Body of the admin `PATCH /parcels/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParcelPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_status: Option<ParcelStatus>,
    /// Full log with the new entry appended; only sent when one was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_logs: Option<StatusLog>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_blocked: Option<bool>,
}

impl UpdateParcelPayload {
    /// Run the status update against a copy of `parcel` and describe the
    /// result as a patch. Rejected updates never produce a payload.
    pub fn status_update(parcel: &Parcel, cmd: UpdateStatus) -> DomainResult<Self> {
        let mut next = parcel.clone();
        let events = next.execute(&ParcelCommand::UpdateStatus(cmd))?;
        let logged = events
            .iter()
            .any(|e| matches!(e, ParcelEvent::StatusChanged(c) if c.log_entry.is_some()));

        Ok(Self {
            current_status: Some(next.status()),
            status_logs: logged.then(|| next.status_logs().clone()),
            is_blocked: None,
        })
    }

    /// Flip the blocked flag.
    pub fn block_toggle(parcel: &Parcel) -> Self {
        Self {
            is_blocked: Some(!parcel.is_blocked()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl CommandAuthorization for UpdateParcelPayload {
    fn required_role(&self) -> Role {
        Role::Admin
    }
}
