//! `parcelhub-client`: typed access to the parcel delivery REST API.
//!
//! The backend owns all authoritative state. This crate only issues requests,
//! decodes the response envelopes, keeps a coarse query cache and rejects
//! mutations that the domain rules already know would fail.

pub mod api;
pub mod cache;
pub mod config;
pub mod dto;
pub mod error;
pub mod http;

pub use api::{IdentityApi, ParcelApi, UserApi};
pub use cache::{CacheTag, QueryCache};
pub use config::ClientConfig;
pub use dto::{ApiResponse, PageQuery, Paginated, PaginationMeta, UpdateParcelPayload};
pub use error::ApiError;
pub use http::HttpClient;
