//! API surface the dashboard depends on.
//!
//! [`crate::HttpClient`] implements all of these; views take them as trait
//! objects so they can run against in-memory fakes.

use parcelhub_auth::{Session, UpdateUser, User};
use parcelhub_core::{ParcelId, TrackingId, UserId};
use parcelhub_parcels::{MyParcels, Parcel, ParcelRequest};

use crate::{ApiError, PageQuery, Paginated, UpdateParcelPayload};

#[async_trait::async_trait]
pub trait IdentityApi: Send + Sync {
    /// Fresh identity lookup; never served from cache.
    async fn current_session(&self) -> Result<Session, ApiError>;
}

#[async_trait::async_trait]
pub trait ParcelApi: Send + Sync {
    /// `POST /parcels`. Invalid requests are rejected before sending.
    async fn send_parcel(&self, request: &ParcelRequest) -> Result<Parcel, ApiError>;

    /// `GET /parcels/track/{trackingId}`; public.
    async fn track_parcel(&self, tracking_id: &TrackingId) -> Result<Parcel, ApiError>;

    /// `GET /parcels/me`.
    async fn my_parcels(&self) -> Result<MyParcels, ApiError>;

    /// `GET /parcels?page&limit`; admin.
    async fn all_parcels(&self, page: PageQuery) -> Result<Paginated<Parcel>, ApiError>;

    /// `PATCH /parcels/{id}`; admin.
    async fn update_parcel(
        &self,
        parcel_id: &ParcelId,
        payload: &UpdateParcelPayload,
    ) -> Result<Parcel, ApiError>;

    /// `POST /parcels/{id}/cancel`; sender.
    async fn cancel_parcel(&self, parcel_id: &ParcelId) -> Result<Parcel, ApiError>;

    /// `POST /parcels/{id}/confirm-delivery`; receiver.
    async fn confirm_delivery(&self, parcel_id: &ParcelId) -> Result<Parcel, ApiError>;
}

#[async_trait::async_trait]
pub trait UserApi: Send + Sync {
    /// `GET /user/all-users?page&limit`; admin.
    async fn all_users(&self, page: PageQuery) -> Result<Paginated<User>, ApiError>;

    /// `PATCH /user/{id}`; admin.
    async fn update_user(&self, user_id: &UserId, patch: &UpdateUser) -> Result<User, ApiError>;
}
