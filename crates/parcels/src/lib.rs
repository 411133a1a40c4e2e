//! Parcel domain module.
//!
//! Status vocabulary, the append-only status log, the parcel aggregate and the
//! pure per-view filters the dashboards partition parcels with. No IO.

pub mod analytics;
pub mod filters;
pub mod parcel;
pub mod party;
pub mod request;
pub mod status;
pub mod status_log;

pub use analytics::{MonthlyShipments, ParcelAnalytics, StatusBucket};
pub use filters::{MyParcels, ParcelView, admin_search, filter_view, matches_search};
pub use parcel::{
    BlockStatusChanged, CancelParcel, ConfirmDelivery, CreateParcel, DeliveryConfirmed, Parcel,
    ParcelCancelled, ParcelCommand, ParcelCreated, ParcelEvent, SetBlocked, StatusChanged,
    UpdateStatus,
};
pub use party::{PartyProfile, PartyRef};
pub use request::ParcelRequest;
pub use status::ParcelStatus;
pub use status_log::{StatusLog, StatusLogEntry};
