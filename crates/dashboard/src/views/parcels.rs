//! Sender and receiver parcel lists.

use chrono::Utc;

use parcelhub_auth::{Session, authorize_command};
use parcelhub_client::ParcelApi;
use parcelhub_core::{Aggregate, DomainError, ParcelId};
use parcelhub_parcels::{
    CancelParcel, ConfirmDelivery, MyParcels, Parcel, ParcelCommand, ParcelView, filter_view,
};

use super::{ViewState, actor};
use crate::{ActionError, Notification};

pub const LOAD_FAILED: &str = "Failed to load parcels. Please try again later.";

/// One of the five status-filtered lists over `GET /parcels/me`.
#[derive(Debug, Clone)]
pub struct ParcelListView {
    view: ParcelView,
    search: String,
    state: ViewState<MyParcels>,
}

impl ParcelListView {
    pub fn new(view: ParcelView) -> Self {
        Self {
            view,
            search: String::new(),
            state: ViewState::Idle,
        }
    }

    pub fn view(&self) -> ParcelView {
        self.view
    }

    pub fn state(&self) -> &ViewState<MyParcels> {
        &self.state
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    pub async fn load(&mut self, api: &dyn ParcelApi) {
        self.state = ViewState::Loading;
        self.state = match api.my_parcels().await {
            Ok(parcels) => ViewState::Ready(parcels),
            Err(err) => {
                tracing::warn!(view = ?self.view, error = %err, "failed to load parcels");
                ViewState::Error(LOAD_FAILED.to_string())
            }
        };
    }

    /// Parcels this view shows, narrowed by the current search.
    pub fn visible(&self) -> Vec<&Parcel> {
        match &self.state {
            ViewState::Ready(parcels) => filter_view(parcels, self.view, &self.search),
            _ => Vec::new(),
        }
    }

    pub fn can_cancel(&self) -> bool {
        self.view == ParcelView::SenderOngoing
    }

    pub fn can_confirm(&self) -> bool {
        self.view == ParcelView::ReceiverConfirmable
    }

    /// Cancel one of the sender's parcels, then reload.
    pub async fn cancel(
        &mut self,
        api: &dyn ParcelApi,
        session: &Session,
        parcel_id: &ParcelId,
    ) -> Notification {
        match self.try_cancel(api, session, parcel_id).await {
            Ok(parcel) => {
                tracing::info!(tracking_id = %parcel.tracking_id(), "parcel cancelled");
                self.load(api).await;
                Notification::success("Delivery cancelled successfully")
                    .with_description("The parcel delivery has been cancelled.")
            }
            Err(err) => Notification::failure("Failed to cancel delivery", &err),
        }
    }

    /// Confirm delivery of one of the receiver's parcels, then reload.
    pub async fn confirm(
        &mut self,
        api: &dyn ParcelApi,
        session: &Session,
        parcel_id: &ParcelId,
    ) -> Notification {
        match self.try_confirm(api, session, parcel_id).await {
            Ok(parcel) => {
                tracing::info!(tracking_id = %parcel.tracking_id(), "delivery confirmed");
                self.load(api).await;
                Notification::success("Delivery confirmed successfully")
                    .with_description("The parcel has been marked as delivered.")
            }
            Err(err) => Notification::failure("Failed to confirm delivery", &err),
        }
    }

    async fn try_cancel(
        &self,
        api: &dyn ParcelApi,
        session: &Session,
        parcel_id: &ParcelId,
    ) -> Result<Parcel, ActionError> {
        let parcel = self.find(|p| &p.sent, parcel_id)?;
        let command = ParcelCommand::CancelParcel(CancelParcel {
            parcel_id: parcel_id.clone(),
            actor: actor(session, parcel.sender())?,
            occurred_at: Utc::now(),
        });
        authorize_command(session, &command)?;
        parcel.handle(&command)?;
        Ok(api.cancel_parcel(parcel_id).await?)
    }

    async fn try_confirm(
        &self,
        api: &dyn ParcelApi,
        session: &Session,
        parcel_id: &ParcelId,
    ) -> Result<Parcel, ActionError> {
        let parcel = self.find(|p| &p.received, parcel_id)?;
        let command = ParcelCommand::ConfirmDelivery(ConfirmDelivery {
            parcel_id: parcel_id.clone(),
            actor: actor(session, parcel.receiver())?,
            occurred_at: Utc::now(),
        });
        authorize_command(session, &command)?;
        parcel.handle(&command)?;
        Ok(api.confirm_delivery(parcel_id).await?)
    }

    fn find<'a>(
        &'a self,
        side: impl Fn(&'a MyParcels) -> &'a Vec<Parcel>,
        parcel_id: &ParcelId,
    ) -> Result<&'a Parcel, DomainError> {
        self.state
            .data()
            .and_then(|parcels| side(parcels).iter().find(|p| p.id_typed() == parcel_id))
            .ok_or_else(DomainError::not_found)
    }
}
