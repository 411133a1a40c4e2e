//! Page view-models.
//!
//! Each view owns its local state and talks to the backend only through the
//! client's API traits. Fetch failures become an inline [`ViewState::Error`];
//! mutation failures become a [`crate::Notification`] and leave the loaded
//! data untouched.

use parcelhub_auth::Session;
use parcelhub_core::{DomainError, DomainResult, UserId};
use parcelhub_navigation::ViewId;
use parcelhub_parcels::{ParcelView, PartyRef};

pub mod admin;
pub mod parcels;
pub mod send;
pub mod track;

pub use admin::{AnalyticsView, ManageParcelsView, ManageUsersView, StatusForm};
pub use parcels::ParcelListView;
pub use send::SendParcelForm;
pub use track::TrackParcelView;

/// Remote data as seen by a view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(String),
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        ViewState::Idle
    }
}

impl<T> ViewState<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            ViewState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Error(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }
}

/// Which view-model a navigation item mounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    SendParcel,
    Parcels(ParcelView),
    Analytics,
    ManageParcels,
    ManageUsers,
}

impl Screen {
    pub fn for_view(view: ViewId) -> Screen {
        match view {
            ViewId::Analytics => Screen::Analytics,
            ViewId::ManageParcels => Screen::ManageParcels,
            ViewId::ManageUsers => Screen::ManageUsers,
            ViewId::SendParcel => Screen::SendParcel,
            // Sender's "My parcels" page lists the cancellable ones.
            ViewId::ParcelDetails => Screen::Parcels(ParcelView::SenderOngoing),
            ViewId::SenderHistory => Screen::Parcels(ParcelView::SenderHistory),
            ViewId::IncomingParcels => Screen::Parcels(ParcelView::ReceiverIncoming),
            ViewId::ConfirmDelivery => Screen::Parcels(ParcelView::ReceiverConfirmable),
            ViewId::DeliveryHistory => Screen::Parcels(ParcelView::ReceiverHistory),
        }
    }
}

/// The user a command is recorded against.
///
/// Sessions that did not carry an id act as the named party, leaving the
/// ownership check to the server.
pub(crate) fn actor(session: &Session, party: Option<&PartyRef>) -> DomainResult<UserId> {
    session
        .user_id()
        .or(party.map(PartyRef::id))
        .cloned()
        .ok_or(DomainError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parcelhub_auth::Role;
    use parcelhub_navigation::sections_for;

    #[test]
    fn every_navigation_item_has_a_screen() {
        for role in [Role::Admin, Role::Sender, Role::Receiver] {
            for section in sections_for(role) {
                for item in &section.items {
                    if let Some(view) = item.view {
                        let screen = Screen::for_view(view);
                        if let Screen::Parcels(filter) = screen {
                            assert_eq!(filter.is_sender_view(), role == Role::Sender);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn actor_prefers_the_session_id() {
        let me: UserId = "aaaaaaaaaaaaaaaaaaaaaaaa".parse().unwrap();
        let other: UserId = "bbbbbbbbbbbbbbbbbbbbbbbb".parse().unwrap();
        let party = PartyRef::Reference(other.clone());

        let with_id = Session::authenticated("me@example.com", vec![Role::Sender]).with_user_id(me.clone());
        assert_eq!(actor(&with_id, Some(&party)).unwrap(), me);

        let without_id = Session::authenticated("me@example.com", vec![Role::Sender]);
        assert_eq!(actor(&without_id, Some(&party)).unwrap(), other);
        assert_eq!(actor(&without_id, None), Err(DomainError::Unauthorized));
    }
}
