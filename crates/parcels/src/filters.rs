//! Per-view parcel filters.
//!
//! Pure functions over an already-fetched parcel collection. Each dashboard
//! view partitions the same data by current status, optionally narrowed by a
//! free-text search.

use serde::{Deserialize, Serialize};

use crate::party::display_name;
use crate::{Parcel, ParcelStatus};

/// Response body of `GET /parcels/me`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MyParcels {
    #[serde(default)]
    pub sent: Vec<Parcel>,
    #[serde(default)]
    pub received: Vec<Parcel>,
}

/// Status-derived views over a user's parcels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParcelView {
    /// Sender parcels still awaiting approval.
    SenderOngoing,
    /// Sender parcels that reached a terminal state.
    SenderHistory,
    /// Receiver parcels on their way.
    ReceiverIncoming,
    /// Receiver parcels that can be confirmed now.
    ReceiverConfirmable,
    /// Receiver parcels already delivered. Cancelled parcels never show here.
    ReceiverHistory,
}

impl ParcelView {
    pub const ALL: [ParcelView; 5] = [
        ParcelView::SenderOngoing,
        ParcelView::SenderHistory,
        ParcelView::ReceiverIncoming,
        ParcelView::ReceiverConfirmable,
        ParcelView::ReceiverHistory,
    ];

    pub fn includes(&self, status: ParcelStatus) -> bool {
        use ParcelStatus::*;

        match self {
            ParcelView::SenderOngoing => status == Requested,
            ParcelView::SenderHistory => matches!(status, Delivered | Cancelled),
            ParcelView::ReceiverIncoming => matches!(status, Approved | Dispatched | InTransit),
            ParcelView::ReceiverConfirmable => status == InTransit,
            ParcelView::ReceiverHistory => status == Delivered,
        }
    }

    /// Whether the view reads the `sent` side of [`MyParcels`].
    pub fn is_sender_view(&self) -> bool {
        matches!(self, ParcelView::SenderOngoing | ParcelView::SenderHistory)
    }

    /// The side of the collection this view draws from.
    pub fn source<'a>(&self, parcels: &'a MyParcels) -> &'a [Parcel] {
        if self.is_sender_view() {
            &parcels.sent
        } else {
            &parcels.received
        }
    }

    /// Apply the status rule to an arbitrary slice.
    pub fn select<'a>(&self, parcels: &'a [Parcel]) -> Vec<&'a Parcel> {
        parcels.iter().filter(|p| self.includes(p.status())).collect()
    }
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Free-text match over tracking id, status text, pickup and delivery address.
///
/// Case-insensitive substring; any one field matching suffices. A blank query
/// matches everything.
pub fn matches_search(parcel: &Parcel, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    contains_ci(parcel.tracking_id().as_str(), &needle)
        || contains_ci(parcel.status().as_str(), &needle)
        || contains_ci(parcel.pickup_address(), &needle)
        || contains_ci(parcel.delivery_address(), &needle)
}

/// Status rule of `view` intersected with the search query.
pub fn filter_view<'a>(parcels: &'a MyParcels, view: ParcelView, query: &str) -> Vec<&'a Parcel> {
    view.select(view.source(parcels))
        .into_iter()
        .filter(|p| matches_search(p, query))
        .collect()
}

/// Admin list search: tracking id, status text, sender or receiver name.
pub fn admin_search<'a>(parcels: &'a [Parcel], query: &str) -> Vec<&'a Parcel> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return parcels.iter().collect();
    }

    parcels
        .iter()
        .filter(|p| {
            contains_ci(p.tracking_id().as_str(), &needle)
                || contains_ci(p.status().as_str(), &needle)
                || contains_ci(&display_name(p.sender()), &needle)
                || contains_ci(&display_name(p.receiver()), &needle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CreateParcel, ParcelCommand, PartyProfile, PartyRef, UpdateStatus};
    use chrono::{DateTime, Duration, Utc};
    use parcelhub_core::{Aggregate, ParcelId, UserId};
    use proptest::prelude::*;

    fn sender() -> UserId {
        "aaaaaaaaaaaaaaaaaaaaaaaa".parse().unwrap()
    }

    fn receiver() -> UserId {
        "bbbbbbbbbbbbbbbbbbbbbbbb".parse().unwrap()
    }

    fn t(minutes: i64) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
            + Duration::minutes(minutes)
    }

    fn parcel(tracking: &str, pickup: &str, delivery: &str) -> Parcel {
        let id = ParcelId::generate();
        Parcel::create(CreateParcel {
            parcel_id: id,
            tracking_id: tracking.parse().unwrap(),
            sender_id: sender(),
            receiver_id: receiver(),
            weight: 2.5,
            fee: 100.0,
            pickup_address: pickup.to_string(),
            delivery_address: delivery.to_string(),
            occurred_at: t(0),
        })
        .unwrap()
    }

    fn with_status(mut parcel: Parcel, status: ParcelStatus) -> Parcel {
        if status == ParcelStatus::Requested {
            return parcel;
        }
        // Terminal statuses go through the admin path with a note so the log
        // records them, same as a confirmed delivery would.
        let cmd = ParcelCommand::UpdateStatus(UpdateStatus {
            parcel_id: parcel.id_typed().clone(),
            actor: Some("cccccccccccccccccccccccc".parse().unwrap()),
            status,
            location: None,
            note: Some("set by test".to_string()),
            occurred_at: t(1),
        });
        parcel.execute(&cmd).unwrap();
        parcel
    }

    fn statuses(parcels: &[&Parcel]) -> Vec<ParcelStatus> {
        parcels.iter().map(|p| p.status()).collect()
    }

    #[test]
    fn receiver_history_hides_cancelled() {
        let received = vec![
            with_status(parcel("TRK-1", "12 Oak St", "45 Pine Ave"), ParcelStatus::Delivered),
            with_status(parcel("TRK-2", "12 Oak St", "45 Pine Ave"), ParcelStatus::Cancelled),
            with_status(parcel("TRK-3", "12 Oak St", "45 Pine Ave"), ParcelStatus::InTransit),
        ];
        let mine = MyParcels { sent: Vec::new(), received };
        let history = filter_view(&mine, ParcelView::ReceiverHistory, "");
        assert_eq!(statuses(&history), vec![ParcelStatus::Delivered]);
    }

    #[test]
    fn sender_history_includes_both_terminal_states() {
        let sent = vec![
            with_status(parcel("TRK-1", "12 Oak St", "45 Pine Ave"), ParcelStatus::Delivered),
            with_status(parcel("TRK-2", "12 Oak St", "45 Pine Ave"), ParcelStatus::Cancelled),
            parcel("TRK-3", "12 Oak St", "45 Pine Ave"),
        ];
        let mine = MyParcels { sent, received: Vec::new() };
        let history = filter_view(&mine, ParcelView::SenderHistory, "");
        assert_eq!(
            statuses(&history),
            vec![ParcelStatus::Delivered, ParcelStatus::Cancelled]
        );
        let ongoing = filter_view(&mine, ParcelView::SenderOngoing, "");
        assert_eq!(statuses(&ongoing), vec![ParcelStatus::Requested]);
    }

    #[test]
    fn views_read_their_own_side() {
        let mine = MyParcels {
            sent: vec![with_status(parcel("TRK-S", "12 Oak St", "45 Pine Ave"), ParcelStatus::InTransit)],
            received: Vec::new(),
        };
        assert!(filter_view(&mine, ParcelView::ReceiverIncoming, "").is_empty());
    }

    #[test]
    fn search_matches_any_field_case_insensitively() {
        let p = with_status(parcel("TRK-20240601-ABCD", "12 Oak St", "45 Pine Ave"), ParcelStatus::InTransit);
        assert!(matches_search(&p, "abcd"));
        assert!(matches_search(&p, "in tRANSIT"));
        assert!(matches_search(&p, "oak"));
        assert!(matches_search(&p, "PINE"));
        assert!(matches_search(&p, "   "));
        assert!(!matches_search(&p, "elm"));
    }

    #[test]
    fn search_narrows_a_view() {
        let received = vec![
            with_status(parcel("TRK-1", "12 Oak St", "45 Pine Ave"), ParcelStatus::Approved),
            with_status(parcel("TRK-2", "7 Elm Road", "45 Pine Ave"), ParcelStatus::Dispatched),
        ];
        let mine = MyParcels { sent: Vec::new(), received };
        let hits = filter_view(&mine, ParcelView::ReceiverIncoming, "elm");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].tracking_id().as_str(), "TRK-2");
    }

    #[test]
    fn admin_search_uses_party_names() {
        let populated = PartyRef::Populated(PartyProfile {
            id: receiver(),
            name: "Rita Receiver".to_string(),
            email: "rita@example.com".to_string(),
        });
        let parcels = vec![
            parcel("TRK-1", "12 Oak St", "45 Pine Ave").with_parties(None, Some(populated)),
            parcel("TRK-2", "12 Oak St", "45 Pine Ave"),
        ];
        let hits = admin_search(&parcels, "rita");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].tracking_id().as_str(), "TRK-1");

        // Unpopulated parties match on their abbreviated id.
        assert_eq!(admin_search(&parcels, "aaaaaaaa").len(), 2);
        assert_eq!(admin_search(&parcels, "").len(), 2);
        // Addresses are not part of the admin search.
        assert!(admin_search(&parcels, "oak").is_empty());
    }

    #[test]
    fn lifecycle_moves_parcel_between_views() {
        let mut p = parcel("TRK-LIFE", "12 Oak St", "45 Pine Ave");
        assert_eq!(p.weight(), 2.5);
        let snapshot = |p: &Parcel| MyParcels { sent: vec![p.clone()], received: vec![p.clone()] };

        assert_eq!(filter_view(&snapshot(&p), ParcelView::SenderOngoing, "").len(), 1);

        p.execute(&ParcelCommand::UpdateStatus(UpdateStatus {
            parcel_id: p.id_typed().clone(),
            actor: Some("cccccccccccccccccccccccc".parse().unwrap()),
            status: ParcelStatus::InTransit,
            location: None,
            note: None,
            occurred_at: t(1),
        }))
        .unwrap();
        let mine = snapshot(&p);
        assert!(filter_view(&mine, ParcelView::SenderOngoing, "").is_empty());
        assert_eq!(filter_view(&mine, ParcelView::ReceiverIncoming, "").len(), 1);
        assert_eq!(filter_view(&mine, ParcelView::ReceiverConfirmable, "").len(), 1);

        p.execute(&ParcelCommand::ConfirmDelivery(crate::ConfirmDelivery {
            parcel_id: p.id_typed().clone(),
            actor: receiver(),
            occurred_at: t(2),
        }))
        .unwrap();
        let mine = snapshot(&p);
        assert_eq!(filter_view(&mine, ParcelView::SenderHistory, "")[0].status(), ParcelStatus::Delivered);
        assert_eq!(filter_view(&mine, ParcelView::ReceiverHistory, "")[0].status(), ParcelStatus::Delivered);
        assert!(filter_view(&mine, ParcelView::ReceiverConfirmable, "").is_empty());
    }

    #[test]
    fn my_parcels_tolerates_missing_sides() {
        let mine: MyParcels = serde_json::from_str("{}").unwrap();
        assert!(mine.sent.is_empty() && mine.received.is_empty());
    }

    #[test]
    fn lowercase_statuses_still_land_in_their_views() {
        let raw = |id: &str, status: &str| {
            serde_json::json!({
                "_id": id,
                "trackingId": "TRK-20240601-0001",
                "currentStatus": status,
                "createdAt": "2024-06-01T09:00:00Z",
                "updatedAt": "2024-06-01T09:00:00Z",
                "weight": 2.5,
                "fee": 125,
                "pickupAddress": "12 Oak St",
                "deliveryAddress": "45 Pine Ave",
                "statusLogs": [{ "status": "requested", "timestamp": "2024-06-01T09:00:00Z" }]
            })
        };
        let mine: MyParcels = serde_json::from_value(serde_json::json!({
            "sent": [raw("dddddddddddddddddddddddd", "requested")],
            "received": [raw("eeeeeeeeeeeeeeeeeeeeeeee", "IN TRANSIT")]
        }))
        .unwrap();
        assert_eq!(filter_view(&mine, ParcelView::SenderOngoing, "").len(), 1);
        assert_eq!(mine.sent[0].status_logs().latest_status(), Some(ParcelStatus::Requested));
        let confirmable = filter_view(&mine, ParcelView::ReceiverConfirmable, "");
        assert_eq!(confirmable[0].status(), ParcelStatus::InTransit);
    }

    proptest! {
        #[test]
        fn views_only_select_matching_statuses(idxs in proptest::collection::vec(0usize..6, 0..12)) {
            let parcels: Vec<Parcel> = idxs
                .iter()
                .enumerate()
                .map(|(i, idx)| with_status(parcel(&format!("TRK-{i}"), "12 Oak St", "45 Pine Ave"), ParcelStatus::ALL[*idx]))
                .collect();
            for view in ParcelView::ALL {
                let selected = view.select(&parcels);
                prop_assert!(selected.iter().all(|p| view.includes(p.status())));
                let expected = parcels.iter().filter(|p| view.includes(p.status())).count();
                prop_assert_eq!(selected.len(), expected);
            }
            let ongoing = ParcelView::SenderOngoing.select(&parcels).len();
            let history = ParcelView::SenderHistory.select(&parcels).len();
            let incoming = ParcelView::ReceiverIncoming.select(&parcels).len();
            prop_assert_eq!(ongoing + history + incoming, parcels.len());
        }
    }
}
