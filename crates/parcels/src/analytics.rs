//! Admin analytics derived from the full parcel list.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Parcel, ParcelStatus};

/// Number of most recent months kept in [`ParcelAnalytics::monthly_shipments`].
pub const MONTHS_SHOWN: usize = 6;

/// Coarse status groups used by the distribution chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatusBucket {
    Delivered,
    InTransit,
    Pending,
    Cancelled,
}

impl StatusBucket {
    pub const ALL: [StatusBucket; 4] = [
        StatusBucket::Delivered,
        StatusBucket::InTransit,
        StatusBucket::Pending,
        StatusBucket::Cancelled,
    ];

    pub fn of(status: ParcelStatus) -> Self {
        match status {
            ParcelStatus::Delivered => StatusBucket::Delivered,
            ParcelStatus::InTransit | ParcelStatus::Dispatched => StatusBucket::InTransit,
            ParcelStatus::Requested | ParcelStatus::Approved => StatusBucket::Pending,
            ParcelStatus::Cancelled => StatusBucket::Cancelled,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusBucket::Delivered => "Delivered",
            StatusBucket::InTransit => "In Transit",
            StatusBucket::Pending => "Pending",
            StatusBucket::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyShipments {
    pub year: i32,
    pub month: u32,
    pub count: usize,
}

impl MonthlyShipments {
    /// Short label such as `Jun 2024`.
    pub fn label(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%b %Y").to_string())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParcelAnalytics {
    pub total_parcels: usize,
    pub delivered: usize,
    pub in_transit: usize,
    pub pending: usize,
    pub cancelled: usize,
    /// Non-empty buckets, in [`StatusBucket::ALL`] order.
    pub status_distribution: Vec<(StatusBucket, usize)>,
    /// Chronological, at most [`MONTHS_SHOWN`] entries.
    pub monthly_shipments: Vec<MonthlyShipments>,
    /// Percentage of parcels delivered; 0 when there are none.
    pub delivery_rate: f64,
    pub total_revenue: f64,
}

impl ParcelAnalytics {
    pub fn compute(parcels: &[Parcel]) -> Self {
        let mut counts: BTreeMap<StatusBucket, usize> = BTreeMap::new();
        for parcel in parcels {
            *counts.entry(StatusBucket::of(parcel.status())).or_default() += 1;
        }
        let count = |bucket: StatusBucket| counts.get(&bucket).copied().unwrap_or(0);

        let status_distribution = StatusBucket::ALL
            .into_iter()
            .map(|bucket| (bucket, count(bucket)))
            .filter(|(_, n)| *n > 0)
            .collect();

        let mut months: BTreeMap<(i32, u32), usize> = BTreeMap::new();
        for parcel in parcels {
            let created = parcel.created_at();
            *months.entry((created.year(), created.month())).or_default() += 1;
        }
        let skip = months.len().saturating_sub(MONTHS_SHOWN);
        let monthly_shipments = months
            .into_iter()
            .skip(skip)
            .map(|((year, month), count)| MonthlyShipments { year, month, count })
            .collect();

        let total_parcels = parcels.len();
        let delivered = count(StatusBucket::Delivered);
        let delivery_rate = if total_parcels == 0 {
            0.0
        } else {
            delivered as f64 * 100.0 / total_parcels as f64
        };

        Self {
            total_parcels,
            delivered,
            in_transit: count(StatusBucket::InTransit),
            pending: count(StatusBucket::Pending),
            cancelled: count(StatusBucket::Cancelled),
            status_distribution,
            monthly_shipments,
            delivery_rate,
            total_revenue: parcels.iter().map(Parcel::fee).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parcel(status: &str, created: &str, fee: f64) -> Parcel {
        serde_json::from_value(serde_json::json!({
            "_id": parcelhub_core::ParcelId::generate().to_string(),
            "trackingId": "TRK-X",
            "currentStatus": status,
            "createdAt": created,
            "updatedAt": created,
            "weight": 1.0,
            "fee": fee,
            "pickupAddress": "12 Oak St",
            "deliveryAddress": "45 Pine Ave"
        }))
        .unwrap()
    }

    #[test]
    fn empty_list_has_zero_rate() {
        let analytics = ParcelAnalytics::compute(&[]);
        assert_eq!(analytics.total_parcels, 0);
        assert_eq!(analytics.delivery_rate, 0.0);
        assert!(analytics.status_distribution.is_empty());
        assert!(analytics.monthly_shipments.is_empty());
    }

    #[test]
    fn buckets_group_statuses() {
        let parcels = vec![
            parcel("Delivered", "2024-01-10T00:00:00Z", 100.0),
            parcel("Dispatched", "2024-01-11T00:00:00Z", 50.0),
            parcel("In Transit", "2024-01-12T00:00:00Z", 50.0),
            parcel("Requested", "2024-02-01T00:00:00Z", 25.5),
            parcel("Approved", "2024-02-02T00:00:00Z", 0.0),
        ];
        let a = ParcelAnalytics::compute(&parcels);
        assert_eq!(a.total_parcels, 5);
        assert_eq!((a.delivered, a.in_transit, a.pending, a.cancelled), (1, 2, 2, 0));
        assert_eq!(
            a.status_distribution,
            vec![
                (StatusBucket::Delivered, 1),
                (StatusBucket::InTransit, 2),
                (StatusBucket::Pending, 2),
            ]
        );
        assert_eq!(a.delivery_rate, 20.0);
        assert_eq!(a.total_revenue, 225.5);
    }

    #[test]
    fn monthly_shipments_keep_last_six_months() {
        let parcels: Vec<Parcel> = (1..=8)
            .map(|m| parcel("Requested", &format!("2023-{m:02}-15T00:00:00Z"), 1.0))
            .chain(std::iter::once(parcel("Requested", "2024-01-03T00:00:00Z", 1.0)))
            .chain(std::iter::once(parcel("Delivered", "2024-01-20T00:00:00Z", 1.0)))
            .collect();
        let months = ParcelAnalytics::compute(&parcels).monthly_shipments;
        assert_eq!(months.len(), MONTHS_SHOWN);
        assert_eq!((months[0].year, months[0].month), (2023, 4));
        let last = months.last().unwrap();
        assert_eq!((last.year, last.month, last.count), (2024, 1, 2));
        assert_eq!(last.label(), "Jan 2024");
    }
}
