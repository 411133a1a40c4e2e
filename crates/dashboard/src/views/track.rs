//! Public tracking page.

use parcelhub_client::ParcelApi;
use parcelhub_core::TrackingId;
use parcelhub_parcels::Parcel;

use super::ViewState;

pub const NOT_FOUND: &str = "Parcel not found. Please check your tracking ID and try again.";
pub const LOOKUP_FAILED: &str = "Failed to track parcel. Please try again later.";

#[derive(Debug, Clone, Default)]
pub struct TrackParcelView {
    input: String,
    state: ViewState<Parcel>,
}

impl TrackParcelView {
    pub fn new() -> Self {
        Self::default()
    }

    /// View for `/track/{trackingId}`; looks the id up right away.
    pub async fn open(api: &dyn ParcelApi, tracking_id: Option<&TrackingId>) -> Self {
        let mut view = Self::new();
        if let Some(id) = tracking_id {
            view.search(api, id.as_str()).await;
        }
        view
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn state(&self) -> &ViewState<Parcel> {
        &self.state
    }

    /// Look up `raw`. A blank id clears the result without a request.
    pub async fn search(&mut self, api: &dyn ParcelApi, raw: &str) {
        self.input = raw.trim().to_string();
        if self.input.is_empty() {
            self.state = ViewState::Idle;
            return;
        }

        let Ok(tracking_id) = self.input.parse::<TrackingId>() else {
            self.state = ViewState::Error(NOT_FOUND.to_string());
            return;
        };

        self.state = ViewState::Loading;
        self.state = match api.track_parcel(&tracking_id).await {
            Ok(parcel) => ViewState::Ready(parcel),
            Err(err) if err.is_not_found() => {
                tracing::debug!(%tracking_id, "tracking id not found");
                ViewState::Error(NOT_FOUND.to_string())
            }
            Err(err) => {
                tracing::warn!(%tracking_id, error = %err, "tracking lookup failed");
                ViewState::Error(LOOKUP_FAILED.to_string())
            }
        };
    }
}
