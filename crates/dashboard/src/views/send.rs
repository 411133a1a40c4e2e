//! Sender's create-parcel form.

use parcelhub_auth::{Session, authorize_command};
use parcelhub_client::ParcelApi;
use parcelhub_parcels::{Parcel, ParcelRequest};

use crate::{ActionError, Notification};

#[derive(Debug, Clone, Default)]
pub struct SendParcelForm {
    pub receiver_id: String,
    pub weight: f64,
    pub pickup_address: String,
    pub delivery_address: String,
    submitting: bool,
    last_sent: Option<Parcel>,
}

impl SendParcelForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) -> ParcelRequest {
        ParcelRequest::new(
            self.receiver_id.clone(),
            self.weight,
            self.pickup_address.clone(),
            self.delivery_address.clone(),
        )
    }

    /// First field error, if any; shown next to the form before submitting.
    pub fn field_error(&self) -> Option<String> {
        self.request().validate().err().map(|err| err.message())
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// The parcel created by the last successful submit.
    pub fn last_sent(&self) -> Option<&Parcel> {
        self.last_sent.as_ref()
    }

    /// Validate and send. The form is cleared only on success.
    pub async fn submit(&mut self, api: &dyn ParcelApi, session: &Session) -> Notification {
        self.submitting = true;
        let result = self.try_submit(api, session).await;
        self.submitting = false;

        match result {
            Ok(parcel) => {
                tracing::info!(tracking_id = %parcel.tracking_id(), "parcel sent");
                *self = Self {
                    last_sent: Some(parcel),
                    ..Self::default()
                };
                Notification::success("Parcel sent successfully!")
                    .with_description("Your parcel has been registered and will be processed shortly.")
            }
            Err(err) => Notification::failure("Failed to send parcel", &err),
        }
    }

    async fn try_submit(&self, api: &dyn ParcelApi, session: &Session) -> Result<Parcel, ActionError> {
        let request = self.request();
        authorize_command(session, &request)?;
        request.validate()?;
        Ok(api.send_parcel(&request).await?)
    }
}
