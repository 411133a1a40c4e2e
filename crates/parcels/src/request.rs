//! `POST /parcels` request body and its validation rules.

use serde::{Deserialize, Serialize};

use parcelhub_auth::{CommandAuthorization, Role};
use parcelhub_core::{DomainError, DomainResult, ObjectId, UserId};

pub const MIN_WEIGHT_KG: f64 = 0.1;
pub const MIN_ADDRESS_LEN: usize = 5;

/// What a sender submits to create a parcel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParcelRequest {
    pub receiver_id: String,
    pub weight: f64,
    pub pickup_address: String,
    pub delivery_address: String,
}

impl ParcelRequest {
    pub fn new(
        receiver_id: impl Into<String>,
        weight: f64,
        pickup_address: impl Into<String>,
        delivery_address: impl Into<String>,
    ) -> Self {
        Self {
            receiver_id: receiver_id.into(),
            weight,
            pickup_address: pickup_address.into(),
            delivery_address: delivery_address.into(),
        }
    }

    /// Check every field; returns the parsed receiver id on success.
    pub fn validate(&self) -> DomainResult<UserId> {
        let receiver = parse_receiver_id(&self.receiver_id)?;
        validate_weight(self.weight)?;
        validate_address("Pickup address", &self.pickup_address)?;
        validate_address("Delivery address", &self.delivery_address)?;
        Ok(receiver)
    }

    /// Copy with addresses and receiver id trimmed, as sent over the wire.
    pub fn normalized(&self) -> Self {
        Self {
            receiver_id: self.receiver_id.trim().to_string(),
            weight: self.weight,
            pickup_address: self.pickup_address.trim().to_string(),
            delivery_address: self.delivery_address.trim().to_string(),
        }
    }
}

impl CommandAuthorization for ParcelRequest {
    fn required_role(&self) -> Role {
        Role::Sender
    }
}

fn parse_receiver_id(raw: &str) -> DomainResult<UserId> {
    let raw = raw.trim();
    if raw.len() != parcelhub_core::id::OBJECT_ID_LEN {
        return Err(DomainError::validation("Receiver ID must be 24 characters"));
    }
    if !ObjectId::is_valid(raw) {
        return Err(DomainError::validation("Invalid receiver ID format"));
    }
    raw.parse()
}

pub(crate) fn validate_weight(weight: f64) -> DomainResult<()> {
    if !weight.is_finite() || weight <= 0.0 {
        return Err(DomainError::validation("Weight must be positive"));
    }
    if weight < MIN_WEIGHT_KG {
        return Err(DomainError::validation("Weight must be at least 0.1 kg"));
    }
    Ok(())
}

pub(crate) fn validate_address(label: &str, address: &str) -> DomainResult<()> {
    let len = address.trim().chars().count();
    if len == 0 {
        return Err(DomainError::validation(format!("{label} is required")));
    }
    if len < MIN_ADDRESS_LEN {
        return Err(DomainError::validation(format!(
            "{label} must be at least {MIN_ADDRESS_LEN} characters"
        )));
    }
    Ok(())
}
