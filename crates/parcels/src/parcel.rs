use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use parcelhub_auth::{CommandAuthorization, Role};
use parcelhub_core::{
    Aggregate, AggregateRoot, DomainError, DomainEvent, DomainResult, ParcelId, TrackingId, UserId,
};

use crate::party::PartyRef;
use crate::request::{validate_address, validate_weight};
use crate::status_log::{StatusLog, StatusLogEntry, non_blank};
use crate::ParcelStatus;

/// Aggregate root: Parcel.
///
/// Serializes to the API's parcel document shape, so the same type is used for
/// responses and for local precondition checks before mutations are sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parcel {
    #[serde(rename = "_id")]
    id: ParcelId,
    tracking_id: TrackingId,
    current_status: ParcelStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    weight: f64,
    fee: f64,
    pickup_address: String,
    delivery_address: String,
    #[serde(default)]
    is_blocked: bool,
    #[serde(default)]
    status_logs: StatusLog,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sender_id: Option<PartyRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    receiver_id: Option<PartyRef>,
    #[serde(skip)]
    version: u64,
    #[serde(skip, default = "persisted")]
    created: bool,
}

fn persisted() -> bool {
    true
}

impl Parcel {
    /// Create an empty, not-yet-created aggregate instance.
    pub fn empty(id: ParcelId) -> Self {
        Self {
            id,
            tracking_id: TrackingId::default(),
            current_status: ParcelStatus::Requested,
            created_at: DateTime::<Utc>::default(),
            updated_at: DateTime::<Utc>::default(),
            weight: 0.0,
            fee: 0.0,
            pickup_address: String::new(),
            delivery_address: String::new(),
            is_blocked: false,
            status_logs: StatusLog::new(),
            sender_id: None,
            receiver_id: None,
            version: 0,
            created: false,
        }
    }

    /// Run a [`CreateParcel`] command against a fresh instance.
    pub fn create(cmd: CreateParcel) -> DomainResult<Self> {
        let mut parcel = Self::empty(cmd.parcel_id.clone());
        parcel.execute(&ParcelCommand::CreateParcel(cmd))?;
        Ok(parcel)
    }

    pub fn id_typed(&self) -> &ParcelId {
        &self.id
    }

    pub fn tracking_id(&self) -> &TrackingId {
        &self.tracking_id
    }

    pub fn status(&self) -> ParcelStatus {
        self.current_status
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn fee(&self) -> f64 {
        self.fee
    }

    pub fn pickup_address(&self) -> &str {
        &self.pickup_address
    }

    pub fn delivery_address(&self) -> &str {
        &self.delivery_address
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_blocked(&self) -> bool {
        self.is_blocked
    }

    pub fn status_logs(&self) -> &StatusLog {
        &self.status_logs
    }

    pub fn sender(&self) -> Option<&PartyRef> {
        self.sender_id.as_ref()
    }

    pub fn receiver(&self) -> Option<&PartyRef> {
        self.receiver_id.as_ref()
    }

    pub fn is_terminal(&self) -> bool {
        self.current_status.is_terminal()
    }

    /// Attach populated party documents (as the API does on listings).
    pub fn with_parties(mut self, sender: Option<PartyRef>, receiver: Option<PartyRef>) -> Self {
        if sender.is_some() {
            self.sender_id = sender;
        }
        if receiver.is_some() {
            self.receiver_id = receiver;
        }
        self
    }

    /// Status the sender may cancel from: exactly `Requested`.
    pub fn ensure_cancellable(&self) -> DomainResult<()> {
        match self.current_status {
            ParcelStatus::Requested => Ok(()),
            ParcelStatus::Cancelled => Err(DomainError::transition("parcel is already cancelled")),
            other => Err(DomainError::transition(format!(
                "parcel can only be cancelled while Requested (current: {other})"
            ))),
        }
    }

    /// Status the receiver may confirm from: exactly `In Transit`.
    pub fn ensure_confirmable(&self) -> DomainResult<()> {
        match self.current_status {
            ParcelStatus::InTransit => Ok(()),
            ParcelStatus::Delivered => {
                Err(DomainError::transition("delivery has already been confirmed"))
            }
            other => Err(DomainError::transition(format!(
                "delivery can only be confirmed while In Transit (current: {other})"
            ))),
        }
    }

    /// Whether admins may still change the status.
    pub fn ensure_open(&self) -> DomainResult<()> {
        if self.is_terminal() {
            return Err(DomainError::transition(format!(
                "parcel is {}; no further status changes are allowed",
                self.current_status
            )));
        }
        Ok(())
    }

    /// Check the status log against the parcel.
    ///
    /// Timestamps must be monotonic. A terminal parcel's log must end with its
    /// terminal status, since every terminal transition records an entry.
    pub fn verify_invariants(&self) -> DomainResult<()> {
        self.status_logs.verify()?;
        if self.is_terminal() && self.status_logs.latest_status() != Some(self.current_status) {
            return Err(DomainError::invariant(format!(
                "terminal status {} is not the latest status log entry",
                self.current_status
            )));
        }
        Ok(())
    }
}

impl AggregateRoot for Parcel {
    type Id = ParcelId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateParcel (sender).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateParcel {
    pub parcel_id: ParcelId,
    pub tracking_id: TrackingId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub weight: f64,
    pub fee: f64,
    pub pickup_address: String,
    pub delivery_address: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CancelParcel (sender).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelParcel {
    pub parcel_id: ParcelId,
    pub actor: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ConfirmDelivery (receiver).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmDelivery {
    pub parcel_id: ParcelId,
    pub actor: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateStatus (admin).
///
/// `actor` is recorded on the log entry when known; otherwise the server
/// attributes the change to the authenticated admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStatus {
    pub parcel_id: ParcelId,
    pub actor: Option<UserId>,
    pub status: ParcelStatus,
    pub location: Option<String>,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetBlocked (admin).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetBlocked {
    pub parcel_id: ParcelId,
    pub actor: Option<UserId>,
    pub blocked: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParcelCommand {
    CreateParcel(CreateParcel),
    CancelParcel(CancelParcel),
    ConfirmDelivery(ConfirmDelivery),
    UpdateStatus(UpdateStatus),
    SetBlocked(SetBlocked),
}

impl CommandAuthorization for ParcelCommand {
    fn required_role(&self) -> Role {
        match self {
            ParcelCommand::CreateParcel(_) | ParcelCommand::CancelParcel(_) => Role::Sender,
            ParcelCommand::ConfirmDelivery(_) => Role::Receiver,
            ParcelCommand::UpdateStatus(_) | ParcelCommand::SetBlocked(_) => Role::Admin,
        }
    }
}

/// Event: ParcelCreated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParcelCreated {
    pub parcel_id: ParcelId,
    pub tracking_id: TrackingId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub weight: f64,
    pub fee: f64,
    pub pickup_address: String,
    pub delivery_address: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ParcelCancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParcelCancelled {
    pub parcel_id: ParcelId,
    pub cancelled_by: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DeliveryConfirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryConfirmed {
    pub parcel_id: ParcelId,
    pub confirmed_by: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StatusChanged. `log_entry` is present only when the admin supplied
/// a location or note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChanged {
    pub parcel_id: ParcelId,
    pub status: ParcelStatus,
    pub log_entry: Option<StatusLogEntry>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: BlockStatusChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockStatusChanged {
    pub parcel_id: ParcelId,
    pub blocked: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParcelEvent {
    ParcelCreated(ParcelCreated),
    ParcelCancelled(ParcelCancelled),
    DeliveryConfirmed(DeliveryConfirmed),
    StatusChanged(StatusChanged),
    BlockStatusChanged(BlockStatusChanged),
}

impl DomainEvent for ParcelEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ParcelEvent::ParcelCreated(_) => "parcel.created",
            ParcelEvent::ParcelCancelled(_) => "parcel.cancelled",
            ParcelEvent::DeliveryConfirmed(_) => "parcel.delivery_confirmed",
            ParcelEvent::StatusChanged(_) => "parcel.status_changed",
            ParcelEvent::BlockStatusChanged(_) => "parcel.block_status_changed",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ParcelEvent::ParcelCreated(e) => e.occurred_at,
            ParcelEvent::ParcelCancelled(e) => e.occurred_at,
            ParcelEvent::DeliveryConfirmed(e) => e.occurred_at,
            ParcelEvent::StatusChanged(e) => e.occurred_at,
            ParcelEvent::BlockStatusChanged(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Parcel {
    type Command = ParcelCommand;
    type Event = ParcelEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ParcelEvent::ParcelCreated(e) => {
                self.id = e.parcel_id.clone();
                self.tracking_id = e.tracking_id.clone();
                self.current_status = ParcelStatus::Requested;
                self.created_at = e.occurred_at;
                self.updated_at = e.occurred_at;
                self.weight = e.weight;
                self.fee = e.fee;
                self.pickup_address = e.pickup_address.clone();
                self.delivery_address = e.delivery_address.clone();
                self.is_blocked = false;
                self.sender_id = Some(PartyRef::Reference(e.sender_id.clone()));
                self.receiver_id = Some(PartyRef::Reference(e.receiver_id.clone()));
                self.status_logs = StatusLog::new();
                self.status_logs.push_unchecked(
                    StatusLogEntry::new(ParcelStatus::Requested, e.occurred_at)
                        .recorded_by(e.sender_id.clone()),
                );
                self.created = true;
            }
            ParcelEvent::ParcelCancelled(e) => {
                self.current_status = ParcelStatus::Cancelled;
                self.updated_at = e.occurred_at;
                self.status_logs.push_unchecked(
                    StatusLogEntry::new(ParcelStatus::Cancelled, e.occurred_at)
                        .recorded_by(e.cancelled_by.clone()),
                );
            }
            ParcelEvent::DeliveryConfirmed(e) => {
                self.current_status = ParcelStatus::Delivered;
                self.updated_at = e.occurred_at;
                self.status_logs.push_unchecked(
                    StatusLogEntry::new(ParcelStatus::Delivered, e.occurred_at)
                        .recorded_by(e.confirmed_by.clone()),
                );
            }
            ParcelEvent::StatusChanged(e) => {
                self.current_status = e.status;
                self.updated_at = e.occurred_at;
                if let Some(entry) = &e.log_entry {
                    self.status_logs.push_unchecked(entry.clone());
                }
            }
            ParcelEvent::BlockStatusChanged(e) => {
                self.is_blocked = e.blocked;
                self.updated_at = e.occurred_at;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ParcelCommand::CreateParcel(cmd) => self.handle_create(cmd),
            ParcelCommand::CancelParcel(cmd) => self.handle_cancel(cmd),
            ParcelCommand::ConfirmDelivery(cmd) => self.handle_confirm(cmd),
            ParcelCommand::UpdateStatus(cmd) => self.handle_update_status(cmd),
            ParcelCommand::SetBlocked(cmd) => self.handle_set_blocked(cmd),
        }
    }
}

impl Parcel {
    fn ensure_exists(&self, parcel_id: &ParcelId) -> DomainResult<()> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if &self.id != parcel_id {
            return Err(DomainError::invariant("parcel_id mismatch"));
        }
        Ok(())
    }

    /// Only the named party may act; parcels without party info accept anyone.
    fn ensure_party(party: Option<&PartyRef>, actor: &UserId) -> DomainResult<()> {
        match party {
            Some(p) if p.id() != actor => Err(DomainError::Unauthorized),
            _ => Ok(()),
        }
    }

    fn ensure_not_before_latest(&self, at: DateTime<Utc>) -> DomainResult<()> {
        self.status_logs.check_append(&StatusLogEntry::new(self.current_status, at))
    }

    fn handle_create(&self, cmd: &CreateParcel) -> DomainResult<Vec<ParcelEvent>> {
        if self.created {
            return Err(DomainError::conflict("parcel already exists"));
        }

        validate_weight(cmd.weight)?;
        validate_address("Pickup address", &cmd.pickup_address)?;
        validate_address("Delivery address", &cmd.delivery_address)?;

        if !cmd.fee.is_finite() || cmd.fee < 0.0 {
            return Err(DomainError::validation("fee must be a non-negative amount"));
        }

        if cmd.tracking_id.as_str().is_empty() {
            return Err(DomainError::validation("tracking id is required"));
        }

        Ok(vec![ParcelEvent::ParcelCreated(ParcelCreated {
            parcel_id: cmd.parcel_id.clone(),
            tracking_id: cmd.tracking_id.clone(),
            sender_id: cmd.sender_id.clone(),
            receiver_id: cmd.receiver_id.clone(),
            weight: cmd.weight,
            fee: cmd.fee,
            pickup_address: cmd.pickup_address.trim().to_string(),
            delivery_address: cmd.delivery_address.trim().to_string(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_cancel(&self, cmd: &CancelParcel) -> DomainResult<Vec<ParcelEvent>> {
        self.ensure_exists(&cmd.parcel_id)?;
        Self::ensure_party(self.sender(), &cmd.actor)?;
        self.ensure_cancellable()?;
        self.ensure_not_before_latest(cmd.occurred_at)?;

        Ok(vec![ParcelEvent::ParcelCancelled(ParcelCancelled {
            parcel_id: cmd.parcel_id.clone(),
            cancelled_by: cmd.actor.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_confirm(&self, cmd: &ConfirmDelivery) -> DomainResult<Vec<ParcelEvent>> {
        self.ensure_exists(&cmd.parcel_id)?;
        Self::ensure_party(self.receiver(), &cmd.actor)?;
        self.ensure_confirmable()?;
        self.ensure_not_before_latest(cmd.occurred_at)?;

        Ok(vec![ParcelEvent::DeliveryConfirmed(DeliveryConfirmed {
            parcel_id: cmd.parcel_id.clone(),
            confirmed_by: cmd.actor.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update_status(&self, cmd: &UpdateStatus) -> DomainResult<Vec<ParcelEvent>> {
        self.ensure_exists(&cmd.parcel_id)?;
        self.ensure_open()?;

        let location = non_blank(cmd.location.as_deref());
        let note = non_blank(cmd.note.as_deref());

        let log_entry = if location.is_some() || note.is_some() {
            let mut entry = StatusLogEntry::new(cmd.status, cmd.occurred_at)
                .with_details(location.as_deref(), note.as_deref());
            entry.updated_by = cmd.actor.clone();
            self.status_logs.check_append(&entry)?;
            Some(entry)
        } else {
            None
        };

        Ok(vec![ParcelEvent::StatusChanged(StatusChanged {
            parcel_id: cmd.parcel_id.clone(),
            status: cmd.status,
            log_entry,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_set_blocked(&self, cmd: &SetBlocked) -> DomainResult<Vec<ParcelEvent>> {
        self.ensure_exists(&cmd.parcel_id)?;

        if self.is_blocked == cmd.blocked {
            return Ok(Vec::new());
        }

        Ok(vec![ParcelEvent::BlockStatusChanged(BlockStatusChanged {
            parcel_id: cmd.parcel_id.clone(),
            blocked: cmd.blocked,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sender() -> UserId {
        "aaaaaaaaaaaaaaaaaaaaaaaa".parse().unwrap()
    }

    fn receiver() -> UserId {
        "bbbbbbbbbbbbbbbbbbbbbbbb".parse().unwrap()
    }

    fn admin() -> UserId {
        "cccccccccccccccccccccccc".parse().unwrap()
    }

    fn t(minutes: i64) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
            + Duration::minutes(minutes)
    }

    fn create_cmd(parcel_id: &ParcelId) -> CreateParcel {
        CreateParcel {
            parcel_id: parcel_id.clone(),
            tracking_id: "TRK-20240601-0001".parse().unwrap(),
            sender_id: sender(),
            receiver_id: receiver(),
            weight: 2.5,
            fee: 125.0,
            pickup_address: "12 Oak St".to_string(),
            delivery_address: "45 Pine Ave".to_string(),
            occurred_at: t(0),
        }
    }

    fn created_parcel() -> Parcel {
        let id = ParcelId::generate();
        Parcel::create(create_cmd(&id)).unwrap()
    }

    fn set_status(parcel: &mut Parcel, status: ParcelStatus, at: DateTime<Utc>) {
        let cmd = ParcelCommand::UpdateStatus(UpdateStatus {
            parcel_id: parcel.id_typed().clone(),
            actor: Some(admin()),
            status,
            location: None,
            note: None,
            occurred_at: at,
        });
        parcel.execute(&cmd).unwrap();
    }

    fn cancel(parcel: &Parcel, at: DateTime<Utc>) -> ParcelCommand {
        ParcelCommand::CancelParcel(CancelParcel {
            parcel_id: parcel.id_typed().clone(),
            actor: sender(),
            occurred_at: at,
        })
    }

    fn confirm(parcel: &Parcel, at: DateTime<Utc>) -> ParcelCommand {
        ParcelCommand::ConfirmDelivery(ConfirmDelivery {
            parcel_id: parcel.id_typed().clone(),
            actor: receiver(),
            occurred_at: at,
        })
    }

    #[test]
    fn create_starts_requested_with_one_log_entry() {
        let parcel = created_parcel();
        assert_eq!(parcel.status(), ParcelStatus::Requested);
        assert_eq!(parcel.status_logs().len(), 1);
        assert_eq!(parcel.status_logs().latest_status(), Some(ParcelStatus::Requested));
        assert_eq!(parcel.sender().map(|p| p.id().clone()), Some(sender()));
        assert_eq!(parcel.version(), 1);
    }

    #[test]
    fn create_twice_conflicts() {
        let parcel = created_parcel();
        let err = parcel
            .handle(&ParcelCommand::CreateParcel(create_cmd(parcel.id_typed())))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn create_rejects_light_parcels() {
        let id = ParcelId::generate();
        let mut cmd = create_cmd(&id);
        cmd.weight = 0.01;
        assert!(matches!(Parcel::create(cmd), Err(DomainError::Validation(_))));
    }

    #[test]
    fn commands_on_missing_parcel_are_not_found() {
        let parcel = Parcel::empty(ParcelId::generate());
        assert_eq!(parcel.handle(&cancel(&parcel, t(1))), Err(DomainError::NotFound));
    }

    #[test]
    fn cancel_requested_parcel_is_terminal() {
        let mut parcel = created_parcel();
        parcel.execute(&cancel(&parcel, t(5))).unwrap();
        assert_eq!(parcel.status(), ParcelStatus::Cancelled);
        assert!(parcel.is_terminal());
        assert_eq!(parcel.status_logs().latest_status(), Some(ParcelStatus::Cancelled));
        parcel.verify_invariants().unwrap();
    }

    #[test]
    fn cancel_after_approval_fails_without_transition() {
        let mut parcel = created_parcel();
        set_status(&mut parcel, ParcelStatus::Approved, t(1));
        let before = parcel.clone();
        let err = parcel.execute(&cancel(&parcel, t(2))).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition(_)));
        assert_eq!(parcel, before);
    }

    #[test]
    fn second_cancel_fails() {
        let mut parcel = created_parcel();
        parcel.execute(&cancel(&parcel, t(1))).unwrap();
        let err = parcel.handle(&cancel(&parcel, t(2))).unwrap_err();
        assert_eq!(err, DomainError::transition("parcel is already cancelled"));
    }

    #[test]
    fn only_the_sender_may_cancel() {
        let parcel = created_parcel();
        let cmd = ParcelCommand::CancelParcel(CancelParcel {
            parcel_id: parcel.id_typed().clone(),
            actor: receiver(),
            occurred_at: t(1),
        });
        assert_eq!(parcel.handle(&cmd), Err(DomainError::Unauthorized));
    }

    #[test]
    fn confirm_in_transit_then_second_confirm_fails() {
        let mut parcel = created_parcel();
        set_status(&mut parcel, ParcelStatus::InTransit, t(1));
        parcel.execute(&confirm(&parcel, t(2))).unwrap();
        assert_eq!(parcel.status(), ParcelStatus::Delivered);

        let err = parcel.handle(&confirm(&parcel, t(3))).unwrap_err();
        assert_eq!(err, DomainError::transition("delivery has already been confirmed"));
    }

    #[test]
    fn confirm_requires_in_transit() {
        let mut parcel = created_parcel();
        set_status(&mut parcel, ParcelStatus::Dispatched, t(1));
        assert!(matches!(
            parcel.handle(&confirm(&parcel, t(2))),
            Err(DomainError::InvalidTransition(_))
        ));
    }

    #[test]
    fn only_the_receiver_may_confirm() {
        let mut parcel = created_parcel();
        set_status(&mut parcel, ParcelStatus::InTransit, t(1));
        let cmd = ParcelCommand::ConfirmDelivery(ConfirmDelivery {
            parcel_id: parcel.id_typed().clone(),
            actor: sender(),
            occurred_at: t(2),
        });
        assert_eq!(parcel.handle(&cmd), Err(DomainError::Unauthorized));
    }

    #[test]
    fn admin_update_appends_log_only_with_details() {
        let mut parcel = created_parcel();
        set_status(&mut parcel, ParcelStatus::Approved, t(1));
        assert_eq!(parcel.status(), ParcelStatus::Approved);
        assert_eq!(parcel.status_logs().len(), 1);

        let cmd = ParcelCommand::UpdateStatus(UpdateStatus {
            parcel_id: parcel.id_typed().clone(),
            actor: Some(admin()),
            status: ParcelStatus::Dispatched,
            location: Some("Central hub".to_string()),
            note: Some("   ".to_string()),
            occurred_at: t(2),
        });
        parcel.execute(&cmd).unwrap();
        let latest = parcel.status_logs().latest().unwrap();
        assert_eq!(latest.status, ParcelStatus::Dispatched);
        assert_eq!(latest.location.as_deref(), Some("Central hub"));
        assert_eq!(latest.note, None);
        assert_eq!(latest.updated_by, Some(admin()));
    }

    #[test]
    fn admin_update_without_actor_leaves_attribution_to_server() {
        let mut parcel = created_parcel();
        let cmd = ParcelCommand::UpdateStatus(UpdateStatus {
            parcel_id: parcel.id_typed().clone(),
            actor: None,
            status: ParcelStatus::Approved,
            location: Some("Depot".to_string()),
            note: None,
            occurred_at: t(1),
        });
        parcel.execute(&cmd).unwrap();
        let latest = parcel.status_logs().latest().unwrap();
        assert_eq!(latest.status, ParcelStatus::Approved);
        assert_eq!(latest.updated_by, None);
    }

    #[test]
    fn terminal_parcels_reject_admin_status_changes() {
        let mut parcel = created_parcel();
        parcel.execute(&cancel(&parcel, t(1))).unwrap();
        let cmd = ParcelCommand::UpdateStatus(UpdateStatus {
            parcel_id: parcel.id_typed().clone(),
            actor: Some(admin()),
            status: ParcelStatus::InTransit,
            location: Some("Depot".to_string()),
            note: None,
            occurred_at: t(2),
        });
        assert!(matches!(parcel.handle(&cmd), Err(DomainError::InvalidTransition(_))));
    }

    #[test]
    fn log_entries_cannot_go_back_in_time() {
        let mut parcel = created_parcel();
        set_status(&mut parcel, ParcelStatus::InTransit, t(10));
        let err = parcel.handle(&confirm(&parcel, t(-5))).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn block_toggle_leaves_status_and_log_alone() {
        let mut parcel = created_parcel();
        let block = |blocked| {
            ParcelCommand::SetBlocked(SetBlocked {
                parcel_id: parcel.id_typed().clone(),
                actor: Some(admin()),
                blocked,
                occurred_at: t(1),
            })
        };
        let (on, off) = (block(true), block(false));
        parcel.execute(&on).unwrap();
        assert!(parcel.is_blocked());
        assert_eq!(parcel.status(), ParcelStatus::Requested);
        assert_eq!(parcel.status_logs().len(), 1);

        assert!(parcel.handle(&on).unwrap().is_empty());
        parcel.execute(&off).unwrap();
        assert!(!parcel.is_blocked());
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let parcel = created_parcel();
        let before = parcel.clone();
        let e1 = parcel.handle(&cancel(&parcel, t(1))).unwrap();
        let e2 = parcel.handle(&cancel(&parcel, t(1))).unwrap();
        assert_eq!(parcel, before);
        assert_eq!(e1, e2);
    }

    #[test]
    fn commands_declare_required_roles() {
        let parcel = created_parcel();
        assert_eq!(cancel(&parcel, t(1)).required_role(), Role::Sender);
        assert_eq!(confirm(&parcel, t(1)).required_role(), Role::Receiver);
    }

    #[test]
    fn event_types_are_stable() {
        let parcel = created_parcel();
        let events = parcel.handle(&cancel(&parcel, t(3))).unwrap();
        assert_eq!(events[0].event_type(), "parcel.cancelled");
        assert_eq!(events[0].occurred_at(), t(3));
    }

    #[test]
    fn deserialized_parcels_accept_commands() {
        let json = serde_json::json!({
            "_id": "dddddddddddddddddddddddd",
            "trackingId": "TRK-20240601-FEED",
            "currentStatus": "In Transit",
            "createdAt": "2024-06-01T09:00:00Z",
            "updatedAt": "2024-06-02T09:00:00Z",
            "weight": 1.2,
            "fee": 60,
            "pickupAddress": "1 Elm Road",
            "deliveryAddress": "9 Birch Lane",
            "receiverId": { "_id": "bbbbbbbbbbbbbbbbbbbbbbbb", "name": "Rita", "email": "rita@example.com" },
            "senderId": "aaaaaaaaaaaaaaaaaaaaaaaa"
        });
        let mut parcel: Parcel = serde_json::from_value(json).unwrap();
        assert!(!parcel.is_blocked());
        assert!(parcel.status_logs().is_empty());
        assert_eq!(parcel.version(), 0);
        parcel.execute(&confirm(&parcel, t(60 * 24 * 2))).unwrap();
        assert_eq!(parcel.status(), ParcelStatus::Delivered);
    }

    #[test]
    fn verify_flags_terminal_status_missing_from_log() {
        let json = serde_json::json!({
            "_id": "dddddddddddddddddddddddd",
            "trackingId": "TRK-1",
            "currentStatus": "Delivered",
            "createdAt": "2024-06-01T09:00:00Z",
            "updatedAt": "2024-06-02T09:00:00Z",
            "weight": 1.0,
            "fee": 10,
            "pickupAddress": "1 Elm Road",
            "deliveryAddress": "9 Birch Lane",
            "statusLogs": [{ "status": "In Transit", "timestamp": "2024-06-01T10:00:00Z" }]
        });
        let parcel: Parcel = serde_json::from_value(json).unwrap();
        assert!(matches!(
            parcel.verify_invariants(),
            Err(DomainError::InvariantViolation(_))
        ));
    }
}
