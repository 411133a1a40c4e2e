use chrono::{DateTime, Utc};

/// A fact emitted by an aggregate's decision logic.
///
/// Events are immutable and describe something that already happened.
pub trait DomainEvent: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name (e.g. "parcel.cancelled").
    fn event_type(&self) -> &'static str;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}
