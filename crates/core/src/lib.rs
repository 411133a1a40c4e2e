//! `parcelhub-core`: domain foundation building blocks.
//!
//! Identifiers, the domain error model and the aggregate/event traits shared by
//! every other crate. Nothing in here performs IO.

pub mod aggregate;
pub mod error;
pub mod event;
pub mod id;

pub use aggregate::{Aggregate, AggregateRoot};
pub use error::{DomainError, DomainResult};
pub use event::DomainEvent;
pub use id::{ObjectId, ParcelId, TrackingId, UserId};
