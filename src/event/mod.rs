//! Domain events - the typed values handed to the publisher.
//!
//! Events are grouped into families. Each family is a closed enum whose
//! variants share a topic:
//!
//! ```text
//! DomainEvent
//!  ├── UserEvent  ── UserCreated | UserUpdated                 → user-events
//!  ├── TaskEvent  ── TaskCreated | TaskUpdated | TaskAssigned  → task-events
//!  └── TeamEvent  ── TeamCreated | TeamMemberAdded             → team-events
//! ```
//!
//! On the wire each variant is a flat JSON object carrying the common
//! header (`eventId`, `correlationId`, `timestamp`), the `eventType`
//! discriminator, and its own camelCase fields.
//!
//! Types outside this crate can be published too: implement [`Event`] and
//! supply an [`EventKind`]. Unmapped families fall back to a topic derived
//! from the kind name.

mod domain;
mod header;
mod kind;
mod task;
mod team;
mod user;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use domain::DomainEvent;
pub use header::EventHeader;
pub use kind::EventKind;
pub use task::{TaskAssigned, TaskCreated, TaskEvent, TaskUpdated};
pub use team::{TeamCreated, TeamEvent, TeamMemberAdded};
pub use user::{UserCreated, UserEvent, UserUpdated};

/// An immutable domain event that can be serialized and published.
///
/// The serialized form must include the `eventType` discriminator matching
/// [`EventKind::event_type`], so that payloads can be checked on decode.
pub trait Event: Serialize + Send + Sync {
    /// Runtime kind of this value.
    fn kind(&self) -> EventKind;

    fn header(&self) -> &EventHeader;

    /// Id of the aggregate this event belongs to.
    fn aggregate_id(&self) -> &str;

    fn event_id(&self) -> &str {
        self.header().event_id()
    }

    fn correlation_id(&self) -> &str {
        self.header().correlation_id()
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.header().timestamp()
    }

    /// Wire discriminator, e.g. `USER_CREATED`.
    fn event_type(&self) -> &'static str {
        self.kind().event_type()
    }
}
