//! Event publishing.
//!
//! ```text
//! publish(event)
//!   │
//!   ├─ TopicResolver::resolve ─────────────── stride.local.user-events
//!   ├─ EventSerializer::serialize_bytes ──┬── Err → PublishHandle (ready, Failed)
//!   │                                     │
//!   ├─ PartitionKeys::derive ◄────────────┘   UserCreatedEvent-417
//!   └─ runtime.spawn(broker.send) ─────────── PublishHandle (Dispatched)
//!                                                │
//!                                     await ─────┴──► PublishReceipt | PublishError
//! ```
//!
//! Three ways to wait for the outcome:
//!
//! - await the [`PublishHandle`] (no bound, caller decides)
//! - [`EventPublisher::publish_and_wait`] from async code, bounded by the
//!   configured timeout
//! - [`EventPublisher::publish_blocking`] from synchronous code, bounded the
//!   same way

mod event_publisher;
mod handle;
mod partition;

pub use event_publisher::EventPublisher;
pub use handle::{PublishHandle, PublishReceipt, PublishState};
pub use partition::PartitionKeys;
