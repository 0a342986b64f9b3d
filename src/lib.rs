//! # stride_events
//!
//! Typed domain events for the Stride services, and the machinery to publish
//! them to a Kafka-compatible broker.
//!
//! ```text
//! ┌────────────┐   ┌────────────────┐   ┌─────────────────┐   ┌──────────────┐
//! │ DomainEvent│──►│ TopicResolver  │──►│ EventSerializer │──►│ BrokerClient │
//! │  families  │   │ family → topic │   │  JSON payload   │   │  async send  │
//! └────────────┘   └────────────────┘   └─────────────────┘   └──────────────┘
//!        ▲                                                           │
//!        │                    EventPublisher                         ▼
//!        └──────────── publish / publish_blocking ◄──── PublishReceipt | PublishError
//! ```
//!
//! ## Example
//!
//! ```
//! use stride_events::broker::InMemoryBroker;
//! use stride_events::{EventHeader, EventPublisher, PublisherSettings, TaskAssigned, TaskEvent};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let broker = InMemoryBroker::new();
//! let publisher = EventPublisher::from_current(broker.clone(), &PublisherSettings::default()).unwrap();
//!
//! let event: TaskEvent = TaskAssigned {
//!     header: EventHeader::new("req-42").unwrap(),
//!     task_id: "t1".into(),
//!     team_id: "team1".into(),
//!     assigned_to: "u2".into(),
//!     assigned_by: "u1".into(),
//!     previous_assignee: None,
//! }
//! .into();
//!
//! let receipt = publisher.publish(&event).await.unwrap();
//! assert_eq!(receipt.topic, "stride.local.task-events");
//! # });
//! ```

pub mod broker;
pub mod config;
pub mod error;
pub mod event;
pub mod logging;
pub mod publisher;
pub mod serializer;
pub mod topic;

pub use broker::{BrokerClient, SendReceipt};
pub use config::PublisherSettings;
pub use error::{
    BrokerError, ConfigurationError, EventError, PublishError, PublishFailure, SerializationError,
};
pub use event::{
    DomainEvent, Event, EventHeader, EventKind, TaskAssigned, TaskCreated, TaskEvent, TaskUpdated,
    TeamCreated, TeamEvent, TeamMemberAdded, UserCreated, UserEvent, UserUpdated,
};
pub use publisher::{EventPublisher, PartitionKeys, PublishHandle, PublishReceipt, PublishState};
pub use serializer::EventSerializer;
pub use topic::{TopicMapping, TopicResolver, TopicResolverBuilder};
