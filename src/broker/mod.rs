//! Broker boundary - the one capability the publisher needs from a broker.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     EventPublisher                       │
//! │   serialize → partition key → spawn send → map result    │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                   BrokerClient trait                     │
//! │   send(topic, key, payload) → SendReceipt | BrokerError  │
//! └──────────────────────────────────────────────────────────┘
//!          │                                  │
//!          ▼                                  ▼
//! ┌──────────────────┐            ┌───────────────────────────┐
//! │  InMemoryBroker  │            │      RestProxyBroker      │
//! │ (feature memory) │            │      (feature http)       │
//! └──────────────────┘            └───────────────────────────┘
//! ```
//!
//! Retries, batching and acks belong to the concrete client's own
//! configuration. The publisher calls `send` exactly once per event.

#[cfg(feature = "memory")]
mod in_memory;
#[cfg(feature = "http")]
mod rest_proxy;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BrokerError;

#[cfg(feature = "memory")]
pub use in_memory::{BrokerRecord, InMemoryBroker};
#[cfg(feature = "http")]
pub use rest_proxy::RestProxyBroker;

/// Where the broker stored a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendReceipt {
    pub partition: i32,
    pub offset: i64,
}

/// Asynchronous send to a message broker.
///
/// Implementations must be safe to call concurrently from many publish
/// calls at once.
#[async_trait]
pub trait BrokerClient: Send + Sync {
    async fn send(&self, topic: &str, key: &str, payload: Vec<u8>) -> Result<SendReceipt, BrokerError>;
}

#[async_trait]
impl<B: BrokerClient + ?Sized> BrokerClient for Arc<B> {
    async fn send(&self, topic: &str, key: &str, payload: Vec<u8>) -> Result<SendReceipt, BrokerError> {
        (**self).send(topic, key, payload).await
    }
}

#[async_trait]
impl<B: BrokerClient + ?Sized> BrokerClient for Box<B> {
    async fn send(&self, topic: &str, key: &str, payload: Vec<u8>) -> Result<SendReceipt, BrokerError> {
        (**self).send(topic, key, payload).await
    }
}
