//! In-memory broker for testing and single-process scenarios.
//!
//! Records are appended to a shared log with Kafka-like placement: the key
//! picks a partition, and each `(topic, partition)` pair numbers its own
//! offsets from zero. Latency and failures can be injected to exercise the
//! publisher's async and timeout paths.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::{BrokerClient, SendReceipt};
use crate::error::BrokerError;

/// One record accepted by the [`InMemoryBroker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerRecord {
    pub topic: String,
    pub key: String,
    pub payload: Vec<u8>,
    pub partition: i32,
    pub offset: i64,
}

impl BrokerRecord {
    /// Get the payload as a string (if valid UTF-8).
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }
}

type FailureFn = dyn Fn() -> BrokerError + Send + Sync;

#[derive(Default)]
struct Log {
    records: Vec<BrokerRecord>,
    next_offsets: HashMap<(String, i32), i64>,
}

/// In-memory broker.
///
/// Cheap to clone; clones share the same log.
///
/// ## Example
///
/// ```
/// use stride_events::broker::{BrokerClient, InMemoryBroker};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let broker = InMemoryBroker::new();
/// let receipt = broker
///     .send("stride.local.user-events", "user-1", br#"{"id":"1"}"#.to_vec())
///     .await
///     .unwrap();
///
/// assert_eq!(receipt.offset, 0);
/// assert_eq!(broker.len(), 1);
/// # });
/// ```
#[derive(Clone)]
pub struct InMemoryBroker {
    log: Arc<Mutex<Log>>,
    partitions: i32,
    latency: Option<Duration>,
    failure: Option<Arc<FailureFn>>,
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InMemoryBroker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryBroker")
            .field("partitions", &self.partitions)
            .field("latency", &self.latency)
            .field("failing", &self.failure.is_some())
            .field("records", &self.len())
            .finish()
    }
}

impl InMemoryBroker {
    /// Create a broker with a single partition per topic.
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(Log::default())),
            partitions: 1,
            latency: None,
            failure: None,
        }
    }

    /// Set the number of partitions per topic (at least one).
    pub fn with_partitions(mut self, partitions: i32) -> Self {
        self.partitions = partitions.max(1);
        self
    }

    /// Delay every send by `latency` before acknowledging.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Fail every send with the error produced by `failure`.
    pub fn failing_with<F>(mut self, failure: F) -> Self
    where
        F: Fn() -> BrokerError + Send + Sync + 'static,
    {
        self.failure = Some(Arc::new(failure));
        self
    }

    /// Partition a key is placed on.
    pub fn partition_for(&self, key: &str) -> i32 {
        let digest = Sha256::digest(key.as_bytes());
        let mut prefix = [0u8; 4];
        prefix.copy_from_slice(&digest[..4]);
        let hash = u32::from_be_bytes(prefix);
        // partitions >= 1, so the remainder always fits in i32
        (hash % self.partitions.unsigned_abs()) as i32
    }

    /// All accepted records in arrival order.
    pub fn records(&self) -> Vec<BrokerRecord> {
        self.lock().records.clone()
    }

    /// Records accepted on `topic`.
    pub fn records_for(&self, topic: &str) -> Vec<BrokerRecord> {
        self.lock()
            .records
            .iter()
            .filter(|r| r.topic == topic)
            .cloned()
            .collect()
    }

    /// Distinct topics in first-seen order.
    pub fn topics(&self) -> Vec<String> {
        let log = self.lock();
        let mut topics: Vec<String> = Vec::new();
        for record in &log.records {
            if !topics.contains(&record.topic) {
                topics.push(record.topic.clone());
            }
        }
        topics
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    /// Clear all records and offsets (useful for test cleanup).
    pub fn clear(&self) {
        let mut log = self.lock();
        log.records.clear();
        log.next_offsets.clear();
    }

    // Inspection helpers keep working after a panicking writer.
    fn lock(&self) -> std::sync::MutexGuard<'_, Log> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl BrokerClient for InMemoryBroker {
    async fn send(&self, topic: &str, key: &str, payload: Vec<u8>) -> Result<SendReceipt, BrokerError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(failure) = &self.failure {
            return Err(failure());
        }

        let partition = self.partition_for(key);
        let mut log = self
            .log
            .lock()
            .map_err(|_| BrokerError::Unavailable("in-memory log poisoned".to_string()))?;
        let next = log
            .next_offsets
            .entry((topic.to_string(), partition))
            .or_insert(0);
        let offset = *next;
        *next += 1;

        log.records.push(BrokerRecord {
            topic: topic.to_string(),
            key: key.to_string(),
            payload,
            partition,
            offset,
        });
        Ok(SendReceipt { partition, offset })
    }
}
