use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::runtime::Handle;
use tracing::Instrument;

use super::handle::{PublishHandle, PublishReceipt, PublishState, StateCell};
use super::partition::PartitionKeys;
use crate::broker::BrokerClient;
use crate::config::PublisherSettings;
use crate::error::{ConfigurationError, PublishError, PublishFailure};
use crate::event::Event;
use crate::serializer::EventSerializer;
use crate::topic::TopicResolver;

/// Publishes domain events to a broker.
///
/// Cheap to clone; clones share the broker client and resolver. Every
/// publish call is independent: the publisher holds no locks and keeps no
/// per-call state after returning the handle.
///
/// ## Example
///
/// ```
/// use stride_events::broker::InMemoryBroker;
/// use stride_events::{EventHeader, EventPublisher, PublisherSettings, UserCreated, UserEvent};
///
/// let runtime = tokio::runtime::Runtime::new().unwrap();
/// let broker = InMemoryBroker::new();
/// let publisher = EventPublisher::new(
///     broker.clone(),
///     &PublisherSettings::default(),
///     runtime.handle().clone(),
/// )
/// .unwrap();
///
/// let event: UserEvent =
///     UserCreated::new(EventHeader::root(), "u1", "o1", "ada@example.com", "Ada").into();
/// let receipt = publisher.publish_blocking(&event).unwrap();
///
/// assert_eq!(receipt.topic, "stride.local.user-events");
/// assert_eq!(broker.len(), 1);
/// ```
pub struct EventPublisher<B> {
    broker: Arc<B>,
    resolver: Arc<TopicResolver>,
    serializer: EventSerializer,
    keys: PartitionKeys,
    timeout: Duration,
    runtime: Handle,
}

impl<B> Clone for EventPublisher<B> {
    fn clone(&self) -> Self {
        Self {
            broker: Arc::clone(&self.broker),
            resolver: Arc::clone(&self.resolver),
            serializer: self.serializer,
            keys: self.keys,
            timeout: self.timeout,
            runtime: self.runtime.clone(),
        }
    }
}

impl<B: BrokerClient + 'static> EventPublisher<B> {
    /// Publisher with the default topic mapping, driving sends on `runtime`.
    pub fn new(broker: B, settings: &PublisherSettings, runtime: Handle) -> Result<Self, ConfigurationError> {
        let resolver = TopicResolver::with_defaults(settings)?;
        Self::with_resolver(broker, resolver, settings, runtime)
    }

    /// Publisher driving sends on the runtime of the calling context.
    pub fn from_current(broker: B, settings: &PublisherSettings) -> Result<Self, ConfigurationError> {
        let runtime = Handle::try_current().map_err(|_| ConfigurationError::NoRuntime)?;
        Self::new(broker, settings, runtime)
    }

    /// Publisher with a custom resolver (extra families, registered kinds).
    pub fn with_resolver(
        broker: B,
        resolver: TopicResolver,
        settings: &PublisherSettings,
        runtime: Handle,
    ) -> Result<Self, ConfigurationError> {
        settings.validate()?;
        Ok(Self {
            broker: Arc::new(broker),
            resolver: Arc::new(resolver),
            serializer: EventSerializer::new(),
            keys: PartitionKeys::new(settings.partition_buckets),
            timeout: settings.publish_timeout(),
            runtime,
        })
    }

    pub fn broker(&self) -> &B {
        &self.broker
    }

    pub fn resolver(&self) -> &TopicResolver {
        &self.resolver
    }

    pub fn partition_keys(&self) -> PartitionKeys {
        self.keys
    }

    /// Bound applied by the waiting publish calls.
    pub fn publish_timeout(&self) -> Duration {
        self.timeout
    }

    /// Publish to the event's resolved topic with a derived key.
    ///
    /// Returns as soon as the send is handed to the runtime.
    pub fn publish<E: Event>(&self, event: &E) -> PublishHandle {
        let topic = self.resolver.resolve(event);
        self.dispatch(topic, None, event)
    }

    /// Publish to an explicit topic with a derived key.
    pub fn publish_to<E: Event>(&self, topic: impl Into<String>, event: &E) -> PublishHandle {
        self.dispatch(topic.into(), None, event)
    }

    /// Publish to an explicit topic with an explicit partition key.
    pub fn publish_with_key<E: Event>(
        &self,
        topic: impl Into<String>,
        key: impl Into<String>,
        event: &E,
    ) -> PublishHandle {
        self.dispatch(topic.into(), Some(key.into()), event)
    }

    /// Publish and block the calling thread until acknowledged or timed out.
    ///
    /// Prefer [`publish`](Self::publish) for throughput-sensitive code. On
    /// timeout the send is not cancelled and may still land: treat the
    /// outcome as unknown.
    ///
    /// Call it from a thread that is not driving the publisher's runtime
    /// (a plain thread or `spawn_blocking`). On a current-thread runtime the
    /// send cannot progress while this call waits, so it will time out.
    pub fn publish_blocking<E: Event>(&self, event: &E) -> Result<PublishReceipt, PublishError> {
        let handle = self.publish(event);
        self.wait_blocking(handle)
    }

    /// [`publish_blocking`](Self::publish_blocking) to an explicit topic.
    pub fn publish_blocking_to<E: Event>(
        &self,
        topic: impl Into<String>,
        event: &E,
    ) -> Result<PublishReceipt, PublishError> {
        let handle = self.publish_to(topic, event);
        self.wait_blocking(handle)
    }

    /// Publish and wait for the outcome from async code, bounded by the
    /// configured timeout. Only the calling task is suspended.
    pub async fn publish_and_wait<E: Event>(&self, event: &E) -> Result<PublishReceipt, PublishError> {
        let handle = self.publish(event);
        let topic = handle.topic().to_string();
        let kind = handle.kind();
        match tokio::time::timeout(self.timeout, handle).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(topic = %topic, kind = %kind, timeout = ?self.timeout, "publish timed out, outcome unknown");
                Err(PublishError::new(topic, kind.name(), PublishFailure::TimedOut(self.timeout)))
            }
        }
    }

    /// Publish every event concurrently and collect the outcomes in order.
    ///
    /// All sends are dispatched before any is awaited. Not bounded by the
    /// publish timeout.
    pub async fn publish_all<E: Event>(&self, events: &[E]) -> Vec<Result<PublishReceipt, PublishError>> {
        let handles: Vec<PublishHandle> = events.iter().map(|event| self.publish(event)).collect();
        join_all(handles).await
    }

    fn dispatch<E: Event>(&self, topic: String, key: Option<String>, event: &E) -> PublishHandle {
        let kind = event.kind();
        let state = StateCell::new();
        let span = tracing::debug_span!(
            "publish",
            topic = %topic,
            kind = %kind,
            event_id = %event.event_id(),
            correlation_id = %event.correlation_id(),
        );
        let entered = span.enter();

        state.advance(PublishState::Serializing);
        let payload = match self.serializer.serialize_bytes(event) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::error!(error = %err, "error serializing event, not dispatched");
                let err = PublishError::new(topic.clone(), kind.name(), err);
                return PublishHandle::failed(topic, kind, state, err);
            }
        };
        let key = key.unwrap_or_else(|| self.keys.derive(kind, &payload));
        tracing::debug!(key = %key, bytes = payload.len(), "publishing event");

        let broker = Arc::clone(&self.broker);
        let task_state = state.clone();
        let task_topic = topic.clone();
        state.advance(PublishState::Dispatched);

        let send = async move {
            match broker.send(&task_topic, &key, payload).await {
                Ok(receipt) => {
                    task_state.advance(PublishState::Succeeded);
                    tracing::info!(
                        partition = receipt.partition,
                        offset = receipt.offset,
                        "successfully published event"
                    );
                    Ok(PublishReceipt {
                        topic: task_topic,
                        key,
                        partition: receipt.partition,
                        offset: receipt.offset,
                    })
                }
                Err(err) => {
                    task_state.advance(PublishState::Failed);
                    tracing::error!(error = %err, "failed to publish event");
                    Err(PublishError::new(task_topic, kind.name(), err))
                }
            }
        };
        drop(entered);
        let join = self.runtime.spawn(send.instrument(span));
        PublishHandle::dispatched(topic, kind, state, join)
    }

    fn wait_blocking(&self, handle: PublishHandle) -> Result<PublishReceipt, PublishError> {
        let topic = handle.topic().to_string();
        let kind = handle.kind();
        let (tx, rx) = mpsc::sync_channel(1);

        self.runtime.spawn(async move {
            let result = handle.await;
            if tx.send(result).is_err() {
                tracing::warn!(kind = %kind, "publish completed after the blocking caller gave up");
            }
        });

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                tracing::error!(topic = %topic, kind = %kind, timeout = ?self.timeout, "timeout publishing event synchronously, outcome unknown");
                Err(PublishError::new(topic, kind.name(), PublishFailure::TimedOut(self.timeout)))
            }
            Err(RecvTimeoutError::Disconnected) => Err(PublishError::new(
                topic,
                kind.name(),
                PublishFailure::Aborted("runtime dropped the publish task".to_string()),
            )),
        }
    }
}
