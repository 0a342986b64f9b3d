use thiserror::Error;

/// Invalid event header values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("event id must not be empty")]
    EmptyEventId,
    #[error("correlation id must not be empty")]
    EmptyCorrelationId,
}

/// An event could not be encoded to, or decoded from, its JSON wire form.
///
/// Never worth retrying: the payload or the declared type is wrong.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("failed to serialize event {kind} to JSON: {source}")]
    Encode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to deserialize JSON to event {expected}: {source}")]
    Decode {
        expected: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("payload carries event type {found}, expected {expected}")]
    KindMismatch {
        expected: &'static str,
        found: String,
    },
    #[error("payload has no eventType discriminator")]
    MissingDiscriminator,
}

impl SerializationError {
    pub const CODE: &'static str = "EVENT_SERIALIZATION_FAILED";

    pub fn error_code(&self) -> &'static str {
        Self::CODE
    }
}

/// Failure reported by a broker client.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// The broker could not be reached.
    #[error("broker unavailable: {0}")]
    Unavailable(String),
    /// The broker refused the credentials or the topic ACL.
    #[error("not authorized: {0}")]
    Unauthorized(String),
    /// The broker accepted the connection but rejected the record.
    #[error("record rejected: {0}")]
    Rejected(String),
    /// The broker did not acknowledge in time.
    #[error("broker acknowledgement timed out")]
    TimedOut,
    #[error("broker error: {0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// Why a publish call failed.
#[derive(Debug, Error)]
pub enum PublishFailure {
    #[error(transparent)]
    Serialization(#[from] SerializationError),
    #[error(transparent)]
    Broker(#[from] BrokerError),
    /// The bounded wait elapsed. The send may still complete afterwards.
    #[error("no broker acknowledgement within {0:?}, outcome unknown")]
    TimedOut(std::time::Duration),
    /// The dispatch task ended without reporting a result.
    #[error("dispatch task aborted: {0}")]
    Aborted(String),
}

/// Dispatch of an event to the broker failed or timed out.
///
/// Carries the destination topic and the event kind for diagnostics. The
/// publisher never retries, so callers may retry with their own back-off.
#[derive(Debug, Error)]
#[error("failed to publish event {event_type} to topic {topic}: {cause}")]
pub struct PublishError {
    topic: String,
    event_type: &'static str,
    #[source]
    cause: PublishFailure,
}

impl PublishError {
    pub const CODE: &'static str = "EVENT_PUBLISH_FAILED";

    pub fn new(
        topic: impl Into<String>,
        event_type: &'static str,
        cause: impl Into<PublishFailure>,
    ) -> Self {
        Self {
            topic: topic.into(),
            event_type,
            cause: cause.into(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Kind name of the event that failed, e.g. `UserCreatedEvent`.
    pub fn event_type(&self) -> &'static str {
        self.event_type
    }

    pub fn cause(&self) -> &PublishFailure {
        &self.cause
    }

    pub fn into_cause(self) -> PublishFailure {
        self.cause
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self.cause,
            PublishFailure::TimedOut(_) | PublishFailure::Broker(BrokerError::TimedOut)
        )
    }

    pub fn error_code(&self) -> &'static str {
        Self::CODE
    }
}

/// Startup-time configuration problems. Fatal: fix the configuration.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("{name} must be a non-empty topic segment of [A-Za-z0-9_-], got {value:?}")]
    InvalidSegment { name: &'static str, value: String },
    #[error("base topic {0:?} must be non-empty and contain only [A-Za-z0-9._-]")]
    InvalidBaseTopic(String),
    #[error("topic {topic:?} is {len} characters, the broker limit is {max}")]
    TopicTooLong { topic: String, len: usize, max: usize },
    #[error("kind {kind} derives base topic {base:?}, which is already mapped to family {family}")]
    TopicCollision {
        kind: &'static str,
        base: String,
        family: String,
    },
    #[error("invalid setting {name}: {reason}")]
    InvalidSetting { name: &'static str, reason: String },
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),
    #[error("no tokio runtime available to drive publish calls")]
    NoRuntime,
}
