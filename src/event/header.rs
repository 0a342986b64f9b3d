use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EventError;

/// Identity, correlation and creation time shared by every event.
///
/// Both ids are guaranteed non-empty, including after deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawHeader")]
pub struct EventHeader {
    event_id: String,
    correlation_id: String,
    timestamp: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHeader {
    event_id: String,
    correlation_id: String,
    timestamp: DateTime<Utc>,
}

impl TryFrom<RawHeader> for EventHeader {
    type Error = EventError;

    fn try_from(raw: RawHeader) -> Result<Self, Self::Error> {
        EventHeader::from_parts(raw.event_id, raw.correlation_id, raw.timestamp)
    }
}

impl EventHeader {
    /// Fresh header: random v4 event id, current time.
    pub fn new(correlation_id: impl Into<String>) -> Result<Self, EventError> {
        Self::from_parts(Uuid::new_v4().to_string(), correlation_id, Utc::now())
    }

    /// Header with a fresh event id that starts a new correlation chain.
    pub fn root() -> Self {
        let id = Uuid::new_v4().to_string();
        Self {
            correlation_id: id.clone(),
            event_id: id,
            timestamp: Utc::now(),
        }
    }

    pub fn from_parts(
        event_id: impl Into<String>,
        correlation_id: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, EventError> {
        let event_id = event_id.into();
        let correlation_id = correlation_id.into();
        if event_id.is_empty() {
            return Err(EventError::EmptyEventId);
        }
        if correlation_id.is_empty() {
            return Err(EventError::EmptyCorrelationId);
        }
        Ok(Self {
            event_id,
            correlation_id,
            timestamp,
        })
    }

    /// Header for an event caused by this one: new id, same correlation.
    pub fn follow_up(&self) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            correlation_id: self.correlation_id.clone(),
            timestamp: Utc::now(),
        }
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
