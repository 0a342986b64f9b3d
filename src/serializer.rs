//! JSON wire codec for events.
//!
//! Timestamps are written as RFC 3339 strings. Decoding never invents
//! values: a missing field, an empty id, or a foreign discriminator is an
//! error.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::SerializationError;
use crate::event::{Event, EventKind};

/// Name of the JSON field holding [`EventKind::event_type`].
pub const DISCRIMINATOR: &str = "eventType";

/// Stateless JSON serializer for events.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventSerializer;

impl EventSerializer {
    pub fn new() -> Self {
        Self
    }

    /// Serialize an event to its JSON text.
    ///
    /// The payload always carries the `eventType` discriminator: it is added
    /// when the event does not write one, and a value different from the
    /// event's kind is rejected.
    pub fn serialize<E: Event>(&self, event: &E) -> Result<String, SerializationError> {
        let kind = event.kind();
        let result = serde_json::to_value(event)
            .map_err(|source| SerializationError::Encode {
                kind: kind.name(),
                source,
            })
            .and_then(|value| tag(value, kind))
            .and_then(|value| {
                serde_json::to_string(&value).map_err(|source| SerializationError::Encode {
                    kind: kind.name(),
                    source,
                })
            });

        match result {
            Ok(json) => {
                tracing::debug!(kind = %kind, json = %json, "serialized event");
                Ok(json)
            }
            Err(err) => {
                tracing::error!(kind = %kind, error = %err, "failed to serialize event");
                Err(err)
            }
        }
    }

    /// Serialize an event to UTF-8 bytes.
    pub fn serialize_bytes<E: Event>(&self, event: &E) -> Result<Vec<u8>, SerializationError> {
        self.serialize(event).map(String::into_bytes)
    }

    /// Decode JSON into the declared type.
    ///
    /// For a family enum or [`crate::DomainEvent`] the discriminator picks
    /// the variant; a discriminator foreign to `E` is an error.
    pub fn deserialize<E: DeserializeOwned>(&self, json: &str) -> Result<E, SerializationError> {
        serde_json::from_str(json).map_err(|source| {
            let expected = short_type_name::<E>();
            tracing::error!(expected = %expected, error = %source, "failed to deserialize event");
            SerializationError::Decode { expected, source }
        })
    }

    /// Decode JSON that must carry exactly the `expected` kind.
    pub fn deserialize_as<E>(&self, json: &str, expected: EventKind) -> Result<E, SerializationError>
    where
        E: Event + DeserializeOwned,
    {
        let value: Value = serde_json::from_str(json).map_err(|source| {
            tracing::error!(expected = %expected, error = %source, "malformed event JSON");
            SerializationError::Decode {
                expected: expected.name().to_string(),
                source,
            }
        })?;

        let found = match value.get(DISCRIMINATOR).and_then(Value::as_str) {
            Some(found) => found,
            None => {
                tracing::error!(expected = %expected, "payload has no event type");
                return Err(SerializationError::MissingDiscriminator);
            }
        };
        if found != expected.event_type() {
            tracing::error!(expected = %expected, found = %found, "event type mismatch");
            return Err(SerializationError::KindMismatch {
                expected: expected.event_type(),
                found: found.to_string(),
            });
        }

        let event: E = serde_json::from_value(value).map_err(|source| {
            tracing::error!(expected = %expected, error = %source, "failed to deserialize event");
            SerializationError::Decode {
                expected: expected.name().to_string(),
                source,
            }
        })?;
        tracing::debug!(kind = %expected, "deserialized event");
        Ok(event)
    }
}

fn tag(mut value: Value, kind: EventKind) -> Result<Value, SerializationError> {
    let Some(object) = value.as_object_mut() else {
        return Err(SerializationError::Encode {
            kind: kind.name(),
            source: serde::ser::Error::custom("event must serialize to a JSON object"),
        });
    };
    match object.get(DISCRIMINATOR).cloned() {
        None => {
            object.insert(DISCRIMINATOR.to_string(), Value::from(kind.event_type()));
        }
        Some(Value::String(found)) if found == kind.event_type() => {}
        Some(other) => {
            return Err(SerializationError::KindMismatch {
                expected: kind.event_type(),
                found: other.as_str().map_or_else(|| other.to_string(), str::to_string),
            });
        }
    }
    Ok(value)
}

fn short_type_name<T>() -> String {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full).to_string()
}
