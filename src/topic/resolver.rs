use std::collections::BTreeMap;

use crate::config::PublisherSettings;
use crate::error::ConfigurationError;
use crate::event::{DomainEvent, Event, EventKind};

use super::TopicMapping;

/// Longest topic name Kafka accepts.
pub const MAX_TOPIC_LEN: usize = 249;

/// Resolves full topic names as `{prefix}.{environment}.{base}`.
///
/// Built once at startup and shared read-only afterwards.
///
/// ## Example
///
/// ```
/// use stride_events::{EventKind, PublisherSettings, TopicResolver};
///
/// let resolver = TopicResolver::with_defaults(&PublisherSettings::default()).unwrap();
/// assert_eq!(resolver.resolve_kind(EventKind::USER_CREATED), "stride.local.user-events");
///
/// let widget = EventKind::new("WidgetEvent", "WidgetEvent", "WIDGET_CREATED");
/// assert_eq!(resolver.resolve_kind(widget), "stride.local.widget-events");
/// ```
#[derive(Debug, Clone)]
pub struct TopicResolver {
    prefix: String,
    environment: String,
    mapping: TopicMapping,
}

impl TopicResolver {
    pub fn builder(settings: &PublisherSettings) -> TopicResolverBuilder {
        TopicResolverBuilder {
            prefix: settings.topic_prefix.clone(),
            environment: settings.environment.clone(),
            mapping: TopicMapping::new(),
            kinds: Vec::new(),
        }
    }

    /// Resolver with the built-in family mapping and all built-in kinds registered.
    pub fn with_defaults(settings: &PublisherSettings) -> Result<Self, ConfigurationError> {
        Self::builder(settings)
            .mapping(TopicMapping::defaults())
            .register_kinds(DomainEvent::KINDS)
            .build()
    }

    /// Defaults plus `extra` kinds this process will publish, so their
    /// derived topics are checked for collisions at build time.
    pub fn with_kinds(
        settings: &PublisherSettings,
        extra: impl IntoIterator<Item = EventKind>,
    ) -> Result<Self, ConfigurationError> {
        Self::builder(settings)
            .mapping(TopicMapping::defaults())
            .register_kinds(DomainEvent::KINDS)
            .register_kinds(extra)
            .build()
    }

    pub fn resolve<E: Event>(&self, event: &E) -> String {
        self.resolve_kind(event.kind())
    }

    pub fn resolve_kind(&self, kind: EventKind) -> String {
        self.topic_for_base(&self.base_topic(kind))
    }

    /// Base topic for a kind: its family's mapping, or the derived name.
    pub fn base_topic(&self, kind: EventKind) -> String {
        match self.mapping.base_topic(kind.family()) {
            Some(base) => base.to_string(),
            None => {
                let derived = kind.derived_base_topic();
                match self.mapping.family_for_base(&derived) {
                    Some(owner) => tracing::warn!(
                        kind = %kind,
                        family = kind.family(),
                        base = %derived,
                        owner = owner,
                        "derived topic of unregistered kind is owned by another family"
                    ),
                    None => tracing::debug!(kind = %kind, family = kind.family(), base = %derived, "no topic mapping for family, using derived name"),
                }
                derived
            }
        }
    }

    pub fn topic_for_base(&self, base_topic: &str) -> String {
        format!("{}.{}.{}", self.prefix, self.environment, base_topic)
    }

    /// Full topic name for every mapped family, keyed by base topic.
    pub fn all_topics(&self) -> BTreeMap<String, String> {
        self.mapping
            .iter()
            .map(|(_, base)| (base.to_string(), self.topic_for_base(base)))
            .collect()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn mapping(&self) -> &TopicMapping {
        &self.mapping
    }
}

/// Collects the mapping and known kinds, then validates them in [`build`].
///
/// [`build`]: TopicResolverBuilder::build
#[derive(Debug, Clone)]
pub struct TopicResolverBuilder {
    prefix: String,
    environment: String,
    mapping: TopicMapping,
    kinds: Vec<EventKind>,
}

impl TopicResolverBuilder {
    /// Replace the whole family mapping.
    pub fn mapping(mut self, mapping: TopicMapping) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn map_family(mut self, family: impl Into<String>, base_topic: impl Into<String>) -> Self {
        self.mapping.insert(family, base_topic);
        self
    }

    /// Declare a kind the process will publish, so its topic is checked at build time.
    pub fn register_kind(mut self, kind: EventKind) -> Self {
        self.kinds.push(kind);
        self
    }

    pub fn register_kinds(mut self, kinds: impl IntoIterator<Item = EventKind>) -> Self {
        self.kinds.extend(kinds);
        self
    }

    pub fn build(self) -> Result<TopicResolver, ConfigurationError> {
        check_segment("topic_prefix", &self.prefix)?;
        check_segment("environment", &self.environment)?;

        let resolver = TopicResolver {
            prefix: self.prefix,
            environment: self.environment,
            mapping: self.mapping,
        };

        for (_, base) in resolver.mapping.iter() {
            check_base(&resolver, base)?;
        }

        for kind in &self.kinds {
            if resolver.mapping.base_topic(kind.family()).is_some() {
                continue;
            }
            let derived = kind.derived_base_topic();
            if let Some(family) = resolver.mapping.family_for_base(&derived) {
                return Err(ConfigurationError::TopicCollision {
                    kind: kind.name(),
                    base: derived,
                    family: family.to_string(),
                });
            }
            check_base(&resolver, &derived)?;
        }

        tracing::info!(
            prefix = %resolver.prefix,
            environment = %resolver.environment,
            families = resolver.mapping.len(),
            kinds = self.kinds.len(),
            "topic resolver ready"
        );
        Ok(resolver)
    }
}

fn check_segment(name: &'static str, value: &str) -> Result<(), ConfigurationError> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidSegment {
            name,
            value: value.to_string(),
        })
    }
}

fn check_base(resolver: &TopicResolver, base: &str) -> Result<(), ConfigurationError> {
    let valid = !base.is_empty()
        && base
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if !valid {
        return Err(ConfigurationError::InvalidBaseTopic(base.to_string()));
    }
    let topic = resolver.topic_for_base(base);
    if topic.len() > MAX_TOPIC_LEN {
        return Err(ConfigurationError::TopicTooLong {
            len: topic.len(),
            topic,
            max: MAX_TOPIC_LEN,
        });
    }
    Ok(())
}
