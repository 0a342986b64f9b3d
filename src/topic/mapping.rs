use std::collections::HashMap;

use crate::event::DomainEvent;

/// Family name to base topic, e.g. `UserEvent → user-events`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicMapping {
    families: HashMap<String, String>,
}

impl TopicMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapping for the built-in user, task and team families.
    pub fn defaults() -> Self {
        DomainEvent::FAMILIES
            .iter()
            .fold(Self::new(), |mapping, (family, base)| mapping.with(*family, *base))
    }

    pub fn with(mut self, family: impl Into<String>, base_topic: impl Into<String>) -> Self {
        self.insert(family, base_topic);
        self
    }

    pub fn insert(&mut self, family: impl Into<String>, base_topic: impl Into<String>) {
        self.families.insert(family.into(), base_topic.into());
    }

    pub fn base_topic(&self, family: &str) -> Option<&str> {
        self.families.get(family).map(String::as_str)
    }

    /// Family that owns `base_topic`, if any.
    pub fn family_for_base(&self, base_topic: &str) -> Option<&str> {
        self.families
            .iter()
            .find(|(_, base)| base.as_str() == base_topic)
            .map(|(family, _)| family.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.families
            .iter()
            .map(|(family, base)| (family.as_str(), base.as_str()))
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}
