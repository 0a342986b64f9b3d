use std::fmt;

/// Tag identifying one event variant.
///
/// - `name` is the kind identifier (`UserCreatedEvent`), used for partition
///   keys, diagnostics, and the derived-topic fallback.
/// - `family` groups variants that share a topic (`UserEvent`).
/// - `event_type` is the wire discriminator (`USER_CREATED`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventKind {
    name: &'static str,
    family: &'static str,
    event_type: &'static str,
}

impl EventKind {
    pub const USER_CREATED: EventKind = EventKind::new("UserCreatedEvent", "UserEvent", "USER_CREATED");
    pub const USER_UPDATED: EventKind = EventKind::new("UserUpdatedEvent", "UserEvent", "USER_UPDATED");
    pub const TASK_CREATED: EventKind = EventKind::new("TaskCreatedEvent", "TaskEvent", "TASK_CREATED");
    pub const TASK_UPDATED: EventKind = EventKind::new("TaskUpdatedEvent", "TaskEvent", "TASK_UPDATED");
    pub const TASK_ASSIGNED: EventKind = EventKind::new("TaskAssignedEvent", "TaskEvent", "TASK_ASSIGNED");
    pub const TEAM_CREATED: EventKind = EventKind::new("TeamCreatedEvent", "TeamEvent", "TEAM_CREATED");
    pub const TEAM_MEMBER_ADDED: EventKind =
        EventKind::new("TeamMemberAddedEvent", "TeamEvent", "TEAM_MEMBER_ADDED");

    pub const fn new(name: &'static str, family: &'static str, event_type: &'static str) -> Self {
        Self {
            name,
            family,
            event_type,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn family(&self) -> &'static str {
        self.family
    }

    pub fn event_type(&self) -> &'static str {
        self.event_type
    }

    /// Base topic used when the family has no explicit mapping.
    ///
    /// Lower-cases the kind name and turns a trailing `event` into
    /// `-events` (`WidgetEvent` becomes `widget-events`). Names without
    /// that suffix get `-events` appended.
    pub fn derived_base_topic(&self) -> String {
        let lower = self.name.to_lowercase();
        let stem = lower.strip_suffix("event").unwrap_or(&lower);
        format!("{stem}-events")
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
