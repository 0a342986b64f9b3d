use serde::{Deserialize, Serialize};

use super::{
    Event, EventHeader, EventKind, TaskAssigned, TaskCreated, TaskEvent, TaskUpdated, TeamCreated,
    TeamEvent, TeamMemberAdded, UserCreated, UserEvent, UserUpdated,
};

/// Any built-in event. Serializes exactly like the wrapped family event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DomainEvent {
    User(UserEvent),
    Task(TaskEvent),
    Team(TeamEvent),
}

impl DomainEvent {
    /// Every built-in kind, in family order.
    pub const KINDS: [EventKind; 7] = [
        EventKind::USER_CREATED,
        EventKind::USER_UPDATED,
        EventKind::TASK_CREATED,
        EventKind::TASK_UPDATED,
        EventKind::TASK_ASSIGNED,
        EventKind::TEAM_CREATED,
        EventKind::TEAM_MEMBER_ADDED,
    ];

    /// Built-in families with their default base topics.
    pub const FAMILIES: [(&'static str, &'static str); 3] = [
        (UserEvent::FAMILY, "user-events"),
        (TaskEvent::FAMILY, "task-events"),
        (TeamEvent::FAMILY, "team-events"),
    ];
}

impl Event for DomainEvent {
    fn kind(&self) -> EventKind {
        match self {
            DomainEvent::User(e) => e.kind(),
            DomainEvent::Task(e) => e.kind(),
            DomainEvent::Team(e) => e.kind(),
        }
    }

    fn header(&self) -> &EventHeader {
        match self {
            DomainEvent::User(e) => e.header(),
            DomainEvent::Task(e) => e.header(),
            DomainEvent::Team(e) => e.header(),
        }
    }

    fn aggregate_id(&self) -> &str {
        match self {
            DomainEvent::User(e) => e.aggregate_id(),
            DomainEvent::Task(e) => e.aggregate_id(),
            DomainEvent::Team(e) => e.aggregate_id(),
        }
    }
}

impl From<UserEvent> for DomainEvent {
    fn from(event: UserEvent) -> Self {
        DomainEvent::User(event)
    }
}

impl From<TaskEvent> for DomainEvent {
    fn from(event: TaskEvent) -> Self {
        DomainEvent::Task(event)
    }
}

impl From<TeamEvent> for DomainEvent {
    fn from(event: TeamEvent) -> Self {
        DomainEvent::Team(event)
    }
}

macro_rules! variant_into_domain {
    ($($variant:ty => $family:ident),* $(,)?) => {
        $(
            impl From<$variant> for DomainEvent {
                fn from(event: $variant) -> Self {
                    DomainEvent::from($family::from(event))
                }
            }
        )*
    };
}

variant_into_domain! {
    UserCreated => UserEvent,
    UserUpdated => UserEvent,
    TaskCreated => TaskEvent,
    TaskUpdated => TaskEvent,
    TaskAssigned => TaskEvent,
    TeamCreated => TeamEvent,
    TeamMemberAdded => TeamEvent,
}
