use serde::{Deserialize, Serialize};

use super::{Event, EventHeader, EventKind};

/// A user account was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreated {
    #[serde(flatten)]
    pub header: EventHeader,
    pub user_id: String,
    pub organization_id: String,
    pub email: String,
    pub full_name: String,
}

impl UserCreated {
    pub fn new(
        header: EventHeader,
        user_id: impl Into<String>,
        organization_id: impl Into<String>,
        email: impl Into<String>,
        full_name: impl Into<String>,
    ) -> Self {
        Self {
            header,
            user_id: user_id.into(),
            organization_id: organization_id.into(),
            email: email.into(),
            full_name: full_name.into(),
        }
    }
}

/// A user's profile changed. Carries the full new state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdated {
    #[serde(flatten)]
    pub header: EventHeader,
    pub user_id: String,
    pub organization_id: String,
    pub email: String,
    pub full_name: String,
}

impl UserUpdated {
    pub fn new(
        header: EventHeader,
        user_id: impl Into<String>,
        organization_id: impl Into<String>,
        email: impl Into<String>,
        full_name: impl Into<String>,
    ) -> Self {
        Self {
            header,
            user_id: user_id.into(),
            organization_id: organization_id.into(),
            email: email.into(),
            full_name: full_name.into(),
        }
    }
}

/// Events about user accounts. Routed to `user-events`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "eventType")]
pub enum UserEvent {
    #[serde(rename = "USER_CREATED")]
    Created(UserCreated),
    #[serde(rename = "USER_UPDATED")]
    Updated(UserUpdated),
}

impl UserEvent {
    pub const FAMILY: &'static str = "UserEvent";
    pub const KINDS: [EventKind; 2] = [EventKind::USER_CREATED, EventKind::USER_UPDATED];
}

impl Event for UserEvent {
    fn kind(&self) -> EventKind {
        match self {
            UserEvent::Created(_) => EventKind::USER_CREATED,
            UserEvent::Updated(_) => EventKind::USER_UPDATED,
        }
    }

    fn header(&self) -> &EventHeader {
        match self {
            UserEvent::Created(e) => &e.header,
            UserEvent::Updated(e) => &e.header,
        }
    }

    fn aggregate_id(&self) -> &str {
        match self {
            UserEvent::Created(e) => &e.user_id,
            UserEvent::Updated(e) => &e.user_id,
        }
    }
}

impl From<UserCreated> for UserEvent {
    fn from(event: UserCreated) -> Self {
        UserEvent::Created(event)
    }
}

impl From<UserUpdated> for UserEvent {
    fn from(event: UserUpdated) -> Self {
        UserEvent::Updated(event)
    }
}
