use serde::{Deserialize, Serialize};

use super::{Event, EventHeader, EventKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamCreated {
    #[serde(flatten)]
    pub header: EventHeader,
    pub team_id: String,
    pub organization_id: String,
    pub team_name: String,
    pub created_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberAdded {
    #[serde(flatten)]
    pub header: EventHeader,
    pub team_id: String,
    pub user_id: String,
    pub role: String,
    pub added_by: String,
}

/// Events about teams and membership. Routed to `team-events`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "eventType")]
pub enum TeamEvent {
    #[serde(rename = "TEAM_CREATED")]
    Created(TeamCreated),
    #[serde(rename = "TEAM_MEMBER_ADDED")]
    MemberAdded(TeamMemberAdded),
}

impl TeamEvent {
    pub const FAMILY: &'static str = "TeamEvent";
    pub const KINDS: [EventKind; 2] = [EventKind::TEAM_CREATED, EventKind::TEAM_MEMBER_ADDED];
}

impl Event for TeamEvent {
    fn kind(&self) -> EventKind {
        match self {
            TeamEvent::Created(_) => EventKind::TEAM_CREATED,
            TeamEvent::MemberAdded(_) => EventKind::TEAM_MEMBER_ADDED,
        }
    }

    fn header(&self) -> &EventHeader {
        match self {
            TeamEvent::Created(e) => &e.header,
            TeamEvent::MemberAdded(e) => &e.header,
        }
    }

    fn aggregate_id(&self) -> &str {
        match self {
            TeamEvent::Created(e) => &e.team_id,
            TeamEvent::MemberAdded(e) => &e.team_id,
        }
    }
}

impl From<TeamCreated> for TeamEvent {
    fn from(event: TeamCreated) -> Self {
        TeamEvent::Created(event)
    }
}

impl From<TeamMemberAdded> for TeamEvent {
    fn from(event: TeamMemberAdded) -> Self {
        TeamEvent::MemberAdded(event)
    }
}
