use serde::{Deserialize, Serialize};

use super::{Event, EventHeader, EventKind};

// Nullable fields must still be present on the wire (as `null`). Routing
// them through `Option::deserialize` turns a missing key into an error
// instead of a silent `None`.

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCreated {
    #[serde(flatten)]
    pub header: EventHeader,
    pub task_id: String,
    pub team_id: String,
    pub project_id: String,
    pub title: String,
    #[serde(deserialize_with = "Option::deserialize")]
    pub assigned_to: Option<String>,
    pub created_by: String,
    pub organization_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdated {
    #[serde(flatten)]
    pub header: EventHeader,
    pub task_id: String,
    pub team_id: String,
    pub status: String,
    #[serde(deserialize_with = "Option::deserialize")]
    pub previous_status: Option<String>,
    pub updated_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAssigned {
    #[serde(flatten)]
    pub header: EventHeader,
    pub task_id: String,
    pub team_id: String,
    pub assigned_to: String,
    pub assigned_by: String,
    #[serde(deserialize_with = "Option::deserialize")]
    pub previous_assignee: Option<String>,
}

/// Events about tasks. Routed to `task-events`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "eventType")]
pub enum TaskEvent {
    #[serde(rename = "TASK_CREATED")]
    Created(TaskCreated),
    #[serde(rename = "TASK_UPDATED")]
    Updated(TaskUpdated),
    #[serde(rename = "TASK_ASSIGNED")]
    Assigned(TaskAssigned),
}

impl TaskEvent {
    pub const FAMILY: &'static str = "TaskEvent";
    pub const KINDS: [EventKind; 3] = [
        EventKind::TASK_CREATED,
        EventKind::TASK_UPDATED,
        EventKind::TASK_ASSIGNED,
    ];
}

impl Event for TaskEvent {
    fn kind(&self) -> EventKind {
        match self {
            TaskEvent::Created(_) => EventKind::TASK_CREATED,
            TaskEvent::Updated(_) => EventKind::TASK_UPDATED,
            TaskEvent::Assigned(_) => EventKind::TASK_ASSIGNED,
        }
    }

    fn header(&self) -> &EventHeader {
        match self {
            TaskEvent::Created(e) => &e.header,
            TaskEvent::Updated(e) => &e.header,
            TaskEvent::Assigned(e) => &e.header,
        }
    }

    fn aggregate_id(&self) -> &str {
        match self {
            TaskEvent::Created(e) => &e.task_id,
            TaskEvent::Updated(e) => &e.task_id,
            TaskEvent::Assigned(e) => &e.task_id,
        }
    }
}

impl From<TaskCreated> for TaskEvent {
    fn from(event: TaskCreated) -> Self {
        TaskEvent::Created(event)
    }
}

impl From<TaskUpdated> for TaskEvent {
    fn from(event: TaskUpdated) -> Self {
        TaskEvent::Updated(event)
    }
}

impl From<TaskAssigned> for TaskEvent {
    fn from(event: TaskAssigned) -> Self {
        TaskEvent::Assigned(event)
    }
}
