use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::reference::EntityRef;
use super::user::UserRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Project,
    Task,
    Meeting,
    #[serde(alias = "confluence_page")]
    Page,
    #[serde(alias = "client_feedback")]
    Feedback,
    TaskIssue,
    User,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Project => "project",
            ResourceKind::Task => "task",
            ResourceKind::Meeting => "meeting",
            ResourceKind::Page => "page",
            ResourceKind::Feedback => "feedback",
            ResourceKind::TaskIssue => "task_issue",
            ResourceKind::User => "user",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "project" => Ok(ResourceKind::Project),
            "task" => Ok(ResourceKind::Task),
            "meeting" => Ok(ResourceKind::Meeting),
            "page" | "confluence_page" => Ok(ResourceKind::Page),
            "feedback" | "client_feedback" => Ok(ResourceKind::Feedback),
            "task_issue" | "issue" => Ok(ResourceKind::TaskIssue),
            "user" | "profile" => Ok(ResourceKind::User),
            other => Err(format!("unknown resource kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    #[serde(alias = "_id")]
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(alias = "createdBy")]
    pub created_by: EntityRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(alias = "_id")]
    pub id: Uuid,
    pub project: EntityRef,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: String,
    #[serde(alias = "createdBy")]
    pub created_by: EntityRef,
    #[serde(default, alias = "assignedTo", skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<EntityRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingRecord {
    #[serde(alias = "_id")]
    pub id: Uuid,
    pub project: EntityRef,
    #[serde(default)]
    pub title: String,
    pub organizer: EntityRef,
    #[serde(default, alias = "meetingLink", skip_serializing_if = "Option::is_none")]
    pub meeting_link: Option<String>,
    #[serde(default)]
    pub attendees: Vec<EntityRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    #[serde(alias = "_id")]
    pub id: Uuid,
    pub project: EntityRef,
    #[serde(default)]
    pub title: String,
    #[serde(alias = "createdBy")]
    pub created_by: EntityRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    #[serde(alias = "_id")]
    pub id: Uuid,
    pub project: EntityRef,
    #[serde(default)]
    pub message: String,
    #[serde(alias = "createdBy")]
    pub created_by: EntityRef,
}

/// Issues hang off a task and reach their project only through it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskIssueRecord {
    #[serde(alias = "_id")]
    pub id: Uuid,
    pub task: EntityRef,
    #[serde(default)]
    pub title: String,
    #[serde(alias = "createdBy")]
    pub created_by: EntityRef,
    #[serde(default, alias = "assignedTo", skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<EntityRef>,
}

/// Canonical resource record as returned by the resource lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resource {
    Project(ProjectRecord),
    Task(TaskRecord),
    Meeting(MeetingRecord),
    Page(PageRecord),
    Feedback(FeedbackRecord),
    TaskIssue(TaskIssueRecord),
    User(UserRecord),
}

/// How a resource is tied to its owning project.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectLink<'a> {
    /// The resource is the project.
    Itself(&'a ProjectRecord),
    Direct(&'a EntityRef),
    ViaTask(&'a EntityRef),
    /// Resource lives outside any project (user profiles).
    Unscoped,
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Project(_) => ResourceKind::Project,
            Resource::Task(_) => ResourceKind::Task,
            Resource::Meeting(_) => ResourceKind::Meeting,
            Resource::Page(_) => ResourceKind::Page,
            Resource::Feedback(_) => ResourceKind::Feedback,
            Resource::TaskIssue(_) => ResourceKind::TaskIssue,
            Resource::User(_) => ResourceKind::User,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Resource::Project(r) => r.id,
            Resource::Task(r) => r.id,
            Resource::Meeting(r) => r.id,
            Resource::Page(r) => r.id,
            Resource::Feedback(r) => r.id,
            Resource::TaskIssue(r) => r.id,
            Resource::User(r) => r.id,
        }
    }

    /// Creator or organizer reference. Profiles have no owner reference;
    /// self-service is decided on the profile id directly.
    pub fn owner_ref(&self) -> Option<&EntityRef> {
        match self {
            Resource::Project(r) => Some(&r.created_by),
            Resource::Task(r) => Some(&r.created_by),
            Resource::Meeting(r) => Some(&r.organizer),
            Resource::Page(r) => Some(&r.created_by),
            Resource::Feedback(r) => Some(&r.created_by),
            Resource::TaskIssue(r) => Some(&r.created_by),
            Resource::User(_) => None,
        }
    }

    pub fn assignee_ref(&self) -> Option<&EntityRef> {
        match self {
            Resource::Task(r) => r.assigned_to.as_ref(),
            Resource::TaskIssue(r) => r.assigned_to.as_ref(),
            _ => None,
        }
    }

    pub fn project_link(&self) -> ProjectLink<'_> {
        match self {
            Resource::Project(r) => ProjectLink::Itself(r),
            Resource::Task(r) => ProjectLink::Direct(&r.project),
            Resource::Meeting(r) => ProjectLink::Direct(&r.project),
            Resource::Page(r) => ProjectLink::Direct(&r.project),
            Resource::Feedback(r) => ProjectLink::Direct(&r.project),
            Resource::TaskIssue(r) => ProjectLink::ViaTask(&r.task),
            Resource::User(_) => ProjectLink::Unscoped,
        }
    }
}
