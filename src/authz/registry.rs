//! Role registry: the single table mapping global roles to capabilities.
//!
//! New capabilities are added here and nowhere else.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewProjects,
    ManageProjects,
    ChangeProjectStatus,
    ViewReports,

    ViewTasks,
    CreateTasks,
    UpdateTasks,
    DeleteTasks,
    AssignTasks,

    ViewMeetings,
    CreateMeetings,
    UpdateMeetings,
    DeleteMeetings,
    EditMeetingLinks,

    ViewPages,
    EditPages,
    DeletePages,

    ViewFeedback,
    CreateFeedback,

    ViewTaskIssues,
    CreateTaskIssues,
    UpdateTaskIssues,
    AssignTaskIssues,

    ViewUsers,
    ManageUsers,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ViewProjects => "view_projects",
            Capability::ManageProjects => "manage_projects",
            Capability::ChangeProjectStatus => "change_project_status",
            Capability::ViewReports => "view_reports",
            Capability::ViewTasks => "view_tasks",
            Capability::CreateTasks => "create_tasks",
            Capability::UpdateTasks => "update_tasks",
            Capability::DeleteTasks => "delete_tasks",
            Capability::AssignTasks => "assign_tasks",
            Capability::ViewMeetings => "view_meetings",
            Capability::CreateMeetings => "create_meetings",
            Capability::UpdateMeetings => "update_meetings",
            Capability::DeleteMeetings => "delete_meetings",
            Capability::EditMeetingLinks => "edit_meeting_links",
            Capability::ViewPages => "view_pages",
            Capability::EditPages => "edit_pages",
            Capability::DeletePages => "delete_pages",
            Capability::ViewFeedback => "view_feedback",
            Capability::CreateFeedback => "create_feedback",
            Capability::ViewTaskIssues => "view_task_issues",
            Capability::CreateTaskIssues => "create_task_issues",
            Capability::UpdateTaskIssues => "update_task_issues",
            Capability::AssignTaskIssues => "assign_task_issues",
            Capability::ViewUsers => "view_users",
            Capability::ManageUsers => "manage_users",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

use Capability::*;

const ADMIN: &[Capability] = &[
    ViewProjects,
    ManageProjects,
    ChangeProjectStatus,
    ViewReports,
    ViewTasks,
    CreateTasks,
    UpdateTasks,
    DeleteTasks,
    AssignTasks,
    ViewMeetings,
    CreateMeetings,
    UpdateMeetings,
    DeleteMeetings,
    EditMeetingLinks,
    ViewPages,
    EditPages,
    DeletePages,
    ViewFeedback,
    CreateFeedback,
    ViewTaskIssues,
    CreateTaskIssues,
    UpdateTaskIssues,
    AssignTaskIssues,
    ViewUsers,
    ManageUsers,
];

const PROJECT_MANAGER: &[Capability] = &[
    ViewProjects,
    ManageProjects,
    ViewReports,
    ViewTasks,
    CreateTasks,
    UpdateTasks,
    DeleteTasks,
    AssignTasks,
    ViewMeetings,
    CreateMeetings,
    UpdateMeetings,
    EditMeetingLinks,
    ViewPages,
    EditPages,
    DeletePages,
    ViewFeedback,
    ViewTaskIssues,
    CreateTaskIssues,
    UpdateTaskIssues,
    AssignTaskIssues,
    ViewUsers,
];

// Task updates are further narrowed to the assignee and the status field.
const TEAM_MEMBER: &[Capability] = &[
    ViewProjects,
    ViewTasks,
    UpdateTasks,
    ViewMeetings,
    CreateMeetings,
    ViewPages,
    EditPages,
    ViewTaskIssues,
    CreateTaskIssues,
    UpdateTaskIssues,
    ViewUsers,
];

const CLIENT: &[Capability] = &[ViewProjects, ViewMeetings, ViewPages, ViewFeedback, CreateFeedback];

const ACCOUNTANT: &[Capability] = &[ViewProjects, ViewReports, ViewUsers];

const UNKNOWN: &[Capability] = &[ViewProjects];

fn table(role: Role) -> &'static [Capability] {
    match role {
        Role::Admin => ADMIN,
        Role::ProjectManager => PROJECT_MANAGER,
        Role::TeamMember => TEAM_MEMBER,
        Role::Client => CLIENT,
        Role::Accountant => ACCOUNTANT,
        Role::Unknown => UNKNOWN,
    }
}

pub fn capabilities_of(role: Role) -> BTreeSet<Capability> {
    table(role).iter().copied().collect()
}

pub fn has_capability(role: Role, capability: Capability) -> bool {
    table(role).contains(&capability)
}
