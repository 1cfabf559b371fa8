use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::registry::Capability;
use crate::models::ResourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    ViewProject,
    CreateProject,
    UpdateProject,
    DeleteProject,
    ChangeProjectStatus,
    ManageProjectMembers,
    ViewReports,

    ViewTask,
    CreateTask,
    UpdateTask,
    DeleteTask,
    AssignTask,

    ViewMeeting,
    CreateMeeting,
    UpdateMeeting,
    DeleteMeeting,
    EditMeetingLink,

    ViewPage,
    CreatePage,
    UpdatePage,
    DeletePage,

    ViewFeedback,
    CreateFeedback,

    ViewTaskIssue,
    CreateTaskIssue,
    UpdateTaskIssue,
    AssignTaskIssue,

    ViewProfile,
    UpdateProfile,
    ChangeUserRole,
}

/// Whether an action needs the actor to belong to the resource's project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// View/update/assign/delete on something that already lives in a project.
    Project,
    /// Creation and global actions; any membership rule lives in the narrowing table.
    Unscoped,
}

/// Static properties of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionSpec {
    pub kind: ResourceKind,
    pub capability: Capability,
    pub scope: Scope,
    /// Creator/organizer may act without holding the capability.
    pub owner_eligible: bool,
    /// A `lead`/`project_manager` membership may stand in for the capability.
    pub elevation_eligible: bool,
    /// Field-level update: the field guard applies on top of the decision.
    pub field_update: bool,
}

const fn spec(kind: ResourceKind, capability: Capability, scope: Scope) -> ActionSpec {
    ActionSpec {
        kind,
        capability,
        scope,
        owner_eligible: false,
        elevation_eligible: false,
        field_update: false,
    }
}

impl ActionSpec {
    const fn owner(mut self) -> Self {
        self.owner_eligible = true;
        self
    }

    const fn elevation(mut self) -> Self {
        self.elevation_eligible = true;
        self
    }

    const fn update(mut self) -> Self {
        self.field_update = true;
        self
    }
}

impl Action {
    pub const ALL: [Action; 30] = [
        Action::ViewProject,
        Action::CreateProject,
        Action::UpdateProject,
        Action::DeleteProject,
        Action::ChangeProjectStatus,
        Action::ManageProjectMembers,
        Action::ViewReports,
        Action::ViewTask,
        Action::CreateTask,
        Action::UpdateTask,
        Action::DeleteTask,
        Action::AssignTask,
        Action::ViewMeeting,
        Action::CreateMeeting,
        Action::UpdateMeeting,
        Action::DeleteMeeting,
        Action::EditMeetingLink,
        Action::ViewPage,
        Action::CreatePage,
        Action::UpdatePage,
        Action::DeletePage,
        Action::ViewFeedback,
        Action::CreateFeedback,
        Action::ViewTaskIssue,
        Action::CreateTaskIssue,
        Action::UpdateTaskIssue,
        Action::AssignTaskIssue,
        Action::ViewProfile,
        Action::UpdateProfile,
        Action::ChangeUserRole,
    ];

    pub fn spec(self) -> ActionSpec {
        use Capability as C;
        use ResourceKind as K;
        use Scope::{Project, Unscoped};

        match self {
            Action::ViewProject => spec(K::Project, C::ViewProjects, Project),
            Action::CreateProject => spec(K::Project, C::ManageProjects, Unscoped),
            Action::UpdateProject => spec(K::Project, C::ManageProjects, Project).owner().elevation().update(),
            Action::DeleteProject => spec(K::Project, C::ManageProjects, Project),
            Action::ChangeProjectStatus => spec(K::Project, C::ChangeProjectStatus, Project),
            Action::ManageProjectMembers => spec(K::Project, C::ManageProjects, Project).elevation(),
            // Reporting is not tied to membership.
            Action::ViewReports => spec(K::Project, C::ViewReports, Unscoped),

            Action::ViewTask => spec(K::Task, C::ViewTasks, Project),
            Action::CreateTask => spec(K::Task, C::CreateTasks, Unscoped).elevation(),
            Action::UpdateTask => spec(K::Task, C::UpdateTasks, Project).elevation().update(),
            Action::DeleteTask => spec(K::Task, C::DeleteTasks, Project),
            Action::AssignTask => spec(K::Task, C::AssignTasks, Project).elevation(),

            Action::ViewMeeting => spec(K::Meeting, C::ViewMeetings, Project),
            Action::CreateMeeting => spec(K::Meeting, C::CreateMeetings, Unscoped),
            Action::UpdateMeeting => spec(K::Meeting, C::UpdateMeetings, Project).owner().update(),
            Action::DeleteMeeting => spec(K::Meeting, C::DeleteMeetings, Project),
            Action::EditMeetingLink => spec(K::Meeting, C::EditMeetingLinks, Project),

            Action::ViewPage => spec(K::Page, C::ViewPages, Project),
            Action::CreatePage => spec(K::Page, C::EditPages, Unscoped),
            Action::UpdatePage => spec(K::Page, C::EditPages, Project).owner().update(),
            Action::DeletePage => spec(K::Page, C::DeletePages, Project).owner(),

            Action::ViewFeedback => spec(K::Feedback, C::ViewFeedback, Project).owner(),
            Action::CreateFeedback => spec(K::Feedback, C::CreateFeedback, Unscoped),

            Action::ViewTaskIssue => spec(K::TaskIssue, C::ViewTaskIssues, Project),
            Action::CreateTaskIssue => spec(K::TaskIssue, C::CreateTaskIssues, Unscoped),
            Action::UpdateTaskIssue => spec(K::TaskIssue, C::UpdateTaskIssues, Project).owner().update(),
            Action::AssignTaskIssue => spec(K::TaskIssue, C::AssignTaskIssues, Project).elevation(),

            Action::ViewProfile => spec(K::User, C::ViewUsers, Unscoped),
            Action::UpdateProfile => spec(K::User, C::ManageUsers, Unscoped).update(),
            Action::ChangeUserRole => spec(K::User, C::ManageUsers, Unscoped),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ViewProject => "project.view",
            Action::CreateProject => "project.create",
            Action::UpdateProject => "project.update",
            Action::DeleteProject => "project.delete",
            Action::ChangeProjectStatus => "project.change_status",
            Action::ManageProjectMembers => "project.manage_members",
            Action::ViewReports => "project.view_reports",
            Action::ViewTask => "task.view",
            Action::CreateTask => "task.create",
            Action::UpdateTask => "task.update",
            Action::DeleteTask => "task.delete",
            Action::AssignTask => "task.assign",
            Action::ViewMeeting => "meeting.view",
            Action::CreateMeeting => "meeting.create",
            Action::UpdateMeeting => "meeting.update",
            Action::DeleteMeeting => "meeting.delete",
            Action::EditMeetingLink => "meeting.edit_link",
            Action::ViewPage => "page.view",
            Action::CreatePage => "page.create",
            Action::UpdatePage => "page.update",
            Action::DeletePage => "page.delete",
            Action::ViewFeedback => "feedback.view",
            Action::CreateFeedback => "feedback.create",
            Action::ViewTaskIssue => "task_issue.view",
            Action::CreateTaskIssue => "task_issue.create",
            Action::UpdateTaskIssue => "task_issue.update",
            Action::AssignTaskIssue => "task_issue.assign",
            Action::ViewProfile => "profile.view",
            Action::UpdateProfile => "profile.update",
            Action::ChangeUserRole => "profile.change_role",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    /// Accepts the dotted form (`task.assign`) or the snake_case variant name (`assign_task`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Action::ALL
            .into_iter()
            .find(|action| {
                action.as_str() == wanted
                    || serde_json::to_value(action)
                        .ok()
                        .and_then(|v| v.as_str().map(|name| name == wanted))
                        .unwrap_or(false)
            })
            .ok_or_else(|| format!("unknown action: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_spellings() {
        assert_eq!("task.assign".parse::<Action>().unwrap(), Action::AssignTask);
        assert_eq!("assign_task".parse::<Action>().unwrap(), Action::AssignTask);
        assert_eq!("Meeting.Edit_Link".parse::<Action>().unwrap(), Action::EditMeetingLink);
        assert!("task.archive".parse::<Action>().is_err());
    }

    #[test]
    fn dotted_names_are_unique() {
        let mut names: Vec<_> = Action::ALL.iter().map(|a| a.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Action::ALL.len());
    }

    #[test]
    fn dotted_prefix_matches_resource_kind() {
        for action in Action::ALL {
            let prefix = action.as_str().split('.').next().unwrap();
            let kind = action.spec().kind;
            let expected = if kind == ResourceKind::User { "profile" } else { kind.as_str() };
            assert_eq!(prefix, expected, "{action}");
        }
    }
}
