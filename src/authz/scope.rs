use uuid::Uuid;

use super::ownership::normalize_ref;
use crate::lookup::{LookupResult, ResourceLookup};
use crate::models::resource::ProjectLink;
use crate::models::{ProjectRecord, Resource, ResourceKind};

/// Owning project of a resource after following direct or transitive references.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectScope {
    Unscoped,
    Resolved(ProjectRecord),
    /// A reference on the path to the project points at nothing.
    Missing { rule: &'static str },
}

impl ProjectScope {
    pub fn project(&self) -> Option<&ProjectRecord> {
        match self {
            ProjectScope::Resolved(project) => Some(project),
            _ => None,
        }
    }

    pub fn project_id(&self) -> Option<Uuid> {
        self.project().map(|p| p.id)
    }
}

async fn fetch_project(lookup: &dyn ResourceLookup, id: Uuid) -> LookupResult<ProjectScope> {
    Ok(match lookup.get(ResourceKind::Project, id).await? {
        Some(Resource::Project(project)) => ProjectScope::Resolved(project),
        _ => ProjectScope::Missing {
            rule: "project.unresolved",
        },
    })
}

pub async fn resolve_project(resource: &Resource, lookup: &dyn ResourceLookup) -> LookupResult<ProjectScope> {
    match resource.project_link() {
        ProjectLink::Itself(project) => Ok(ProjectScope::Resolved(project.clone())),
        ProjectLink::Direct(reference) => fetch_project(lookup, normalize_ref(reference)).await,
        ProjectLink::ViaTask(task_ref) => {
            match lookup.get(ResourceKind::Task, normalize_ref(task_ref)).await? {
                Some(Resource::Task(task)) => fetch_project(lookup, normalize_ref(&task.project)).await,
                _ => Ok(ProjectScope::Missing {
                    rule: "task_issue.task_unresolved",
                }),
            }
        }
        ProjectLink::Unscoped => Ok(ProjectScope::Unscoped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::InMemoryDirectory;
    use crate::models::{TaskIssueRecord, TaskRecord};

    fn project(id: Uuid) -> ProjectRecord {
        ProjectRecord {
            id,
            name: "Apollo".into(),
            status: "active".into(),
            created_by: Uuid::new_v4().into(),
        }
    }

    #[tokio::test]
    async fn issue_resolves_project_through_its_task() {
        let project_id = Uuid::new_v4();
        let task_id = Uuid::new_v4();
        let directory = InMemoryDirectory::new()
            .with_resource(Resource::Project(project(project_id)))
            .with_resource(Resource::Task(TaskRecord {
                id: task_id,
                project: project_id.into(),
                title: "t".into(),
                status: "todo".into(),
                created_by: Uuid::new_v4().into(),
                assigned_to: None,
            }));
        let issue = Resource::TaskIssue(TaskIssueRecord {
            id: Uuid::new_v4(),
            task: task_id.into(),
            title: "bug".into(),
            created_by: Uuid::new_v4().into(),
            assigned_to: None,
        });

        let scope = resolve_project(&issue, &directory).await.unwrap();
        assert_eq!(scope.project_id(), Some(project_id));
    }

    #[tokio::test]
    async fn dangling_references_are_reported_missing() {
        let directory = InMemoryDirectory::new();
        let issue = Resource::TaskIssue(TaskIssueRecord {
            id: Uuid::new_v4(),
            task: Uuid::new_v4().into(),
            title: "bug".into(),
            created_by: Uuid::new_v4().into(),
            assigned_to: None,
        });

        let scope = resolve_project(&issue, &directory).await.unwrap();
        assert_eq!(
            scope,
            ProjectScope::Missing {
                rule: "task_issue.task_unresolved"
            }
        );
    }
}
