//! Assignment validity: who may be put on a task, issue or meeting.
//!
//! Independent of whether the acting user may perform the assignment;
//! handlers need both this and the evaluator's verdict.

use std::sync::Arc;

use uuid::Uuid;

use super::decision::{Decision, Reason};
use super::membership::MembershipResolver;
use super::ownership::normalize_ref;
use super::scope::{resolve_project, ProjectScope};
use crate::lookup::{LookupResult, MembershipLookup, ResourceLookup};
use crate::models::{Actor, EntityRef, MeetingRecord, Resource, ResourceKind, Role};

#[derive(Clone)]
pub struct AssignmentValidator {
    resources: Arc<dyn ResourceLookup>,
    memberships: Arc<dyn MembershipLookup>,
}

impl AssignmentValidator {
    pub fn new(resources: Arc<dyn ResourceLookup>, memberships: Arc<dyn MembershipLookup>) -> Self {
        Self { resources, memberships }
    }

    /// Clients are never assignable, member or not. Everyone else must hold a
    /// membership in the target project.
    pub async fn validate_assignee(&self, candidate: &Actor, project: Uuid) -> LookupResult<Decision> {
        if candidate.role == Role::Client {
            return Ok(Decision::deny(Reason::IneligibleRole, "assignee.client"));
        }

        let resolver = MembershipResolver::new(self.memberships.as_ref());
        if !resolver.is_member(candidate, project).await? {
            return Ok(Decision::deny(Reason::NotAMember, "assignee.not_a_member"));
        }

        Ok(Decision::granted("assignee.eligible"))
    }

    async fn candidate(&self, reference: &EntityRef) -> LookupResult<Option<Actor>> {
        Ok(match self.resources.get(ResourceKind::User, normalize_ref(reference)).await? {
            Some(Resource::User(user)) => Some(user.as_actor()),
            _ => None,
        })
    }

    /// Validates a referenced user against the owning project of `resource`.
    pub async fn validate_assignment(&self, resource: &Resource, candidate: &EntityRef) -> LookupResult<Decision> {
        let project = match resolve_project(resource, self.resources.as_ref()).await? {
            ProjectScope::Resolved(project) => project.id,
            ProjectScope::Missing { rule } => return Ok(Decision::deny(Reason::NotFound, rule)),
            ProjectScope::Unscoped => {
                return Ok(Decision::deny(Reason::NotFound, "assignment.no_project"));
            }
        };

        let Some(candidate) = self.candidate(candidate).await? else {
            return Ok(Decision::deny(Reason::NotFound, "assignee.unknown_user"));
        };

        self.validate_assignee(&candidate, project).await
    }

    /// Every attendee must be assignable to the meeting's project; the first failure is returned.
    pub async fn validate_attendees(&self, meeting: &MeetingRecord) -> LookupResult<Decision> {
        let project = normalize_ref(&meeting.project);
        for attendee in &meeting.attendees {
            let Some(candidate) = self.candidate(attendee).await? else {
                return Ok(Decision::deny(Reason::NotFound, "assignee.unknown_user"));
            };
            let decision = self.validate_assignee(&candidate, project).await?;
            if !decision.allow {
                return Ok(decision);
            }
        }

        Ok(Decision::granted("attendees.eligible"))
    }

    /// Stored assignee, when present, must still be a valid assignee for the resource's project.
    pub async fn check_assignee_invariant(&self, resource: &Resource) -> LookupResult<Decision> {
        match resource.assignee_ref() {
            Some(assignee) => self.validate_assignment(resource, assignee).await,
            None => Ok(Decision::granted("assignee.none")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::InMemoryDirectory;
    use crate::models::{ProjectMembership, UserRecord};

    fn user(role: Role) -> UserRecord {
        UserRecord {
            id: Uuid::new_v4(),
            name: "u".into(),
            email: "u@example.com".into(),
            role,
        }
    }

    fn validator(directory: InMemoryDirectory) -> AssignmentValidator {
        let directory = Arc::new(directory);
        AssignmentValidator::new(directory.clone(), directory)
    }

    #[tokio::test]
    async fn client_is_ineligible_even_as_member() {
        let project = Uuid::new_v4();
        let client = user(Role::Client);
        let v = validator(
            InMemoryDirectory::new().with_membership(ProjectMembership::new(project, client.id, "client")),
        );

        let decision = v.validate_assignee(&client.as_actor(), project).await.unwrap();
        assert_eq!(decision.reason, Reason::IneligibleRole);

        let decision = v.validate_assignee(&client.as_actor(), Uuid::new_v4()).await.unwrap();
        assert_eq!(decision.reason, Reason::IneligibleRole);
    }

    #[tokio::test]
    async fn meeting_attendees_must_all_be_members() {
        let project = Uuid::new_v4();
        let (a, b) = (user(Role::TeamMember), user(Role::TeamMember));
        let v = validator(
            InMemoryDirectory::new()
                .with_user(a.clone())
                .with_user(b.clone())
                .with_membership(ProjectMembership::new(project, a.id, "developer")),
        );
        let mut meeting = MeetingRecord {
            id: Uuid::new_v4(),
            project: project.into(),
            title: "Kickoff".into(),
            organizer: a.id.into(),
            meeting_link: None,
            attendees: vec![a.id.into()],
        };

        assert!(v.validate_attendees(&meeting).await.unwrap().allow);

        meeting.attendees.push(b.id.into());
        let decision = v.validate_attendees(&meeting).await.unwrap();
        assert_eq!(decision.reason, Reason::NotAMember);
    }
}
