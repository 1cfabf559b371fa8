use std::sync::Arc;

use async_trait::async_trait;

use super::action::{Action, ActionSpec, Scope};
use super::decision::{Decision, Reason};
use super::membership::MembershipResolver;
use super::ownership::{is_assignee, is_owner, refers_to};
use super::registry::{has_capability, Capability};
use super::scope::{resolve_project, ProjectScope};
use crate::lookup::{LookupResult, MembershipLookup, ResourceLookup};
use crate::models::{Actor, ProjectMembership, ProjectRecord, Resource, Role, UserRecord};

/// Decision engine seam. Handlers depend on this trait, not on the default rules.
#[async_trait]
pub trait PolicyEvaluator: Send + Sync {
    /// Decide whether `actor` may perform `action` on an existing `resource`.
    /// `None` means the request carried no authenticated actor.
    async fn decide(&self, actor: Option<&Actor>, action: Action, resource: &Resource) -> LookupResult<Decision>;
}

/// Default rule set.
///
/// Evaluation order, first match wins:
/// 1. no actor -> deny `unauthenticated`
/// 2. admin -> allow `admin_override`
/// 3. capability, or project elevation / ownership where the action admits them,
///    else deny `insufficient_role`
/// 4. project-scoped actions need a membership in the owning project, else deny `not_a_member`
/// 5. action-specific narrowing -> deny `narrowed_by_role` (or `not_a_member`) or allow `granted`
#[derive(Clone)]
pub struct DefaultPolicyEvaluator {
    resources: Arc<dyn ResourceLookup>,
    memberships: Arc<dyn MembershipLookup>,
}

/// Everything the narrowing rules look at, resolved once per decision.
struct Facts<'a> {
    actor: &'a Actor,
    resource: &'a Resource,
    project: Option<&'a ProjectRecord>,
    membership: Option<&'a ProjectMembership>,
}

impl Facts<'_> {
    fn is_member(&self) -> bool {
        self.membership.is_some()
    }

    fn is_elevated(&self) -> bool {
        self.membership.is_some_and(|m| m.is_elevated())
    }

    fn is_owner(&self) -> bool {
        is_owner(self.actor, self.resource)
    }

    fn is_assignee(&self) -> bool {
        is_assignee(self.actor, self.resource)
    }

    fn is_project_creator(&self) -> bool {
        self.project
            .is_some_and(|p| refers_to(&p.created_by, self.actor.id))
    }
}

impl DefaultPolicyEvaluator {
    pub fn new(resources: Arc<dyn ResourceLookup>, memberships: Arc<dyn MembershipLookup>) -> Self {
        Self { resources, memberships }
    }

    /// Both lookups served by one directory.
    pub fn from_directory<D>(directory: Arc<D>) -> Self
    where
        D: ResourceLookup + MembershipLookup + 'static,
    {
        Self::new(directory.clone(), directory)
    }

    fn resolver(&self) -> MembershipResolver<'_> {
        MembershipResolver::new(self.memberships.as_ref())
    }

    async fn evaluate(&self, actor: Option<&Actor>, action: Action, resource: &Resource) -> LookupResult<Decision> {
        // 1. Authentication
        let Some(actor) = actor else {
            return Ok(Decision::deny(Reason::Unauthenticated, "actor.missing"));
        };

        // 2. Admin is total
        if actor.is_admin() {
            return Ok(Decision::allow(Reason::AdminOverride, "admin.override"));
        }

        let spec = action.spec();
        if spec.kind != resource.kind() {
            return Ok(Decision::deny(Reason::NotFound, "resource.kind_mismatch"));
        }

        if let Resource::User(profile) = resource {
            return self.decide_profile(actor, action, spec, profile).await;
        }

        let scope = resolve_project(resource, self.resources.as_ref()).await?;
        if let ProjectScope::Missing { rule } = scope {
            return Ok(Decision::deny(Reason::NotFound, rule));
        }
        let project = scope.project();
        let membership = match project {
            Some(p) => self.resolver().membership_of(actor, p.id).await?,
            None => None,
        };

        let facts = Facts {
            actor,
            resource,
            project,
            membership: membership.as_ref(),
        };

        // 3. Capability, with elevation and ownership substitutes
        if !has_capability(actor.role, spec.capability)
            && !(spec.elevation_eligible && facts.is_elevated())
            && !(spec.owner_eligible && facts.is_owner())
        {
            return Ok(Decision::missing_capability(spec.capability));
        }

        // 4. Membership for project-scoped actions
        if spec.scope == Scope::Project && !facts.is_member() {
            return Ok(Decision::deny(Reason::NotAMember, "membership.required"));
        }

        // 5. Narrowing
        Ok(narrow(action, &facts))
    }

    async fn decide_profile(
        &self,
        actor: &Actor,
        action: Action,
        spec: ActionSpec,
        profile: &UserRecord,
    ) -> LookupResult<Decision> {
        let own = profile.id == actor.id;

        match action {
            Action::ViewProfile | Action::UpdateProfile if own => Ok(Decision::granted("profile.self")),
            Action::ViewProfile if has_capability(actor.role, Capability::ViewUsers) => {
                Ok(Decision::granted("profile.view"))
            }
            Action::ViewProfile => {
                if self.resolver().shares_project(actor.id, profile.id).await? {
                    Ok(Decision::granted("profile.shared_project"))
                } else {
                    Ok(Decision::missing_capability(Capability::ViewUsers))
                }
            }
            _ if has_capability(actor.role, spec.capability) => Ok(Decision::granted("profile.manage")),
            _ => Ok(Decision::missing_capability(spec.capability)),
        }
    }
}

fn deny(reason: Reason, rule: &'static str) -> Decision {
    Decision::deny(reason, rule)
}

/// Action-specific narrowing applied after the role and membership baseline.
fn narrow(action: Action, facts: &Facts<'_>) -> Decision {
    use Reason::{NarrowedByRole, NotAMember};

    let role = facts.actor.role;

    match action {
        Action::ViewTask => match role {
            Role::Client => deny(NarrowedByRole, "task.view.clients_excluded"),
            Role::TeamMember if !facts.is_assignee() => deny(NarrowedByRole, "task.view.assigned_only"),
            _ => Decision::granted("task.view"),
        },

        Action::CreateTask => match role {
            Role::ProjectManager if facts.is_member() || facts.is_project_creator() => {
                Decision::granted("task.create")
            }
            Role::ProjectManager => deny(NotAMember, "task.create.member_or_creator"),
            _ => deny(NarrowedByRole, "task.create.managers_only"),
        },

        Action::UpdateTask => match role {
            Role::ProjectManager => Decision::granted("task.update"),
            Role::TeamMember if facts.is_assignee() => Decision::granted("task.update.assignee"),
            Role::TeamMember => deny(NarrowedByRole, "task.update.assigned_only"),
            _ => deny(NarrowedByRole, "task.update.role_excluded"),
        },

        Action::DeleteTask => match role {
            Role::ProjectManager => Decision::granted("task.delete"),
            _ => deny(NarrowedByRole, "task.delete.managers_only"),
        },

        Action::AssignTask => match role {
            Role::ProjectManager if facts.is_elevated() => Decision::granted("task.assign"),
            Role::ProjectManager => deny(NarrowedByRole, "task.assign.requires_elevation"),
            _ => deny(NarrowedByRole, "task.assign.managers_only"),
        },

        Action::DeleteMeeting => deny(NarrowedByRole, "meeting.delete.admin_only"),

        Action::EditMeetingLink => match role {
            Role::ProjectManager if facts.is_owner() || facts.is_elevated() => {
                Decision::granted("meeting.edit_link")
            }
            _ => deny(NarrowedByRole, "meeting.edit_link.organizer_or_lead"),
        },

        Action::ChangeProjectStatus => deny(NarrowedByRole, "project.change_status.admin_only"),

        Action::DeleteProject => match role {
            Role::ProjectManager if facts.is_owner() || facts.is_elevated() => {
                Decision::granted("project.delete")
            }
            _ => deny(NarrowedByRole, "project.delete.owner_or_lead"),
        },

        Action::CreateFeedback => match role {
            Role::Client if facts.is_member() => Decision::granted("feedback.create"),
            Role::Client => deny(NotAMember, "feedback.create.member_only"),
            _ => deny(NarrowedByRole, "feedback.create.clients_only"),
        },

        Action::CreateTaskIssue => match role {
            Role::Client => deny(NarrowedByRole, "task_issue.create.clients_excluded"),
            _ if facts.is_member() => Decision::granted("task_issue.create"),
            _ => deny(NotAMember, "task_issue.create.member_only"),
        },

        Action::CreateMeeting if !facts.is_member() => deny(NotAMember, "meeting.create.member_only"),
        Action::CreatePage if !facts.is_member() => deny(NotAMember, "page.create.member_only"),

        _ => Decision::granted("role.capability"),
    }
}

#[async_trait]
impl PolicyEvaluator for DefaultPolicyEvaluator {
    async fn decide(&self, actor: Option<&Actor>, action: Action, resource: &Resource) -> LookupResult<Decision> {
        let decision = self.evaluate(actor, action, resource).await?;

        tracing::debug!(
            user_id = ?actor.map(|a| a.id),
            role = ?actor.map(|a| a.role),
            action = %action,
            resource_kind = %resource.kind(),
            resource_id = %resource.id(),
            allow = decision.allow,
            reason = decision.reason.as_str(),
            rule = decision.rule,
            "policy decision"
        );

        Ok(decision)
    }
}
