//! Field mutation guard: restricts which fields a role may touch in an update.

use std::collections::BTreeSet;

use super::action::Action;
use super::decision::{Decision, Reason};
use crate::models::{Actor, Resource, ResourceKind, Role};

/// Fields a role may change on one resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPolicy {
    Unrestricted,
    Only(&'static [&'static str]),
    AllExcept(&'static [&'static str]),
}

impl FieldPolicy {
    pub fn permits(&self, field: &str) -> bool {
        match self {
            FieldPolicy::Unrestricted => true,
            FieldPolicy::Only(allowed) => allowed.contains(&field),
            FieldPolicy::AllExcept(blocked) => !blocked.contains(&field),
        }
    }
}

const TEAM_MEMBER_TASK_FIELDS: &[&str] = &["status"];
const ADMIN_ONLY_PROFILE_FIELDS: &[&str] = &["role"];
// Link edits go through `EditMeetingLink`, status changes through `ChangeProjectStatus`.
const DEDICATED_MEETING_FIELDS: &[&str] = &["meeting_link"];
const DEDICATED_PROJECT_FIELDS: &[&str] = &["status"];

/// Allow-list table. New narrowed combinations get a row here.
pub fn allowed_fields(role: Role, kind: ResourceKind) -> FieldPolicy {
    match (role, kind) {
        (Role::Admin, _) => FieldPolicy::Unrestricted,
        (Role::TeamMember, ResourceKind::Task) => FieldPolicy::Only(TEAM_MEMBER_TASK_FIELDS),
        (_, ResourceKind::User) => FieldPolicy::AllExcept(ADMIN_ONLY_PROFILE_FIELDS),
        (_, ResourceKind::Meeting) => FieldPolicy::AllExcept(DEDICATED_MEETING_FIELDS),
        (_, ResourceKind::Project) => FieldPolicy::AllExcept(DEDICATED_PROJECT_FIELDS),
        _ => FieldPolicy::Unrestricted,
    }
}

/// Checks a proposed update's field set against the role's allow-list.
///
/// Runs in addition to the evaluator's verdict, never instead of it.
pub fn guard_fields<I, S>(actor: Option<&Actor>, resource: &Resource, action: Action, proposed: I) -> Decision
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let Some(actor) = actor else {
        return Decision::deny(Reason::Unauthenticated, "actor.missing");
    };

    if !action.spec().field_update {
        return Decision::granted("fields.not_an_update");
    }

    if actor.is_admin() {
        return Decision::allow(Reason::AdminOverride, "admin.override");
    }

    let policy = allowed_fields(actor.role, resource.kind());
    let rejected: BTreeSet<String> = proposed
        .into_iter()
        .map(|f| f.as_ref().trim().to_string())
        .filter(|f| !policy.permits(f))
        .collect();

    if rejected.is_empty() {
        Decision::granted("fields.within_allow_list")
    } else {
        tracing::debug!(
            user_id = %actor.id,
            role = %actor.role,
            action = %action,
            fields = ?rejected,
            "field update outside allow-list"
        );
        Decision::deny(Reason::NarrowedByRole, "fields.outside_allow_list")
            .with_fields(rejected.into_iter().collect())
    }
}
