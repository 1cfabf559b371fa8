use std::collections::BTreeSet;

use uuid::Uuid;

use crate::lookup::{LookupResult, MembershipLookup};
use crate::models::{Actor, ProjectMembership};

/// Answers membership questions for one actor/project pair at call time.
/// Nothing is cached between calls.
#[derive(Clone, Copy)]
pub struct MembershipResolver<'a> {
    lookup: &'a dyn MembershipLookup,
}

impl<'a> MembershipResolver<'a> {
    pub fn new(lookup: &'a dyn MembershipLookup) -> Self {
        Self { lookup }
    }

    pub async fn membership_of(&self, actor: &Actor, project: Uuid) -> LookupResult<Option<ProjectMembership>> {
        self.lookup.find(project, actor.id).await
    }

    pub async fn is_member(&self, actor: &Actor, project: Uuid) -> LookupResult<bool> {
        Ok(self.membership_of(actor, project).await?.is_some())
    }

    /// Holds `lead` or `project_manager` inside this project.
    pub async fn is_elevated_in_project(&self, actor: &Actor, project: Uuid) -> LookupResult<bool> {
        Ok(self
            .membership_of(actor, project)
            .await?
            .is_some_and(|m| m.is_elevated()))
    }

    pub async fn projects_of(&self, user: Uuid) -> LookupResult<BTreeSet<Uuid>> {
        Ok(self
            .lookup
            .list_for_user(user)
            .await?
            .into_iter()
            .map(|m| m.project)
            .collect())
    }

    /// True when both users belong to at least one common project.
    pub async fn shares_project(&self, user: Uuid, other: Uuid) -> LookupResult<bool> {
        let mine = self.projects_of(user).await?;
        if mine.is_empty() {
            return Ok(false);
        }
        let theirs = self.projects_of(other).await?;
        Ok(!mine.is_disjoint(&theirs))
    }
}
