use std::sync::Arc;

use uuid::Uuid;

use super::action::Action;
use super::assignment::AssignmentValidator;
use super::decision::{Decision, Reason};
use super::evaluator::{DefaultPolicyEvaluator, PolicyEvaluator};
use super::fields::guard_fields;
use super::ownership::normalize_ref;
use super::AuthzMode;
use crate::errors::{AppResult, AuthzError};
use crate::events::{record_decision, DecisionEvent, EventBus};
use crate::lookup::{LookupResult, MembershipLookup, ResourceLookup};
use crate::models::{Actor, EntityRef, MeetingRecord, Resource, ResourceKind};

/// Entry point for request handlers: evaluator, field guard and assignment
/// validator behind one handle, with audit logging and enforcement mode.
#[derive(Clone)]
pub struct Authorizer {
    evaluator: Arc<dyn PolicyEvaluator>,
    assignments: AssignmentValidator,
    resources: Arc<dyn ResourceLookup>,
    mode: AuthzMode,
    events: Option<EventBus>,
}

impl Authorizer {
    pub fn new(resources: Arc<dyn ResourceLookup>, memberships: Arc<dyn MembershipLookup>) -> Self {
        Self {
            evaluator: Arc::new(DefaultPolicyEvaluator::new(resources.clone(), memberships.clone())),
            assignments: AssignmentValidator::new(resources.clone(), memberships),
            resources,
            mode: AuthzMode::default(),
            events: None,
        }
    }

    pub fn from_directory<D>(directory: Arc<D>) -> Self
    where
        D: ResourceLookup + MembershipLookup + 'static,
    {
        Self::new(directory.clone(), directory)
    }

    pub fn with_evaluator(mut self, evaluator: Arc<dyn PolicyEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn with_mode(mut self, mode: AuthzMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn mode(&self) -> AuthzMode {
        self.mode
    }

    fn record(&self, event: DecisionEvent) {
        record_decision(self.events.as_ref(), event);
    }

    pub async fn decide(&self, actor: Option<&Actor>, action: Action, resource: &Resource) -> LookupResult<Decision> {
        let decision = self.evaluator.decide(actor, action, resource).await?;
        self.record(
            DecisionEvent::new("authz.decision", actor, decision.clone())
                .with_action(action)
                .with_resource(resource.kind(), resource.id()),
        );
        Ok(decision)
    }

    /// Looks the resource up first; an absent record is a `not_found` denial.
    /// Unauthenticated requests are refused before the lookup.
    pub async fn decide_by_id(
        &self,
        actor: Option<&Actor>,
        action: Action,
        kind: ResourceKind,
        id: Uuid,
    ) -> LookupResult<Decision> {
        if actor.is_none() {
            return self.decide_missing(actor, action, kind, id, Reason::Unauthenticated, "actor.missing");
        }

        match self.resources.get(kind, id).await? {
            Some(resource) => self.decide(actor, action, &resource).await,
            None => self.decide_missing(actor, action, kind, id, Reason::NotFound, "resource.not_found"),
        }
    }

    fn decide_missing(
        &self,
        actor: Option<&Actor>,
        action: Action,
        kind: ResourceKind,
        id: Uuid,
        reason: Reason,
        rule: &'static str,
    ) -> LookupResult<Decision> {
        let decision = Decision::deny(reason, rule);
        self.record(
            DecisionEvent::new("authz.decision", actor, decision.clone())
                .with_action(action)
                .with_resource(kind, id),
        );
        Ok(decision)
    }

    pub fn guard_fields<I, S>(&self, actor: Option<&Actor>, resource: &Resource, action: Action, proposed: I) -> Decision
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let decision = guard_fields(actor, resource, action, proposed);
        self.record(
            DecisionEvent::new("authz.fields", actor, decision.clone())
                .with_action(action)
                .with_resource(resource.kind(), resource.id()),
        );
        decision
    }

    pub async fn validate_assignee(&self, candidate: &Actor, project: Uuid) -> LookupResult<Decision> {
        let decision = self.assignments.validate_assignee(candidate, project).await?;
        self.record(
            DecisionEvent::new("authz.assignment", Some(candidate), decision.clone())
                .with_resource(ResourceKind::Project, project)
                .with_project(project),
        );
        Ok(decision)
    }

    pub async fn validate_assignment(&self, resource: &Resource, candidate: &EntityRef) -> LookupResult<Decision> {
        let decision = self.assignments.validate_assignment(resource, candidate).await?;
        self.record(
            DecisionEvent::new("authz.assignment", None, decision.clone())
                .with_resource(resource.kind(), resource.id()),
        );
        Ok(decision)
    }

    pub async fn validate_attendees(&self, meeting: &MeetingRecord) -> LookupResult<Decision> {
        let decision = self.assignments.validate_attendees(meeting).await?;
        self.record(
            DecisionEvent::new("authz.assignment", None, decision.clone())
                .with_resource(ResourceKind::Meeting, meeting.id)
                .with_project(normalize_ref(&meeting.project)),
        );
        Ok(decision)
    }

    pub async fn check_assignee_invariant(&self, resource: &Resource) -> LookupResult<Decision> {
        self.assignments.check_assignee_invariant(resource).await
    }

    /// Evaluator verdict first; on allow, the field guard over the proposed fields.
    pub async fn authorize_update<I, S>(
        &self,
        actor: Option<&Actor>,
        action: Action,
        resource: &Resource,
        proposed: I,
    ) -> LookupResult<Decision>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let decision = self.decide(actor, action, resource).await?;
        if !decision.allow {
            return Ok(decision);
        }
        Ok(self.guard_fields(actor, resource, action, proposed))
    }

    /// Actor must be allowed to assign on `resource`, and the candidate must be assignable.
    pub async fn authorize_assignment(
        &self,
        actor: Option<&Actor>,
        resource: &Resource,
        candidate: &EntityRef,
    ) -> LookupResult<Decision> {
        let action = match resource.kind() {
            ResourceKind::Task => Action::AssignTask,
            ResourceKind::TaskIssue => Action::AssignTaskIssue,
            ResourceKind::Meeting => Action::UpdateMeeting,
            _ => return Ok(Decision::deny(Reason::NotFound, "assignment.not_assignable")),
        };

        let decision = self.decide(actor, action, resource).await?;
        if !decision.allow {
            return Ok(decision);
        }
        self.validate_assignment(resource, candidate).await
    }

    /// Applies the enforcement mode to a decision.
    pub fn enforce(&self, decision: Decision) -> Result<(), AuthzError> {
        match self.mode {
            AuthzMode::Off => Ok(()),
            AuthzMode::Advisory => {
                if !decision.allow {
                    tracing::warn!(
                        reason = decision.reason.as_str(),
                        rule = decision.rule,
                        "advisory mode: denial not enforced"
                    );
                }
                Ok(())
            }
            AuthzMode::Strict => decision.into_result(),
        }
    }

    /// Decide and enforce in one step, for handlers that only need pass/fail.
    pub async fn require(&self, actor: Option<&Actor>, action: Action, resource: &Resource) -> AppResult<()> {
        let decision = self.decide(actor, action, resource).await?;
        self.enforce(decision)?;
        Ok(())
    }
}
