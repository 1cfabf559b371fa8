use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use uuid::Uuid;

pub mod severity;
pub use severity::Severity;

use crate::authz::{Action, Decision};
use crate::models::{Actor, ResourceKind, Role};

/// Audit record for one authorization decision. Self-contained: a sink can
/// store it without re-deriving anything.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionEvent {
    pub id: Uuid,
    /// `authz.decision`, `authz.fields` or `authz.assignment`
    pub name: &'static str,
    pub occurred_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_kind: Option<ResourceKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Uuid>,
    pub decision: Decision,
    pub severity: Severity,
}

impl DecisionEvent {
    pub fn new(name: &'static str, actor: Option<&Actor>, decision: Decision) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            occurred_at: Utc::now(),
            actor_id: actor.map(|a| a.id),
            actor_role: actor.map(|a| a.role),
            action: None,
            resource_kind: None,
            resource_id: None,
            project_id: None,
            severity: Severity::for_decision(&decision),
            decision,
        }
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_resource(mut self, kind: ResourceKind, id: Uuid) -> Self {
        self.resource_kind = Some(kind);
        self.resource_id = Some(id);
        self
    }

    pub fn with_project(mut self, project_id: Uuid) -> Self {
        self.project_id = Some(project_id);
        self
    }
}

pub type EventBus = broadcast::Sender<Value>;

pub fn init_event_bus(capacity: usize) -> (EventBus, broadcast::Receiver<Value>) {
    broadcast::channel(capacity)
}

/// Logs the decision and, when a bus is attached, publishes it.
/// Publishing never fails the caller: no subscribers is not an error.
pub fn record_decision(bus: Option<&EventBus>, event: DecisionEvent) {
    let decision = &event.decision;
    if decision.allow {
        tracing::debug!(
            event = event.name,
            actor_id = ?event.actor_id,
            action = ?event.action.map(|a| a.as_str()),
            resource_kind = ?event.resource_kind,
            resource_id = ?event.resource_id,
            reason = decision.reason.as_str(),
            rule = decision.rule,
            "authorization granted"
        );
    } else {
        tracing::info!(
            event = event.name,
            actor_id = ?event.actor_id,
            actor_role = ?event.actor_role,
            action = ?event.action.map(|a| a.as_str()),
            resource_kind = ?event.resource_kind,
            resource_id = ?event.resource_id,
            project_id = ?event.project_id,
            reason = decision.reason.as_str(),
            rule = decision.rule,
            severity = event.severity.as_str(),
            "authorization denied"
        );
    }

    if let Some(bus) = bus {
        match serde_json::to_value(&event) {
            Ok(value) => {
                let _ = bus.send(value);
            }
            Err(err) => tracing::error!("failed to serialize audit event: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::Reason;

    #[tokio::test]
    async fn published_event_carries_reason_and_rule() {
        let (bus, mut rx) = init_event_bus(8);
        let actor = Actor::new(Uuid::new_v4(), Role::TeamMember);
        let task_id = Uuid::new_v4();
        let event = DecisionEvent::new(
            "authz.decision",
            Some(&actor),
            Decision::deny(Reason::NarrowedByRole, "task.view.assigned_only"),
        )
        .with_action(Action::ViewTask)
        .with_resource(ResourceKind::Task, task_id);

        record_decision(Some(&bus), event);

        let value = rx.recv().await.unwrap();
        assert_eq!(value["name"], "authz.decision");
        assert_eq!(value["action"], "view_task");
        assert_eq!(value["resource_kind"], "task");
        assert_eq!(value["resource_id"], task_id.to_string());
        assert_eq!(value["decision"]["reason"], "narrowed_by_role");
        assert_eq!(value["decision"]["rule"], "task.view.assigned_only");
        assert_eq!(value["severity"], "critical");
        assert_eq!(value["actor_role"], "team_member");
    }

    #[test]
    fn recording_without_subscribers_is_fine() {
        let (bus, rx) = init_event_bus(1);
        drop(rx);
        record_decision(Some(&bus), DecisionEvent::new("authz.decision", None, Decision::granted("x")));
        record_decision(None, DecisionEvent::new("authz.decision", None, Decision::granted("x")));
    }
}
