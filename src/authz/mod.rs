//! Authorization core - policy evaluator, field guard and assignment validator
//!
//! This module decides, for an actor, an action and a resource, whether the
//! action is permitted. It combines:
//! - the static role registry (role -> capabilities)
//! - project membership and project-scoped elevation (`lead`, `project_manager`)
//! - ownership (creator / organizer)
//! - per-action narrowing and per-field mutation restrictions
//!
//! Every decision is computed from lookups made at call time; nothing is cached.

mod action;
mod assignment;
mod decision;
mod evaluator;
mod fields;
mod membership;
mod ownership;
mod registry;
mod scope;
mod service;

pub use action::{Action, ActionSpec, Scope};
pub use assignment::AssignmentValidator;
pub use decision::{Decision, Reason};
pub use evaluator::{DefaultPolicyEvaluator, PolicyEvaluator};
pub use fields::{allowed_fields, guard_fields, FieldPolicy};
pub use membership::MembershipResolver;
pub use ownership::{is_assignee, is_owner, normalize_ref};
pub use registry::{capabilities_of, has_capability, Capability};
pub use scope::{resolve_project, ProjectScope};
pub use service::Authorizer;

/// Authorization enforcement mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthzMode {
    /// No enforcement (development mode); decisions are still logged
    Off,
    /// Log denials but let requests through (rollout mode)
    Advisory,
    /// Denials become errors (production mode)
    #[default]
    Strict,
}

impl AuthzMode {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "off" => AuthzMode::Off,
            "advisory" => AuthzMode::Advisory,
            _ => AuthzMode::Strict,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthzMode::Off => "off",
            AuthzMode::Advisory => "advisory",
            AuthzMode::Strict => "strict",
        }
    }
}
