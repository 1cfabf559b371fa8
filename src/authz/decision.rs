use serde::Serialize;

use super::registry::Capability;
use crate::errors::AuthzError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    Granted,
    AdminOverride,
    Unauthenticated,
    InsufficientRole,
    NotAMember,
    NarrowedByRole,
    IneligibleRole,
    NotFound,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::Granted => "granted",
            Reason::AdminOverride => "admin_override",
            Reason::Unauthenticated => "unauthenticated",
            Reason::InsufficientRole => "insufficient_role",
            Reason::NotAMember => "not_a_member",
            Reason::NarrowedByRole => "narrowed_by_role",
            Reason::IneligibleRole => "ineligible_role",
            Reason::NotFound => "not_found",
        }
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, Reason::Granted | Reason::AdminOverride)
    }
}

/// Verdict of the authorization core. Always carries the reason and the id
/// of the rule that produced it so a denial can be audited as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub allow: bool,
    pub reason: Reason,
    pub rule: &'static str,
    /// Capability the actor lacked, for `insufficient_role`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability: Option<Capability>,
    /// Offending field names, for field-guard denials.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

impl Decision {
    pub fn allow(reason: Reason, rule: &'static str) -> Self {
        debug_assert!(reason.is_allow());
        Self {
            allow: true,
            reason,
            rule,
            capability: None,
            fields: Vec::new(),
        }
    }

    pub fn granted(rule: &'static str) -> Self {
        Self::allow(Reason::Granted, rule)
    }

    pub fn deny(reason: Reason, rule: &'static str) -> Self {
        debug_assert!(!reason.is_allow());
        Self {
            allow: false,
            reason,
            rule,
            capability: None,
            fields: Vec::new(),
        }
    }

    pub fn missing_capability(capability: Capability) -> Self {
        Self {
            capability: Some(capability),
            ..Self::deny(Reason::InsufficientRole, "role.missing_capability")
        }
    }

    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }

    /// Converts a denial into the error taxonomy handlers propagate with `?`.
    pub fn into_result(self) -> Result<(), AuthzError> {
        if self.allow {
            return Ok(());
        }

        let rule = self.rule;
        Err(match self.reason {
            Reason::Unauthenticated => AuthzError::Unauthenticated,
            Reason::InsufficientRole => AuthzError::InsufficientRole {
                rule,
                capability: self.capability,
            },
            Reason::NotAMember => AuthzError::NotAProjectMember { rule },
            Reason::NarrowedByRole => AuthzError::NarrowedByRole {
                rule,
                fields: self.fields,
            },
            Reason::IneligibleRole => AuthzError::IneligibleAssignee { rule },
            Reason::NotFound => AuthzError::ResourceNotFound { rule },
            Reason::Granted | Reason::AdminOverride => return Ok(()),
        })
    }
}
