use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Project-scoped roles that carry management authority inside a project,
/// whatever the member's global role is.
pub const ELEVATED_PROJECT_ROLES: [&str; 2] = ["project_manager", "lead"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMembership {
    pub project: Uuid,
    pub user: Uuid,
    /// Free-form label; only the values in `ELEVATED_PROJECT_ROLES` mean anything to authorization.
    #[serde(alias = "roleInProject", default)]
    pub role_in_project: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<DateTime<Utc>>,
}

impl ProjectMembership {
    pub fn new(project: Uuid, user: Uuid, role_in_project: impl Into<String>) -> Self {
        Self {
            project,
            user,
            role_in_project: role_in_project.into(),
            joined_at: None,
        }
    }

    pub fn is_elevated(&self) -> bool {
        let label = self.role_in_project.trim();
        ELEVATED_PROJECT_ROLES
            .iter()
            .any(|elevated| label.eq_ignore_ascii_case(elevated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lead_and_project_manager_are_elevated() {
        let p = Uuid::new_v4();
        let u = Uuid::new_v4();
        assert!(ProjectMembership::new(p, u, "lead").is_elevated());
        assert!(ProjectMembership::new(p, u, "Project_Manager").is_elevated());
        assert!(!ProjectMembership::new(p, u, "developer").is_elevated());
        assert!(!ProjectMembership::new(p, u, "").is_elevated());
    }

    #[test]
    fn accepts_camel_case_role_field() {
        let p = Uuid::new_v4();
        let u = Uuid::new_v4();
        let raw = serde_json::json!({"project": p, "user": u, "roleInProject": "lead"});
        let membership: ProjectMembership = serde_json::from_value(raw).unwrap();
        assert_eq!(membership.role_in_project, "lead");
    }
}
