use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Global role of a user. The set is closed; anything unrecognised lands
/// on `Unknown`, which only ever receives the minimal view-only capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    ProjectManager,
    TeamMember,
    Client,
    Accountant,
    Unknown,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Admin,
        Role::ProjectManager,
        Role::TeamMember,
        Role::Client,
        Role::Accountant,
        Role::Unknown,
    ];

    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "admin" => Role::Admin,
            "project_manager" => Role::ProjectManager,
            "team_member" => Role::TeamMember,
            "client" => Role::Client,
            "accountant" => Role::Accountant,
            _ => Role::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::ProjectManager => "project_manager",
            Role::TeamMember => "team_member",
            Role::Client => "client",
            Role::Accountant => "accountant",
            Role::Unknown => "unknown",
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Role::parse(&value)
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated caller of a request. Handlers build one per request
/// and pass it explicitly into every decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(alias = "_id")]
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
}

impl UserRecord {
    pub fn as_actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }
}

impl From<&UserRecord> for Actor {
    fn from(user: &UserRecord) -> Self {
        user.as_actor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognised_roles_fall_back_to_unknown() {
        assert_eq!(Role::parse("superuser"), Role::Unknown);
        assert_eq!(Role::parse(""), Role::Unknown);
        assert_eq!(Role::parse(" Project-Manager "), Role::ProjectManager);
    }

    #[test]
    fn role_serializes_as_snake_case_string() {
        let json = serde_json::to_string(&Role::TeamMember).unwrap();
        assert_eq!(json, "\"team_member\"");

        let role: Role = serde_json::from_str("\"intern\"").unwrap();
        assert_eq!(role, Role::Unknown);
    }
}
