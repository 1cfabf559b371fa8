//! Collaborator interfaces consumed by the authorization core.
//!
//! The core never owns storage; it reads canonical records and membership
//! facts through these traits at decision time. Two implementations ship
//! with the crate: an in-memory directory (fixtures, tests, embedding) and
//! a SQLite-backed one.

mod memory;
mod sqlite;

pub use memory::InMemoryDirectory;
pub use sqlite::SqliteDirectory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{ProjectMembership, Resource, ResourceKind};

#[derive(thiserror::Error, Debug)]
pub enum LookupError {
    #[error("database error")]
    Database(#[from] sqlx::Error),
    #[error("corrupt record: {0}")]
    Corrupt(String),
    #[error("failed to read directory source")]
    Io(#[from] std::io::Error),
}

impl LookupError {
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt(message.into())
    }
}

pub type LookupResult<T> = Result<T, LookupError>;

#[async_trait]
pub trait ResourceLookup: Send + Sync {
    /// Fetch a canonical record. `Ok(None)` means the record does not exist.
    async fn get(&self, kind: ResourceKind, id: Uuid) -> LookupResult<Option<Resource>>;
}

#[async_trait]
pub trait MembershipLookup: Send + Sync {
    async fn find(&self, project: Uuid, user: Uuid) -> LookupResult<Option<ProjectMembership>>;

    async fn list_for_user(&self, user: Uuid) -> LookupResult<Vec<ProjectMembership>>;
}
