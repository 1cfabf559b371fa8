use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use super::{LookupError, LookupResult, MembershipLookup, ResourceLookup};
use crate::models::{ProjectMembership, Resource, ResourceKind, UserRecord};

/// Snapshot of records and memberships held in memory.
///
/// Memberships are keyed by `(user, project)` so a second record for the
/// same pair replaces the first.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    resources: HashMap<(ResourceKind, Uuid), Resource>,
    memberships: BTreeMap<(Uuid, Uuid), ProjectMembership>,
}

/// On-disk fixture layout accepted by [`InMemoryDirectory::from_json_str`].
#[derive(Debug, Default, Deserialize)]
struct Fixture {
    #[serde(default)]
    users: Vec<UserRecord>,
    #[serde(default)]
    resources: Vec<Resource>,
    #[serde(default)]
    memberships: Vec<ProjectMembership>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.insert_resource(resource);
        self
    }

    pub fn with_user(self, user: UserRecord) -> Self {
        self.with_resource(Resource::User(user))
    }

    pub fn with_membership(mut self, membership: ProjectMembership) -> Self {
        self.insert_membership(membership);
        self
    }

    pub fn insert_resource(&mut self, resource: Resource) {
        self.resources.insert((resource.kind(), resource.id()), resource);
    }

    pub fn insert_membership(&mut self, membership: ProjectMembership) {
        self.memberships
            .insert((membership.user, membership.project), membership);
    }

    pub fn remove_membership(&mut self, project: Uuid, user: Uuid) -> Option<ProjectMembership> {
        self.memberships.remove(&(user, project))
    }

    pub fn from_json_str(raw: &str) -> LookupResult<Self> {
        let de = &mut serde_json::Deserializer::from_str(raw);
        let fixture: Fixture = serde_path_to_error::deserialize(de)
            .map_err(|err| LookupError::corrupt(format!("fixture at `{}`: {}", err.path(), err.inner())))?;

        let mut directory = Self::new();
        for user in fixture.users {
            directory.insert_resource(Resource::User(user));
        }
        for resource in fixture.resources {
            directory.insert_resource(resource);
        }
        for membership in fixture.memberships {
            directory.insert_membership(membership);
        }

        tracing::debug!(
            resources = directory.resources.len(),
            memberships = directory.memberships.len(),
            "loaded directory fixture"
        );

        Ok(directory)
    }

    pub fn load(path: impl AsRef<Path>) -> LookupResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }
}

#[async_trait]
impl ResourceLookup for InMemoryDirectory {
    async fn get(&self, kind: ResourceKind, id: Uuid) -> LookupResult<Option<Resource>> {
        Ok(self.resources.get(&(kind, id)).cloned())
    }
}

#[async_trait]
impl MembershipLookup for InMemoryDirectory {
    async fn find(&self, project: Uuid, user: Uuid) -> LookupResult<Option<ProjectMembership>> {
        Ok(self.memberships.get(&(user, project)).cloned())
    }

    async fn list_for_user(&self, user: Uuid) -> LookupResult<Vec<ProjectMembership>> {
        Ok(self
            .memberships
            .iter()
            .filter(|((member, _), _)| *member == user)
            .map(|(_, membership)| membership.clone())
            .collect())
    }
}
