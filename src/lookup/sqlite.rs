use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{LookupResult, MembershipLookup, ResourceLookup};
use crate::db::row_parsers;
use crate::db::uuid_sql::{bind_uuid, match_uuid_clause};
use crate::models::{EntityRef, ProjectMembership, Resource, ResourceKind};

/// Directory backed by the SQLite schema in `migrations/`.
#[derive(Debug, Clone)]
pub struct SqliteDirectory {
    pool: SqlitePool,
}

impl SqliteDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Runs `select` filtered to the row whose `id` matches, in whatever form it was stored.
    async fn fetch_row(&self, select: &str, id: Uuid) -> LookupResult<Option<sqlx::sqlite::SqliteRow>> {
        let sql = format!("{select} WHERE {}", match_uuid_clause("id"));
        Ok(bind_uuid(sqlx::query(&sql), id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn meeting_attendees(&self, meeting: Uuid) -> LookupResult<Vec<EntityRef>> {
        let sql = format!(
            "SELECT user_id FROM meeting_attendees WHERE {} ORDER BY user_id",
            match_uuid_clause("meeting_id")
        );
        let rows = bind_uuid(sqlx::query(&sql), meeting)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| row_parsers::uuid_column(row, "user_id").map(EntityRef::Id))
            .collect()
    }
}

#[async_trait]
impl ResourceLookup for SqliteDirectory {
    async fn get(&self, kind: ResourceKind, id: Uuid) -> LookupResult<Option<Resource>> {
        let resource = match kind {
            ResourceKind::User => self
                .fetch_row("SELECT id, name, email, role FROM users", id)
                .await?
                .map(|row| row_parsers::user_from_row(&row).map(Resource::User))
                .transpose()?,
            ResourceKind::Project => self
                .fetch_row("SELECT id, name, status, created_by FROM projects", id)
                .await?
                .map(|row| row_parsers::project_from_row(&row).map(Resource::Project))
                .transpose()?,
            ResourceKind::Task => self
                .fetch_row(
                    "SELECT id, project_id, title, status, created_by, assigned_to FROM tasks",
                    id,
                )
                .await?
                .map(|row| row_parsers::task_from_row(&row).map(Resource::Task))
                .transpose()?,
            ResourceKind::Meeting => {
                match self
                    .fetch_row(
                        "SELECT id, project_id, title, organizer, meeting_link FROM meetings",
                        id,
                    )
                    .await?
                {
                    Some(row) => {
                        let attendees = self.meeting_attendees(id).await?;
                        Some(Resource::Meeting(row_parsers::meeting_from_row(&row, attendees)?))
                    }
                    None => None,
                }
            }
            ResourceKind::Page => self
                .fetch_row("SELECT id, project_id, title, created_by FROM pages", id)
                .await?
                .map(|row| row_parsers::page_from_row(&row).map(Resource::Page))
                .transpose()?,
            ResourceKind::Feedback => self
                .fetch_row(
                    "SELECT id, project_id, message, created_by FROM client_feedback",
                    id,
                )
                .await?
                .map(|row| row_parsers::feedback_from_row(&row).map(Resource::Feedback))
                .transpose()?,
            ResourceKind::TaskIssue => self
                .fetch_row(
                    "SELECT id, task_id, title, created_by, assigned_to FROM task_issues",
                    id,
                )
                .await?
                .map(|row| row_parsers::task_issue_from_row(&row).map(Resource::TaskIssue))
                .transpose()?,
        };

        Ok(resource)
    }
}

#[async_trait]
impl MembershipLookup for SqliteDirectory {
    async fn find(&self, project: Uuid, user: Uuid) -> LookupResult<Option<ProjectMembership>> {
        let sql = format!(
            "SELECT project_id, user_id, role_in_project, joined_at FROM project_members WHERE {} AND {}",
            match_uuid_clause("project_id"),
            match_uuid_clause("user_id")
        );
        let row = bind_uuid(bind_uuid(sqlx::query(&sql), project), user)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| row_parsers::membership_from_row(&row)).transpose()
    }

    async fn list_for_user(&self, user: Uuid) -> LookupResult<Vec<ProjectMembership>> {
        let sql = format!(
            "SELECT project_id, user_id, role_in_project, joined_at FROM project_members WHERE {} ORDER BY project_id",
            match_uuid_clause("user_id")
        );
        let rows = bind_uuid(sqlx::query(&sql), user)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_parsers::membership_from_row).collect()
    }
}
