use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::lookup::{LookupError, LookupResult};
use crate::models::{
    EntityRef, FeedbackRecord, MeetingRecord, PageRecord, ProjectMembership, ProjectRecord, Role,
    TaskIssueRecord, TaskRecord, UserRecord,
};

fn parse_datetime(s: &str) -> LookupResult<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // SQLite CURRENT_TIMESTAMP format, optional fractional seconds
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(Utc.from_utc_datetime(&naive));
    }

    if let Ok(naive_date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let ndt = naive_date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| LookupError::corrupt("invalid datetime: date out of range"))?;
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    Err(LookupError::corrupt(format!("invalid datetime: {}", s)))
}

fn parse_opt_datetime(s: Option<String>) -> LookupResult<Option<DateTime<Utc>>> {
    match s {
        Some(s) if !s.trim().is_empty() => Ok(Some(parse_datetime(&s)?)),
        _ => Ok(None),
    }
}

fn text(row: &SqliteRow, col: &str) -> LookupResult<String> {
    row.try_get(col)
        .map_err(|e| LookupError::corrupt(format!("missing {}: {}", col, e)))
}

fn opt_text(row: &SqliteRow, col: &str) -> LookupResult<Option<String>> {
    row.try_get(col)
        .map_err(|e| LookupError::corrupt(format!("missing {}: {}", col, e)))
}

/// Reads a UUID column stored either as canonical text or as a 16-byte blob.
pub fn uuid_column(row: &SqliteRow, col: &str) -> LookupResult<Uuid> {
    uuid_opt_column(row, col)?.ok_or_else(|| LookupError::corrupt(format!("null {}", col)))
}

pub fn uuid_opt_column(row: &SqliteRow, col: &str) -> LookupResult<Option<Uuid>> {
    if let Ok(value) = row.try_get::<Option<String>, _>(col) {
        return value
            .map(|s| {
                Uuid::parse_str(s.trim())
                    .map_err(|e| LookupError::corrupt(format!("invalid uuid in {}: {}", col, e)))
            })
            .transpose();
    }

    let bytes: Option<Vec<u8>> = row
        .try_get(col)
        .map_err(|e| LookupError::corrupt(format!("missing {}: {}", col, e)))?;

    bytes
        .map(|b| {
            Uuid::from_slice(&b)
                .map_err(|e| LookupError::corrupt(format!("invalid uuid blob in {}: {}", col, e)))
        })
        .transpose()
}

fn ref_column(row: &SqliteRow, col: &str) -> LookupResult<EntityRef> {
    uuid_column(row, col).map(EntityRef::Id)
}

fn opt_ref_column(row: &SqliteRow, col: &str) -> LookupResult<Option<EntityRef>> {
    Ok(uuid_opt_column(row, col)?.map(EntityRef::Id))
}

pub fn user_from_row(row: &SqliteRow) -> LookupResult<UserRecord> {
    Ok(UserRecord {
        id: uuid_column(row, "id")?,
        name: text(row, "name")?,
        email: text(row, "email")?,
        role: Role::parse(&text(row, "role")?),
    })
}

pub fn project_from_row(row: &SqliteRow) -> LookupResult<ProjectRecord> {
    Ok(ProjectRecord {
        id: uuid_column(row, "id")?,
        name: text(row, "name")?,
        status: text(row, "status")?,
        created_by: ref_column(row, "created_by")?,
    })
}

pub fn membership_from_row(row: &SqliteRow) -> LookupResult<ProjectMembership> {
    Ok(ProjectMembership {
        project: uuid_column(row, "project_id")?,
        user: uuid_column(row, "user_id")?,
        role_in_project: text(row, "role_in_project")?,
        joined_at: parse_opt_datetime(opt_text(row, "joined_at")?)?,
    })
}

pub fn task_from_row(row: &SqliteRow) -> LookupResult<TaskRecord> {
    Ok(TaskRecord {
        id: uuid_column(row, "id")?,
        project: ref_column(row, "project_id")?,
        title: text(row, "title")?,
        status: text(row, "status")?,
        created_by: ref_column(row, "created_by")?,
        assigned_to: opt_ref_column(row, "assigned_to")?,
    })
}

/// Attendees live in their own table and are attached by the caller.
pub fn meeting_from_row(row: &SqliteRow, attendees: Vec<EntityRef>) -> LookupResult<MeetingRecord> {
    Ok(MeetingRecord {
        id: uuid_column(row, "id")?,
        project: ref_column(row, "project_id")?,
        title: text(row, "title")?,
        organizer: ref_column(row, "organizer")?,
        meeting_link: opt_text(row, "meeting_link")?,
        attendees,
    })
}

pub fn page_from_row(row: &SqliteRow) -> LookupResult<PageRecord> {
    Ok(PageRecord {
        id: uuid_column(row, "id")?,
        project: ref_column(row, "project_id")?,
        title: text(row, "title")?,
        created_by: ref_column(row, "created_by")?,
    })
}

pub fn feedback_from_row(row: &SqliteRow) -> LookupResult<FeedbackRecord> {
    Ok(FeedbackRecord {
        id: uuid_column(row, "id")?,
        project: ref_column(row, "project_id")?,
        message: text(row, "message")?,
        created_by: ref_column(row, "created_by")?,
    })
}

pub fn task_issue_from_row(row: &SqliteRow) -> LookupResult<TaskIssueRecord> {
    Ok(TaskIssueRecord {
        id: uuid_column(row, "id")?,
        task: ref_column(row, "task_id")?,
        title: text(row, "title")?,
        created_by: ref_column(row, "created_by")?,
        assigned_to: opt_ref_column(row, "assigned_to")?,
    })
}
