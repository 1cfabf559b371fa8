use std::sync::Arc;

use anyhow::Result;
use sqlx::SqlitePool;
use tempfile::tempdir;
use uuid::Uuid;

use pm_authz::db;
use pm_authz::lookup::{MembershipLookup, ResourceLookup, SqliteDirectory};
use pm_authz::models::{EntityRef, Resource, ResourceKind};
use pm_authz::{Action, Authorizer, Reason, Role};

struct Seed {
    lead: Uuid,
    member: Uuid,
    client: Uuid,
    project: Uuid,
    task: Uuid,
    meeting: Uuid,
    issue: Uuid,
}

async fn insert_user(pool: &SqlitePool, id: Uuid, name: &str, role: &str) -> Result<()> {
    sqlx::query("INSERT INTO users (id, name, email, role) VALUES (?, ?, ?, ?)")
        .bind(id.to_string())
        .bind(name)
        .bind(format!("{name}@example.com"))
        .bind(role)
        .execute(pool)
        .await?;
    Ok(())
}

async fn seed(pool: &SqlitePool) -> Result<Seed> {
    let seed = Seed {
        lead: Uuid::new_v4(),
        member: Uuid::new_v4(),
        client: Uuid::new_v4(),
        project: Uuid::new_v4(),
        task: Uuid::new_v4(),
        meeting: Uuid::new_v4(),
        issue: Uuid::new_v4(),
    };

    insert_user(pool, seed.lead, "lee", "project_manager").await?;
    insert_user(pool, seed.member, "mo", "team_member").await?;
    insert_user(pool, seed.client, "cy", "client").await?;

    sqlx::query("INSERT INTO projects (id, name, status, created_by) VALUES (?, 'Tower', 'active', ?)")
        .bind(seed.project.to_string())
        .bind(seed.lead.to_string())
        .execute(pool)
        .await?;

    for (user, role_in_project) in [(seed.lead, "Lead"), (seed.member, "developer"), (seed.client, "client")] {
        sqlx::query(
            "INSERT INTO project_members (project_id, user_id, role_in_project, joined_at) VALUES (?, ?, ?, '2025-01-02 09:30:00')",
        )
        .bind(seed.project.to_string())
        .bind(user.to_string())
        .bind(role_in_project)
        .execute(pool)
        .await?;
    }

    sqlx::query(
        "INSERT INTO tasks (id, project_id, title, status, created_by, assigned_to) VALUES (?, ?, 'Crane permit', 'todo', ?, ?)",
    )
    .bind(seed.task.to_string())
    .bind(seed.project.to_string())
    .bind(seed.lead.to_string())
    .bind(seed.member.to_string())
    .execute(pool)
    .await?;

    sqlx::query("INSERT INTO meetings (id, project_id, title, organizer, meeting_link) VALUES (?, ?, 'Kickoff', ?, NULL)")
        .bind(seed.meeting.to_string())
        .bind(seed.project.to_string())
        .bind(seed.lead.to_string())
        .execute(pool)
        .await?;

    sqlx::query("INSERT INTO meeting_attendees (meeting_id, user_id) VALUES (?, ?)")
        .bind(seed.meeting.to_string())
        .bind(seed.member.to_string())
        .execute(pool)
        .await?;

    sqlx::query("INSERT INTO task_issues (id, task_id, title, created_by, assigned_to) VALUES (?, ?, 'Permit late', ?, NULL)")
        .bind(seed.issue.to_string())
        .bind(seed.task.to_string())
        .bind(seed.member.to_string())
        .execute(pool)
        .await?;

    Ok(seed)
}

async fn setup() -> Result<(tempfile::TempDir, SqliteDirectory, Seed)> {
    let dir = tempdir()?;
    let url = format!("sqlite://{}", dir.path().join("authz.db").display());
    let pool = db::init(&url).await?;
    let seed = seed(&pool).await?;
    Ok((dir, SqliteDirectory::new(pool), seed))
}

#[tokio::test]
async fn loads_records_with_their_references() -> Result<()> {
    let (_dir, directory, seed) = setup().await?;

    match directory.get(ResourceKind::Task, seed.task).await? {
        Some(Resource::Task(task)) => {
            assert_eq!(task.project, EntityRef::Id(seed.project));
            assert_eq!(task.assigned_to, Some(EntityRef::Id(seed.member)));
            assert_eq!(task.title, "Crane permit");
        }
        other => panic!("unexpected {other:?}"),
    }

    match directory.get(ResourceKind::Meeting, seed.meeting).await? {
        Some(Resource::Meeting(meeting)) => {
            assert_eq!(meeting.attendees, vec![EntityRef::Id(seed.member)]);
            assert_eq!(meeting.meeting_link, None);
        }
        other => panic!("unexpected {other:?}"),
    }

    match directory.get(ResourceKind::User, seed.client).await? {
        Some(Resource::User(user)) => assert_eq!(user.role, Role::Client),
        other => panic!("unexpected {other:?}"),
    }

    assert!(directory.get(ResourceKind::Page, Uuid::new_v4()).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn memberships_round_out_from_the_table() -> Result<()> {
    let (_dir, directory, seed) = setup().await?;

    let lead = directory
        .find(seed.project, seed.lead)
        .await?
        .expect("lead membership");
    assert!(lead.is_elevated());
    assert!(lead.joined_at.is_some());

    assert!(directory.find(seed.project, Uuid::new_v4()).await?.is_none());

    let projects = directory.list_for_user(seed.member).await?;
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].project, seed.project);
    Ok(())
}

#[tokio::test]
async fn decisions_over_sqlite_match_in_memory_rules() -> Result<()> {
    let (_dir, directory, seed) = setup().await?;
    let authorizer = Authorizer::from_directory(Arc::new(directory.clone()));

    let lead = match directory.get(ResourceKind::User, seed.lead).await? {
        Some(Resource::User(user)) => user.as_actor(),
        other => panic!("unexpected {other:?}"),
    };
    let client = match directory.get(ResourceKind::User, seed.client).await? {
        Some(Resource::User(user)) => user.as_actor(),
        other => panic!("unexpected {other:?}"),
    };

    let decision = authorizer
        .decide_by_id(Some(&lead), Action::AssignTask, ResourceKind::Task, seed.task)
        .await?;
    assert!(decision.allow, "{decision:?}");

    let decision = authorizer
        .decide_by_id(Some(&client), Action::ViewTaskIssue, ResourceKind::TaskIssue, seed.issue)
        .await?;
    assert_eq!(decision.reason, Reason::InsufficientRole);

    let decision = authorizer
        .decide_by_id(Some(&client), Action::ViewMeeting, ResourceKind::Meeting, seed.meeting)
        .await?;
    assert!(decision.allow, "{decision:?}");

    let decision = authorizer.validate_assignee(&client, seed.project).await?;
    assert_eq!(decision.reason, Reason::IneligibleRole);
    Ok(())
}

#[tokio::test]
async fn init_is_idempotent_on_an_existing_file() -> Result<()> {
    let dir = tempdir()?;
    let url = format!("sqlite://{}", dir.path().join("authz.db").display());

    let pool = db::init(&url).await?;
    pool.close().await;

    let pool = db::init(&url).await?;
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(&pool).await?;
    assert_eq!(count, 0);
    Ok(())
}

#[tokio::test]
async fn rows_keyed_by_blob_or_upper_case_text_are_found() -> Result<()> {
    let dir = tempdir()?;
    let url = format!("sqlite://{}", dir.path().join("authz.db").display());
    let pool = db::init(&url).await?;

    let user = Uuid::new_v4();
    let project = Uuid::new_v4();
    let upper = project.to_string().to_uppercase();

    sqlx::query("INSERT INTO users (id, name, email, role) VALUES (?, 'blob', 'blob@example.com', 'team_member')")
        .bind(user.as_bytes().to_vec())
        .execute(&pool)
        .await?;
    sqlx::query("INSERT INTO projects (id, name, status, created_by) VALUES (?, 'Quay', 'active', ?)")
        .bind(upper.clone())
        .bind(user.as_bytes().to_vec())
        .execute(&pool)
        .await?;
    sqlx::query("INSERT INTO project_members (project_id, user_id, role_in_project) VALUES (?, ?, 'developer')")
        .bind(upper)
        .bind(user.as_bytes().to_vec())
        .execute(&pool)
        .await?;

    let directory = SqliteDirectory::new(pool);

    match directory.get(ResourceKind::User, user).await? {
        Some(Resource::User(record)) => assert_eq!(record.id, user),
        other => panic!("unexpected {other:?}"),
    }
    match directory.get(ResourceKind::Project, project).await? {
        Some(Resource::Project(record)) => {
            assert_eq!(record.id, project);
            assert_eq!(record.created_by, EntityRef::Id(user));
        }
        other => panic!("unexpected {other:?}"),
    }

    let membership = directory.find(project, user).await?.expect("membership");
    assert_eq!(membership.user, user);
    assert_eq!(directory.list_for_user(user).await?.len(), 1);
    Ok(())
}
