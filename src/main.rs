use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use uuid::Uuid;

use pm_authz::authz::{capabilities_of, Action, Authorizer, Decision};
use pm_authz::config::AuthzConfig;
use pm_authz::events::init_event_bus;
use pm_authz::lookup::{InMemoryDirectory, MembershipLookup, ResourceLookup, SqliteDirectory};
use pm_authz::models::{Actor, Resource, ResourceKind, Role};
use pm_authz::db;

#[derive(Parser, Debug)]
#[command(author, version, about = "pm-authz decision tool", long_about = None)]
struct Cli {
    /// JSON fixture with users, resources and memberships
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,
    /// SQLite database URL (defaults to DATABASE_URL)
    #[arg(long, global = true)]
    database_url: Option<String>,
    /// Print audit events as JSON lines on stderr
    #[arg(long, global = true)]
    audit: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the capability set of a global role
    Capabilities { role: String },
    /// Decide whether an actor may perform an action on a resource
    Decide {
        #[arg(long)]
        actor: Option<Uuid>,
        #[arg(long)]
        action: Action,
        #[arg(long)]
        kind: ResourceKind,
        #[arg(long)]
        id: Uuid,
    },
    /// Check a proposed update's fields against the actor's allow-list
    GuardFields {
        #[arg(long)]
        actor: Option<Uuid>,
        #[arg(long)]
        action: Action,
        #[arg(long)]
        kind: ResourceKind,
        #[arg(long)]
        id: Uuid,
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },
    /// Check whether a user may be assigned to work in a project
    ValidateAssignee {
        #[arg(long)]
        candidate: Uuid,
        #[arg(long)]
        project: Uuid,
    },
    /// Apply migrations to the SQLite database
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    load_env();
    init_tracing();

    let cli = Cli::parse();
    let config = AuthzConfig::from_env()?;

    if let Commands::Capabilities { role } = &cli.command {
        let role = Role::parse(role);
        let capabilities: Vec<&str> = capabilities_of(role).iter().map(|c| c.as_str()).collect();
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({
            "role": role,
            "capabilities": capabilities,
        }))?);
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(path) = &cli.fixture {
        let directory = InMemoryDirectory::load(path)
            .with_context(|| format!("failed to load fixture {}", path.display()))?;
        return run(Arc::new(directory), &cli, &config).await;
    }

    let database_url = cli
        .database_url
        .clone()
        .or_else(|| config.database_url.clone())
        .context("either --fixture or --database-url/DATABASE_URL is required")?;
    let pool = db::init(&database_url).await?;

    if let Commands::Migrate = cli.command {
        println!("Migrations applied");
        return Ok(ExitCode::SUCCESS);
    }

    run(Arc::new(SqliteDirectory::new(pool)), &cli, &config).await
}

async fn run<D>(directory: Arc<D>, cli: &Cli, config: &AuthzConfig) -> anyhow::Result<ExitCode>
where
    D: ResourceLookup + MembershipLookup + 'static,
{
    let (bus, mut rx) = init_event_bus(config.audit_channel_capacity);
    let authorizer = Authorizer::from_directory(directory.clone())
        .with_mode(config.mode)
        .with_event_bus(bus);

    let decision = match &cli.command {
        Commands::Decide { actor, action, kind, id } => {
            let actor = load_actor(directory.as_ref(), *actor).await?;
            authorizer.decide_by_id(actor.as_ref(), *action, *kind, *id).await?
        }
        Commands::GuardFields {
            actor,
            action,
            kind,
            id,
            fields,
        } => {
            let actor = load_actor(directory.as_ref(), *actor).await?;
            let resource = directory
                .get(*kind, *id)
                .await?
                .with_context(|| format!("{kind} {id} not found"))?;
            authorizer.guard_fields(actor.as_ref(), &resource, *action, fields)
        }
        Commands::ValidateAssignee { candidate, project } => {
            let candidate = load_actor(directory.as_ref(), Some(*candidate))
                .await?
                .with_context(|| format!("user {candidate} not found"))?;
            authorizer.validate_assignee(&candidate, *project).await?
        }
        Commands::Capabilities { .. } | Commands::Migrate => {
            anyhow::bail!("command does not take a directory")
        }
    };

    println!("{}", serde_json::to_string_pretty(&decision)?);

    if cli.audit {
        while let Ok(event) = rx.try_recv() {
            eprintln!("{}", event);
        }
    }

    Ok(exit_code(&decision))
}

async fn load_actor<D: ResourceLookup>(directory: &D, id: Option<Uuid>) -> anyhow::Result<Option<Actor>> {
    let Some(id) = id else {
        return Ok(None);
    };

    Ok(match directory.get(ResourceKind::User, id).await? {
        Some(Resource::User(user)) => Some(user.as_actor()),
        _ => None,
    })
}

fn exit_code(decision: &Decision) -> ExitCode {
    if decision.allow {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

fn load_env() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    let crate_env = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    let _ = dotenvy::from_path(crate_env);
}

fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
