//! taskpool CLI — operator interface to the assignment engine.

use clap::{Parser, Subcommand};
use secrecy::ExposeSecret;
use taskpool::config::Config;
use taskpool::db::Db;
use taskpool::model::{Actor, ListScope, NewTask, TaskId, TaskKind, WorkerId};
use taskpool::telemetry::{TelemetryConfig, init_telemetry};

#[derive(Parser)]
#[command(name = "taskpool", about = "Postgres-backed task assignment engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Task operations
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },
    /// Worker registry operations
    Worker {
        #[command(subcommand)]
        action: WorkerAction,
    },
}

#[derive(Subcommand)]
enum TaskAction {
    /// Create a new pending task
    Create {
        /// Requester worker id
        created_by: i64,
        title: String,
        /// Work payload (source text, or briefing for audio tasks)
        content: String,
        /// Language of the payload
        #[arg(long, default_value = "en")]
        source_language: String,
        /// Requested output language
        #[arg(long)]
        target_language: Option<String>,
        /// Task kind (text_translation | audio_transcription)
        #[arg(long, default_value = "text_translation")]
        kind: String,
        /// Media URL, required for audio tasks
        #[arg(long)]
        media_url: Option<String>,
    },
    /// List tasks, newest first
    List {
        /// Only tasks created by this worker
        #[arg(long)]
        created_by: Option<i64>,
        /// Only tasks assigned to this worker
        #[arg(long)]
        assigned_to: Option<i64>,
        #[arg(long, default_value_t = 20)]
        limit: i64,
        #[arg(long, default_value_t = 0)]
        offset: i64,
    },
    /// Show a task
    Show {
        id: i64,
        /// Print the full record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Claim the next available task for a worker
    Claim {
        worker: i64,
    },
    /// Submit the result for an in-progress task
    Submit {
        id: i64,
        /// The assignee submitting the result
        worker: i64,
        result: String,
    },
    /// Directly assign a pending task to a worker (admin override)
    Assign {
        id: i64,
        worker: i64,
        /// Acting admin id, recorded in the audit trail
        #[arg(long)]
        admin: i64,
    },
    /// Soft-delete a task
    Delete {
        id: i64,
        /// Acting worker id (owner, unless --superuser)
        actor: i64,
        #[arg(long)]
        superuser: bool,
    },
}

#[derive(Subcommand)]
enum WorkerAction {
    /// Register a worker
    Add {
        name: String,
        #[arg(long)]
        superuser: bool,
        /// Comma-separated language preferences
        #[arg(long, value_delimiter = ',')]
        languages: Vec<String>,
    },
    /// Replace a worker's language preferences
    Languages {
        id: i64,
        #[arg(value_delimiter = ',')]
        languages: Vec<String>,
    },
    /// List registered workers
    List {
        #[arg(long, default_value_t = 50)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::from_env()?;
    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "taskpool".to_string(),
    })?;

    let db = Db::connect(config.database_url.expose_secret()).await?;
    db.migrate().await?;

    match cli.command {
        Command::Task { action } => match action {
            TaskAction::Create {
                created_by,
                title,
                content,
                source_language,
                target_language,
                kind,
                media_url,
            } => {
                let kind: TaskKind = kind
                    .parse()
                    .map_err(|_| anyhow::anyhow!("invalid task kind: {kind}"))?;
                let mut new = NewTask::new(title, content, source_language, kind);
                if let Some(target) = target_language {
                    new = new.target_language(target);
                }
                if let Some(url) = media_url {
                    new = new.media_url(url);
                }
                let task = db.create_task(WorkerId(created_by), new).await?;
                println!("Created: {} (status: {})", task.id, task.status);
            }
            TaskAction::List {
                created_by,
                assigned_to,
                limit,
                offset,
            } => {
                let scope = match (created_by, assigned_to) {
                    (Some(_), Some(_)) => {
                        anyhow::bail!("--created-by and --assigned-to are mutually exclusive")
                    }
                    (Some(worker), None) => ListScope::CreatedBy(WorkerId(worker)),
                    (None, Some(worker)) => ListScope::AssignedTo(WorkerId(worker)),
                    (None, None) => ListScope::All,
                };
                cmd_task_list(&db, scope, limit, offset).await?;
            }
            TaskAction::Show { id, json } => cmd_task_show(&db, TaskId(id), json).await?,
            TaskAction::Claim { worker } => {
                let task = db.claim_next(WorkerId(worker)).await?;
                println!(
                    "Claimed: {} \"{}\" ({} -> {})",
                    task.id,
                    task.title,
                    task.source_language,
                    task.target_language.as_deref().unwrap_or("-")
                );
            }
            TaskAction::Submit { id, worker, result } => {
                let task = db
                    .submit_result(TaskId(id), WorkerId(worker), &result)
                    .await?;
                println!("Completed: {} (translator: {})", task.id, worker);
            }
            TaskAction::Assign { id, worker, admin } => {
                let task = db
                    .admin_assign(WorkerId(admin), TaskId(id), WorkerId(worker))
                    .await?;
                println!("Assigned: {} -> worker {}", task.id, worker);
            }
            TaskAction::Delete {
                id,
                actor,
                superuser,
            } => {
                db.soft_delete_task(
                    TaskId(id),
                    Actor {
                        id: WorkerId(actor),
                        is_superuser: superuser,
                    },
                )
                .await?;
                println!("Deleted: {id}");
            }
        },
        Command::Worker { action } => match action {
            WorkerAction::Add {
                name,
                superuser,
                languages,
            } => {
                let worker = db.create_worker(&name, superuser).await?;
                if !languages.is_empty() {
                    db.set_worker_languages(WorkerId(worker.id), &languages)
                        .await?;
                }
                println!("Registered: {} (id: {})", worker.name, worker.id);
            }
            WorkerAction::Languages { id, languages } => {
                db.set_worker_languages(WorkerId(id), &languages).await?;
                let resolved = db.worker_languages(WorkerId(id)).await?;
                println!("Languages for {id}: {}", resolved.join(", "));
            }
            WorkerAction::List { limit } => {
                let workers = db.list_workers(limit).await?;
                if workers.is_empty() {
                    println!("No workers registered.");
                    return Ok(());
                }
                println!("{:<6}  {:<20}  SUPERUSER", "ID", "NAME");
                println!("{}", "-".repeat(40));
                for worker in &workers {
                    println!(
                        "{:<6}  {:<20}  {}",
                        worker.id, worker.name, worker.is_superuser
                    );
                }
            }
        },
    }

    Ok(())
}

async fn cmd_task_list(db: &Db, scope: ListScope, limit: i64, offset: i64) -> anyhow::Result<()> {
    let tasks = db.list_tasks(scope, limit, offset).await?;

    if tasks.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }

    // Header
    println!(
        "{:<6}  {:<10}  {:<12}  {:<8}  {:<8}  {:<30}  CREATED",
        "ID", "STATUS", "KIND", "SOURCE", "ASSIGNEE", "TITLE"
    );
    println!("{}", "-".repeat(100));

    for task in &tasks {
        let assignee = task
            .assignee
            .map(|w| w.to_string())
            .unwrap_or_else(|| "-".to_string());
        let title = if task.title.len() > 30 {
            &task.title[..30]
        } else {
            &task.title
        };
        println!(
            "{:<6}  {:<10}  {:<12}  {:<8}  {:<8}  {:<30}  {}",
            task.id.to_string(),
            task.status.to_string(),
            task.kind.to_string(),
            task.source_language,
            assignee,
            title,
            task.created_at.format("%Y-%m-%d %H:%M")
        );
    }

    println!("\n{} task(s)", tasks.len());
    Ok(())
}

async fn cmd_task_show(db: &Db, id: TaskId, json: bool) -> anyhow::Result<()> {
    let task = db.get_task(id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&task)?);
        return Ok(());
    }

    println!("ID:          {}", task.id);
    println!("Public ID:   {}", task.public_id);
    println!("Title:       {}", task.title);
    println!("Kind:        {}", task.kind);
    println!("Status:      {}", task.status);
    println!("Source:      {}", task.source_language);
    println!(
        "Target:      {}",
        task.target_language.as_deref().unwrap_or("-")
    );
    println!("Created By:  {}", task.created_by);
    println!(
        "Assignee:    {}",
        task.assignee
            .map(|w| w.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    println!(
        "Translator:  {}",
        task.translator
            .map(|w| w.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    if let Some(ref url) = task.media_url {
        println!("Media:       {url}");
    }
    println!("Created:     {}", task.created_at);
    if let Some(updated) = task.updated_at {
        println!("Updated:     {updated}");
    }
    if let Some(completed) = task.completed_at {
        println!("Completed:   {completed}");
    }
    println!("---");
    println!("{}", task.content);
    if let Some(ref result) = task.result_content {
        println!("--- result ---");
        println!("{result}");
    }

    Ok(())
}
