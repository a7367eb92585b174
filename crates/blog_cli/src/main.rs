//! Command-line front end over the post service.
//!
//! Every command prints one JSON document on stdout. Service failures print
//! `{"status": <code>, "message": ...}` on stderr and exit non-zero.

use anyhow::{Context, Result};
use blog_core::db::open_db;
use blog_core::{
    default_log_level, init_logging, CreatePost, PostId, PostService, ServiceError,
    SqlitePersistenceContext, SqlitePostRepository, UpdatePost,
};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

const DEFAULT_DB_FILE: &str = "blog.sqlite3";

#[derive(Parser)]
#[command(name = "blog")]
#[command(about = "Manage blog posts stored in SQLite", version)]
struct Cli {
    /// SQLite database file, created on first use.
    #[arg(long, env = "BLOG_DB", default_value = DEFAULT_DB_FILE)]
    db: PathBuf,

    /// Log level (trace|debug|info|warn|error).
    #[arg(long, env = "BLOG_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files. Logging is off when omitted.
    #[arg(long, env = "BLOG_LOG_DIR")]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a post
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        writer: String,
    },

    /// List all posts
    List,

    /// Show one post
    Get { id: PostId },

    /// Update selected fields of a post
    Update {
        id: PostId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        writer: Option<String>,
    },

    /// Delete a post
    Delete { id: PostId },
}

#[derive(Serialize)]
struct ErrorResponse {
    status: u16,
    message: String,
}

#[derive(Serialize)]
struct SuccessResponse {
    success: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)
            .map_err(|err| anyhow::anyhow!("failed to initialize logging: {err}"))?;
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database {}", cli.db.display()))?;
    let service = PostService::new(
        SqlitePostRepository::try_new(&conn).context("database is not ready")?,
        SqlitePersistenceContext::new(&conn),
    );

    match run(&service, cli.command) {
        Ok(output) => {
            println!("{output}");
            Ok(ExitCode::SUCCESS)
        }
        Err(CommandError::Service(err)) => {
            let response = ErrorResponse {
                status: err.status(),
                message: err.to_string(),
            };
            eprintln!("{}", serde_json::to_string(&response)?);
            Ok(ExitCode::FAILURE)
        }
        Err(CommandError::Encode(err)) => Err(err.into()),
    }
}

enum CommandError {
    Service(ServiceError),
    Encode(serde_json::Error),
}

impl From<ServiceError> for CommandError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

fn run(
    service: &PostService<SqlitePostRepository<'_>, SqlitePersistenceContext<'_>>,
    command: Commands,
) -> Result<String, CommandError> {
    let output = match command {
        Commands::Create {
            title,
            content,
            writer,
        } => {
            let post = service.create(&CreatePost::new(title, content, writer))?;
            info!("event=cli_create module=cli status=ok id={}", post.id);
            serde_json::to_string_pretty(&post)?
        }
        Commands::List => serde_json::to_string_pretty(&service.find_all()?)?,
        Commands::Get { id } => serde_json::to_string_pretty(&service.find_one(id)?)?,
        Commands::Update {
            id,
            title,
            content,
            writer,
        } => {
            let patch = UpdatePost {
                title,
                content,
                writer,
            };
            let success = service.update(id, &patch)?;
            serde_json::to_string(&SuccessResponse { success })?
        }
        Commands::Delete { id } => {
            let success = service.delete(id)?;
            serde_json::to_string(&SuccessResponse { success })?
        }
    };
    Ok(output)
}
