//! `memos` command-line front end.
//!
//! # Responsibility
//! - Map subcommands onto `memo_core::MemoService` operations.
//! - Resolve configuration from env, then let flags override it.

mod commands;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::debug;
use memo_core::{init_from_config, CoreConfig, MemoService, ServiceOptions, SqliteKvStore};
use std::path::PathBuf;
use std::process::ExitCode;

/// Memo and tag manager
#[derive(Parser, Debug)]
#[command(name = "memos")]
#[command(about = "Create, tag, filter and delete short notes")]
#[command(version)]
struct Cli {
    /// SQLite file holding the MEMOS and TAGS records (env: MEMOS_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log level for file logging (env: MEMOS_LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files (env: MEMOS_LOG_DIR)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Also strip a deleted tag's id from stored memos
    #[arg(long, global = true)]
    prune_on_tag_delete: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a memo
    New {
        #[arg(short, long)]
        title: String,

        #[arg(short, long, default_value = "")]
        body: String,

        /// Tag id or label; unknown labels are created
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Change fields of a memo; omitted fields keep their value
    Edit {
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        body: Option<String>,

        /// Replace the memo's tags (id or label; unknown labels are created)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Remove every tag from the memo
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,
    },

    /// Show one memo
    Show {
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Delete a memo
    Rm { id: String },

    /// List memos, optionally filtered
    List(ListArgs),

    /// Tag management commands
    #[command(subcommand)]
    Tags(TagsCommand),

    /// Remove ids of deleted tags from stored memos
    Prune,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Case-insensitive title substring
    #[arg(long, default_value = "")]
    title: String,

    /// Required tag id or label; repeat to require several
    #[arg(long = "tag")]
    tags: Vec<String>,

    #[arg(long)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum TagsCommand {
    /// List all tags
    List {
        #[arg(long)]
        json: bool,
    },

    /// Create a tag
    Add { label: String },

    /// Rename a tag
    Rename { id: String, label: String },

    /// Delete a tag
    Rm { id: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli, CoreConfig::from_env());
    init_from_config(&config).context("failed to initialize logging")?;
    debug!(
        "event=cli_start module=cli status=ok command={} prune_on_tag_delete={}",
        command_name(&cli.command),
        config.prune_on_tag_delete
    );

    let store = SqliteKvStore::open(&config.db_path)
        .with_context(|| format!("failed to open store `{}`", config.db_path.display()))?;
    let mut service = MemoService::with_options(&store, ServiceOptions::from(&config))
        .context("failed to load memos")?;

    let mut stdout = std::io::stdout().lock();
    commands::execute(&mut service, cli.command, &mut stdout)
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::New { .. } => "new",
        Command::Edit { .. } => "edit",
        Command::Show { .. } => "show",
        Command::Rm { .. } => "rm",
        Command::List(_) => "list",
        Command::Tags(_) => "tags",
        Command::Prune => "prune",
    }
}

fn resolve_config(cli: &Cli, mut config: CoreConfig) -> CoreConfig {
    if let Some(db) = cli.db.as_ref() {
        config.db_path = db.clone();
    }
    if let Some(level) = cli.log_level.as_ref() {
        config.log_level = level.clone();
    }
    if let Some(dir) = cli.log_dir.as_ref() {
        config.log_dir = Some(dir.clone());
    }
    if cli.prune_on_tag_delete {
        config.prune_on_tag_delete = true;
    }
    config
}
