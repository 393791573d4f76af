//! `synapse` command-line capture surface.
//!
//! # Responsibility
//! - Resolve configuration (file, environment, flags) and bootstrap logging.
//! - Wire session, activity store and sync client into `CaptureService`.
//! - Render save outcomes, recent activity and the knowledge graph.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::warn;
use std::path::PathBuf;
use std::process::ExitCode;
use synapse_core::db::{open_db, open_db_in_memory};
use synapse_core::graph::export::{to_dot, to_json};
use synapse_core::{
    init_logging, ActivityStore, CaptureService, ForceLayout, LayoutConfig, NoteDraft, NoteType,
    Session, SqliteKvStore, SyncClient, SynapseConfig, AUTO_CATEGORY,
};

const IN_MEMORY_DB: &str = ":memory:";

#[derive(Parser)]
#[command(name = "synapse", version, about = "Capture notes into your digital synapse")]
struct Cli {
    /// TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// SQLite database path (`:memory:` for a throwaway session).
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Remote capture endpoint URL.
    #[arg(long, global = true, conflicts_with = "demo")]
    endpoint: Option<String>,
    /// Ignore any configured endpoint and summarize locally.
    #[arg(long, global = true)]
    demo: bool,
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store the access key and unlock capture.
    Login { key: String },
    /// Forget the access key.
    Logout,
    /// Show lock state, sync mode and cache size.
    Status,
    /// Capture one note.
    Save(SaveArgs),
    /// List cached notes, newest first.
    Recent,
    /// Lay out and export the knowledge graph.
    Graph(GraphArgs),
}

#[derive(Args)]
struct SaveArgs {
    #[arg(long = "type", value_enum, default_value_t = KindArg::Text)]
    kind: KindArg,
    #[arg(long, default_value = "")]
    title: String,
    #[arg(long, default_value = AUTO_CATEGORY)]
    category: String,
    /// Comma-separated tags.
    #[arg(long, default_value = "")]
    tags: String,
    /// Note body; may be omitted for images.
    #[arg(default_value = "")]
    content: String,
}

#[derive(Args)]
struct GraphArgs {
    #[arg(long, value_enum, default_value_t = GraphFormat::Json)]
    format: GraphFormat,
    #[arg(long, default_value_t = 960.0)]
    width: f64,
    #[arg(long, default_value_t = 640.0)]
    height: f64,
    #[arg(long, default_value_t = 300)]
    ticks: usize,
    /// Rest length of note links.
    #[arg(long, default_value_t = 100.0)]
    link_distance: f64,
    /// Node charge; negative values repel.
    #[arg(long, default_value_t = -200.0, allow_hyphen_values = true)]
    charge: f64,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Text,
    Link,
    Image,
}

impl From<KindArg> for NoteType {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Text => NoteType::Text,
            KindArg::Link => NoteType::Link,
            KindArg::Image => NoteType::Image,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum GraphFormat {
    Json,
    Dot,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = resolve_config(&cli)?;
    if let Err(err) = init_logging(&config.log_level, &config.log_dir) {
        eprintln!("warning: file logging disabled: {err}");
    }

    let conn = if config.db_path.as_os_str() == IN_MEMORY_DB {
        open_db_in_memory()
    } else {
        open_db(&config.db_path)
    }
    .with_context(|| format!("failed to open `{}`", config.db_path.display()))?;
    let kv = SqliteKvStore::new(&conn);
    let mut session = Session::load(kv)?;

    match cli.command {
        Command::Login { key } => {
            session.login(&key)?;
            println!("Access granted.");
        }
        Command::Logout => {
            session.logout()?;
            println!("Locked.");
        }
        Command::Status => {
            let store = ActivityStore::load(kv)?;
            println!(
                "locked={} mode={} cached={} db={}",
                !session.is_unlocked(),
                if config.is_demo() { "demo" } else { "remote" },
                store.len(),
                config.db_path.display()
            );
        }
        Command::Save(args) => {
            let store = ActivityStore::load(kv)?;
            let sync = SyncClient::from_config(&config)?;
            let mut capture = CaptureService::new(session, store, sync);
            let draft = NoteDraft::new(args.kind.into(), args.content)
                .with_title(args.title)
                .with_category(args.category)
                .with_tags(args.tags);

            match capture.save(&draft) {
                Ok(saved) => {
                    let record = &saved.record;
                    println!("Captured \"{}\" [{}]", record.title, record.category);
                    if let Some(summary) = &record.summary {
                        println!("  {summary}");
                    }
                    if !saved.persisted {
                        warn!(
                            "event=cli_save module=cli status=error note_id={} error_code=not_persisted",
                            record.id
                        );
                        eprintln!("warning: not saved locally; the note is lost on exit.");
                        return Ok(ExitCode::from(2));
                    }
                }
                Err(err) => {
                    warn!(
                        "event=cli_save module=cli status=error kind={:?}",
                        err.kind()
                    );
                    eprintln!("{}", err.user_message());
                    return Ok(ExitCode::from(2));
                }
            }
        }
        Command::Recent => {
            let store = ActivityStore::load(kv)?;
            if store.is_empty() {
                println!("No notes yet.");
            }
            for record in store.all() {
                println!(
                    "[{}] {} ({}) {}",
                    record.kind, record.title, record.category, record.timestamp
                );
                if let Some(summary) = &record.summary {
                    println!("    {summary}");
                }
            }
        }
        Command::Graph(args) => {
            let store = ActivityStore::load(kv)?;
            let layout_config = LayoutConfig {
                link_distance: args.link_distance,
                charge_strength: args.charge,
                ..LayoutConfig::default()
            };
            let mut layout = ForceLayout::with_config(args.width, args.height, layout_config);
            layout.update(store.all());
            layout.run(args.ticks);
            match args.format {
                GraphFormat::Json => println!("{}", to_json(&layout)?),
                GraphFormat::Dot => print!("{}", to_dot(&layout)),
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// File, then environment, then flags; validated once at the end.
fn resolve_config(cli: &Cli) -> Result<SynapseConfig> {
    let mut config = SynapseConfig::load(cli.config.as_deref())?;
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = Some(endpoint.clone());
    }
    if cli.demo {
        config.endpoint = None;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = dir.clone();
    }
    config.validate()?;
    Ok(config)
}
