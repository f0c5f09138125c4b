mod app;
mod domain;
mod timeutil;
mod ui;
mod usecase;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use time::OffsetDateTime;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use app::App;
use domain::id::IdGenerator;
use domain::todo::{CreateToDo, ToDo};
use usecase::todo_service::TodoService;

#[derive(Parser, Debug)]
#[command(author, version, about = "todo-service: in-memory todo list manager", long_about = None)]
struct Args {
    /// Tick interval of render loop in milliseconds
    #[arg(long, default_value_t = 120)]
    tick_ms: u64,

    /// Start with demo tasks
    #[arg(long, default_value_t = false)]
    demo: bool,

    /// Print the final list as JSON after quitting
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Write logs to this file (filter with RUST_LOG, default "info")
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let mut todos: Vec<ToDo> = Vec::new();
    let mut service = TodoService::new(&mut todos, IdGenerator::new());
    if args.demo {
        for task in seed_todos() {
            service.add_to_do(task);
        }
    }
    info!(count = service.get_to_dos().len(), "starting");

    let mut app = App::new(service);
    app.set_status("Press 'a' to add a task, 'f' to switch views");
    ui::run(app, Duration::from_millis(args.tick_ms))?;

    if args.json {
        let out = serde_json::to_string_pretty(&todos).context("failed to encode todos")?;
        println!("{out}");
    }
    Ok(())
}

fn seed_todos() -> Vec<CreateToDo> {
    let now = OffsetDateTime::now_utc();
    vec![
        CreateToDo::new("Write documentation", now),
        CreateToDo::new("Check PRs waiting for review", now + time::Duration::days(2)),
        CreateToDo::new("Draft release notes", now + time::Duration::days(10)),
    ]
}

fn init_logging(path: Option<&Path>) -> Result<()> {
    // The terminal UI owns stdout/stderr, so logs only go to a file.
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .init();
    Ok(())
}
