use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use taskboard::app::{App, AppEvent};
use taskboard::board::{build_summary, render_text, Board};
use taskboard::config::Config;
use taskboard::keybindings::KeybindingRegistry;
use taskboard::preferences::PreferenceManager;
use taskboard::storage::{Database, StorageError};
use taskboard::ui;

/// Home-relative directory, e.g. `~/.config/taskboard`.
fn home_dir(parts: &[&str]) -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(parts.iter().fold(PathBuf::from(home), |p, part| p.join(part)))
}

/// Create `dir` if needed and restrict it to the current user.
fn ensure_private_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(dir, perms) {
                    tracing::warn!(
                        path = %dir.display(),
                        error = %e,
                        "Failed to set directory permissions to 0700"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "Failed to read directory metadata");
            }
        }
    }
    Ok(())
}

/// Send tracing output to stderr or to `taskboard.log` in the data directory.
///
/// The TUI owns stdout, so file logging is the default.
fn init_tracing(data_dir: &Path, to_stderr: bool) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env());
    if to_stderr {
        builder.with_writer(std::io::stderr).init();
    } else {
        let log_path = data_dir.join("taskboard.log");
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
        builder
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(
    name = "taskboard",
    about = "Terminal task board with categories, priorities and weekly summaries"
)]
struct Args {
    /// Directory holding the database and log file
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Config file (default ~/.config/taskboard/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Reset database (delete and recreate)
    #[arg(long)]
    reset_db: bool,

    /// Print this week's summary as text and exit
    #[arg(long)]
    export_summary: bool,

    /// Log to stderr instead of the log file
    #[arg(long)]
    log_stderr: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let data_dir = match &args.data_dir {
        Some(dir) => dir.clone(),
        None => home_dir(&[".local", "share", "taskboard"])?,
    };
    ensure_private_dir(&data_dir)?;
    init_tracing(&data_dir, args.log_stderr)?;

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => home_dir(&[".config", "taskboard", "config.toml"])?,
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let db_path = data_dir.join("taskboard.db");
    if args.reset_db && db_path.exists() {
        std::fs::remove_file(&db_path).context("Failed to delete database")?;
        println!("Database reset.");
    }

    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = match Database::open(db_path_str).await {
        Ok(db) => db,
        Err(StorageError::InstanceLocked) => {
            eprintln!(
                "Error: Another instance of taskboard appears to be running. Please close it and try again."
            );
            std::process::exit(1);
        }
        Err(e) => {
            return Err(anyhow::anyhow!("Failed to open database: {}", e));
        }
    };
    tracing::info!(path = %db_path.display(), "Database opened");

    let prefs = match PreferenceManager::load(&config, &db).await {
        Ok(prefs) => prefs,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load stored preferences, using config defaults");
            PreferenceManager::from_config(&config)
        }
    };

    if args.export_summary {
        let loaded = db.load_board().await.context("Failed to load tasks")?;
        let board = Board::from_parts(loaded.categories, loaded.tasks, StdRng::from_entropy());
        let summary = build_summary(
            board.tasks().as_slice(),
            board.categories().as_slice(),
            &Local::now(),
        );
        print!("{}", render_text(&summary, prefs.date_format()));
        return Ok(());
    }

    let mut keybindings = KeybindingRegistry::new();
    for warning in keybindings.apply_overrides(&prefs.keybinding_overrides()) {
        tracing::warn!(%warning, "Ignoring keybinding override");
    }

    let mut app = App::new(db, prefs, keybindings);

    // Channel for background load results
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    ui::run(&mut app, event_tx, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
