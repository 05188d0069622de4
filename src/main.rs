use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::mpsc;

use spinpick::app::{App, AppEvent};
use spinpick::config::Config;
use spinpick::storage::{Database, DatabaseError};
use spinpick::ui;

/// Get the config directory path (~/.config/spinpick/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let config_dir = PathBuf::from(home).join(".config").join("spinpick");
    Ok(config_dir)
}

#[derive(Parser, Debug)]
#[command(
    name = "spinpick",
    about = "Terminal random picker with game/movie/TV catalog search"
)]
struct Args {
    /// Reset database (delete and recreate; lists and history are lost)
    #[arg(long)]
    reset_db: bool,

    /// Skip catalog search entirely; the search box only adds custom items
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    // Set up config directory
    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
        println!("Created config directory: {}", config_dir.display());
    }

    // Set directory permissions on Unix (user-only access)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(&config_dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(&config_dir, perms) {
                    tracing::warn!(
                        path = %config_dir.display(),
                        error = %e,
                        "Failed to set config directory permissions to 0700"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %config_dir.display(),
                    error = %e,
                    "Failed to read config directory metadata"
                );
            }
        }
    }

    let config = Config::load(&config_dir.join("config.toml"))
        .context("Failed to load configuration")?;

    let db_path = config_dir.join("picker.db");

    // Handle --reset-db flag
    if args.reset_db && db_path.exists() {
        std::fs::remove_file(&db_path).context("Failed to delete database")?;
        println!("Database reset.");
    }

    // Open database
    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = match Database::open(db_path_str).await {
        Ok(db) => db,
        Err(DatabaseError::InstanceLocked) => {
            eprintln!(
                "Error: Another instance of spinpick appears to be running. Please close it and try again."
            );
            std::process::exit(1);
        }
        Err(e) => {
            return Err(anyhow::anyhow!("Failed to open database: {}", e));
        }
    };

    // Create app state
    let mut app = App::new(db, &config).context("Failed to create application")?;
    app.offline = args.offline;

    if !args.offline && !app.catalog.has_any_credentials() {
        eprintln!(
            "Note: no catalog credentials configured; search will only add custom items."
        );
        eprintln!(
            "Set TMDB_API_TOKEN and/or IGDB_CLIENT_ID + IGDB_ACCESS_TOKEN, or add them to {}",
            config_dir.join("config.toml").display()
        );
    }

    // Load persisted lists and history before the first render
    app.reload_lists().await.context("Failed to load lists")?;
    app.reload_history()
        .await
        .context("Failed to load history")?;

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    // Run the TUI
    ui::run(&mut app, event_tx, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
