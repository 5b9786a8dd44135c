use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use snapdeck_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "snapdeck")]
#[command(author, version, about = "A scroll-snapping slide deck for the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Present a deck (the built-in demo when no file is given)
    Run {
        /// Deck file in TOML
        deck: Option<PathBuf>,
    },
    /// Feed a recorded input trace through the engine and print what it did
    Replay {
        /// Trace file in JSON
        trace: PathBuf,
        /// Wait between events as they were recorded
        #[arg(long)]
        realtime: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        write: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Arc::new(AppConfig::load()?);

    let interactive = matches!(cli.command, Some(Commands::Run { .. }) | None);
    init_logging(&config, interactive)?;

    match cli.command {
        Some(Commands::Run { deck }) => commands::run::run(config, deck).await,
        None => commands::run::run(config, None).await,
        Some(Commands::Replay {
            trace,
            realtime,
            json,
        }) => commands::replay::run(&config, &trace, realtime, json).await,
        Some(Commands::Config { write }) => commands::config::run(&config, write),
    }
}

/// The deck owns the terminal, so it logs to a file; everything else logs to stderr
fn init_logging(config: &AppConfig, interactive: bool) -> Result<()> {
    let filter = EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
    );
    let registry = tracing_subscriber::registry().with(filter);

    if interactive {
        let path = config.log_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    Ok(())
}
