mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kcal::config::Config;

const DEFAULT_ICS_OUTPUT: &str = "kcal_ics_data";

#[derive(Parser)]
#[command(name = "kcal")]
#[command(about = "Sync a list of all-day events into Google Calendar and export them as .ics")]
struct Cli {
    /// Config file (defaults to ~/.config/kcal/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Calendar to work on, by display name (repeatable; overrides config)
    #[arg(short, long = "calendar", global = true)]
    calendars: Vec<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authorize with Google and store the token
    Auth,
    /// List calendars visible to the account
    Calendars,
    /// Show remote events that repeat the source events
    Duplicates {
        /// Source events file (.toml or .json)
        #[arg(short, long)]
        events: PathBuf,
    },
    /// Delete duplicates of the source events
    Delete {
        /// Source events file (.toml or .json)
        #[arg(short, long)]
        events: PathBuf,

        /// Delete these ids instead of searching for duplicates
        #[arg(long = "event-id")]
        event_ids: Vec<String>,
    },
    /// Insert the source events as all-day events
    Upload {
        /// Source events file (.toml or .json)
        #[arg(short, long)]
        events: PathBuf,
    },
    /// Delete duplicates, then upload
    Sync {
        /// Source events file (.toml or .json)
        #[arg(short, long)]
        events: PathBuf,
    },
    /// Write the source events to an .ics file
    Export {
        /// Source events file (.toml or .json)
        #[arg(short, long)]
        events: PathBuf,

        /// Output path; .ics is appended when missing
        #[arg(short, long, default_value = DEFAULT_ICS_OUTPUT)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = Config::load(cli.config.as_deref())?.with_calendars(cli.calendars);

    match cli.command {
        Commands::Auth => commands::auth::run(&cfg).await,
        Commands::Calendars => commands::calendars::run(&cfg).await,
        Commands::Duplicates { events } => commands::duplicates::run(&cfg, &events).await,
        Commands::Delete { events, event_ids } => {
            commands::delete::run(&cfg, &events, event_ids).await
        }
        Commands::Upload { events } => commands::upload::run(&cfg, &events).await,
        Commands::Sync { events } => commands::sync::run(&cfg, &events).await,
        Commands::Export { events, output } => commands::export::run(&cfg, &events, &output),
    }
}

/// RUST_LOG wins; otherwise warnings only, or debug with `-v`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
