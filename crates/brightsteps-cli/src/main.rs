//! brightsteps CLI — screening, goal progress, and rewards from the command line.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod store;

#[derive(Parser)]
#[command(
    name = "brightsteps",
    version,
    about = "Developmental screening and progress tracking"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score an M-CHAT-R answer set
    Screen {
        /// JSON object mapping question number to true (yes) / false (no)
        #[arg(long)]
        answers: PathBuf,

        /// Instrument TOML (default: built-in M-CHAT-R table)
        #[arg(long)]
        instrument: Option<PathBuf>,

        /// Child identifier stored with the record
        #[arg(long, default_value = "child")]
        child: String,

        /// Directory to append the screening record to
        #[arg(long)]
        save: Option<PathBuf>,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show progress of goals in their current window
    Progress {
        /// JSON array of goals
        #[arg(long)]
        goals: PathBuf,

        /// JSON array of log events
        #[arg(long)]
        events: PathBuf,

        /// Evaluation time as RFC 3339 (default: now)
        #[arg(long)]
        now: Option<String>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show the next milestone and unlock earned badges
    Rewards {
        /// JSON array of log events
        #[arg(long)]
        events: PathBuf,

        /// JSON array of goals
        #[arg(long)]
        goals: Option<PathBuf>,

        /// Reward catalog TOML (default: standard catalog)
        #[arg(long)]
        rewards: Option<PathBuf>,

        /// Badge ledger JSON, updated in place
        #[arg(long)]
        ledger: Option<PathBuf>,

        /// Screening history directory, counted for screening badges
        #[arg(long)]
        history: Option<PathBuf>,

        /// Child whose screenings count toward badges
        #[arg(long, default_value = "child")]
        child: String,

        /// Evaluation time as RFC 3339 (default: now)
        #[arg(long)]
        now: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate instrument and reward catalog TOML files
    Validate {
        /// Instrument file or directory
        #[arg(long)]
        instrument: Option<PathBuf>,

        /// Reward catalog file
        #[arg(long)]
        rewards: Option<PathBuf>,
    },

    /// Create starter config, instrument, and reward catalog
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("brightsteps=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Screen {
            answers,
            instrument,
            child,
            save,
            format,
            config,
        } => commands::screen::execute(answers, instrument, child, save, format, config).await,
        Commands::Progress {
            goals,
            events,
            now,
            format,
            config,
        } => commands::progress::execute(goals, events, now, format, config),
        Commands::Rewards {
            events,
            goals,
            rewards,
            ledger,
            history,
            child,
            now,
            config,
        } => commands::rewards::execute(
            events, goals, rewards, ledger, history, child, now, config,
        ),
        Commands::Validate {
            instrument,
            rewards,
        } => commands::validate::execute(instrument, rewards),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
