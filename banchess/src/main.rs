//! Command-line front end for Ban Chess record files.
//!
//! Every invocation loads a record, replays it through the rule engine,
//! optionally applies one action and writes the updated record back. No
//! state lives anywhere but the file, so two players can take turns on a
//! shared file; an update is refused if the file changed after it was read.
//!
//! Environment variables are described in [`config`].

use std::path::PathBuf;

use anyhow::Context;
use ban_chess::GameRecordService;
use chess::Side;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod store;

#[derive(Parser)]
#[command(name = "banchess", about = "Play Ban Chess through PGN record files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new record file.
    New {
        file: PathBuf,
        /// Start from this position instead of the standard one.
        #[arg(long)]
        fen: Option<String>,
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
    /// Print the current position and status.
    Show {
        file: PathBuf,
        /// Print the full game snapshot as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List the moves the banning side may forbid.
    Bans { file: PathBuf },
    /// Forbid one of the opponent's moves, e.g. `e7e5`.
    Ban { file: PathBuf, ban: String },
    /// Play a move in coordinates, e.g. `e2e4` or `e7e8q`.
    Move {
        file: PathBuf,
        #[arg(value_name = "MOVE")]
        mv: String,
    },
    /// Resign on behalf of `side`.
    Resign {
        file: PathBuf,
        #[arg(value_parser = parse_side)]
        side: Side,
    },
    /// End the game as a draw by agreement.
    Draw { file: PathBuf },
}

fn parse_side(s: &str) -> Result<Side, String> {
    Side::parse(s).ok_or_else(|| format!("expected white or black, got {:?}", s))
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(config::get_log_filter()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let rules = config::load_rules().context("failed to load rule configuration")?;
    tracing::debug!(?rules, "Rules loaded");
    let service = GameRecordService::new(rules);

    let output = match cli.command {
        Commands::New { file, fen, force } => {
            commands::new_game(&service, &file, fen.as_deref(), force)?
        }
        Commands::Show { file, json } => commands::show(&service, &file, json)?,
        Commands::Bans { file } => commands::list_bans(&service, &file)?,
        Commands::Ban { file, ban } => commands::ban(&service, &file, &ban)?,
        Commands::Move { file, mv } => commands::play(&service, &file, &mv)?,
        Commands::Resign { file, side } => commands::resign(&service, &file, side)?,
        Commands::Draw { file } => commands::draw(&service, &file)?,
    };

    println!("{}", output);
    Ok(())
}
