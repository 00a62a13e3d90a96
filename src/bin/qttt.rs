//! qttt CLI - Tabular Q-learning for Tic-Tac-Toe and mazes
//!
//! This CLI provides a unified interface for:
//! - Training X and O agents by self-play
//! - Evaluating saved agents against each other
//! - Merging and inspecting saved agents
//! - Teaching an agent to walk a maze

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "qttt")]
#[command(version, about = "Tabular Q-learning self-play toolkit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train X and O agents by self-play
    Train(Box<qttt::cli::commands::train::TrainArgs>),

    /// Evaluate two saved agents with greedy play
    Evaluate(qttt::cli::commands::evaluate::EvaluateArgs),

    /// Merge two saved agents into one
    Merge(qttt::cli::commands::merge::MergeArgs),

    /// Show statistics and learned values of a saved agent
    Inspect(qttt::cli::commands::inspect::InspectArgs),

    /// Train an agent on a maze and print its path
    Maze(qttt::cli::commands::maze::MazeArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => qttt::cli::commands::train::execute(*args),
        Commands::Evaluate(args) => qttt::cli::commands::evaluate::execute(args),
        Commands::Merge(args) => qttt::cli::commands::merge::execute(args),
        Commands::Inspect(args) => qttt::cli::commands::inspect::execute(args),
        Commands::Maze(args) => qttt::cli::commands::maze::execute(args),
    }
}
