//! Merge command - Combine the Q-tables of two saved agents

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use crate::{
    app::App,
    cli::output::{format_number, print_section, print_stats_table},
    q_learning::{MergeReport, QLearningAgent, TrainingMetadata, merge_tables},
};

#[derive(Parser, Debug)]
#[command(about = "Merge two saved agents, keeping the larger value of every pair")]
pub struct MergeArgs {
    /// First model; its hyperparameters are kept
    pub first: PathBuf,

    /// Second model
    pub second: PathBuf,

    /// Where to write the merged model
    #[arg(long, short = 'o')]
    pub output: PathBuf,
}

pub fn execute(args: MergeArgs) -> Result<()> {
    let report = run(&App::new(), &args)?;
    println!("\nMerged agent saved to {}", args.output.display());
    log::info!(
        "Merge added {} states, {} actions and resolved {} conflicts",
        report.new_states,
        report.new_actions,
        report.conflicts_resolved
    );
    Ok(())
}

pub fn run(app: &App, args: &MergeArgs) -> Result<MergeReport> {
    let repository = app.model_repository();
    let first = repository
        .load(&args.first)
        .with_context(|| format!("Failed to load {}", args.first.display()))?;
    let second = repository
        .load(&args.second)
        .with_context(|| format!("Failed to load {}", args.second.display()))?;

    let board_size = match (first.metadata.board_size, second.metadata.board_size) {
        (Some(a), Some(b)) if a != b => {
            bail!("Cannot merge agents trained on {a}x{a} and {b}x{b} boards")
        }
        (a, b) => a.or(b),
    };

    let first = first.into_agent()?;
    let second = second.into_agent()?;
    let outcome = merge_tables(first.q_table(), second.q_table());

    print_section("Merge");
    print_stats_table(&[
        ("States in first", &format_number(first.known_states())),
        ("States in second", &format_number(second.known_states())),
        ("New states", &format_number(outcome.report.new_states)),
        ("New actions", &format_number(outcome.report.new_actions)),
        (
            "Conflicts resolved",
            &format_number(outcome.report.conflicts_resolved),
        ),
        ("Merged states", &format_number(outcome.table.state_count())),
    ]);

    let merged = QLearningAgent::from_table(outcome.table, *first.hyperparameters());
    let metadata = TrainingMetadata {
        board_size,
        ..TrainingMetadata::default()
    };
    app.save_agent(&merged, metadata, &args.output)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;

    Ok(outcome.report)
}
