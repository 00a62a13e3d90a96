//! Evaluate command - Greedy play between two saved agents

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use crate::{
    app::App,
    cli::output::{print_evaluation, print_kv, print_section},
    pipeline::{EvaluationResult, SelfPlayTrainer},
    tictactoe::{DEFAULT_BOARD_SIZE, TicTacToe},
};

#[derive(Parser, Debug)]
#[command(about = "Evaluate two trained agents against each other")]
pub struct EvaluateArgs {
    /// Saved model playing X
    pub agent_x: PathBuf,

    /// Saved model playing O
    pub agent_o: PathBuf,

    /// Number of evaluation games
    #[arg(long, short = 'g', default_value_t = 100)]
    pub games: usize,

    /// Seed for tie-breaking between equally valued moves
    #[arg(long)]
    pub seed: Option<u64>,

    /// Export results to a JSON file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    let result = run(&App::new(), &args)?;
    print_evaluation(&result);

    if let Some(path) = &args.export {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(file, &result)?;
        println!();
        print_kv("Exported", &path.display().to_string());
    }
    Ok(())
}

pub fn run(app: &App, args: &EvaluateArgs) -> Result<EvaluationResult> {
    let repository = app.model_repository();
    let saved_x = repository
        .load(&args.agent_x)
        .with_context(|| format!("Failed to load {}", args.agent_x.display()))?;
    let saved_o = repository
        .load(&args.agent_o)
        .with_context(|| format!("Failed to load {}", args.agent_o.display()))?;

    let size_x = saved_x.metadata.board_size.unwrap_or(DEFAULT_BOARD_SIZE);
    let size_o = saved_o.metadata.board_size.unwrap_or(DEFAULT_BOARD_SIZE);
    if size_x != size_o {
        bail!("Agents were trained on different boards ({size_x}x{size_x} vs {size_o}x{size_o})");
    }

    let mut agent_x = saved_x.into_agent()?;
    let mut agent_o = saved_o.into_agent()?;
    if let Some(seed) = args.seed {
        agent_x.set_rng_seed(seed);
        agent_o.set_rng_seed(seed.wrapping_add(1));
    }

    print_section("Evaluation");
    print_kv("Agent X", &args.agent_x.display().to_string());
    print_kv("Agent O", &args.agent_o.display().to_string());
    print_kv("Board", &format!("{size_x}x{size_x}"));

    let mut trainer = SelfPlayTrainer::new(TicTacToe::new(size_x)?, agent_x, agent_o);
    Ok(trainer.evaluate(args.games)?)
}
