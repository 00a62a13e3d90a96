//! Maze command - Step-wise Q-learning on a maze read from a file

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    cli::{
        config::HyperparameterArgs,
        output::{format_number, print_kv, print_section, print_stats_table, print_subsection},
    },
    maze::{Maze, Position},
    pipeline::TdTrainer,
    q_learning::{Hyperparameters, QLearningAgent},
};

#[derive(Parser, Debug)]
#[command(about = "Teach an agent to walk a maze and show the learned path")]
pub struct MazeArgs {
    /// Maze text file: `#` wall, `S` start, `G` goal, anything else floor
    pub maze: PathBuf,

    /// Training episodes
    #[arg(long, short = 'n', default_value_t = 500)]
    pub episodes: usize,

    /// Step cap per episode
    #[arg(long, default_value_t = 1_000)]
    pub max_steps: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub hyperparameters: HyperparameterArgs,
}

/// Result of a maze run
#[derive(Debug, Clone, PartialEq)]
pub struct MazeOutcome {
    /// Greedy path from start, start included
    pub path: Vec<Position>,
    pub reached_goal: bool,
    /// Episodes that reached the goal during training
    pub completed_episodes: usize,
}

pub fn execute(args: MazeArgs) -> Result<()> {
    let text = std::fs::read_to_string(&args.maze)
        .with_context(|| format!("Failed to read maze {}", args.maze.display()))?;
    let maze = Maze::parse(&text).context("Invalid maze")?;

    print_section(&format!("Maze {}x{}", maze.rows(), maze.cols()));
    println!("{maze}");

    let rendered = maze.clone();
    let outcome = run(maze, &args)?;

    print_subsection("Training");
    print_stats_table(&[
        ("Episodes", &format_number(args.episodes)),
        ("Reached goal", &format_number(outcome.completed_episodes)),
    ]);

    print_subsection("Greedy path");
    println!("{}", rendered.render_path(&outcome.path));
    println!();
    if outcome.reached_goal {
        print_kv("Steps", &(outcome.path.len() - 1).to_string());
    } else {
        print_kv("Steps", "goal not reached; train longer");
    }
    Ok(())
}

pub fn run(maze: Maze, args: &MazeArgs) -> Result<MazeOutcome> {
    let hyperparameters = args.hyperparameters.apply(Hyperparameters::default());
    hyperparameters.validate()?;

    let goal = maze.goal();
    let mut agent = QLearningAgent::new(hyperparameters);
    if let Some(seed) = args.seed {
        agent.set_rng_seed(seed);
    }

    let mut trainer = TdTrainer::new(maze, agent).with_max_steps(args.max_steps);
    let history = trainer.train(args.episodes)?;
    let completed_episodes = history.iter().filter(|e| e.completed).count();

    let path = trainer.greedy_path(args.max_steps)?;
    let reached_goal = path.last() == Some(&goal);
    Ok(MazeOutcome {
        path,
        reached_goal,
        completed_episodes,
    })
}
