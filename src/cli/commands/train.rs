//! Train command - Self-play training of two Q-learning agents

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    app::{App, TrainerConfig},
    cli::{
        config::{HyperparameterArgs, load_trainer_config},
        output::{print_evaluation, print_kv, print_section, print_training_report},
    },
    pipeline::{LoggingObserver, ProgressObserver, TrainingReport},
};

#[derive(Parser, Debug, Default)]
#[command(about = "Train X and O agents by self-play")]
pub struct TrainArgs {
    /// JSON trainer configuration; flags override its values
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Number of self-play episodes
    #[arg(long, short = 'n')]
    pub episodes: Option<usize>,

    /// Board side (3 to 9)
    #[arg(long, short = 's')]
    pub board_size: Option<usize>,

    /// Episodes per statistics window (0 disables)
    #[arg(long)]
    pub stats_interval: Option<usize>,

    /// Episodes between checkpoints (0 disables)
    #[arg(long)]
    pub checkpoint_interval: Option<usize>,

    /// Greedy games played after training (0 skips evaluation)
    #[arg(long)]
    pub eval_games: Option<usize>,

    /// Directory for checkpoints and final models
    #[arg(long)]
    pub model_dir: Option<PathBuf>,

    /// Directory for the statistics JSON
    #[arg(long)]
    pub stats_dir: Option<PathBuf>,

    /// Random seed for reproducibility (O uses seed + 1)
    #[arg(long)]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub hyperparameters: HyperparameterArgs,

    /// Continue training agent X from a saved model
    #[arg(long)]
    pub resume_x: Option<PathBuf>,

    /// Continue training agent O from a saved model
    #[arg(long)]
    pub resume_o: Option<PathBuf>,

    /// Also export the windowed history as CSV
    #[arg(long)]
    pub history_csv: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl TrainArgs {
    /// Configuration file (or defaults) with command-line overrides applied
    pub fn resolve_config(&self) -> Result<TrainerConfig> {
        let mut config = load_trainer_config(self.config.as_deref())?;
        if let Some(episodes) = self.episodes {
            config.episodes = episodes;
        }
        if let Some(size) = self.board_size {
            config.board_size = size;
        }
        if let Some(interval) = self.stats_interval {
            config.stats_interval = interval;
        }
        if let Some(interval) = self.checkpoint_interval {
            config.checkpoint_interval = interval;
        }
        if let Some(games) = self.eval_games {
            config.evaluation_games = games;
        }
        if let Some(dir) = &self.model_dir {
            config.model_dir = dir.clone();
        }
        if let Some(dir) = &self.stats_dir {
            config.stats_dir = dir.clone();
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.hyperparameters = self.hyperparameters.apply(config.hyperparameters);
        config.validate().context("Invalid training configuration")?;
        Ok(config)
    }
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let (report, stats_path) = run(&App::new(), &args)?;
    print_training_report(&report);
    if let Some(evaluation) = &report.evaluation {
        print_evaluation(evaluation);
    }
    println!();
    print_kv("Statistics", &stats_path.display().to_string());
    Ok(())
}

/// Train, evaluate and write the statistics; returns the report and its path
pub fn run(app: &App, args: &TrainArgs) -> Result<(TrainingReport, PathBuf)> {
    let config = args.resolve_config()?;

    let mut trainer = if args.resume_x.is_some() || args.resume_o.is_some() {
        let agent_x = match &args.resume_x {
            Some(path) => app.load_agent_or_fresh(path, app.agent_config(&config, 0))?,
            None => app.create_agent(app.agent_config(&config, 0))?,
        };
        let agent_o = match &args.resume_o {
            Some(path) => app.load_agent_or_fresh(path, app.agent_config(&config, 1))?,
            None => app.create_agent(app.agent_config(&config, 1))?,
        };
        app.self_play_trainer_with(&config, agent_x, agent_o)?
    } else {
        app.self_play_trainer(&config)?
    };

    trainer = trainer.with_observer(Box::new(LoggingObserver::new()));
    if !args.no_progress {
        trainer = trainer.with_observer(Box::new(ProgressObserver::new()));
    }

    print_section(&format!(
        "Self-play training: {} episodes on a {1}x{1} board",
        config.episodes, config.board_size
    ));
    print_kv(
        "Epsilon X / O",
        &format!(
            "{:.4} / {:.4}",
            trainer.agent_x().epsilon(),
            trainer.agent_o().epsilon()
        ),
    );
    print_kv("Models", &config.model_dir.display().to_string());

    let mut report = trainer
        .train(&config.schedule())
        .context("Self-play training failed")?;

    if config.evaluation_games > 0 {
        report.evaluation = Some(trainer.evaluate(config.evaluation_games)?);
    }

    let stats_path = config
        .stats_dir
        .join(format!("training_{}_episodes.json", config.episodes));
    report
        .save(&stats_path)
        .with_context(|| format!("Failed to write statistics to {}", stats_path.display()))?;

    if let Some(csv_path) = &args.history_csv {
        report
            .export_history_csv(csv_path)
            .with_context(|| format!("Failed to write history to {}", csv_path.display()))?;
    }

    Ok((report, stats_path))
}
