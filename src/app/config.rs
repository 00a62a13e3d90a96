//! Configuration types for agent and trainer creation.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    pipeline::TrainingSchedule,
    q_learning::Hyperparameters,
    tictactoe::{DEFAULT_BOARD_SIZE, MAX_BOARD_SIZE, MIN_BOARD_SIZE},
};

/// Configuration for creating a Q-learning agent.
///
/// # Examples
///
/// ```
/// use qttt::app::AgentConfig;
///
/// let config = AgentConfig::new()
///     .with_learning_rate(0.3)
///     .with_discount_factor(0.95)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentConfig {
    pub hyperparameters: Hyperparameters,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl AgentConfig {
    /// Default hyperparameters, no seed
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hyperparameters(mut self, hyperparameters: Hyperparameters) -> Self {
        self.hyperparameters = hyperparameters;
        self
    }

    pub fn with_learning_rate(mut self, alpha: f64) -> Self {
        self.hyperparameters.learning_rate = alpha;
        self
    }

    pub fn with_discount_factor(mut self, gamma: f64) -> Self {
        self.hyperparameters.discount_factor = gamma;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.hyperparameters.epsilon = epsilon;
        self
    }

    pub fn with_epsilon_schedule(mut self, min_epsilon: f64, decay: f64) -> Self {
        self.hyperparameters.min_epsilon = min_epsilon;
        self.hyperparameters.epsilon_decay = decay;
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.hyperparameters.validate()
    }
}

/// Settings of a complete self-play run, loadable from JSON.
///
/// Missing fields take their defaults, so a file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub board_size: usize,
    pub episodes: usize,
    pub stats_interval: usize,
    pub checkpoint_interval: usize,
    pub evaluation_games: usize,
    pub model_dir: PathBuf,
    pub stats_dir: PathBuf,
    pub seed: Option<u64>,
    pub hyperparameters: Hyperparameters,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            episodes: 20_000,
            stats_interval: 1_000,
            checkpoint_interval: 5_000,
            evaluation_games: 100,
            model_dir: PathBuf::from("models"),
            stats_dir: PathBuf::from("stats"),
            seed: None,
            hyperparameters: Hyperparameters::default(),
        }
    }
}

impl TrainerConfig {
    /// Load and validate a JSON configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open config {path:?}"),
            source,
        })?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.hyperparameters.validate()?;
        if self.episodes == 0 {
            return Err(Error::InvalidConfiguration {
                message: "episodes must be positive".to_string(),
            });
        }
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&self.board_size) {
            return Err(Error::InvalidBoardSize {
                size: self.board_size,
            });
        }
        Ok(())
    }

    pub fn schedule(&self) -> TrainingSchedule {
        TrainingSchedule::new(self.episodes)
            .with_stats_interval(self.stats_interval)
            .with_checkpoint_interval(self.checkpoint_interval)
    }

    /// Agent settings for one side; O is seeded one past X
    pub fn agent_config(&self, offset: u64) -> AgentConfig {
        let config = AgentConfig::new().with_hyperparameters(self.hyperparameters);
        match self.seed {
            Some(seed) => config.with_seed(seed.wrapping_add(offset)),
            None => config,
        }
    }
}
