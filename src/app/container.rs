//! Dependency injection container for the application.
//!
//! The container owns infrastructure dependencies and provides factory
//! methods for creating agents and trainers.

use std::{path::Path, sync::Arc};

use super::config::{AgentConfig, TrainerConfig};
use crate::{
    Result,
    adapters::MsgPackRepository,
    pipeline::{Checkpointer, SelfPlayTrainer},
    ports::ModelRepository,
    q_learning::{self, QLearningAgent, SavedAgent, TrainingMetadata},
    tictactoe::TicTacToe,
};

/// Application with dependency injection.
///
/// # Examples
///
/// ## Production usage
///
/// ```
/// use qttt::app::{AgentConfig, App};
///
/// let app = App::new();
/// let agent = app.create_agent(AgentConfig::new().with_seed(42))?;
/// # Ok::<(), qttt::Error>(())
/// ```
///
/// ## Testing with dependency injection
///
/// ```
/// use qttt::adapters::InMemoryRepository;
/// use qttt::app::App;
///
/// let app = App::for_testing()
///     .with_repository(InMemoryRepository::new())
///     .with_default_seed(42)
///     .build();
/// ```
pub struct App {
    model_repository: Arc<dyn ModelRepository + Send + Sync>,
    /// Default random seed (None = non-deterministic)
    default_seed: Option<u64>,
}

impl App {
    /// Create a new app backed by `MsgPackRepository`, without a default seed.
    pub fn new() -> Self {
        Self {
            model_repository: Arc::new(MsgPackRepository::new()),
            default_seed: None,
        }
    }

    /// Create a builder for constructing app with custom dependencies.
    pub fn for_testing() -> AppBuilder {
        AppBuilder::new()
    }

    pub fn model_repository(&self) -> Arc<dyn ModelRepository + Send + Sync> {
        Arc::clone(&self.model_repository)
    }

    pub fn default_seed(&self) -> Option<u64> {
        self.default_seed
    }

    /// Create a fresh agent, seeded from the config or the app default.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfiguration`] for out-of-range
    /// hyperparameters.
    pub fn create_agent(&self, config: AgentConfig) -> Result<QLearningAgent> {
        config.validate()?;
        let agent = QLearningAgent::new(config.hyperparameters);
        Ok(match config.seed.or(self.default_seed) {
            Some(seed) => agent.with_seed(seed),
            None => agent,
        })
    }

    /// Load an agent from the repository.
    pub fn load_agent(&self, path: &Path) -> Result<QLearningAgent> {
        let agent = self.model_repository.load(path)?.into_agent()?;
        Ok(self.reseed(agent))
    }

    /// Load an agent, or create one from `config` when nothing is stored.
    ///
    /// A loaded agent is reseeded from the config, falling back to the app default.
    pub fn load_agent_or_fresh(&self, path: &Path, config: AgentConfig) -> Result<QLearningAgent> {
        let seed = config.seed.or(self.default_seed);
        let fresh = self.create_agent(config)?;
        let mut agent =
            q_learning::load_agent_or_fresh(self.model_repository.as_ref(), path, || fresh)?;
        if let Some(seed) = seed {
            agent.set_rng_seed(seed);
        }
        Ok(agent)
    }

    fn reseed(&self, mut agent: QLearningAgent) -> QLearningAgent {
        if let Some(seed) = self.default_seed {
            agent.set_rng_seed(seed);
        }
        agent
    }

    /// Settings for one side of self-play; O's seed is one past X's, whether
    /// it comes from the training config or the app default.
    pub fn agent_config(&self, config: &TrainerConfig, offset: u64) -> AgentConfig {
        let agent_config = config.agent_config(offset);
        match (agent_config.seed, self.default_seed) {
            (None, Some(seed)) => agent_config.with_seed(seed.wrapping_add(offset)),
            _ => agent_config,
        }
    }

    pub fn save_agent(
        &self,
        agent: &QLearningAgent,
        metadata: TrainingMetadata,
        path: &Path,
    ) -> Result<()> {
        self.model_repository
            .save(&SavedAgent::from_agent(agent, metadata.stamped()), path)?;
        log::info!("Saved agent to {}", path.display());
        Ok(())
    }

    /// Two fresh agents on a new board, checkpointing into the model directory.
    ///
    /// Agent X is seeded with the configured (or default) seed and agent O
    /// with the next one.
    pub fn self_play_trainer(&self, config: &TrainerConfig) -> Result<SelfPlayTrainer> {
        config.validate()?;
        let agent_x = self.create_agent(self.agent_config(config, 0))?;
        let agent_o = self.create_agent(self.agent_config(config, 1))?;
        self.self_play_trainer_with(config, agent_x, agent_o)
    }

    /// Trainer around existing agents, e.g. ones resumed from saved models.
    pub fn self_play_trainer_with(
        &self,
        config: &TrainerConfig,
        agent_x: QLearningAgent,
        agent_o: QLearningAgent,
    ) -> Result<SelfPlayTrainer> {
        let env = TicTacToe::new(config.board_size)?;
        let checkpointer = Checkpointer::new(
            self.model_repository(),
            config.model_dir.clone(),
            config.board_size,
        )
        .with_seed(config.seed.or(self.default_seed));
        Ok(SelfPlayTrainer::new(env, agent_x, agent_o).with_checkpointer(checkpointer))
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing app with custom dependencies.
///
/// Primarily used for testing to inject in-memory repositories and control
/// randomness.
pub struct AppBuilder {
    model_repository: Option<Arc<dyn ModelRepository + Send + Sync>>,
    default_seed: Option<u64>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            model_repository: None,
            default_seed: None,
        }
    }

    /// Set a custom model repository.
    pub fn with_repository<R: ModelRepository + Send + Sync + 'static>(mut self, repo: R) -> Self {
        self.model_repository = Some(Arc::new(repo));
        self
    }

    /// Set a default random seed for all agents created by this container.
    pub fn with_default_seed(mut self, seed: u64) -> Self {
        self.default_seed = Some(seed);
        self
    }

    /// Build the app; without a repository, `MsgPackRepository` is used.
    pub fn build(self) -> App {
        App {
            model_repository: self
                .model_repository
                .unwrap_or_else(|| Arc::new(MsgPackRepository::new())),
            default_seed: self.default_seed,
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
