//! Serialization support for Q-learning agents.

use std::{hash::Hash, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ports::ModelRepository,
    q_learning::agent::{AgentState, QLearningAgent},
    tictactoe::Player,
};

/// Provenance recorded alongside a saved agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetadata {
    /// Which mark the agent learned to play
    pub role: Option<Player>,
    /// Board side the agent was trained on
    pub board_size: Option<usize>,
    /// Total self-play episodes behind this snapshot
    pub episodes_trained: Option<usize>,
    /// Random seed used (if any)
    pub seed: Option<u64>,
    /// Seconds since the Unix epoch when saved
    pub saved_at: Option<u64>,
}

impl TrainingMetadata {
    pub fn for_role(role: Player, board_size: usize) -> Self {
        Self {
            role: Some(role),
            board_size: Some(board_size),
            ..Self::default()
        }
    }

    pub fn with_episodes(mut self, episodes: usize) -> Self {
        self.episodes_trained = Some(episodes);
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Stamp with the current wall-clock time
    pub fn stamped(mut self) -> Self {
        self.saved_at = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .ok()
            .map(|elapsed| elapsed.as_secs());
        self
    }
}

/// Versioned snapshot of a Q-learning agent.
///
/// Holds the Q-table, hyperparameters (including the initial ε), the current
/// ε and the outcome statistics, so a loaded agent resumes exactly where the
/// saved one stopped. The in-progress trajectory is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "S: Serialize + Eq + Hash",
    deserialize = "S: Deserialize<'de> + Eq + Hash"
))]
pub struct SavedAgent<S> {
    pub version: u32,
    state: AgentState<S>,
    pub metadata: TrainingMetadata,
}

impl<S: Clone + Eq + Hash> SavedAgent<S> {
    /// Current save format version
    pub const VERSION: u32 = 1;

    pub fn from_agent(agent: &QLearningAgent<S>, metadata: TrainingMetadata) -> Self {
        Self {
            version: Self::VERSION,
            state: agent.export_state(),
            metadata,
        }
    }

    /// Rebuild the agent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedVersion`] for snapshots written by another
    /// format version.
    pub fn to_agent(&self) -> Result<QLearningAgent<S>> {
        self.check_version()?;
        Ok(QLearningAgent::from_state(self.state.clone()))
    }

    /// Consume the snapshot without cloning the table
    pub fn into_agent(self) -> Result<QLearningAgent<S>> {
        self.check_version()?;
        Ok(QLearningAgent::from_state(self.state))
    }

    fn check_version(&self) -> Result<()> {
        if self.version != Self::VERSION {
            return Err(Error::UnsupportedVersion {
                found: self.version,
                expected: Self::VERSION,
            });
        }
        Ok(())
    }

    pub fn entry_count(&self) -> usize {
        self.state.q_table.entry_count()
    }
}

/// Load a saved agent, falling back to a fresh one when nothing is stored.
///
/// Only a missing model is recovered; corrupt or incompatible files are
/// still errors.
pub fn load_agent_or_fresh<R>(
    repository: &R,
    path: &Path,
    fresh: impl FnOnce() -> QLearningAgent,
) -> Result<QLearningAgent>
where
    R: ModelRepository + ?Sized,
{
    match repository.load(path) {
        Ok(saved) => {
            let agent = saved.into_agent()?;
            log::info!(
                "Loaded agent from {} ({} known states)",
                path.display(),
                agent.known_states()
            );
            Ok(agent)
        }
        Err(Error::ModelNotFound { path }) => {
            log::warn!(
                "No saved model at {}, starting a fresh agent",
                path.display()
            );
            Ok(fresh())
        }
        Err(e) => Err(e),
    }
}
