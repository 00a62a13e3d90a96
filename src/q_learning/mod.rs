//! Tabular Q-learning
//!
//! The agent keeps a lazily grown table of action values and learns in two
//! ways:
//!
//! - **Monte Carlo backup** ([`QLearningAgent::finish_episode`]): after a
//!   self-play game the final reward is propagated backwards through the
//!   agent's own moves, discounted by γ per step.
//! - **Temporal difference** ([`QLearningAgent::update`] with a real
//!   successor): one Bellman update per environment step, used for
//!   single-agent environments such as the maze.
//!
//! ## Update rule
//!
//! | Term | Value |
//! |------|-------|
//! | target | r + γ max_a' Q(s', a'), or r when terminal |
//! | new Q | Q + α (target - Q) |
//!
//! ## Usage Example
//!
//! ```
//! use qttt::q_learning::{Hyperparameters, QLearningAgent};
//! use qttt::tictactoe::TicTacToe;
//!
//! let mut game = TicTacToe::standard();
//! let mut agent = QLearningAgent::new(Hyperparameters::default()).with_seed(42);
//!
//! let state = game.reset();
//! let action = agent.select_action(&state, &game.legal_actions(), true)?;
//! agent.record_move(state, action);
//! game.step(action)?;
//! # Ok::<(), qttt::Error>(())
//! ```

pub mod agent;
pub mod merge;
pub mod q_table;
pub mod serialization;

pub use agent::{AgentStats, Hyperparameters, QLearningAgent};
pub use merge::{MergeOutcome, MergeReport, merge_tables};
pub use q_table::{ActionValues, QTable};
pub use serialization::{SavedAgent, TrainingMetadata, load_agent_or_fresh};
