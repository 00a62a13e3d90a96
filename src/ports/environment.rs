//! Environment port - the reset/step contract consumed by learning loops
//!
//! Both the Tic-Tac-Toe rule engine and the maze implement this trait, so
//! the agent and the trainers depend on the contract rather than on a
//! particular game.

use std::hash::Hash;

use crate::Result;

/// Result of applying one action to an environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Step<S> {
    /// State after the action was applied
    pub state: S,
    /// Reward from the perspective of the actor that just moved
    pub reward: f64,
    /// Whether the episode reached a terminal state
    pub done: bool,
}

/// Episodic environment with integer actions.
pub trait Environment {
    /// Hashable value type used as the Q-table key
    type State: Clone + Eq + Hash;

    /// Restore the initial configuration and return its state.
    fn reset(&mut self) -> Self::State;

    /// Current state snapshot.
    fn state(&self) -> Self::State;

    /// Actions that may be passed to [`Environment::step`] right now.
    ///
    /// Empty once the episode is over.
    fn legal_actions(&self) -> Vec<usize>;

    /// Apply an action.
    ///
    /// # Errors
    ///
    /// Returns an invalid-action error when the action cannot be applied;
    /// the environment is left unchanged in that case.
    fn step(&mut self, action: usize) -> Result<Step<Self::State>>;

    /// Whether the current episode has ended.
    fn is_done(&self) -> bool;
}
