//! Q-learning agent
//!
//! The agent owns its Q-table, an explicit random source and the trajectory
//! of the episode in progress. Learning happens either at the end of an
//! episode by propagating the final reward backwards through the trajectory
//! ([`QLearningAgent::finish_episode`]) or step by step through
//! [`QLearningAgent::update`] with a real successor state.

use std::hash::Hash;

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    q_learning::q_table::QTable,
    tictactoe::State,
};

/// Learning hyperparameters.
///
/// `epsilon` is the initial exploration rate; the agent tracks the decayed
/// value separately.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hyperparameters {
    /// α in [0, 1]
    pub learning_rate: f64,
    /// γ in [0, 1]
    pub discount_factor: f64,
    /// Initial ε in [0, 1]
    pub epsilon: f64,
    /// Floor for ε
    pub min_epsilon: f64,
    /// Multiplicative ε decay per episode, in (0, 1]
    pub epsilon_decay: f64,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            learning_rate: 0.5,
            discount_factor: 0.9,
            epsilon: 1.0,
            min_epsilon: 0.01,
            epsilon_decay: 0.9995,
        }
    }
}

impl Hyperparameters {
    /// Check every parameter against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] naming the first offending value.
    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, value: f64| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(Error::InvalidConfiguration {
                    message: format!("{name} must be within [0, 1], got {value}"),
                })
            }
        };
        unit("learning_rate", self.learning_rate)?;
        unit("discount_factor", self.discount_factor)?;
        unit("epsilon", self.epsilon)?;
        unit("min_epsilon", self.min_epsilon)?;
        if !(self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0) {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "epsilon_decay must be within (0, 1], got {}",
                    self.epsilon_decay
                ),
            });
        }
        Ok(())
    }
}

/// Episode outcome counters, updated once per finished episode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStats {
    pub episodes: usize,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
}

impl AgentStats {
    /// Count one episode by the sign of its final reward
    pub fn record(&mut self, final_reward: f64) {
        self.episodes += 1;
        if final_reward > 0.0 {
            self.wins += 1;
        } else if final_reward < 0.0 {
            self.losses += 1;
        } else {
            self.draws += 1;
        }
    }

    fn rate(&self, count: usize) -> f64 {
        let games = self.wins + self.losses + self.draws;
        if games == 0 {
            0.0
        } else {
            count as f64 / games as f64
        }
    }

    pub fn win_rate(&self) -> f64 {
        self.rate(self.wins)
    }

    pub fn draw_rate(&self) -> f64 {
        self.rate(self.draws)
    }

    pub fn loss_rate(&self) -> f64 {
        self.rate(self.losses)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "S: Serialize + Eq + Hash",
    deserialize = "S: Deserialize<'de> + Eq + Hash"
))]
pub(crate) struct AgentState<S> {
    pub q_table: QTable<S>,
    pub hyperparameters: Hyperparameters,
    pub epsilon: f64,
    pub stats: AgentStats,
    pub rng_seed: Option<u64>,
}

/// Seed for an agent restored after `episodes` episodes, so a resumed run
/// does not replay the draws of the run that produced the snapshot.
fn resumed_seed(seed: u64, episodes: usize) -> u64 {
    seed ^ (episodes as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Tabular Q-learning agent with ε-greedy exploration.
#[derive(Debug, Clone)]
pub struct QLearningAgent<S = State> {
    q_table: QTable<S>,
    hyperparameters: Hyperparameters,
    epsilon: f64,
    stats: AgentStats,
    trajectory: Vec<(S, usize)>,
    rng: StdRng,
    rng_seed: Option<u64>,
}

impl<S: Clone + Eq + Hash> QLearningAgent<S> {
    /// Create an agent with an empty table and an entropy-seeded RNG
    pub fn new(hyperparameters: Hyperparameters) -> Self {
        Self {
            q_table: QTable::new(),
            hyperparameters,
            epsilon: hyperparameters.epsilon,
            stats: AgentStats::default(),
            trajectory: Vec::new(),
            rng: build_rng(None),
            rng_seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.set_rng_seed(seed);
        self
    }

    /// Reseed exploration and tie-break draws
    ///
    /// The stream also depends on the episodes already played, so a trained
    /// agent does not repeat the draws it started with.
    pub fn set_rng_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(resumed_seed(seed, self.stats.episodes));
        self.rng_seed = Some(seed);
    }

    pub fn rng_seed(&self) -> Option<u64> {
        self.rng_seed
    }

    /// Stored Q-value, recording the pair with 0.0 on first access
    pub fn value_of(&mut self, state: &S, action: usize) -> f64 {
        self.q_table.value_of(state, action)
    }

    /// Best value recorded for exactly this state (0.0 if none)
    pub fn best_value(&self, state: &S) -> f64 {
        self.q_table.best_value(state)
    }

    /// Bellman update.
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)], with the future
    /// term dropped when `terminal` is set.
    pub fn update(&mut self, state: &S, action: usize, reward: f64, next_state: &S, terminal: bool) {
        let current_q = self.q_table.value_of(state, action);
        let future = if terminal {
            0.0
        } else {
            self.q_table.best_value(next_state)
        };
        let target = reward + self.hyperparameters.discount_factor * future;
        let new_q = current_q + self.hyperparameters.learning_rate * (target - current_q);
        self.q_table.set(state.clone(), action, new_q);
    }

    /// ε-greedy action selection.
    ///
    /// With `exploring` unset the choice is always greedy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyActionSet`] when `legal_actions` is empty.
    pub fn select_action(
        &mut self,
        state: &S,
        legal_actions: &[usize],
        exploring: bool,
    ) -> Result<usize> {
        if legal_actions.is_empty() {
            return Err(Error::EmptyActionSet);
        }
        if exploring && self.rng.random::<f64>() < self.epsilon {
            return legal_actions
                .choose(&mut self.rng)
                .copied()
                .ok_or(Error::EmptyActionSet);
        }
        self.best_action(state, legal_actions)
    }

    /// Greedy action with uniform tie-breaking.
    ///
    /// Unseen pairs are initialized to 0.0 while being evaluated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyActionSet`] when `legal_actions` is empty.
    pub fn best_action(&mut self, state: &S, legal_actions: &[usize]) -> Result<usize> {
        let values: Vec<(usize, f64)> = legal_actions
            .iter()
            .map(|&action| (action, self.q_table.value_of(state, action)))
            .collect();
        self.pick_best(&values)
    }

    /// Greedy action with uniform tie-breaking that leaves the table untouched.
    ///
    /// Used when measuring a learned policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyActionSet`] when `legal_actions` is empty.
    pub fn greedy_action(&mut self, state: &S, legal_actions: &[usize]) -> Result<usize> {
        let values: Vec<(usize, f64)> = legal_actions
            .iter()
            .map(|&action| (action, self.q_table.value_or_default(state, action)))
            .collect();
        self.pick_best(&values)
    }

    fn pick_best(&mut self, values: &[(usize, f64)]) -> Result<usize> {
        let max_q = values
            .iter()
            .map(|&(_, q)| q)
            .fold(f64::NEG_INFINITY, f64::max);
        let best: Vec<usize> = values
            .iter()
            .filter(|&&(_, q)| q == max_q)
            .map(|&(action, _)| action)
            .collect();
        best.choose(&mut self.rng)
            .copied()
            .ok_or(Error::EmptyActionSet)
    }

    /// Start a new episode with an empty trajectory
    pub fn begin_episode(&mut self) {
        self.trajectory.clear();
    }

    /// Remember a move made during the current episode
    pub fn record_move(&mut self, state: S, action: usize) {
        self.trajectory.push((state, action));
    }

    /// Close the episode: count the outcome, propagate the final reward
    /// backwards through the trajectory and decay ε.
    ///
    /// The most recent move receives `final_reward`; each earlier move gets
    /// the previous credit multiplied by γ. Every backup is terminal, so no
    /// successor value enters the target.
    pub fn finish_episode(&mut self, final_reward: f64) {
        self.stats.record(final_reward);

        let trajectory = std::mem::take(&mut self.trajectory);
        let mut reward = final_reward;
        for (state, action) in trajectory.iter().rev() {
            self.update(state, *action, reward, state, true);
            reward *= self.hyperparameters.discount_factor;
        }

        self.decay_exploration();
    }

    /// ε ← max(ε_min, ε · decay)
    pub fn decay_exploration(&mut self) {
        self.epsilon = (self.epsilon * self.hyperparameters.epsilon_decay)
            .max(self.hyperparameters.min_epsilon);
    }

    /// Forget everything learned and restore the initial ε
    pub fn reset(&mut self) {
        self.q_table.clear();
        self.trajectory.clear();
        self.stats = AgentStats::default();
        self.epsilon = self.hyperparameters.epsilon;
        self.rng = build_rng(self.rng_seed);
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn hyperparameters(&self) -> &Hyperparameters {
        &self.hyperparameters
    }

    pub fn stats(&self) -> &AgentStats {
        &self.stats
    }

    pub fn trajectory(&self) -> &[(S, usize)] {
        &self.trajectory
    }

    pub fn q_table(&self) -> &QTable<S> {
        &self.q_table
    }

    pub fn q_table_mut(&mut self) -> &mut QTable<S> {
        &mut self.q_table
    }

    /// Number of states with at least one recorded action value
    pub fn known_states(&self) -> usize {
        self.q_table.state_count()
    }

    pub(crate) fn export_state(&self) -> AgentState<S> {
        AgentState {
            q_table: self.q_table.clone(),
            hyperparameters: self.hyperparameters,
            epsilon: self.epsilon,
            stats: self.stats,
            rng_seed: self.rng_seed,
        }
    }

    pub(crate) fn from_state(state: AgentState<S>) -> Self {
        Self {
            q_table: state.q_table,
            hyperparameters: state.hyperparameters,
            epsilon: state.epsilon,
            stats: state.stats,
            trajectory: Vec::new(),
            rng: build_rng(
                state
                    .rng_seed
                    .map(|seed| resumed_seed(seed, state.stats.episodes)),
            ),
            rng_seed: state.rng_seed,
        }
    }

    pub(crate) fn from_table(q_table: QTable<S>, hyperparameters: Hyperparameters) -> Self {
        Self {
            q_table,
            ..Self::new(hyperparameters)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn agent(epsilon: f64) -> QLearningAgent {
        QLearningAgent::new(Hyperparameters {
            learning_rate: 0.5,
            discount_factor: 0.9,
            epsilon,
            min_epsilon: 0.01,
            epsilon_decay: 0.9995,
        })
        .with_seed(7)
    }

    fn state(text: &str) -> State {
        State::parse(text).unwrap()
    }

    #[test]
    fn test_value_of_unseen_is_zero_and_recorded() {
        let mut agent = agent(1.0);
        let s = state("X...O....");
        assert_eq!(agent.value_of(&s, 4), 0.0);
        assert_eq!(agent.q_table().get(&s, 4), Some(0.0));
        assert_eq!(agent.value_of(&s, 4), 0.0);
        assert_eq!(agent.q_table().entry_count(), 1);
    }

    #[test]
    fn test_bellman_update() {
        let mut agent = agent(1.0);
        let s = state(".........");
        let next = state("....X....");
        agent.q_table_mut().set(next.clone(), 0, 0.5);
        agent.q_table_mut().set(next.clone(), 1, 0.8);
        agent.q_table_mut().set(next.clone(), 2, 0.3);

        agent.update(&s, 4, 0.0, &next, false);

        // 0 + 0.5 * (0 + 0.9 * 0.8 - 0) = 0.36
        assert!((agent.value_of(&s, 4) - 0.36).abs() < 1e-12);
    }

    #[test]
    fn test_terminal_update_ignores_future() {
        let mut agent = agent(1.0);
        let s = state(".........");
        let next = state("....X....");
        agent.q_table_mut().set(next.clone(), 0, 5.0);

        agent.update(&s, 4, 1.0, &next, true);
        assert!((agent.value_of(&s, 4) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_greedy_selection_is_deterministic() {
        let mut agent = agent(0.0);
        let s = state("XO.......");
        let legal = [2, 3, 4, 5, 6, 7, 8];
        agent.q_table_mut().set(s.clone(), 2, 0.5);
        agent.q_table_mut().set(s.clone(), 3, 0.1);
        agent.q_table_mut().set(s.clone(), 4, 0.9);

        for _ in 0..100 {
            assert_eq!(agent.select_action(&s, &legal, true).unwrap(), 4);
        }
    }

    #[test]
    fn test_not_exploring_ignores_epsilon() {
        let mut agent = agent(1.0);
        let s = state(".........");
        agent.q_table_mut().set(s.clone(), 7, 0.2);
        let legal: Vec<usize> = (0..9).collect();
        for _ in 0..50 {
            assert_eq!(agent.select_action(&s, &legal, false).unwrap(), 7);
        }
    }

    #[test]
    fn test_pure_exploration_covers_all_actions() {
        let mut agent = agent(1.0);
        let s = state(".........");
        agent.q_table_mut().set(s.clone(), 0, 10.0);
        let legal: Vec<usize> = (0..9).collect();

        let chosen: HashSet<usize> = (0..500)
            .map(|_| agent.select_action(&s, &legal, true).unwrap())
            .collect();
        assert_eq!(chosen.len(), 9);
    }

    #[test]
    fn test_ties_are_broken_randomly() {
        let mut agent = agent(0.0);
        let s = state(".........");
        let legal: Vec<usize> = (0..9).collect();

        let chosen: HashSet<usize> = (0..500)
            .map(|_| agent.best_action(&s, &legal).unwrap())
            .collect();
        assert_eq!(chosen.len(), 9);
    }

    #[test]
    fn test_greedy_action_does_not_grow_table() {
        let mut agent = agent(0.0);
        let s = state("X...O....");
        agent.q_table_mut().set(s.clone(), 8, 0.3);

        assert_eq!(agent.greedy_action(&s, &[1, 2, 8]).unwrap(), 8);
        assert_eq!(agent.q_table().entry_count(), 1);
        assert!(agent.greedy_action(&s, &[]).is_err());
    }

    #[test]
    fn test_empty_action_set() {
        let mut agent = agent(0.5);
        let s = state("XOXXOOOXX");
        assert!(matches!(
            agent.select_action(&s, &[], true),
            Err(Error::EmptyActionSet)
        ));
        assert!(matches!(
            agent.best_action(&s, &[]),
            Err(Error::EmptyActionSet)
        ));
    }

    #[test]
    fn test_finish_episode_counts_outcomes() {
        let mut agent = agent(1.0);
        agent.finish_episode(1.0);
        assert_eq!(
            *agent.stats(),
            AgentStats {
                episodes: 1,
                wins: 1,
                losses: 0,
                draws: 0
            }
        );

        agent.finish_episode(0.0);
        assert_eq!(agent.stats().draws, 1);
        assert_eq!(agent.stats().wins, 1);
        assert_eq!(agent.stats().losses, 0);

        agent.finish_episode(-1.0);
        assert_eq!(agent.stats().losses, 1);
        assert_eq!(agent.stats().episodes, 3);
    }

    #[test]
    fn test_finish_episode_propagates_discounted_reward() {
        let mut agent = agent(1.0);
        let s0 = state(".........");
        let s1 = state("X...O....");
        let s2 = state("XX..O...O");

        agent.begin_episode();
        agent.record_move(s0.clone(), 0);
        agent.record_move(s1.clone(), 1);
        agent.record_move(s2.clone(), 2);
        agent.finish_episode(1.0);

        // Last move: 0.5 * 1.0; earlier moves discounted by 0.9 per step back
        assert!((agent.value_of(&s2, 2) - 0.5).abs() < 1e-12);
        assert!((agent.value_of(&s1, 1) - 0.45).abs() < 1e-12);
        assert!((agent.value_of(&s0, 0) - 0.405).abs() < 1e-12);
        assert!(agent.trajectory().is_empty());
    }

    #[test]
    fn test_finish_episode_decays_epsilon() {
        let mut agent = agent(1.0);
        agent.finish_episode(0.0);
        assert!((agent.epsilon() - 0.9995).abs() < 1e-12);
    }

    #[test]
    fn test_epsilon_never_below_floor() {
        let mut agent = QLearningAgent::<State>::new(Hyperparameters {
            epsilon: 1.0,
            min_epsilon: 0.05,
            epsilon_decay: 0.5,
            ..Hyperparameters::default()
        });
        for _ in 0..10_000 {
            agent.decay_exploration();
            assert!(agent.epsilon() >= 0.05);
        }
        assert_eq!(agent.epsilon(), 0.05);
    }

    #[test]
    fn test_begin_episode_clears_trajectory() {
        let mut agent = agent(1.0);
        agent.record_move(state("........."), 4);
        agent.begin_episode();
        assert!(agent.trajectory().is_empty());
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut agent = agent(1.0);
        agent.update(&state("........."), 4, 1.0, &state("........."), true);
        agent.finish_episode(1.0);
        agent.reset();
        assert_eq!(agent.known_states(), 0);
        assert_eq!(agent.epsilon(), 1.0);
        assert_eq!(agent.stats().episodes, 0);
    }

    #[test]
    fn test_restored_agent_draws_a_new_stream() {
        let legal: Vec<usize> = (0..9).collect();
        let s = state(".........");
        let draws = |agent: &mut QLearningAgent| -> Vec<usize> {
            (0..32)
                .map(|_| agent.select_action(&s, &legal, true).unwrap())
                .collect()
        };

        let mut trained = agent(1.0).with_seed(9);
        let initial = draws(&mut trained);
        for _ in 0..5 {
            trained.finish_episode(0.0);
        }
        let snapshot = trained.export_state();

        let mut restored = QLearningAgent::from_state(snapshot.clone());
        let mut again = QLearningAgent::from_state(snapshot);
        assert_eq!(restored.rng_seed(), Some(9));
        let resumed = draws(&mut restored);
        assert_ne!(resumed, initial);
        assert_eq!(draws(&mut again), resumed);

        // An explicit reseed of a trained agent also avoids the initial stream
        restored.set_rng_seed(9);
        assert_ne!(draws(&mut restored), initial);
    }

    #[test]
    fn test_hyperparameter_validation() {
        assert!(Hyperparameters::default().validate().is_ok());
        let bad_alpha = Hyperparameters {
            learning_rate: 1.5,
            ..Hyperparameters::default()
        };
        assert!(matches!(
            bad_alpha.validate(),
            Err(Error::InvalidConfiguration { .. })
        ));
        let bad_decay = Hyperparameters {
            epsilon_decay: 0.0,
            ..Hyperparameters::default()
        };
        assert!(bad_decay.validate().is_err());
    }

    #[test]
    fn test_stats_rates() {
        let stats = AgentStats {
            episodes: 4,
            wins: 2,
            losses: 1,
            draws: 1,
        };
        assert_eq!(stats.win_rate(), 0.5);
        assert_eq!(stats.loss_rate(), 0.25);
        assert_eq!(AgentStats::default().draw_rate(), 0.0);
    }
}
