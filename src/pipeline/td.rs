//! Step-wise Q-learning for single-agent environments

use serde::{Deserialize, Serialize};

use crate::{Result, ports::Environment, q_learning::QLearningAgent};

/// Default cap on steps per episode
pub const DEFAULT_MAX_STEPS: usize = 10_000;

/// Summary of one TD episode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TdEpisode {
    pub steps: usize,
    /// Undiscounted sum of rewards
    pub total_reward: f64,
    /// Whether the environment reached a terminal state before the cap
    pub completed: bool,
}

/// Trains one agent with a Bellman update after every environment step.
///
/// Unlike self-play, the successor state is real, so bootstrapping from
/// `max_a' Q(s', a')` applies until the environment reports `done`.
pub struct TdTrainer<E: Environment> {
    env: E,
    agent: QLearningAgent<E::State>,
    max_steps: usize,
}

impl<E: Environment> TdTrainer<E> {
    pub fn new(env: E, agent: QLearningAgent<E::State>) -> Self {
        Self {
            env,
            agent,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn agent(&self) -> &QLearningAgent<E::State> {
        &self.agent
    }

    pub fn environment(&self) -> &E {
        &self.env
    }

    pub fn into_agent(self) -> QLearningAgent<E::State> {
        self.agent
    }

    /// Run one exploring episode, learning from every step, then decay ε.
    pub fn run_episode(&mut self) -> Result<TdEpisode> {
        let mut state = self.env.reset();
        self.agent.begin_episode();

        let mut steps = 0;
        let mut total_reward = 0.0;
        while steps < self.max_steps && !self.env.is_done() {
            let legal = self.env.legal_actions();
            let action = self.agent.select_action(&state, &legal, true)?;
            let step = self.env.step(action)?;
            self.agent
                .update(&state, action, step.reward, &step.state, step.done);

            total_reward += step.reward;
            steps += 1;
            state = step.state;
        }

        self.agent.decay_exploration();
        Ok(TdEpisode {
            steps,
            total_reward,
            completed: self.env.is_done(),
        })
    }

    pub fn train(&mut self, episodes: usize) -> Result<Vec<TdEpisode>> {
        let mut history = Vec::with_capacity(episodes);
        for episode in 1..=episodes {
            let result = self.run_episode()?;
            log::debug!(
                "TD episode {episode}: {} steps, return {:.2}",
                result.steps,
                result.total_reward
            );
            history.push(result);
        }
        Ok(history)
    }

    /// States visited by the greedy policy from a fresh reset, start included.
    ///
    /// Stops at a terminal state or after `max_steps` moves. The table is
    /// not modified.
    pub fn greedy_path(&mut self, max_steps: usize) -> Result<Vec<E::State>> {
        let mut state = self.env.reset();
        let mut path = vec![state.clone()];

        while path.len() <= max_steps && !self.env.is_done() {
            let legal = self.env.legal_actions();
            let action = self.agent.greedy_action(&state, &legal)?;
            state = self.env.step(action)?.state;
            path.push(state.clone());
        }
        Ok(path)
    }
}
