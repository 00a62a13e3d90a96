//! Self-play training between two Q-learning agents

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use serde::{Deserialize, Serialize};

use super::report::{
    AgentSnapshot, EpisodeResult, EvaluationResult, TrainingReport, WindowCounter, WindowStats,
};
use crate::{
    Result,
    ports::{ModelRepository, Observer},
    q_learning::{QLearningAgent, SavedAgent, TrainingMetadata},
    tictactoe::{GameOutcome, Player, TicTacToe},
};

/// How many episodes to run and how often to report and checkpoint.
///
/// An interval of 0 disables the corresponding action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingSchedule {
    pub episodes: usize,
    pub stats_interval: usize,
    pub checkpoint_interval: usize,
}

impl TrainingSchedule {
    pub fn new(episodes: usize) -> Self {
        Self {
            episodes,
            stats_interval: 0,
            checkpoint_interval: 0,
        }
    }

    pub fn with_stats_interval(mut self, interval: usize) -> Self {
        self.stats_interval = interval;
        self
    }

    pub fn with_checkpoint_interval(mut self, interval: usize) -> Self {
        self.checkpoint_interval = interval;
        self
    }
}

fn fires(interval: usize, episode: usize) -> bool {
    interval > 0 && episode.is_multiple_of(interval)
}

/// Persists both agents under a fixed directory.
pub struct Checkpointer {
    repository: Arc<dyn ModelRepository + Send + Sync>,
    directory: PathBuf,
    board_size: usize,
    seed: Option<u64>,
}

impl Checkpointer {
    pub fn new(
        repository: Arc<dyn ModelRepository + Send + Sync>,
        directory: impl Into<PathBuf>,
        board_size: usize,
    ) -> Self {
        Self {
            repository,
            directory: directory.into(),
            board_size,
            seed: None,
        }
    }

    /// Seed recorded in the metadata of every saved model
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// `agent_{x|o}_checkpoint_{episode}.msgpack`
    pub fn checkpoint_path(&self, role: Player, episode: usize) -> PathBuf {
        self.directory
            .join(format!("agent_{}_checkpoint_{episode}.msgpack", role_tag(role)))
    }

    /// `agent_{x|o}_final_{episodes}.msgpack`
    pub fn final_path(&self, role: Player, episodes: usize) -> PathBuf {
        self.directory
            .join(format!("agent_{}_final_{episodes}.msgpack", role_tag(role)))
    }

    pub fn save_checkpoint(
        &self,
        agent_x: &QLearningAgent,
        agent_o: &QLearningAgent,
        episode: usize,
    ) -> Result<()> {
        self.save(agent_x, Player::X, &self.checkpoint_path(Player::X, episode))?;
        self.save(agent_o, Player::O, &self.checkpoint_path(Player::O, episode))?;
        log::debug!("Checkpoint written at episode {episode}");
        Ok(())
    }

    /// Save the final models and return their paths (X, O)
    pub fn save_final(
        &self,
        agent_x: &QLearningAgent,
        agent_o: &QLearningAgent,
        episodes: usize,
    ) -> Result<(PathBuf, PathBuf)> {
        let path_x = self.final_path(Player::X, episodes);
        let path_o = self.final_path(Player::O, episodes);
        self.save(agent_x, Player::X, &path_x)?;
        self.save(agent_o, Player::O, &path_o)?;
        log::info!(
            "Final models saved to {} and {}",
            path_x.display(),
            path_o.display()
        );
        Ok((path_x, path_o))
    }

    fn save(&self, agent: &QLearningAgent, role: Player, path: &Path) -> Result<()> {
        let metadata = TrainingMetadata::for_role(role, self.board_size)
            .with_episodes(agent.stats().episodes)
            .with_seed(self.seed)
            .stamped();
        self.repository
            .save(&SavedAgent::from_agent(agent, metadata), path)
    }
}

fn role_tag(role: Player) -> &'static str {
    match role {
        Player::X => "x",
        Player::O => "o",
    }
}

/// Two agents learning Tic-Tac-Toe by playing each other.
///
/// The agent controlling the environment's current player moves; after a
/// terminal step the winner learns from +1.0, the loser from -1.0 and both
/// from 0.0 on a draw.
pub struct SelfPlayTrainer {
    env: TicTacToe,
    agent_x: QLearningAgent,
    agent_o: QLearningAgent,
    checkpointer: Option<Checkpointer>,
    observers: Vec<Box<dyn Observer>>,
}

impl SelfPlayTrainer {
    pub fn new(env: TicTacToe, agent_x: QLearningAgent, agent_o: QLearningAgent) -> Self {
        Self {
            env,
            agent_x,
            agent_o,
            checkpointer: None,
            observers: Vec::new(),
        }
    }

    pub fn with_checkpointer(mut self, checkpointer: Checkpointer) -> Self {
        self.checkpointer = Some(checkpointer);
        self
    }

    /// Add an observer to the trainer
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn agent_x(&self) -> &QLearningAgent {
        &self.agent_x
    }

    pub fn agent_o(&self) -> &QLearningAgent {
        &self.agent_o
    }

    pub fn environment(&self) -> &TicTacToe {
        &self.env
    }

    /// Hand the trained agents back (X, O)
    pub fn into_agents(self) -> (QLearningAgent, QLearningAgent) {
        (self.agent_x, self.agent_o)
    }

    fn agent_mut(&mut self, player: Player) -> &mut QLearningAgent {
        match player {
            Player::X => &mut self.agent_x,
            Player::O => &mut self.agent_o,
        }
    }

    fn notify(&mut self, mut event: impl FnMut(&mut dyn Observer) -> Result<()>) -> Result<()> {
        for observer in &mut self.observers {
            event(observer.as_mut())?;
        }
        Ok(())
    }

    /// Play one exploring game and let both agents learn from it.
    pub fn run_episode(&mut self) -> Result<EpisodeResult> {
        self.env.reset();
        self.agent_x.begin_episode();
        self.agent_o.begin_episode();

        let mut moves = 0;
        let outcome = loop {
            let player = self.env.current_player();
            let state = self.env.state();
            let legal = self.env.legal_actions();

            let agent = self.agent_mut(player);
            let action = agent.select_action(&state, &legal, true)?;
            agent.record_move(state, action);

            self.env.step(action)?;
            moves += 1;

            if let Some(outcome) = self.env.outcome() {
                break outcome;
            }
        };

        self.agent_x.finish_episode(outcome.reward_for(Player::X));
        self.agent_o.finish_episode(outcome.reward_for(Player::O));

        Ok(EpisodeResult { outcome, moves })
    }

    /// Run the whole schedule.
    ///
    /// Checkpoint failures are logged, counted in the report and passed to
    /// observers without stopping training. Failing to save the final
    /// models is an error.
    pub fn train(&mut self, schedule: &TrainingSchedule) -> Result<TrainingReport> {
        let started = Instant::now();
        self.notify(|o| o.on_training_start(schedule.episodes))?;

        let mut window = WindowCounter::default();
        let mut history = Vec::new();
        let mut checkpoint_failures = 0;

        for episode in 1..=schedule.episodes {
            let result = self.run_episode()?;
            window.record(result.outcome);
            self.notify(|o| o.on_episode_end(episode, &result))?;

            if fires(schedule.stats_interval, episode) {
                let stats = self.close_window(episode, std::mem::take(&mut window));
                self.notify(|o| o.on_window(&stats))?;
                history.push(stats);
            }

            if fires(schedule.checkpoint_interval, episode)
                && let Some(checkpointer) = &self.checkpointer
            {
                let saved = checkpointer.save_checkpoint(&self.agent_x, &self.agent_o, episode);
                if let Err(e) = &saved {
                    log::warn!("Checkpoint at episode {episode} failed: {e}");
                    checkpoint_failures += 1;
                }
                self.notify(|o| o.on_checkpoint(episode, saved.as_ref().err()))?;
            }
        }

        if let Some(checkpointer) = &self.checkpointer {
            checkpointer.save_final(&self.agent_x, &self.agent_o, schedule.episodes)?;
        }

        let report = TrainingReport {
            board_size: self.env.size(),
            episodes: schedule.episodes,
            agent_x: AgentSnapshot::of(&self.agent_x),
            agent_o: AgentSnapshot::of(&self.agent_o),
            history,
            checkpoint_failures,
            elapsed_seconds: started.elapsed().as_secs_f64(),
            evaluation: None,
        };
        self.notify(|o| o.on_training_end(&report))?;
        Ok(report)
    }

    fn close_window(&self, episode: usize, window: WindowCounter) -> WindowStats {
        WindowStats {
            episode,
            x_wins: window.x_wins,
            o_wins: window.o_wins,
            draws: window.draws,
            epsilon_x: self.agent_x.epsilon(),
            epsilon_o: self.agent_o.epsilon(),
            states_x: self.agent_x.known_states(),
            states_o: self.agent_o.known_states(),
        }
    }

    /// Play greedy games without learning.
    ///
    /// Neither table nor statistics change; only the tie-break random
    /// streams advance.
    pub fn evaluate(&mut self, games: usize) -> Result<EvaluationResult> {
        let mut counts = WindowCounter::default();

        for _ in 0..games {
            self.env.reset();
            let outcome: GameOutcome = loop {
                let player = self.env.current_player();
                let state = self.env.state();
                let legal = self.env.legal_actions();
                let action = self.agent_mut(player).greedy_action(&state, &legal)?;
                self.env.step(action)?;
                if let Some(outcome) = self.env.outcome() {
                    break outcome;
                }
            };
            counts.record(outcome);
        }

        Ok(EvaluationResult {
            games,
            x_wins: counts.x_wins,
            o_wins: counts.o_wins,
            draws: counts.draws,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{
        Error,
        adapters::InMemoryRepository,
        q_learning::Hyperparameters,
        tictactoe::State,
    };

    fn agents(seed: u64) -> (QLearningAgent, QLearningAgent) {
        (
            QLearningAgent::new(Hyperparameters::default()).with_seed(seed),
            QLearningAgent::new(Hyperparameters::default()).with_seed(seed + 1),
        )
    }

    fn trainer(seed: u64) -> SelfPlayTrainer {
        let (x, o) = agents(seed);
        SelfPlayTrainer::new(TicTacToe::standard(), x, o)
    }

    #[test]
    fn test_run_episode_assigns_symmetric_rewards() {
        let mut trainer = trainer(1);
        let result = trainer.run_episode().unwrap();

        assert!((5..=9).contains(&result.moves));
        let (x, o) = (trainer.agent_x().stats(), trainer.agent_o().stats());
        assert_eq!(x.episodes, 1);
        assert_eq!(o.episodes, 1);
        match result.outcome {
            GameOutcome::Win(Player::X) => assert_eq!((x.wins, o.losses), (1, 1)),
            GameOutcome::Win(Player::O) => assert_eq!((x.losses, o.wins), (1, 1)),
            GameOutcome::Draw => assert_eq!((x.draws, o.draws), (1, 1)),
        }
        assert!(trainer.agent_x().trajectory().is_empty());
    }

    #[test]
    fn test_x_moves_first_on_empty_board() {
        let mut trainer = trainer(3);
        trainer.run_episode().unwrap();
        assert!(trainer.agent_x().q_table().actions(&State::empty(3).unwrap()).is_some());
        assert!(trainer.agent_o().q_table().actions(&State::empty(3).unwrap()).is_none());
    }

    #[test]
    fn test_train_records_windows() {
        let mut trainer = trainer(5);
        let schedule = TrainingSchedule::new(50).with_stats_interval(10);
        let report = trainer.train(&schedule).unwrap();

        assert_eq!(report.episodes, 50);
        assert_eq!(report.history.len(), 5);
        assert!(report.history.iter().all(|w| w.games() == 10));
        assert_eq!(report.history[4].episode, 50);
        assert_eq!(report.agent_x.episodes, 50);
        assert!(report.agent_x.final_epsilon < report.agent_x.initial_epsilon);
    }

    #[test]
    fn test_zero_interval_disables_windows() {
        let mut trainer = trainer(5);
        let report = trainer.train(&TrainingSchedule::new(5)).unwrap();
        assert!(report.history.is_empty());
    }

    #[test]
    fn test_checkpoints_and_final_models() {
        let repo = InMemoryRepository::new();
        let checkpointer = Checkpointer::new(Arc::new(repo.clone()), "models", 3);
        let mut trainer = trainer(9).with_checkpointer(checkpointer);

        let schedule = TrainingSchedule::new(20).with_checkpoint_interval(10);
        trainer.train(&schedule).unwrap();

        let paths = repo.paths();
        assert_eq!(paths.len(), 6);
        assert!(paths.contains(&PathBuf::from("models/agent_x_checkpoint_10.msgpack")));
        assert!(paths.contains(&PathBuf::from("models/agent_o_checkpoint_20.msgpack")));
        assert!(paths.contains(&PathBuf::from("models/agent_x_final_20.msgpack")));
    }

    struct FlakyRepository {
        inner: InMemoryRepository,
        fail_checkpoints: bool,
    }

    impl ModelRepository for FlakyRepository {
        fn save(&self, model: &SavedAgent<State>, path: &Path) -> Result<()> {
            if self.fail_checkpoints && path.to_string_lossy().contains("checkpoint") {
                return Err(Error::Io {
                    operation: "write checkpoint".to_string(),
                    source: std::io::Error::other("disk full"),
                });
            }
            self.inner.save(model, path)
        }

        fn load(&self, path: &Path) -> Result<SavedAgent<State>> {
            self.inner.load(path)
        }

        fn exists(&self, path: &Path) -> bool {
            self.inner.exists(path)
        }
    }

    #[derive(Clone, Default)]
    struct Recorder {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl Observer for Recorder {
        fn on_training_start(&mut self, total: usize) -> Result<()> {
            self.events.lock().unwrap().push(format!("start {total}"));
            Ok(())
        }

        fn on_checkpoint(&mut self, episode: usize, error: Option<&Error>) -> Result<()> {
            self.events
                .lock()
                .unwrap()
                .push(format!("checkpoint {episode} failed={}", error.is_some()));
            Ok(())
        }

        fn on_training_end(&mut self, report: &TrainingReport) -> Result<()> {
            self.events
                .lock()
                .unwrap()
                .push(format!("end {}", report.episodes));
            Ok(())
        }
    }

    #[test]
    fn test_checkpoint_failure_does_not_abort_training() {
        let inner = InMemoryRepository::new();
        let repo = FlakyRepository {
            inner: inner.clone(),
            fail_checkpoints: true,
        };
        let recorder = Recorder::default();
        let mut trainer = trainer(11)
            .with_checkpointer(Checkpointer::new(Arc::new(repo), "m", 3))
            .with_observer(Box::new(recorder.clone()));

        let schedule = TrainingSchedule::new(30).with_checkpoint_interval(10);
        let report = trainer.train(&schedule).unwrap();

        assert_eq!(report.episodes, 30);
        assert_eq!(report.checkpoint_failures, 3);
        // Final models still written
        assert_eq!(inner.count(), 2);

        let events = recorder.events.lock().unwrap().clone();
        assert_eq!(events.first().map(String::as_str), Some("start 30"));
        assert!(events.contains(&"checkpoint 20 failed=true".to_string()));
        assert_eq!(events.last().map(String::as_str), Some("end 30"));
    }

    #[test]
    fn test_evaluate_leaves_agents_untouched() {
        let mut trainer = trainer(13);
        trainer.train(&TrainingSchedule::new(200)).unwrap();

        let table_x = trainer.agent_x().q_table().clone();
        let table_o = trainer.agent_o().q_table().clone();
        let stats_x = *trainer.agent_x().stats();
        let epsilon_o = trainer.agent_o().epsilon();

        let result = trainer.evaluate(25).unwrap();
        assert_eq!(result.games, 25);
        assert_eq!(result.x_wins + result.o_wins + result.draws, 25);

        assert_eq!(trainer.agent_x().q_table(), &table_x);
        assert_eq!(trainer.agent_o().q_table(), &table_o);
        assert_eq!(*trainer.agent_x().stats(), stats_x);
        assert_eq!(trainer.agent_o().epsilon(), epsilon_o);
    }

    #[test]
    fn test_training_is_reproducible_from_seed() {
        let mut a = trainer(21);
        let mut b = trainer(21);
        let schedule = TrainingSchedule::new(100).with_stats_interval(25);
        let (ra, rb) = (a.train(&schedule).unwrap(), b.train(&schedule).unwrap());
        assert_eq!(ra.history, rb.history);
        assert_eq!(a.agent_x().q_table(), b.agent_x().q_table());
    }
}
