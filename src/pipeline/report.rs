//! Pure-data results of training and evaluation runs

use std::{
    fmt,
    fs::File,
    hash::Hash,
    io::{BufWriter, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    q_learning::QLearningAgent,
    tictactoe::{GameOutcome, Player},
};

/// Outcome of one self-play game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeResult {
    pub outcome: GameOutcome,
    /// Moves played by both sides
    pub moves: usize,
}

/// Outcome counts for one reporting window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    /// Episodes completed when the window closed
    pub episode: usize,
    pub x_wins: usize,
    pub o_wins: usize,
    pub draws: usize,
    pub epsilon_x: f64,
    pub epsilon_o: f64,
    pub states_x: usize,
    pub states_o: usize,
}

impl WindowStats {
    pub fn games(&self) -> usize {
        self.x_wins + self.o_wins + self.draws
    }

    pub fn draw_rate(&self) -> f64 {
        match self.games() {
            0 => 0.0,
            games => self.draws as f64 / games as f64,
        }
    }
}

/// Running counts for the window in progress
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct WindowCounter {
    pub x_wins: usize,
    pub o_wins: usize,
    pub draws: usize,
}

impl WindowCounter {
    pub fn record(&mut self, outcome: GameOutcome) {
        match outcome {
            GameOutcome::Win(Player::X) => self.x_wins += 1,
            GameOutcome::Win(Player::O) => self.o_wins += 1,
            GameOutcome::Draw => self.draws += 1,
        }
    }
}

/// Hyperparameters and final statistics of one trained agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub learning_rate: f64,
    pub discount_factor: f64,
    pub initial_epsilon: f64,
    pub final_epsilon: f64,
    pub min_epsilon: f64,
    pub epsilon_decay: f64,
    pub episodes: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub known_states: usize,
}

impl AgentSnapshot {
    pub fn of<S: Clone + Eq + Hash>(agent: &QLearningAgent<S>) -> Self {
        let hyper = agent.hyperparameters();
        let stats = agent.stats();
        Self {
            learning_rate: hyper.learning_rate,
            discount_factor: hyper.discount_factor,
            initial_epsilon: hyper.epsilon,
            final_epsilon: agent.epsilon(),
            min_epsilon: hyper.min_epsilon,
            epsilon_decay: hyper.epsilon_decay,
            episodes: stats.episodes,
            wins: stats.wins,
            draws: stats.draws,
            losses: stats.losses,
            known_states: agent.known_states(),
        }
    }
}

/// Result of a self-play training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub board_size: usize,
    /// Episodes played in this run
    pub episodes: usize,
    pub agent_x: AgentSnapshot,
    pub agent_o: AgentSnapshot,
    pub history: Vec<WindowStats>,
    pub checkpoint_failures: usize,
    pub elapsed_seconds: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<EvaluationResult>,
}

impl TrainingReport {
    /// Save report to a pretty-printed JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(create_file(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush().map_err(|source| Error::Io {
            operation: format!("flush {path:?}"),
            source,
        })
    }

    /// Load report from JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let report = serde_json::from_reader(file)?;
        Ok(report)
    }

    /// Write the windowed history as CSV, one row per window
    pub fn export_history_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        create_file(path.as_ref())?;
        let mut writer = csv::Writer::from_path(path.as_ref())?;
        for window in &self.history {
            writer.serialize(window)?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn create_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| Error::Io {
            operation: format!("create directory {parent:?}"),
            source,
        })?;
    }
    File::create(path).map_err(|source| Error::Io {
        operation: format!("create file {path:?}"),
        source,
    })
}

/// Classification of how close greedy play is to perfect play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// More than 95% draws
    Equilibrium,
    /// More than 75% draws
    Excellent,
    /// More than 50% draws
    Good,
    NeedsTraining,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Verdict::Equilibrium => "equilibrium reached: both agents play near-perfectly",
            Verdict::Excellent => "excellent: agents have learned strong strategies",
            Verdict::Good => "good: agents are learning but can improve",
            Verdict::NeedsTraining => "needs more training",
        };
        f.write_str(text)
    }
}

/// Result of greedy play between two agents
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub games: usize,
    pub x_wins: usize,
    pub o_wins: usize,
    pub draws: usize,
}

impl EvaluationResult {
    fn rate(&self, count: usize) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            count as f64 / self.games as f64
        }
    }

    pub fn x_win_rate(&self) -> f64 {
        self.rate(self.x_wins)
    }

    pub fn o_win_rate(&self) -> f64 {
        self.rate(self.o_wins)
    }

    pub fn draw_rate(&self) -> f64 {
        self.rate(self.draws)
    }

    pub fn verdict(&self) -> Verdict {
        let draw_rate = self.draw_rate();
        if draw_rate > 0.95 {
            Verdict::Equilibrium
        } else if draw_rate > 0.75 {
            Verdict::Excellent
        } else if draw_rate > 0.5 {
            Verdict::Good
        } else {
            Verdict::NeedsTraining
        }
    }
}
