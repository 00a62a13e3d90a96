//! Observer implementations for training pipelines
//!
//! Observers allow composable data collection during training without coupling
//! training logic to specific output formats.

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use super::report::{EpisodeResult, TrainingReport, WindowStats};
use crate::{
    Error, Result,
    ports::Observer,
    tictactoe::{GameOutcome, Player},
};

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    x_wins: usize,
    o_wins: usize,
    draws: usize,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            x_wins: 0,
            o_wins: 0,
            draws: 0,
        }
    }

    fn message(&self) -> String {
        format!("X:{} O:{} D:{}", self.x_wins, self.o_wins, self.draws)
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                .map_err(|e| Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, episode: usize, result: &EpisodeResult) -> Result<()> {
        match result.outcome {
            GameOutcome::Win(Player::X) => self.x_wins += 1,
            GameOutcome::Win(Player::O) => self.o_wins += 1,
            GameOutcome::Draw => self.draws += 1,
        }

        if let Some(pb) = &self.progress_bar {
            pb.set_position(episode as u64);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_training_end(&mut self, _report: &TrainingReport) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Logging observer - Emits one log line per statistics window
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl LoggingObserver {
    pub fn new() -> Self {
        Self
    }
}

impl Observer for LoggingObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        log::info!("Starting self-play training for {total_episodes} episodes");
        Ok(())
    }

    fn on_window(&mut self, stats: &WindowStats) -> Result<()> {
        log::info!(
            "Episode {}: X wins {}, O wins {}, draws {} ({:.1}%), epsilon X {:.4} O {:.4}, states X {} O {}",
            stats.episode,
            stats.x_wins,
            stats.o_wins,
            stats.draws,
            stats.draw_rate() * 100.0,
            stats.epsilon_x,
            stats.epsilon_o,
            stats.states_x,
            stats.states_o,
        );
        Ok(())
    }

    fn on_checkpoint(&mut self, episode: usize, error: Option<&Error>) -> Result<()> {
        if error.is_none() {
            log::info!("Checkpoint saved at episode {episode}");
        }
        Ok(())
    }

    fn on_training_end(&mut self, report: &TrainingReport) -> Result<()> {
        log::info!(
            "Training finished: {} episodes in {:.2}s",
            report.episodes,
            report.elapsed_seconds
        );
        Ok(())
    }
}

/// Metrics observer - Tracks outcome counts and game length
pub struct MetricsObserver {
    x_wins: usize,
    o_wins: usize,
    draws: usize,
    total_episodes: usize,
    total_moves: usize,
    failed_checkpoints: usize,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self {
            x_wins: 0,
            o_wins: 0,
            draws: 0,
            total_episodes: 0,
            total_moves: 0,
            failed_checkpoints: 0,
        }
    }

    fn rate(&self, count: usize) -> f64 {
        if self.total_episodes == 0 {
            0.0
        } else {
            count as f64 / self.total_episodes as f64
        }
    }

    pub fn draw_rate(&self) -> f64 {
        self.rate(self.draws)
    }

    /// Average number of moves per game
    pub fn avg_game_length(&self) -> f64 {
        if self.total_episodes == 0 {
            0.0
        } else {
            self.total_moves as f64 / self.total_episodes as f64
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_episodes: self.total_episodes,
            x_wins: self.x_wins,
            o_wins: self.o_wins,
            draws: self.draws,
            x_win_rate: self.rate(self.x_wins),
            o_win_rate: self.rate(self.o_wins),
            draw_rate: self.draw_rate(),
            avg_game_length: self.avg_game_length(),
            failed_checkpoints: self.failed_checkpoints,
        }
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_episodes: usize,
    pub x_wins: usize,
    pub o_wins: usize,
    pub draws: usize,
    pub x_win_rate: f64,
    pub o_win_rate: f64,
    pub draw_rate: f64,
    pub avg_game_length: f64,
    pub failed_checkpoints: usize,
}

impl Default for MetricsObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for MetricsObserver {
    fn on_episode_end(&mut self, _episode: usize, result: &EpisodeResult) -> Result<()> {
        self.total_episodes += 1;
        self.total_moves += result.moves;
        match result.outcome {
            GameOutcome::Win(Player::X) => self.x_wins += 1,
            GameOutcome::Win(Player::O) => self.o_wins += 1,
            GameOutcome::Draw => self.draws += 1,
        }
        Ok(())
    }

    fn on_checkpoint(&mut self, _episode: usize, error: Option<&Error>) -> Result<()> {
        if error.is_some() {
            self.failed_checkpoints += 1;
        }
        Ok(())
    }
}
