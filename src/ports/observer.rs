//! Observer port - abstraction for training observation and data collection
//!
//! This port defines the interface for observing training events, so that
//! progress display, logging and metrics never live inside the training loop.

use crate::{
    Error, Result,
    pipeline::{EpisodeResult, TrainingReport, WindowStats},
};

/// Observer trait for monitoring self-play training
///
/// # Event Sequence
///
/// 1. `on_training_start(total_episodes)` - once at the beginning
/// 2. For each episode:
///    - `on_episode_end(episode, result)`
///    - `on_window(stats)` when a statistics window closes
///    - `on_checkpoint(episode, error)` when a checkpoint was attempted
/// 3. `on_training_end(report)` - once at the end
///
/// Episodes are numbered from 1.
///
/// # Examples
///
/// ```no_run
/// use qttt::{pipeline::EpisodeResult, ports::Observer};
///
/// struct MoveCounter {
///     moves: usize,
/// }
///
/// impl Observer for MoveCounter {
///     fn on_episode_end(&mut self, _episode: usize, result: &EpisodeResult) -> qttt::Result<()> {
///         self.moves += result.moves;
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called when training starts with the number of episodes to run.
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    /// Called after both agents learned from a finished episode.
    fn on_episode_end(&mut self, _episode: usize, _result: &EpisodeResult) -> Result<()> {
        Ok(())
    }

    /// Called when a statistics window closes.
    fn on_window(&mut self, _stats: &WindowStats) -> Result<()> {
        Ok(())
    }

    /// Called after a checkpoint attempt; `error` is set when saving failed.
    ///
    /// Checkpoint failures never abort training.
    fn on_checkpoint(&mut self, _episode: usize, _error: Option<&Error>) -> Result<()> {
        Ok(())
    }

    /// Called when training completes.
    fn on_training_end(&mut self, _report: &TrainingReport) -> Result<()> {
        Ok(())
    }
}
