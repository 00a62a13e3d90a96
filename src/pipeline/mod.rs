//! Training and evaluation pipeline
//!
//! This module provides:
//! - Self-play training between two Q-learning agents
//! - Greedy evaluation of trained agents
//! - Step-wise TD training for single-agent environments
//! - Observers recording what happens during training

pub mod observers;
pub mod report;
pub mod self_play;
pub mod td;

pub use observers::{LoggingObserver, MetricsObserver, MetricsSummary, ProgressObserver};
pub use report::{
    AgentSnapshot, EpisodeResult, EvaluationResult, TrainingReport, Verdict, WindowStats,
};
pub use self_play::{Checkpointer, SelfPlayTrainer, TrainingSchedule};
pub use td::{TdEpisode, TdTrainer};

pub use crate::ports::Observer;
