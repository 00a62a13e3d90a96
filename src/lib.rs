//! Tabular Q-learning agents that learn Tic-Tac-Toe through self-play
//!
//! This crate provides:
//! - An N×N Tic-Tac-Toe environment with full-line wins
//! - A Q-learning agent with ε-greedy exploration and Monte Carlo-style
//!   backups over the moves of an episode
//! - Self-play training with windowed statistics and checkpoints
//! - Persistence, merging and greedy evaluation of saved agents
//! - A maze environment trained with per-step temporal-difference updates

pub mod adapters;
pub mod app;
pub mod cli;
pub mod error;
pub mod maze;
pub mod pipeline;
pub mod ports;
pub mod q_learning;
pub mod tictactoe;

pub use error::{Error, Result};
pub use maze::{Direction, Maze, Position};
pub use q_learning::{Hyperparameters, QLearningAgent, QTable, SavedAgent, TrainingMetadata};
pub use tictactoe::{GameOutcome, Player, State, TicTacToe};
