//! CLI infrastructure for the Q-learning toolkit
//!
//! This module provides the command-line interface for training, evaluating,
//! merging and inspecting agents, and for the maze demo.

pub mod commands;
pub mod config;
pub mod output;
