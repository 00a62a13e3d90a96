//! Shared configuration arguments for CLI commands

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use crate::{app::TrainerConfig, q_learning::Hyperparameters};

/// Hyperparameter overrides accepted by every learning command
#[derive(Args, Debug, Clone, Default)]
pub struct HyperparameterArgs {
    /// Learning rate α
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Discount factor γ
    #[arg(long)]
    pub gamma: Option<f64>,

    /// Initial exploration rate ε
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Exploration floor
    #[arg(long)]
    pub min_epsilon: Option<f64>,

    /// Multiplicative ε decay per episode
    #[arg(long)]
    pub epsilon_decay: Option<f64>,
}

impl HyperparameterArgs {
    /// Overlay the given flags on `base`
    pub fn apply(&self, base: Hyperparameters) -> Hyperparameters {
        Hyperparameters {
            learning_rate: self.alpha.unwrap_or(base.learning_rate),
            discount_factor: self.gamma.unwrap_or(base.discount_factor),
            epsilon: self.epsilon.unwrap_or(base.epsilon),
            min_epsilon: self.min_epsilon.unwrap_or(base.min_epsilon),
            epsilon_decay: self.epsilon_decay.unwrap_or(base.epsilon_decay),
        }
    }
}

/// Trainer settings from an optional JSON file, defaults otherwise
pub fn load_trainer_config(path: Option<&Path>) -> Result<TrainerConfig> {
    match path {
        Some(path) => TrainerConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(TrainerConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_only_given_values() {
        let args = HyperparameterArgs {
            alpha: Some(0.1),
            epsilon_decay: Some(0.99),
            ..HyperparameterArgs::default()
        };
        let merged = args.apply(Hyperparameters::default());
        assert_eq!(merged.learning_rate, 0.1);
        assert_eq!(merged.epsilon_decay, 0.99);
        assert_eq!(merged.discount_factor, 0.9);
    }

    #[test]
    fn test_missing_config_path_uses_defaults() {
        assert_eq!(load_trainer_config(None).unwrap(), TrainerConfig::default());
        assert!(load_trainer_config(Some(Path::new("/nonexistent/qttt.json"))).is_err());
    }
}
