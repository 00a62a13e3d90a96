//! Repository port for model persistence.
//!
//! This module defines the trait boundary between the domain and infrastructure
//! layers for storing and retrieving trained agents.

use std::path::Path;

use crate::{Result, q_learning::SavedAgent, tictactoe::State};

/// Port for persisting and loading saved Tic-Tac-Toe agents.
///
/// This trait abstracts the storage mechanism so that training and the CLI
/// never depend on a specific serialization format.
///
/// # Examples
///
/// ```no_run
/// use qttt::ports::ModelRepository;
/// use qttt::q_learning::SavedAgent;
/// use qttt::tictactoe::State;
/// use std::path::Path;
///
/// fn store<R: ModelRepository>(
///     repo: &R,
///     model: &SavedAgent<State>,
///     path: &Path,
/// ) -> qttt::Result<()> {
///     repo.save(model, path)
/// }
/// ```
pub trait ModelRepository {
    /// Save a model to persistent storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the location cannot be written or serialization
    /// fails.
    fn save(&self, model: &SavedAgent<State>, path: &Path) -> Result<()>;

    /// Load a model from persistent storage.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ModelNotFound`] when nothing is stored at
    /// `path`, and a serialization error when the stored bytes are invalid.
    fn load(&self, path: &Path) -> Result<SavedAgent<State>>;

    /// Whether a model is stored at `path`
    fn exists(&self, path: &Path) -> bool;
}
