//! Error types for the qttt crate

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the qttt crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid move: position {position} is already occupied")]
    InvalidMove { position: usize },

    #[error("position {position} is out of bounds (board has {cells} cells)")]
    InvalidPosition { position: usize, cells: usize },

    #[error("action {action} is not one of the {available} actions of this environment")]
    InvalidAction { action: usize, available: usize },

    #[error("episode already over")]
    GameOver,

    #[error("no legal actions available to choose from")]
    EmptyActionSet,

    #[error("board size {size} is not supported (expected 3 to 9)")]
    InvalidBoardSize { size: usize },

    #[error("invalid cell value {value} at index {index} (expected 0, 1 or 2)")]
    InvalidCellValue { value: u8, index: usize },

    #[error("state has {got} cells, which is not a square board of side 3 to 9")]
    InvalidStateLength { got: usize },

    #[error("invalid character '{character}' at position {position} in '{context}'")]
    InvalidCellCharacter {
        character: char,
        position: usize,
        context: String,
    },

    #[error("invalid maze: {message}")]
    InvalidMaze { message: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("no saved model found at {}", path.display())]
    ModelNotFound { path: PathBuf },

    #[error("unsupported model format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

impl Error {
    /// Whether this error rejects an action the environment cannot apply.
    pub fn is_invalid_action(&self) -> bool {
        matches!(
            self,
            Error::InvalidMove { .. }
                | Error::InvalidPosition { .. }
                | Error::InvalidAction { .. }
                | Error::GameOver
        )
    }
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
