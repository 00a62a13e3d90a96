//! MessagePack implementation of the model repository.
//!
//! Q-tables are keyed by board states, which JSON cannot use as object keys;
//! MessagePack maps accept them directly.

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, ErrorKind, Write},
    path::Path,
};

use crate::{
    Result, error::Error, ports::ModelRepository, q_learning::SavedAgent, tictactoe::State,
};

/// MessagePack-based model repository.
///
/// # Examples
///
/// ```no_run
/// use qttt::adapters::MsgPackRepository;
/// use qttt::ports::ModelRepository;
/// use qttt::q_learning::{Hyperparameters, QLearningAgent, SavedAgent, TrainingMetadata};
/// use std::path::Path;
///
/// let repo = MsgPackRepository::new();
/// let agent = QLearningAgent::new(Hyperparameters::default());
/// let saved = SavedAgent::from_agent(&agent, TrainingMetadata::default());
///
/// repo.save(&saved, Path::new("models/agent_x.msgpack"))?;
/// let loaded = repo.load(Path::new("models/agent_x.msgpack"))?;
/// # Ok::<(), qttt::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackRepository;

impl MsgPackRepository {
    pub fn new() -> Self {
        Self
    }
}

impl ModelRepository for MsgPackRepository {
    fn save(&self, model: &SavedAgent<State>, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| Error::Io {
                operation: format!("create directory {parent:?}"),
                source,
            })?;
        }

        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {path:?}"),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        rmp_serde::encode::write(&mut writer, model).map_err(|e| {
            Error::SerializationContext {
                operation: "serialize agent to MessagePack".to_string(),
                message: e.to_string(),
            }
        })?;
        writer.flush().map_err(|source| Error::Io {
            operation: format!("flush {path:?}"),
            source,
        })?;

        log::debug!("Saved {} Q-values to {}", model.entry_count(), path.display());
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<SavedAgent<State>> {
        let file = File::open(path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                Error::ModelNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                Error::Io {
                    operation: format!("open file {path:?}"),
                    source,
                }
            }
        })?;

        rmp_serde::decode::from_read(BufReader::new(file)).map_err(|e| {
            Error::SerializationContext {
                operation: format!("deserialize agent from {path:?}"),
                message: e.to_string(),
            }
        })
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}
