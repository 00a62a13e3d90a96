//! Saving and loading agents through the repositories

use qttt::{
    Error, Hyperparameters, Player, QLearningAgent, SavedAgent, State, TrainingMetadata,
    adapters::{InMemoryRepository, MsgPackRepository},
    app::{AgentConfig, App},
    ports::ModelRepository,
    q_learning::load_agent_or_fresh,
};
use tempfile::TempDir;

fn trained_agent() -> QLearningAgent {
    let mut agent = QLearningAgent::new(Hyperparameters {
        epsilon: 0.8,
        ..Hyperparameters::default()
    })
    .with_seed(9);
    let boards = [".........", "X...O....", "XX..O.O..", "XXO.OXO.."];
    for (i, board) in boards.iter().enumerate() {
        let state = State::parse(board).unwrap();
        for action in state.empty_positions() {
            agent
                .q_table_mut()
                .set(state.clone(), action, (i * 10 + action) as f64 / 100.0 - 0.2);
        }
    }
    for reward in [1.0, -1.0, 0.0, 1.0] {
        agent.begin_episode();
        agent.finish_episode(reward);
    }
    agent
}

#[test]
fn test_msgpack_round_trip_preserves_everything() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("nested").join("agent_x.msgpack");

    let agent = trained_agent();
    let repo = MsgPackRepository::new();
    let metadata = TrainingMetadata::for_role(Player::X, 3).with_episodes(4);
    repo.save(&SavedAgent::from_agent(&agent, metadata), &path)
        .expect("Failed to save agent");
    assert!(path.exists(), "Saved file should exist");
    assert!(repo.exists(&path));

    let saved = repo.load(&path).expect("Failed to load agent");
    assert_eq!(saved.version, SavedAgent::<State>::VERSION);
    assert_eq!(saved.metadata.role, Some(Player::X));
    assert_eq!(saved.metadata.episodes_trained, Some(4));

    let loaded = saved.into_agent().unwrap();
    assert_eq!(loaded.q_table(), agent.q_table());
    assert_eq!(loaded.q_table().entry_count(), agent.q_table().entry_count());
    assert_eq!(loaded.stats(), agent.stats());
    assert_eq!(loaded.epsilon(), agent.epsilon());
    assert_eq!(loaded.hyperparameters(), agent.hyperparameters());
    assert_eq!(loaded.hyperparameters().epsilon, 0.8);
}

#[test]
fn test_missing_file_is_model_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing.msgpack");
    let repo = MsgPackRepository::new();

    assert!(!repo.exists(&path));
    assert!(matches!(repo.load(&path), Err(Error::ModelNotFound { .. })));
}

#[test]
fn test_corrupt_file_is_an_error_not_a_fresh_agent() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("corrupt.msgpack");
    std::fs::write(&path, b"definitely not msgpack").unwrap();

    let repo = MsgPackRepository::new();
    let result = load_agent_or_fresh(&repo, &path, || {
        QLearningAgent::new(Hyperparameters::default())
    });
    assert!(matches!(result, Err(Error::SerializationContext { .. })));
}

#[test]
fn test_fresh_agent_when_nothing_saved() {
    let repo = InMemoryRepository::new();
    let agent = load_agent_or_fresh(&repo, "nowhere.msgpack".as_ref(), || {
        QLearningAgent::new(Hyperparameters::default())
    })
    .unwrap();
    assert!(agent.q_table().is_empty());
    assert_eq!(agent.stats().episodes, 0);
}

#[test]
fn test_app_resumes_saved_agent() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("agent.msgpack");
    let app = App::for_testing()
        .with_repository(MsgPackRepository::new())
        .with_default_seed(1)
        .build();

    let agent = trained_agent();
    app.save_agent(&agent, TrainingMetadata::for_role(Player::O, 3), &path)
        .unwrap();

    let resumed = app.load_agent_or_fresh(&path, AgentConfig::new()).unwrap();
    assert_eq!(resumed.q_table(), agent.q_table());
    assert_eq!(resumed.stats().episodes, 4);
    assert!(resumed.epsilon() < resumed.hyperparameters().epsilon);

    let fresh = app
        .load_agent_or_fresh(&temp_dir.path().join("other.msgpack"), AgentConfig::new())
        .unwrap();
    assert!(fresh.q_table().is_empty());
}
