//! End-to-end runs of the command implementations

use clap::Parser;
use qttt::{
    State,
    adapters::MsgPackRepository,
    app::App,
    cli::commands::{
        evaluate::{self, EvaluateArgs},
        inspect::inspect_board,
        train::{self, TrainArgs},
    },
    pipeline::TrainingReport,
    ports::ModelRepository,
};
use tempfile::tempdir;

fn train_args(dir: &std::path::Path, extra: &[&str]) -> TrainArgs {
    let models = dir.join("models");
    let stats = dir.join("stats");
    let mut args = vec![
        "train".to_string(),
        "--episodes".into(),
        "400".into(),
        "--stats-interval".into(),
        "100".into(),
        "--checkpoint-interval".into(),
        "200".into(),
        "--eval-games".into(),
        "20".into(),
        "--seed".into(),
        "5".into(),
        "--model-dir".into(),
        models.display().to_string(),
        "--stats-dir".into(),
        stats.display().to_string(),
        "--no-progress".into(),
    ];
    args.extend(extra.iter().map(|s| s.to_string()));
    TrainArgs::parse_from(args)
}

#[test]
fn test_train_writes_models_and_statistics() {
    let tmp = tempdir().unwrap();
    let csv_path = tmp.path().join("history.csv");
    let args = train_args(tmp.path(), &["--history-csv", csv_path.to_str().unwrap()]);

    let (report, stats_path) = train::run(&App::new(), &args).expect("training should succeed");

    assert_eq!(
        stats_path,
        tmp.path().join("stats").join("training_400_episodes.json")
    );
    let loaded = TrainingReport::load(&stats_path).unwrap();
    assert_eq!(loaded.episodes, report.episodes);
    assert_eq!(loaded.history.len(), 4);
    assert_eq!(loaded.agent_x.known_states, report.agent_x.known_states);
    assert_eq!(loaded.evaluation.map(|e| e.games), Some(20));

    let contents = std::fs::read_to_string(&stats_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed["episodes"], 400);

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv.lines().count(), 5);

    let models = tmp.path().join("models");
    for name in [
        "agent_x_checkpoint_200.msgpack",
        "agent_o_checkpoint_400.msgpack",
        "agent_x_final_400.msgpack",
        "agent_o_final_400.msgpack",
    ] {
        assert!(models.join(name).exists(), "missing {name}");
    }
}

#[test]
fn test_train_resumes_and_evaluates_saved_agents() {
    let tmp = tempdir().unwrap();
    train::run(&App::new(), &train_args(tmp.path(), &[])).unwrap();

    let models = tmp.path().join("models");
    let final_x = models.join("agent_x_final_400.msgpack");
    let final_o = models.join("agent_o_final_400.msgpack");

    let resumed_dir = tmp.path().join("resumed");
    let args = train_args(
        &resumed_dir,
        &[
            "--resume-x",
            final_x.to_str().unwrap(),
            "--resume-o",
            final_o.to_str().unwrap(),
        ],
    );
    let (report, _) = train::run(&App::new(), &args).unwrap();
    // Statistics continue from the saved agents
    assert_eq!(report.agent_x.episodes, 800);
    assert_eq!(report.agent_o.episodes, 800);

    let result = evaluate::run(
        &App::new(),
        &EvaluateArgs::parse_from([
            "evaluate",
            final_x.to_str().unwrap(),
            final_o.to_str().unwrap(),
            "--games",
            "30",
            "--seed",
            "2",
        ]),
    )
    .unwrap();
    assert_eq!(result.games, 30);
    assert_eq!(result.x_wins + result.o_wins + result.draws, 30);

    // Evaluation never writes back to the models
    let saved = MsgPackRepository::new().load(&final_x).unwrap();
    assert_eq!(saved.into_agent().unwrap().stats().episodes, 400);
}

#[test]
fn test_invalid_configuration_is_rejected() {
    let tmp = tempdir().unwrap();
    let args = train_args(tmp.path(), &["--board-size", "12"]);
    assert!(train::run(&App::new(), &args).is_err());

    let args = train_args(tmp.path(), &["--alpha", "2.0"]);
    assert!(train::run(&App::new(), &args).is_err());
}

#[test]
fn test_config_file_with_overrides() {
    let tmp = tempdir().unwrap();
    let config_path = tmp.path().join("trainer.json");
    std::fs::write(
        &config_path,
        r#"{ "board_size": 4, "episodes": 50, "hyperparameters": { "learning_rate": 0.2 } }"#,
    )
    .unwrap();

    let args = TrainArgs::parse_from([
        "train",
        "--config",
        config_path.to_str().unwrap(),
        "--episodes",
        "30",
    ]);
    let config = args.resolve_config().unwrap();
    assert_eq!(config.board_size, 4);
    assert_eq!(config.episodes, 30);
    assert_eq!(config.hyperparameters.learning_rate, 0.2);
    assert_eq!(config.hyperparameters.discount_factor, 0.9);
}

#[test]
fn test_inspect_reads_trained_values() {
    let tmp = tempdir().unwrap();
    train::run(&App::new(), &train_args(tmp.path(), &[])).unwrap();

    let path = tmp.path().join("models").join("agent_x_final_400.msgpack");
    let agent = App::new().load_agent(&path).unwrap();
    let empty = State::parse(".........").unwrap();

    let inspection = inspect_board(&agent, &empty);
    assert_eq!(inspection.values.len(), 9);
    assert!(!inspection.best.is_empty());
    assert!(inspection.winning_moves.is_empty());
    // X has opened the game many times
    assert!(inspection.values.iter().any(|&(_, q)| q != 0.0));
}
