//! Inspect command - Show what a saved agent has learned

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use crate::{
    app::App,
    cli::output::{
        format_board_values, format_number, format_percent, print_section, print_stats_table,
        print_subsection,
    },
    q_learning::QLearningAgent,
    tictactoe::{Cell, Player, State, WinningLines},
};

#[derive(Parser, Debug)]
#[command(about = "Show statistics of a saved agent and its values for a board")]
pub struct InspectArgs {
    /// Saved model
    pub model: PathBuf,

    /// Board to score, e.g. `X.O......` (`.` empty, `X`, `O`)
    #[arg(long, short = 'b')]
    pub board: Option<String>,
}

/// Learned values for one board
#[derive(Debug, Clone, PartialEq)]
pub struct BoardInspection {
    pub to_move: Player,
    /// Recorded value of every empty cell (0.0 if never tried)
    pub values: Vec<(usize, f64)>,
    /// Empty cells with the highest value
    pub best: Vec<usize>,
    /// Cells that complete a line for the player to move
    pub winning_moves: Vec<usize>,
    /// Cells the opponent would complete a line with
    pub blocking_moves: Vec<usize>,
}

/// X moves whenever both sides have placed the same number of marks
pub fn player_to_move(state: &State) -> Player {
    let count = |cell| state.cells().iter().filter(|&&c| c == cell).count();
    if count(Cell::X) > count(Cell::O) {
        Player::O
    } else {
        Player::X
    }
}

pub fn inspect_board(agent: &QLearningAgent, state: &State) -> BoardInspection {
    let values: Vec<(usize, f64)> = state
        .empty_positions()
        .into_iter()
        .map(|pos| (pos, agent.q_table().value_or_default(state, pos)))
        .collect();
    let max = values
        .iter()
        .map(|&(_, q)| q)
        .fold(f64::NEG_INFINITY, f64::max);
    let best = values
        .iter()
        .filter(|&&(_, q)| q == max)
        .map(|&(pos, _)| pos)
        .collect();

    let to_move = player_to_move(state);
    let lines = WinningLines::new(state.size());
    BoardInspection {
        to_move,
        values,
        best,
        winning_moves: lines.winning_moves(state.cells(), to_move),
        blocking_moves: lines.winning_moves(state.cells(), to_move.opponent()),
    }
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let app = App::new();
    let saved = app
        .model_repository()
        .load(&args.model)
        .with_context(|| format!("Failed to load {}", args.model.display()))?;
    let metadata = saved.metadata.clone();
    let agent = saved.into_agent()?;
    let stats = agent.stats();
    let hyper = agent.hyperparameters();

    print_section(&format!("Agent {}", args.model.display()));
    print_stats_table(&[
        (
            "Role",
            &metadata
                .role
                .map_or_else(|| "unknown".to_string(), |p| p.to_string()),
        ),
        (
            "Board",
            &metadata
                .board_size
                .map_or_else(|| "unknown".to_string(), |s| format!("{s}x{s}")),
        ),
        ("Episodes", &format_number(stats.episodes)),
        ("Win rate", &format_percent(stats.win_rate())),
        ("Draw rate", &format_percent(stats.draw_rate())),
        ("Loss rate", &format_percent(stats.loss_rate())),
        ("Known states", &format_number(agent.known_states())),
        ("Q-values", &format_number(agent.q_table().entry_count())),
        ("Alpha / Gamma", &format!("{} / {}", hyper.learning_rate, hyper.discount_factor)),
        ("Epsilon", &format!("{:.4}", agent.epsilon())),
    ]);

    let Some(board) = &args.board else {
        return Ok(());
    };
    let state = State::parse(board).with_context(|| format!("Invalid board '{board}'"))?;
    if let Some(size) = metadata.board_size
        && size != state.size()
    {
        bail!(
            "Board is {0}x{0} but the agent was trained on {size}x{size}",
            state.size()
        );
    }

    let inspection = inspect_board(&agent, &state);
    print_subsection(&format!("{} to move", inspection.to_move));
    println!("{}", format_board_values(&state, &inspection.values));
    println!();
    print_stats_table(&[
        ("Best moves", &format!("{:?}", inspection.best)),
        ("Winning moves", &format!("{:?}", inspection.winning_moves)),
        ("Blocking moves", &format!("{:?}", inspection.blocking_moves)),
        (
            "State known",
            &agent.q_table().actions(&state).is_some().to_string(),
        ),
    ]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::q_learning::Hyperparameters;

    #[test]
    fn test_player_to_move() {
        assert_eq!(player_to_move(&State::parse(".........").unwrap()), Player::X);
        assert_eq!(player_to_move(&State::parse("X........").unwrap()), Player::O);
        assert_eq!(player_to_move(&State::parse("X...O....").unwrap()), Player::X);
    }

    #[test]
    fn test_inspect_board() {
        let state = State::parse("XX.OO....").unwrap();
        let mut agent = QLearningAgent::new(Hyperparameters::default());
        agent.q_table_mut().set(state.clone(), 2, 0.9);
        agent.q_table_mut().set(state.clone(), 5, 0.4);

        let inspection = inspect_board(&agent, &state);
        assert_eq!(inspection.to_move, Player::X);
        assert_eq!(inspection.values.len(), 5);
        assert_eq!(inspection.best, vec![2]);
        assert_eq!(inspection.winning_moves, vec![2]);
        assert_eq!(inspection.blocking_moves, vec![5]);
        // Pure lookups only
        assert_eq!(agent.q_table().entry_count(), 2);
    }
}
