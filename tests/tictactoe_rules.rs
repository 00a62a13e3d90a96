//! Rules of the N×N Tic-Tac-Toe environment

use qttt::{
    Error, GameOutcome, Player, State, TicTacToe,
    ports::Environment,
    tictactoe::{Cell, WinningLines},
};

fn play(game: &mut TicTacToe, moves: &[usize]) -> Vec<(f64, bool)> {
    moves
        .iter()
        .map(|&m| {
            let step = game.step(m).expect("legal move");
            (step.reward, step.done)
        })
        .collect()
}

#[test]
fn test_x_wins_top_row() {
    let mut game = TicTacToe::standard();
    let steps = play(&mut game, &[0, 3, 1, 4, 2]);

    assert_eq!(steps[..4], [(0.0, false); 4]);
    assert_eq!(steps[4], (1.0, true));
    assert_eq!(game.outcome(), Some(GameOutcome::Win(Player::X)));
    assert_eq!(game.winner_code(), Some(1));
    assert!(game.legal_actions().is_empty());
}

#[test]
fn test_full_board_draw() {
    let mut game = TicTacToe::standard();
    let steps = play(&mut game, &[0, 1, 2, 4, 3, 5, 7, 6, 8]);

    assert!(steps[..8].iter().all(|&(_, done)| !done));
    assert_eq!(steps[8], (0.0, true));
    assert_eq!(game.outcome(), Some(GameOutcome::Draw));
    assert_eq!(game.winner_code(), Some(0));
}

#[test]
fn test_player_switches_even_on_terminal_step() {
    let mut game = TicTacToe::standard();
    play(&mut game, &[0, 3, 1, 4]);
    assert_eq!(game.current_player(), Player::X);
    game.step(2).unwrap();
    assert_eq!(game.current_player(), Player::O);
}

#[test]
fn test_invalid_actions_are_rejected() {
    let mut game = TicTacToe::standard();
    game.step(4).unwrap();

    let occupied = game.step(4).unwrap_err();
    assert!(matches!(occupied, Error::InvalidMove { position: 4 }));
    assert!(occupied.is_invalid_action());

    let out_of_range = game.step(9).unwrap_err();
    assert!(matches!(out_of_range, Error::InvalidPosition { position: 9, .. }));

    // The rejected moves changed nothing
    assert_eq!(game.legal_actions().len(), 8);
    assert_eq!(game.current_player(), Player::O);
}

#[test]
fn test_moves_after_game_over_fail() {
    let mut game = TicTacToe::standard();
    play(&mut game, &[0, 3, 1, 4, 2]);
    let err = game.step(8).unwrap_err();
    assert!(matches!(err, Error::GameOver));
    assert!(err.is_invalid_action());
}

#[test]
fn test_reset_clears_everything() {
    let mut game = TicTacToe::standard();
    play(&mut game, &[0, 3, 1, 4, 2]);

    let state = game.reset();
    assert_eq!(state, State::empty(3).unwrap());
    assert_eq!(game.outcome(), None);
    assert_eq!(game.current_player(), Player::X);
    assert_eq!(game.legal_actions(), (0..9).collect::<Vec<_>>());
}

#[test]
fn test_larger_boards_need_full_lines() {
    let mut game = TicTacToe::new(4).unwrap();
    // X fills the anti-diagonal of a 4x4 board
    let steps = play(&mut game, &[3, 0, 6, 1, 9, 2, 12]);
    assert_eq!(steps[5], (0.0, false));
    assert_eq!(steps[6], (1.0, true));
    assert_eq!(game.winner(), Some(Player::X));
}

#[test]
fn test_board_size_bounds() {
    assert!(matches!(
        TicTacToe::new(2),
        Err(Error::InvalidBoardSize { size: 2 })
    ));
    assert!(TicTacToe::new(10).is_err());
    for size in 3..=9 {
        let game = TicTacToe::new(size).unwrap();
        assert_eq!(game.legal_actions().len(), size * size);
    }
}

#[test]
fn test_environment_port() {
    fn drive<E: Environment>(env: &mut E) -> usize {
        env.reset();
        let mut steps = 0;
        while !env.is_done() {
            let action = env.legal_actions()[0];
            env.step(action).unwrap();
            steps += 1;
        }
        steps
    }

    // Lowest free cell each turn: X takes 0, 2, 4, 6 and wins on the diagonal
    let mut game = TicTacToe::standard();
    assert_eq!(drive(&mut game), 7);
    assert_eq!(game.winner(), Some(Player::X));
}

#[test]
fn test_winning_moves() {
    let state = State::parse("XX.OO....").unwrap();
    let lines = WinningLines::new(3);
    assert_eq!(lines.winning_moves(state.cells(), Player::X), vec![2]);
    assert_eq!(lines.winning_moves(state.cells(), Player::O), vec![5]);
    assert!(!lines.has_won(state.cells(), Player::X));
    assert_eq!(state.get(0), Some(Cell::X));
}
