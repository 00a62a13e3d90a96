//! Tic-Tac-Toe rule engine for N×N boards

pub mod board;
pub mod game;
pub mod lines;

pub use board::{Cell, MAX_BOARD_SIZE, MIN_BOARD_SIZE, Player, State, board_side};
pub use game::{DEFAULT_BOARD_SIZE, GameOutcome, TicTacToe};
pub use lines::WinningLines;
