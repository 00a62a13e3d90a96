//! Tic-Tac-Toe rule engine exposed as an episodic environment

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{
    board::{Cell, MAX_BOARD_SIZE, MIN_BOARD_SIZE, Player, State},
    lines::WinningLines,
};
use crate::{
    Error, Result,
    ports::{Environment, Step},
};

/// Board side used when none is configured
pub const DEFAULT_BOARD_SIZE: usize = 3;

/// Outcome of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    Win(Player),
    Draw,
}

impl GameOutcome {
    /// Numeric winner code: 1 for X, 2 for O, 0 for a draw.
    pub fn code(self) -> u8 {
        match self {
            GameOutcome::Win(player) => player.mark(),
            GameOutcome::Draw => 0,
        }
    }

    pub fn winner(self) -> Option<Player> {
        match self {
            GameOutcome::Win(player) => Some(player),
            GameOutcome::Draw => None,
        }
    }

    /// Terminal reward assigned to `player`: +1 win, -1 loss, 0 draw.
    pub fn reward_for(self, player: Player) -> f64 {
        match self {
            GameOutcome::Win(winner) if winner == player => 1.0,
            GameOutcome::Win(_) => -1.0,
            GameOutcome::Draw => 0.0,
        }
    }
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOutcome::Win(player) => write!(f, "{player} wins"),
            GameOutcome::Draw => write!(f, "draw"),
        }
    }
}

/// N×N Tic-Tac-Toe game: X always opens, players alternate, a full line wins.
#[derive(Debug, Clone)]
pub struct TicTacToe {
    size: usize,
    cells: Vec<Cell>,
    current: Player,
    outcome: Option<GameOutcome>,
    lines: WinningLines,
}

impl TicTacToe {
    /// Create a game on a `size`×`size` board.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBoardSize`] unless `size` is within 3..=9.
    pub fn new(size: usize) -> Result<Self> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
            return Err(Error::InvalidBoardSize { size });
        }
        Ok(Self {
            size,
            cells: vec![Cell::Empty; size * size],
            current: Player::X,
            outcome: None,
            lines: WinningLines::new(size),
        })
    }

    /// The classic 3×3 game
    pub fn standard() -> Self {
        Self {
            size: DEFAULT_BOARD_SIZE,
            cells: vec![Cell::Empty; DEFAULT_BOARD_SIZE * DEFAULT_BOARD_SIZE],
            current: Player::X,
            outcome: None,
            lines: WinningLines::new(DEFAULT_BOARD_SIZE),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Player whose mark the next [`TicTacToe::step`] places
    pub fn current_player(&self) -> Player {
        self.current
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn winner(&self) -> Option<Player> {
        self.outcome.and_then(GameOutcome::winner)
    }

    /// Winner code once the game has ended (1 = X, 2 = O, 0 = draw)
    pub fn winner_code(&self) -> Option<u8> {
        self.outcome.map(GameOutcome::code)
    }

    pub fn lines(&self) -> &WinningLines {
        &self.lines
    }

    pub fn reset(&mut self) -> State {
        self.cells.iter_mut().for_each(|c| *c = Cell::Empty);
        self.current = Player::X;
        self.outcome = None;
        self.state()
    }

    pub fn state(&self) -> State {
        State::from_cells(self.cells.clone())
    }

    /// Indices of empty cells; empty once the game is over.
    pub fn legal_actions(&self) -> Vec<usize> {
        if self.outcome.is_some() {
            return Vec::new();
        }
        self.empty_cells()
    }

    fn empty_cells(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == Cell::Empty)
            .map(|(i, _)| i)
            .collect()
    }

    /// Place the current player's mark on `action`.
    ///
    /// The reward is from the mover's perspective: +1.0 when the move wins,
    /// 0.0 otherwise. The current player switches after every applied move,
    /// including the terminal one.
    ///
    /// # Errors
    ///
    /// - [`Error::GameOver`] if the game already ended
    /// - [`Error::InvalidPosition`] if `action` is off the board
    /// - [`Error::InvalidMove`] if the cell is occupied
    pub fn step(&mut self, action: usize) -> Result<Step<State>> {
        if self.outcome.is_some() {
            return Err(Error::GameOver);
        }
        if action >= self.cells.len() {
            return Err(Error::InvalidPosition {
                position: action,
                cells: self.cells.len(),
            });
        }
        if self.cells[action] != Cell::Empty {
            return Err(Error::InvalidMove { position: action });
        }

        let mover = self.current;
        self.cells[action] = mover.to_cell();

        let reward = if self.lines.has_won(&self.cells, mover) {
            self.outcome = Some(GameOutcome::Win(mover));
            1.0
        } else {
            if !self.cells.contains(&Cell::Empty) {
                self.outcome = Some(GameOutcome::Draw);
            }
            0.0
        };

        self.current = mover.opponent();

        Ok(Step {
            state: self.state(),
            reward,
            done: self.outcome.is_some(),
        })
    }
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self::standard()
    }
}

impl Environment for TicTacToe {
    type State = State;

    fn reset(&mut self) -> State {
        TicTacToe::reset(self)
    }

    fn state(&self) -> State {
        TicTacToe::state(self)
    }

    fn legal_actions(&self) -> Vec<usize> {
        TicTacToe::legal_actions(self)
    }

    fn step(&mut self, action: usize) -> Result<Step<State>> {
        TicTacToe::step(self, action)
    }

    fn is_done(&self) -> bool {
        self.outcome.is_some()
    }
}

impl fmt::Display for TicTacToe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.state())
    }
}
