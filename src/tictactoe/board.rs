//! Board state representation and basic operations

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Smallest supported board side
pub const MIN_BOARD_SIZE: usize = 3;
/// Largest supported board side
pub const MAX_BOARD_SIZE: usize = 9;

/// A cell on the board
///
/// Serialized as its numeric value (0 = empty, 1 = X, 2 = O) so persisted
/// tables keep the plain integer-sequence state encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Cell {
    Empty,
    X,
    O,
}

impl Cell {
    pub fn value(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::X => 1,
            Cell::O => 2,
        }
    }

    pub fn from_value(value: u8) -> Option<Cell> {
        match value {
            0 => Some(Cell::Empty),
            1 => Some(Cell::X),
            2 => Some(Cell::O),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::X => 'X',
            Cell::O => 'O',
        }
    }

    pub fn from_char(c: char) -> Option<Cell> {
        match c {
            '.' | '_' | '-' | '0' => Some(Cell::Empty),
            'X' | 'x' | '1' => Some(Cell::X),
            'O' | 'o' | '2' => Some(Cell::O),
            _ => None,
        }
    }
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> u8 {
        cell.value()
    }
}

impl TryFrom<u8> for Cell {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        Cell::from_value(value).ok_or_else(|| format!("invalid cell value {value}"))
    }
}

/// A player in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    X,
    O,
}

impl Player {
    /// Get the opponent player
    pub fn opponent(self) -> Player {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// Convert player to cell
    pub fn to_cell(self) -> Cell {
        match self {
            Player::X => Cell::X,
            Player::O => Cell::O,
        }
    }

    /// Numeric mark written into the board (1 for X, 2 for O)
    pub fn mark(self) -> u8 {
        self.to_cell().value()
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_cell().to_char())
    }
}

/// Side length of a square board with `cells` cells, if supported
pub fn board_side(cells: usize) -> Option<usize> {
    (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).find(|side| side * side == cells)
}

/// Immutable snapshot of one board configuration.
///
/// Used as the Q-table key. The cell count is always the square of a
/// supported board side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "Vec<Cell>", try_from = "Vec<Cell>")]
pub struct State {
    cells: Vec<Cell>,
}

impl State {
    /// All-empty state for a board of the given side
    pub fn empty(size: usize) -> Result<Self> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
            return Err(Error::InvalidBoardSize { size });
        }
        Ok(State {
            cells: vec![Cell::Empty; size * size],
        })
    }

    pub(crate) fn from_cells(cells: Vec<Cell>) -> Self {
        debug_assert!(board_side(cells.len()).is_some());
        State { cells }
    }

    /// Build a state from raw cell values (0, 1, 2).
    ///
    /// # Errors
    ///
    /// Returns an error if the length is not a supported square or a value
    /// is outside {0, 1, 2}.
    pub fn from_values(values: &[u8]) -> Result<Self> {
        if board_side(values.len()).is_none() {
            return Err(Error::InvalidStateLength { got: values.len() });
        }
        let cells = values
            .iter()
            .enumerate()
            .map(|(index, &value)| {
                Cell::from_value(value).ok_or(Error::InvalidCellValue { value, index })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(State { cells })
    }

    /// Parse a board written as text, e.g. `"X.O......"` or `"X.O|...|..."`.
    ///
    /// Whitespace and `|` separators are ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let cells = text
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '|')
            .enumerate()
            .map(|(position, c)| {
                Cell::from_char(c).ok_or_else(|| Error::InvalidCellCharacter {
                    character: c,
                    position,
                    context: text.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        if board_side(cells.len()).is_none() {
            return Err(Error::InvalidStateLength { got: cells.len() });
        }
        Ok(State { cells })
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Raw cell values (0 = empty, 1 = X, 2 = O)
    pub fn values(&self) -> Vec<u8> {
        self.cells.iter().map(|c| c.value()).collect()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// No marks placed yet
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|&c| c == Cell::Empty)
    }

    /// Board side length
    pub fn size(&self) -> usize {
        board_side(self.cells.len()).unwrap_or(MIN_BOARD_SIZE)
    }

    pub fn get(&self, pos: usize) -> Option<Cell> {
        self.cells.get(pos).copied()
    }

    /// Indices of empty cells in ascending order
    pub fn empty_positions(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == Cell::Empty)
            .map(|(i, _)| i)
            .collect()
    }

    /// Compact single-line encoding (`X.O......`)
    pub fn encode(&self) -> String {
        self.cells.iter().map(|c| c.to_char()).collect()
    }
}

impl From<State> for Vec<Cell> {
    fn from(state: State) -> Vec<Cell> {
        state.cells
    }
}

impl TryFrom<Vec<Cell>> for State {
    type Error = Error;

    fn try_from(cells: Vec<Cell>) -> Result<Self> {
        if board_side(cells.len()).is_none() {
            return Err(Error::InvalidStateLength { got: cells.len() });
        }
        Ok(State { cells })
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self.size();
        for (row, chunk) in self.cells.chunks(size).enumerate() {
            if row > 0 {
                writeln!(f)?;
            }
            let line: String = chunk.iter().map(|c| c.to_char()).collect();
            write!(f, "{line}")?;
        }
        Ok(())
    }
}
