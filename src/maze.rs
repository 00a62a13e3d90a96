//! Grid maze exposed as a single-agent environment
//!
//! The agent walks from a start cell to a goal cell. Every move costs a small
//! penalty and reaching the goal pays a large reward, so the greedy policy of
//! a trained agent is a short path to the exit.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ports::{Environment, Step},
};

/// Reward for the step that reaches the goal
pub const GOAL_REWARD: f64 = 10.0;
/// Reward for every other step, including bumps into walls
pub const STEP_PENALTY: f64 = -0.1;

/// Grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Movement direction; its index is the action number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn from_action(action: usize) -> Option<Direction> {
        Self::ALL.get(action).copied()
    }

    pub fn action(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}

/// Rectangular maze of walls and open cells.
#[derive(Debug, Clone)]
pub struct Maze {
    walls: Vec<Vec<bool>>,
    start: Position,
    goal: Position,
    position: Position,
}

impl Maze {
    /// Build a maze from a wall grid (`true` = wall).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMaze`] if the grid is empty or ragged, or if
    /// the start or goal lies outside the grid or on a wall.
    pub fn new(walls: Vec<Vec<bool>>, start: Position, goal: Position) -> Result<Self> {
        let cols = walls.first().map(Vec::len).unwrap_or(0);
        if cols == 0 {
            return Err(Error::InvalidMaze {
                message: "grid is empty".to_string(),
            });
        }
        if let Some(row) = walls.iter().position(|row| row.len() != cols) {
            return Err(Error::InvalidMaze {
                message: format!(
                    "row {row} has {} cells, expected {cols}",
                    walls[row].len()
                ),
            });
        }

        let maze = Self {
            walls,
            start,
            goal,
            position: start,
        };
        for (name, pos) in [("start", start), ("goal", goal)] {
            if !maze.is_open(pos) {
                return Err(Error::InvalidMaze {
                    message: format!("{name} {pos} is outside the grid or on a wall"),
                });
            }
        }
        Ok(maze)
    }

    /// Parse a maze drawn as text.
    ///
    /// `#` is a wall, `S` marks the start, `G` the goal and any other
    /// character is open floor. Without markers the start is the first open
    /// cell in reading order and the goal the last one. Lines are padded
    /// with open cells to the width of the longest line.
    pub fn parse(text: &str) -> Result<Self> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();
        let width = lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);

        let mut walls = Vec::with_capacity(lines.len());
        let mut start = None;
        let mut goal = None;
        let mut open = Vec::new();

        for (row, line) in lines.iter().enumerate() {
            let mut cells = vec![false; width];
            for (col, c) in line.chars().enumerate() {
                let pos = Position::new(row, col);
                match c {
                    '#' => cells[col] = true,
                    'S' => start = Some(pos),
                    'G' => goal = Some(pos),
                    _ => {}
                }
            }
            open.extend(
                cells
                    .iter()
                    .enumerate()
                    .filter(|(_, wall)| !**wall)
                    .map(|(col, _)| Position::new(row, col)),
            );
            walls.push(cells);
        }

        let start = start.or_else(|| open.first().copied());
        let goal = goal.or_else(|| open.last().copied());
        match (start, goal) {
            (Some(start), Some(goal)) => Self::new(walls, start, goal),
            _ => Err(Error::InvalidMaze {
                message: "maze has no open cells".to_string(),
            }),
        }
    }

    pub fn rows(&self) -> usize {
        self.walls.len()
    }

    pub fn cols(&self) -> usize {
        self.walls.first().map(Vec::len).unwrap_or(0)
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn goal(&self) -> Position {
        self.goal
    }

    /// Current agent position
    pub fn position(&self) -> Position {
        self.position
    }

    /// Inside the grid and not a wall
    pub fn is_open(&self, pos: Position) -> bool {
        self.walls
            .get(pos.row)
            .and_then(|row| row.get(pos.col))
            .is_some_and(|wall| !wall)
    }

    fn neighbor(&self, direction: Direction) -> Option<Position> {
        let Position { row, col } = self.position;
        let next = match direction {
            Direction::Up => Position::new(row.checked_sub(1)?, col),
            Direction::Down => Position::new(row + 1, col),
            Direction::Left => Position::new(row, col.checked_sub(1)?),
            Direction::Right => Position::new(row, col + 1),
        };
        self.is_open(next).then_some(next)
    }

    /// Move the agent one cell.
    ///
    /// Moving into a wall or off the grid leaves the agent in place and
    /// still costs the step penalty.
    ///
    /// # Errors
    ///
    /// - [`Error::GameOver`] once the goal has been reached
    /// - [`Error::InvalidAction`] for an action outside 0..4
    pub fn step(&mut self, action: usize) -> Result<Step<Position>> {
        if self.position == self.goal {
            return Err(Error::GameOver);
        }
        let direction = Direction::from_action(action).ok_or(Error::InvalidAction {
            action,
            available: Direction::ALL.len(),
        })?;

        if let Some(next) = self.neighbor(direction) {
            self.position = next;
        }

        let done = self.position == self.goal;
        Ok(Step {
            state: self.position,
            reward: if done { GOAL_REWARD } else { STEP_PENALTY },
            done,
        })
    }

    /// Render the maze with the given path marked by `*`
    pub fn render_path(&self, path: &[Position]) -> String {
        self.render(|pos| path.contains(&pos).then_some('*'))
    }

    fn render(&self, overlay: impl Fn(Position) -> Option<char>) -> String {
        let mut out = String::new();
        for (row, cells) in self.walls.iter().enumerate() {
            if row > 0 {
                out.push('\n');
            }
            for (col, &wall) in cells.iter().enumerate() {
                let pos = Position::new(row, col);
                let c = if pos == self.goal {
                    'G'
                } else if pos == self.position {
                    '@'
                } else if wall {
                    '#'
                } else {
                    overlay(pos).unwrap_or('.')
                };
                out.push(c);
            }
        }
        out
    }
}

impl Environment for Maze {
    type State = Position;

    fn reset(&mut self) -> Position {
        self.position = self.start;
        self.position
    }

    fn state(&self) -> Position {
        self.position
    }

    fn legal_actions(&self) -> Vec<usize> {
        if self.is_done() {
            return Vec::new();
        }
        Direction::ALL.iter().map(|d| d.action()).collect()
    }

    fn step(&mut self, action: usize) -> Result<Step<Position>> {
        Maze::step(self, action)
    }

    fn is_done(&self) -> bool {
        self.position == self.goal
    }
}

impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(|_| None))
    }
}
