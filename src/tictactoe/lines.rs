//! Winning line analysis for N×N boards

use super::{Cell, Player};

/// Every winning line of an N×N board: N rows, N columns and both diagonals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinningLines {
    size: usize,
    lines: Vec<Vec<usize>>,
}

impl WinningLines {
    pub fn new(size: usize) -> Self {
        let mut lines = Vec::with_capacity(2 * size + 2);
        for row in 0..size {
            lines.push((0..size).map(|col| row * size + col).collect());
        }
        for col in 0..size {
            lines.push((0..size).map(|row| row * size + col).collect());
        }
        lines.push((0..size).map(|i| i * size + i).collect());
        lines.push((0..size).map(|i| i * size + (size - 1 - i)).collect());
        Self { size, lines }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn lines(&self) -> &[Vec<usize>] {
        &self.lines
    }

    /// Check if a player owns every cell of at least one line
    pub fn has_won(&self, cells: &[Cell], player: Player) -> bool {
        let target = player.to_cell();
        self.lines
            .iter()
            .any(|line| line.iter().all(|&idx| cells[idx] == target))
    }

    /// Positions that would immediately complete a line for the player
    pub fn winning_moves(&self, cells: &[Cell], player: Player) -> Vec<usize> {
        let mut moves: Vec<usize> = self
            .lines
            .iter()
            .filter_map(|line| Self::winning_move_in_line(cells, player, line))
            .collect();
        moves.sort_unstable();
        moves.dedup();
        moves
    }

    fn winning_move_in_line(cells: &[Cell], player: Player, line: &[usize]) -> Option<usize> {
        let target = player.to_cell();
        let mut empty_pos = None;

        for &idx in line {
            match cells[idx] {
                Cell::Empty => {
                    if empty_pos.is_some() {
                        return None;
                    }
                    empty_pos = Some(idx);
                }
                c if c == target => {}
                _ => return None,
            }
        }

        empty_pos
    }
}
