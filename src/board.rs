use ndarray::Array2;

use crate::constants::{BOARD_HEIGHT, BOARD_WIDTH};
use crate::tetromino::{Piece, Tetromino};

/// The playfield, row-major with row 0 at the top. The first few rows are
/// the hidden spawn buffer and never drawn.
#[derive(Debug, Clone)]
pub struct Board {
    cells: Array2<Option<Tetromino>>,
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: Array2::from_elem([BOARD_HEIGHT, BOARD_WIDTH], None),
        }
    }

    // Board edges count as collisions, so callers can probe a move and roll
    // it back without a separate bounds check.
    pub fn collides(&self, piece: &Piece) -> bool {
        piece.cells().any(|(x, y)| {
            x < 0
                || x >= BOARD_WIDTH as i32
                || y < 0
                || y >= BOARD_HEIGHT as i32
                || self.cells[[y as usize, x as usize]].is_some()
        })
    }

    pub fn place(&mut self, piece: &Piece) {
        for (x, y) in piece.cells() {
            self.cells[[y as usize, x as usize]] = Some(piece.kind);
        }
    }

    /// Indices of completely filled rows, top to bottom.
    pub fn full_rows(&self) -> Vec<usize> {
        self.cells
            .rows()
            .into_iter()
            .enumerate()
            .filter_map(|(y, row)| row.iter().all(|cell| cell.is_some()).then_some(y))
            .collect()
    }

    pub fn clear_rows(&mut self, rows: &[usize]) {
        for &row in rows {
            for y in (1..=row).rev() {
                for x in 0..BOARD_WIDTH {
                    self.cells[[y, x]] = self.cells[[y - 1, x]];
                }
            }
            for x in 0..BOARD_WIDTH {
                self.cells[[0, x]] = None;
            }
        }
    }

    pub fn filled(&self) -> impl Iterator<Item = (usize, usize, Tetromino)> + '_ {
        self.cells
            .indexed_iter()
            .filter_map(|((y, x), cell)| cell.map(|kind| (x, y, kind)))
    }

    #[cfg(test)]
    pub fn cell(&self, x: usize, y: usize) -> Option<Tetromino> {
        self.cells[[y, x]]
    }

    #[cfg(test)]
    pub fn set(&mut self, x: usize, y: usize, kind: Tetromino) {
        self.cells[[y, x]] = Some(kind);
    }

    #[cfg(test)]
    pub fn fill_row(&mut self, y: usize, kind: Tetromino) {
        for x in 0..BOARD_WIDTH {
            self.set(x, y, kind);
        }
    }
}
