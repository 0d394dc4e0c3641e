//! Board module - settled cells and the playfield walls
//!
//! The board is a 10x20 grid where each cell can be empty or hold a settled
//! cell of some shape. Uses a flat array for cache locality and zero-allocation.
//! Coordinates: (x, y) where x ranges 0..9 (left to right), y ranges 0..19 (top to bottom).
//!
//! The active piece is never stored here; it lives in [`crate::piece::Piece`]
//! until it terminates and is decomposed with [`Board::place_cells`].
//! Space above row 0 is open: a piece may extend there, but anything left
//! above the top when it settles is discarded.

use crate::rows::Occupancy;
use crate::types::{Cell, CellPos, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};

/// Total number of cells on the board
const BOARD_SIZE: usize = (BOARD_WIDTH as usize) * (BOARD_HEIGHT as usize);

/// Answers whether a single cell may be occupied by the active piece.
pub trait CollisionQuery {
    fn is_free(&self, pos: CellPos) -> bool;

    /// Whether every cell, displaced by `offset`, is free.
    fn fits(&self, cells: &[CellPos], offset: (i8, i8)) -> bool {
        cells
            .iter()
            .all(|&(x, y)| self.is_free((x + offset.0, y + offset.1)))
    }
}

/// The game board - 10 columns x 20 rows using flat array storage
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [Cell; BOARD_SIZE],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [None; BOARD_SIZE],
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= BOARD_WIDTH as i8 || y < 0 || y >= BOARD_HEIGHT as i8 {
            return None;
        }
        Some((y as usize) * (BOARD_WIDTH as usize) + (x as usize))
    }

    pub fn width(&self) -> u8 {
        BOARD_WIDTH
    }

    pub fn height(&self) -> u8 {
        BOARD_HEIGHT
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    /// Fill every column of row `y` except those in `gaps`.
    pub fn fill_row_except(&mut self, y: i8, gaps: &[i8], kind: PieceKind) {
        for x in 0..BOARD_WIDTH as i8 {
            if !gaps.contains(&x) {
                self.set(x, y, Some(kind));
            }
        }
    }

    /// Decompose a piece into settled cells.
    ///
    /// Returns how many cells landed on the board; cells above the top or
    /// outside the walls are dropped.
    pub fn place_cells(&mut self, cells: &[CellPos], kind: PieceKind) -> usize {
        let mut placed = 0;
        for &(x, y) in cells {
            if self.set(x, y, Some(kind)) {
                placed += 1;
            }
        }
        placed
    }

    /// Remove the given rows and drop every surviving cell by the number of
    /// removed rows strictly below it.
    ///
    /// Cells on a removed row are destroyed, never shifted.
    pub fn clear_rows(&mut self, rows: &[i8]) -> usize {
        let width = BOARD_WIDTH as usize;
        let mut next = [None; BOARD_SIZE];
        let mut cleared = 0;

        for y in 0..BOARD_HEIGHT as i8 {
            if rows.contains(&y) {
                cleared += 1;
                continue;
            }
            let below = rows.iter().filter(|&&r| r > y).count();
            let src = y as usize * width;
            let dst = (y as usize + below) * width;
            next[dst..dst + width].copy_from_slice(&self.cells[src..src + width]);
        }

        self.cells = next;
        cleared
    }

    /// Number of settled cells
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Convert to 2D vector for testing/display
    #[cfg(test)]
    pub fn to_cells(&self) -> Vec<Vec<Cell>> {
        let width = BOARD_WIDTH as usize;
        (0..BOARD_HEIGHT as usize)
            .map(|y| {
                let start = y * width;
                let end = start + width;
                self.cells[start..end].to_vec()
            })
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionQuery for Board {
    /// Inside the walls, above the floor, and not on a settled cell.
    fn is_free(&self, (x, y): CellPos) -> bool {
        if x < 0 || x >= BOARD_WIDTH as i8 || y >= BOARD_HEIGHT as i8 {
            return false;
        }
        y < 0 || !self.is_occupied(x, y)
    }
}

impl Occupancy for Board {
    fn visit_row(&self, y: i8, visit: &mut dyn FnMut(CellPos)) {
        for x in 0..BOARD_WIDTH as i8 {
            if self.is_occupied(x, y) {
                visit((x, y));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_index_calculation() {
        assert_eq!(Board::index(0, 0), Some(0));
        assert_eq!(Board::index(9, 0), Some(9));
        assert_eq!(Board::index(0, 1), Some(10));
        assert_eq!(Board::index(9, 19), Some(199));
        assert_eq!(Board::index(-1, 0), None);
        assert_eq!(Board::index(10, 0), None);
        assert_eq!(Board::index(0, 20), None);
    }

    #[test]
    fn test_walls_floor_and_open_top() {
        let mut board = Board::new();
        assert!(board.is_free((0, 0)));
        assert!(board.is_free((9, 19)));
        assert!(board.is_free((4, -3)));
        assert!(!board.is_free((-1, 5)));
        assert!(!board.is_free((10, 5)));
        assert!(!board.is_free((10, -1)));
        assert!(!board.is_free((3, 20)));

        board.set(3, 7, Some(PieceKind::T));
        assert!(!board.is_free((3, 7)));
        assert!(board.fits(&[(3, 6), (4, 7)], (0, 0)));
        assert!(!board.fits(&[(3, 6), (4, 7)], (0, 1)));
    }

    #[test]
    fn test_place_cells_drops_cells_above_top() {
        let mut board = Board::new();
        let placed = board.place_cells(&[(4, -1), (4, 0), (4, 1), (5, 1)], PieceKind::J);
        assert_eq!(placed, 3);
        assert_eq!(board.occupied_count(), 3);
        assert_eq!(board.get(4, 0), Some(Some(PieceKind::J)));
    }

    #[test]
    fn test_clear_single_row_shifts_only_cells_above() {
        let mut board = Board::new();
        board.fill_row_except(18, &[], PieceKind::I);
        board.set(2, 17, Some(PieceKind::T));
        board.set(7, 19, Some(PieceKind::O));

        assert_eq!(board.clear_rows(&[18]), 1);

        // Above moved down one.
        assert_eq!(board.get(2, 18), Some(Some(PieceKind::T)));
        assert_eq!(board.get(2, 17), Some(None));
        // Below untouched.
        assert_eq!(board.get(7, 19), Some(Some(PieceKind::O)));
        assert_eq!(board.occupied_count(), 2);
    }

    #[test]
    fn test_clear_non_adjacent_rows_shifts_per_cell() {
        let mut board = Board::new();
        board.fill_row_except(19, &[], PieceKind::I);
        board.fill_row_except(17, &[], PieceKind::I);
        board.set(0, 18, Some(PieceKind::S)); // one cleared row below
        board.set(0, 16, Some(PieceKind::Z)); // two cleared rows below

        assert_eq!(board.clear_rows(&[17, 19]), 2);

        assert_eq!(board.get(0, 19), Some(Some(PieceKind::S)));
        assert_eq!(board.get(0, 18), Some(Some(PieceKind::Z)));
        assert_eq!(board.occupied_count(), 2);
    }

    #[test]
    fn test_clear_no_rows_is_identity() {
        let mut board = Board::new();
        board.set(1, 1, Some(PieceKind::L));
        let before = board.to_cells();
        assert_eq!(board.clear_rows(&[]), 0);
        assert_eq!(board.to_cells(), before);
    }
}
