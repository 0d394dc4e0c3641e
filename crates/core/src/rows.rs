//! Row scanner - full-line detection over a spatial occupancy query.

use crate::types::CellPos;

/// Spatial query listing the occupants that overlap a row.
pub trait Occupancy {
    fn visit_row(&self, y: i8, visit: &mut dyn FnMut(CellPos));
}

/// Detects completed rows of a fixed width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowScanner {
    width: usize,
}

/// A completed row and the occupants that fill it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullRow {
    pub y: i8,
    pub cells: Vec<CellPos>,
}

impl RowScanner {
    pub fn new(width: usize) -> Self {
        Self { width }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// The occupants of row `y` if their count is exactly the target width.
    ///
    /// More occupants than the width means something is passing through the
    /// row, which does not count as full.
    pub fn scan<O: Occupancy + ?Sized>(&self, occupancy: &O, y: i8) -> Option<Vec<CellPos>> {
        let mut found = Vec::with_capacity(self.width);
        occupancy.visit_row(y, &mut |pos| found.push(pos));
        (found.len() == self.width).then_some(found)
    }

    /// Scan rows `0..height`, top to bottom.
    pub fn full_rows<O: Occupancy + ?Sized>(&self, occupancy: &O, height: u8) -> Vec<FullRow> {
        (0..height as i8)
            .filter_map(|y| self.scan(occupancy, y).map(|cells| FullRow { y, cells }))
            .collect()
    }
}
