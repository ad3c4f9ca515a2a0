//! Tray grid addressing
//!
//! Linear index `i` maps to `row = i / PNP_COLS`, `col = i % PNP_COLS`.
//! Cell (0, 0) sits at the tray origin; columns step toward -X and rows
//! toward -Y.

use crate::config::machine::{
    PNP_COLS, PNP_COL_PITCH_IN, PNP_ORIGIN_X_IN, PNP_ORIGIN_Y_IN, PNP_ROWS, PNP_ROW_PITCH_IN,
};
use crate::motion::inches_to_steps;

use super::PnpError;

/// Number of cells in the tray
pub const GRID_CELLS: usize = PNP_ROWS * PNP_COLS;

/// One tray cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
}

impl GridCell {
    pub fn new(row: usize, col: usize) -> Result<Self, PnpError> {
        if row < PNP_ROWS && col < PNP_COLS {
            Ok(Self { row, col })
        } else {
            Err(PnpError::InvalidGridIndex)
        }
    }

    pub fn from_index(index: usize) -> Result<Self, PnpError> {
        Self::new(index / PNP_COLS, index % PNP_COLS)
    }

    pub fn index(&self) -> usize {
        self.row * PNP_COLS + self.col
    }

    /// Cell centre in inches
    pub fn position_in(&self) -> (f32, f32) {
        (
            PNP_ORIGIN_X_IN - self.col as f32 * PNP_COL_PITCH_IN,
            PNP_ORIGIN_Y_IN - self.row as f32 * PNP_ROW_PITCH_IN,
        )
    }

    /// Cell centre in steps
    pub fn position_steps(&self) -> (i32, i32) {
        let (x, y) = self.position_in();
        (inches_to_steps(x), inches_to_steps(y))
    }
}

/// Order in which cells are filled
///
/// The defaults fill the right-hand column of each row: 1, 3, 5, 7, 9.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PnpSequence {
    pub first: usize,
    pub stride: usize,
}

impl Default for PnpSequence {
    fn default() -> Self {
        Self {
            first: 1,
            stride: 2,
        }
    }
}

impl PnpSequence {
    /// Placement after `index` is outside the tray
    pub fn is_final(&self, index: usize) -> bool {
        index + self.stride.max(1) >= GRID_CELLS
    }

    pub fn next(&self, index: usize) -> usize {
        index + self.stride.max(1)
    }

    /// Placements in one full tray
    pub fn total(&self) -> usize {
        if self.first >= GRID_CELLS {
            0
        } else {
            (GRID_CELLS - self.first).div_ceil(self.stride.max(1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_origin_cell() {
        let cell = GridCell::from_index(0).unwrap();
        assert_eq!(cell, GridCell { row: 0, col: 0 });
        assert_eq!(cell.position_in(), (16.75, 32.4));
    }

    #[test]
    fn test_index_one_is_second_column() {
        let cell = GridCell::from_index(1).unwrap();
        assert_eq!(cell, GridCell { row: 0, col: 1 });
        let (x, y) = cell.position_in();
        assert!((x - 7.35).abs() < 1e-4);
        assert!((y - 32.4).abs() < 1e-4);
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(GridCell::from_index(GRID_CELLS), Err(PnpError::InvalidGridIndex));
        assert_eq!(GridCell::new(0, PNP_COLS), Err(PnpError::InvalidGridIndex));
    }

    #[test]
    fn test_default_sequence() {
        let seq = PnpSequence::default();
        assert_eq!(seq.total(), 5);

        let mut visited = heapless::Vec::<usize, 8>::new();
        let mut i = seq.first;
        loop {
            visited.push(i).unwrap();
            if seq.is_final(i) {
                break;
            }
            i = seq.next(i);
        }
        assert_eq!(visited.as_slice(), &[1, 3, 5, 7, 9]);
    }

    #[test]
    fn test_dense_sequence() {
        let seq = PnpSequence { first: 0, stride: 1 };
        assert_eq!(seq.total(), GRID_CELLS);
        assert!(seq.is_final(GRID_CELLS - 1));
        assert!(!seq.is_final(GRID_CELLS - 2));
    }

    proptest! {
        #[test]
        fn prop_cell_coordinates(row in 0usize..PNP_ROWS, col in 0usize..PNP_COLS) {
            let cell = GridCell::new(row, col).unwrap();
            prop_assert_eq!(GridCell::from_index(cell.index()).unwrap(), cell);

            let (x, y) = cell.position_in();
            prop_assert!((x - (PNP_ORIGIN_X_IN - col as f32 * PNP_COL_PITCH_IN)).abs() < 1e-4);
            prop_assert!((y - (PNP_ORIGIN_Y_IN - row as f32 * PNP_ROW_PITCH_IN)).abs() < 1e-4);

            let (sx, sy) = cell.position_steps();
            prop_assert_eq!(sx, inches_to_steps(x));
            prop_assert_eq!(sy, inches_to_steps(y));
        }
    }
}
