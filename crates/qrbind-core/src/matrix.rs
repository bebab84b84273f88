//! The module matrix produced by a successful encode.

use std::fmt;

/// An immutable square grid of 0/1 cells representing a finished QR
/// symbol.
///
/// A matrix is built by copying cell values out of module memory while
/// the producing scope is still open; once returned it is owned solely
/// by the caller and has no remaining relationship to the module
/// instance or the scope that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix {
    size: usize,
    /// Row-major cells, one byte per module, each 0 or 1.
    cells: Vec<u8>,
}

impl Matrix {
    /// Build a matrix from row-major cells.
    ///
    /// Panics if `cells.len() != size * size` or any cell is not 0/1;
    /// both indicate a read-back bug, not a runtime condition.
    pub fn from_cells(size: usize, cells: Vec<u8>) -> Self {
        assert_eq!(cells.len(), size * size, "cell count must be size^2");
        assert!(cells.iter().all(|&c| c <= 1), "cells must be 0 or 1");
        Matrix { size, cells }
    }

    /// Side length in modules.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the matrix holds no cells.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Cell value at `(x, y)`, where `x` is the column and `y` the row.
    ///
    /// Panics on out-of-bounds coordinates.
    pub fn get(&self, x: usize, y: usize) -> u8 {
        assert!(x < self.size && y < self.size, "cell out of bounds");
        self.cells[y * self.size + x]
    }

    /// Whether the cell at `(x, y)` is dark.
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        self.get(x, y) == 1
    }

    /// The row at index `y` as a slice of 0/1 bytes.
    pub fn row(&self, y: usize) -> &[u8] {
        assert!(y < self.size, "row out of bounds");
        &self.cells[y * self.size..(y + 1) * self.size]
    }

    /// Iterator over rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.cells.chunks_exact(self.size.max(1))
    }

    /// Number of dark cells.
    pub fn dark_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c == 1).count()
    }
}

impl fmt::Display for Matrix {
    /// Renders dark cells as `#` and light cells as `.`, one row per
    /// line. Intended for debugging and test output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for &cell in row {
                f.write_str(if cell == 1 { "#" } else { "." })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}
