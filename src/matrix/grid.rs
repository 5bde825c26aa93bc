//! Fixed-size 2D container addressed by (row, col)

use std::ops::{Index, IndexMut};

/// A `ROWS` x `COLS` grid of copyable cells.
///
/// `get`/`set` are bounds-checked and never panic. `Index`/`IndexMut` with a
/// `(row, col)` tuple behave like slice indexing and are meant for loops that
/// already stay inside the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T, const ROWS: usize, const COLS: usize> {
    cells: [[T; COLS]; ROWS],
}

impl<T: Copy, const ROWS: usize, const COLS: usize> Grid<T, ROWS, COLS> {
    /// Create a grid with every cell set to `value`
    pub fn filled(value: T) -> Self {
        Self {
            cells: [[value; COLS]; ROWS],
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        self.cells.get(row)?.get(col).copied()
    }

    /// Set a cell, returning false (and leaving the grid untouched) when
    /// (row, col) is out of range.
    pub fn set(&mut self, row: usize, col: usize, value: T) -> bool {
        match self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    pub fn fill(&mut self, value: T) {
        for row in self.cells.iter_mut() {
            row.fill(value);
        }
    }

    /// Map a zero-based, row-major linear index to (row, col)
    pub const fn position_of(&self, index: usize) -> Option<(usize, usize)> {
        if COLS == 0 || index >= ROWS * COLS {
            return None;
        }
        Some((index / COLS, index % COLS))
    }

    /// Iterate over every cell in row-major order
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), T)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(move |(col, value)| ((row, col), *value))
        })
    }

    /// Build a new grid of the same shape by applying `f` to every cell
    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> Grid<U, ROWS, COLS> {
        Grid {
            cells: self.cells.map(|row| row.map(&f)),
        }
    }
}

impl<T: Copy + Default, const ROWS: usize, const COLS: usize> Default for Grid<T, ROWS, COLS> {
    fn default() -> Self {
        Self::filled(T::default())
    }
}

impl<T, const ROWS: usize, const COLS: usize> Index<(usize, usize)> for Grid<T, ROWS, COLS> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.cells[row][col]
    }
}

impl<T, const ROWS: usize, const COLS: usize> IndexMut<(usize, usize)> for Grid<T, ROWS, COLS> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        &mut self.cells[row][col]
    }
}
