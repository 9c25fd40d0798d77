//! Grid - fixed-shape (channel, slot) storage
//!
//! Filters, weights and correlation history all share the same shape.
//! Row-major, allocated once, never resized.

use std::ops::{Index, IndexMut};

/// Row-major 2-D container indexed by (channel, slot)
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Create a grid with every cell set to `fill`
    pub fn new(rows: usize, cols: usize, fill: T) -> Self {
        Self {
            rows,
            cols,
            cells: vec![fill; rows * cols],
        }
    }
}

impl<T> Grid<T> {
    /// Build from a row-major vector; None if the length does not match
    pub fn from_vec(rows: usize, cols: usize, cells: Vec<T>) -> Option<Self> {
        (cells.len() == rows * cols).then_some(Self { rows, cols, cells })
    }

    /// Number of rows (channels)
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (slots)
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    fn offset(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    /// Bounds-checked access
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        let i = self.offset(row, col)?;
        Some(&self.cells[i])
    }

    /// Bounds-checked mutable access
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        let i = self.offset(row, col)?;
        Some(&mut self.cells[i])
    }

    /// One row as a slice
    pub fn row(&self, row: usize) -> &[T] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    /// All cells in row-major order
    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    /// All cells in row-major order, mutable
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.cells
    }

    /// Iterate `((row, col), &cell)` in row-major order
    pub fn indexed(&self) -> impl Iterator<Item = ((usize, usize), &T)> {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, c)| ((i / cols, i % cols), c))
    }
}

impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(
            row < self.rows && col < self.cols,
            "grid index ({}, {}) out of bounds {}x{}",
            row,
            col,
            self.rows,
            self.cols
        );
        &self.cells[row * self.cols + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        assert!(
            row < self.rows && col < self.cols,
            "grid index ({}, {}) out of bounds {}x{}",
            row,
            col,
            self.rows,
            self.cols
        );
        &mut self.cells[row * self.cols + col]
    }
}
