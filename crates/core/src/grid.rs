//! Grid module - the locked-cell matrix
//!
//! The grid is `width x height` cells stored in a flat row-major vector.
//! Coordinates: (x, y) where x grows left to right and y grows top to bottom;
//! row 0 is the top row. Cells hold a color code, `0` means empty.
//!
//! The grid knows nothing about timers, commands or scoring. It answers
//! collision queries, merges locked pieces and clears full rows.

use crate::pieces::Piece;
use crate::types::{Block, BoardSize, Cell, EMPTY_CELL};

/// The locked-cell matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    /// Flat array of cells, row-major order (y * width + x)
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a new empty grid
    pub fn new(size: BoardSize) -> Self {
        Self {
            width: size.width(),
            height: size.height(),
            cells: vec![EMPTY_CELL; size.area()],
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check whether a set of blocks may sit on the board.
    ///
    /// A block above the board (`y < 0`) is always accepted and never looked
    /// up. Any other block must lie inside the board on an empty cell.
    pub fn is_valid_position(&self, blocks: &[Block]) -> bool {
        blocks.iter().all(|b| {
            if b.y < 0 {
                return true;
            }
            matches!(self.get(b.x, b.y), Some(EMPTY_CELL))
        })
    }

    /// Merge blocks into the grid, writing each block's color.
    ///
    /// Blocks outside the board are skipped.
    pub fn place(&mut self, blocks: &[Block]) {
        for b in blocks {
            self.set(b.x, b.y, b.color);
        }
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        self.row(y)
            .map(|row| row.iter().all(|&cell| cell != EMPTY_CELL))
            .unwrap_or(false)
    }

    /// Cells of row `y`, or None if out of bounds
    pub fn row(&self, y: usize) -> Option<&[Cell]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        Some(&self.cells[start..start + self.width])
    }

    /// Iterate rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width)
    }

    /// Clear row `y` and shift every row above it down by one.
    /// Row 0 is left empty.
    fn clear_row(&mut self, y: usize) {
        let width = self.width;

        for cell in &mut self.cells[y * width..(y + 1) * width] {
            *cell = EMPTY_CELL;
        }

        // copy_within handles the overlapping ranges
        for row in (1..=y).rev() {
            let src_start = (row - 1) * width;
            self.cells
                .copy_within(src_start..src_start + width, row * width);
        }

        for cell in &mut self.cells[..width] {
            *cell = EMPTY_CELL;
        }
    }

    /// Clear every full row and return how many were cleared.
    ///
    /// Rows are scanned top to bottom. Clearing a row only moves the rows
    /// above it, so rows further down keep their indices and the scan stays
    /// correct in a single pass.
    pub fn clear_full_lines(&mut self) -> usize {
        let mut cleared = 0;
        for y in 0..self.height {
            if self.is_row_full(y) {
                self.clear_row(y);
                cleared += 1;
            }
        }
        cleared
    }

    /// Locked cells overlaid with `active`'s blocks, row-major.
    ///
    /// Active blocks win over locked cells; blocks off the board are skipped.
    /// For display only.
    pub fn overlay(&self, active: Option<&Piece>) -> Vec<Cell> {
        let mut out = self.cells.clone();
        if let Some(piece) = active {
            for b in piece.blocks() {
                if let Some(idx) = self.index(b.x, b.y) {
                    out[idx] = b.color;
                }
            }
        }
        out
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of occupied cells
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c != EMPTY_CELL).count()
    }

    /// Build a grid from rows of cells, top row first.
    ///
    /// Returns None if the rows are empty or ragged.
    pub fn from_rows(rows: &[Vec<Cell>]) -> Option<Self> {
        let height = rows.len();
        let width = rows.first()?.len();
        if width == 0 || rows.iter().any(|r| r.len() != width) {
            return None;
        }
        Some(Self {
            width,
            height,
            cells: rows.concat(),
        })
    }
}
