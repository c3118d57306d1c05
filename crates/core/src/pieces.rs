//! Pieces module - tetromino spawn layouts and the pivot rotation
//!
//! Every kind has one fixed spawn layout. Rotation turns the blocks 90°
//! clockwise around the block at index 1 of the layout. There are no wall
//! kicks: callers validate the rotated blocks against the grid and discard
//! the attempt if they do not fit.

use crate::types::{Block, PieceKind};

/// The four blocks of a piece
pub type PieceBlocks = [Block; 4];

/// Index of the pivot block inside a piece's block list
pub const PIVOT_INDEX: usize = 1;

/// Piece-local spawn layout (block order matters: index 1 is the pivot)
fn layout(kind: PieceKind) -> [(i32, i32); 4] {
    match kind {
        PieceKind::I => [(0, 0), (1, 0), (2, 0), (3, 0)],
        PieceKind::J => [(0, 0), (0, 1), (1, 1), (2, 1)],
        PieceKind::L => [(2, 0), (0, 1), (1, 1), (2, 1)],
        PieceKind::O => [(0, 0), (1, 0), (0, 1), (1, 1)],
        PieceKind::S => [(1, 0), (2, 0), (0, 1), (1, 1)],
        PieceKind::T => [(1, 0), (0, 1), (1, 1), (2, 1)],
        PieceKind::Z => [(0, 0), (1, 0), (1, 1), (2, 1)],
    }
}

/// Canonical piece-local blocks for `kind`, colored with the kind's color
pub fn spawn_blocks(kind: PieceKind) -> PieceBlocks {
    let color = kind.color();
    layout(kind).map(|(x, y)| Block::new(x, y, color))
}

/// Rotate `blocks` 90° clockwise around the pivot block.
///
/// Each offset `(dx, dy)` from the pivot maps to `(-dy, dx)`. The square
/// kind is returned unchanged. No bounds checking happens here.
pub fn rotate_clockwise(kind: PieceKind, blocks: &PieceBlocks) -> PieceBlocks {
    if kind == PieceKind::O {
        return *blocks;
    }

    let pivot = blocks[PIVOT_INDEX];
    blocks.map(|b| {
        let dx = b.x - pivot.x;
        let dy = b.y - pivot.y;
        Block::new(pivot.x - dy, pivot.y + dx, b.color)
    })
}

/// A piece in play: kind, rotation index and absolute block positions.
///
/// Pieces are values. Moving or rotating produces a candidate piece and
/// leaves the original untouched until the caller commits the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    kind: PieceKind,
    rotation: u8,
    blocks: PieceBlocks,
}

impl Piece {
    /// Piece in its spawn layout at the piece-local origin
    pub fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            rotation: 0,
            blocks: spawn_blocks(kind),
        }
    }

    /// Piece in its spawn layout, top-centered on a board `width` cells wide
    pub fn spawn(kind: PieceKind, width: usize) -> Self {
        let start_x = (width / 2) as i32 - 1;
        Self::new(kind).translated(start_x, 0)
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Rotation index (0-3); always 0 for the square kind
    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    pub fn blocks(&self) -> &PieceBlocks {
        &self.blocks
    }

    pub fn color(&self) -> u32 {
        self.kind.color()
    }

    /// Candidate piece shifted by `(dx, dy)`
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            blocks: self.blocks.map(|b| b.offset(dx, dy)),
            ..*self
        }
    }

    /// Candidate piece rotated 90° clockwise around its pivot
    pub fn rotated(&self) -> Self {
        if self.kind == PieceKind::O {
            return *self;
        }
        Self {
            kind: self.kind,
            rotation: (self.rotation + 1) % 4,
            blocks: rotate_clockwise(self.kind, &self.blocks),
        }
    }
}
