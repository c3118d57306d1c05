use crate::pieces::Piece;
use crate::types::{Block, Cell, GameStatus, PieceKind};

/// Preview of the queued piece, in piece-local coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NextPiece {
    pub kind: PieceKind,
    pub color: Cell,
    pub blocks: [Block; 4],
}

impl From<&Piece> for NextPiece {
    fn from(value: &Piece) -> Self {
        Self {
            kind: value.kind(),
            color: value.color(),
            blocks: *value.blocks(),
        }
    }
}

/// Read-only view of a game for display.
///
/// `cells` are the locked cells overlaid with the active piece, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<Cell>,
    pub next: NextPiece,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub paused: bool,
    pub game_over: bool,
}

impl GameSnapshot {
    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells[y * self.width + x])
    }

    /// Rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width)
    }

    pub fn status(&self) -> GameStatus {
        if self.game_over {
            GameStatus::GameOver
        } else if self.paused {
            GameStatus::Paused
        } else {
            GameStatus::Running
        }
    }
}
