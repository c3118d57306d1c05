//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are plain data with no I/O, usable by the simulation core, the
//! session engine and the transport adapter alike.
//!
//! # Board Dimensions
//!
//! - **Default width**: 10 columns (indexed 0-9, left to right)
//! - **Default height**: 20 rows (indexed 0-19, row 0 is the top)
//! - Dimensions are validated once through [`BoardSize::new`]
//!
//! # Cells and Colors
//!
//! A [`Cell`] is an RGB color code. [`EMPTY_CELL`] (`0`) marks an empty cell;
//! every other value is the color of the piece kind that was locked there.
//!
//! | Kind | Color      |
//! |------|------------|
//! | I    | `0x00FFFF` |
//! | J    | `0x0000FF` |
//! | L    | `0xFFA500` |
//! | O    | `0xFFFF00` |
//! | S    | `0x00FF00` |
//! | T    | `0x800080` |
//! | Z    | `0xFF0000` |
//!
//! # Examples
//!
//! ```
//! use blockfall_types::{BoardSize, Command, PieceKind};
//!
//! let size = BoardSize::new(10, 20).unwrap();
//! assert_eq!(size.width(), 10);
//! assert!(BoardSize::new(0, 20).is_err());
//!
//! assert_eq!(PieceKind::T.color(), 0x800080);
//!
//! assert_eq!(Command::from_str("dropDown"), Some(Command::HardDrop));
//! ```

/// Default board width in cells (10 columns)
pub const DEFAULT_WIDTH: usize = 10;

/// Default board height in cells (20 rows)
pub const DEFAULT_HEIGHT: usize = 20;

/// Largest accepted board dimension on either axis
pub const MAX_BOARD_DIMENSION: usize = 1024;

/// Drop interval at level 1 (1000ms = 1 second per row)
pub const BASE_DROP_MS: u32 = 1000;

/// Drop interval reduction per level gained
pub const DROP_STEP_MS: u32 = 100;

/// Fastest drop interval, reached at level 10
pub const DROP_INTERVAL_MIN_MS: u32 = 100;

/// Lines needed to advance one level
pub const LINES_PER_LEVEL: u32 = 10;

/// Flat line clear bonuses indexed by lines cleared in one lock event.
///
/// Not multiplied by level.
pub const LINE_SCORES: [u32; 5] = [0, 100, 300, 500, 800];

/// A cell on the game board
///
/// - `0` ([`EMPTY_CELL`]): empty
/// - anything else: occupied, carrying the locked piece's color
pub type Cell = u32;

/// Marker for an empty cell
pub const EMPTY_CELL: Cell = 0;

/// The seven tetromino piece kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl PieceKind {
    /// All kinds, in canonical order
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// The color code every block of this kind carries
    pub fn color(&self) -> Cell {
        match self {
            PieceKind::I => 0x00FFFF,
            PieceKind::J => 0x0000FF,
            PieceKind::L => 0xFFA500,
            PieceKind::O => 0xFFFF00,
            PieceKind::S => 0x00FF00,
            PieceKind::T => 0x800080,
            PieceKind::Z => 0xFF0000,
        }
    }

    /// Reverse lookup of [`PieceKind::color`]
    pub fn from_color(color: Cell) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.color() == color)
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::J => "j",
            PieceKind::L => "l",
            PieceKind::O => "o",
            PieceKind::S => "s",
            PieceKind::T => "t",
            PieceKind::Z => "z",
        }
    }
}

/// A single block of a piece, in absolute board coordinates.
///
/// `y` may be negative while a piece is still partially above the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Block {
    pub x: i32,
    pub y: i32,
    pub color: Cell,
}

impl Block {
    pub const fn new(x: i32, y: i32, color: Cell) -> Self {
        Self { x, y, color }
    }

    /// Same block shifted by `(dx, dy)`
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            color: self.color,
        }
    }
}

/// Board dimensions rejected at construction time
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("board {axis} must be between 1 and 1024 cells, got {value}")]
pub struct BoardSizeError {
    pub axis: &'static str,
    pub value: usize,
}

/// Validated board dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardSize {
    width: usize,
    height: usize,
}

impl BoardSize {
    /// Validate `width` x `height`.
    ///
    /// Both must lie in `1..=MAX_BOARD_DIMENSION`.
    pub fn new(width: usize, height: usize) -> Result<Self, BoardSizeError> {
        if width == 0 || width > MAX_BOARD_DIMENSION {
            return Err(BoardSizeError {
                axis: "width",
                value: width,
            });
        }
        if height == 0 || height > MAX_BOARD_DIMENSION {
            return Err(BoardSizeError {
                axis: "height",
                value: height,
            });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells on the board
    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

impl Default for BoardSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

/// Coarse lifecycle state of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameStatus {
    Running,
    Paused,
    GameOver,
}

/// Player commands accepted by a game
///
/// Commands issued while paused or after game over are accepted and ignored,
/// except [`Command::Restart`] (and [`Command::Resume`] while paused).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Rotate piece 90° clockwise
    Rotate,
    /// Drop piece until it locks
    HardDrop,
    /// Suspend the drop timer's effect
    Pause,
    /// Resume after pause
    Resume,
    /// Discard the game and start a fresh one
    Restart,
}

impl Command {
    /// Parse a command from its wire name (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_types::Command;
    ///
    /// assert_eq!(Command::from_str("moveLeft"), Some(Command::MoveLeft));
    /// assert_eq!(Command::from_str("hardDrop"), Some(Command::HardDrop));
    /// assert_eq!(Command::from_str("newGame"), Some(Command::Restart));
    /// assert_eq!(Command::from_str("unknown"), None);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(Command::MoveLeft),
            "moveright" => Some(Command::MoveRight),
            "rotate" => Some(Command::Rotate),
            "harddrop" | "dropdown" => Some(Command::HardDrop),
            "pause" => Some(Command::Pause),
            "resume" => Some(Command::Resume),
            "restart" | "newgame" => Some(Command::Restart),
            _ => None,
        }
    }

    /// Convert to camelCase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::MoveLeft => "moveLeft",
            Command::MoveRight => "moveRight",
            Command::Rotate => "rotate",
            Command::HardDrop => "hardDrop",
            Command::Pause => "pause",
            Command::Resume => "resume",
            Command::Restart => "restart",
        }
    }
}
