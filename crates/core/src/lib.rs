//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains all the game rules and simulation logic.
//! It has **no dependencies** on timers, networking, or I/O, making it:
//!
//! - **Deterministic**: Same seed produces identical games
//! - **Testable**: Every rule is a plain method on plain data
//! - **Portable**: The session engine, the demo and the benches drive it alike
//!
//! # Module Structure
//!
//! - [`pieces`]: the seven spawn layouts and the pivot rotation
//! - [`grid`]: the locked-cell matrix with collision checks and line clearing
//! - [`scoring`]: line clear bonuses, level progression and drop speed
//! - [`rng`]: uniform piece selection and a seeded LCG
//! - [`game_state`]: the state machine tying everything together
//! - [`observer`]: change batches and the notification sink trait
//! - [`snapshot`]: read-only views for display
//!
//! # Game Rules
//!
//! - **Random pieces**: each new piece kind is drawn uniformly
//! - **Rotation**: 90° clockwise around the second block, no wall kicks
//! - **Locking**: a piece locks as soon as it cannot move down
//! - **Scoring**: 100 / 300 / 500 / 800 for 1-4 lines, flat across levels
//! - **Levels**: one level per 10 lines, starting at level 1
//! - **Speed**: 1000ms per row at level 1, 100ms faster per level, 100ms floor
//!
//! # Example
//!
//! ```
//! use blockfall_core::GameState;
//! use blockfall_core::types::{BoardSize, Command};
//!
//! let mut game = GameState::with_seed(BoardSize::default(), 12345);
//!
//! game.apply(Command::MoveRight);
//! game.apply(Command::Rotate);
//! game.apply(Command::HardDrop);
//!
//! assert_eq!(game.grid().occupied_count(), 4);
//! assert!(game.take_changes().board);
//! ```

pub mod game_state;
pub mod grid;
pub mod observer;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use blockfall_types as types;

// Re-export commonly used types for convenience
pub use game_state::{GameState, LockEvent, TickOutcome};
pub use grid::Grid;
pub use observer::{Changes, GameObserver, NoopObserver};
pub use pieces::{rotate_clockwise, spawn_blocks, Piece, PieceBlocks};
pub use rng::{random_kind, SimpleRng};
pub use scoring::{drop_interval_ms, level_for_lines, line_clear_score};
pub use snapshot::{GameSnapshot, NextPiece};
