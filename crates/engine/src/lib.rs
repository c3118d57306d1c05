//! Session engine - drives a [`GameState`] in real time
//!
//! The core crate knows nothing about time. This crate wraps one game in a
//! [`Session`]: a tokio drop timer at the level's interval, a per-session
//! lock shared with player commands, and observer delivery after every
//! committed change.

pub mod session;

pub use blockfall_core as core;
pub use blockfall_types as types;

pub use session::{Session, SessionError};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::core::GameState;
use crate::types::BoardSize;

/// Build a fresh game, seeded for reproducibility or from OS entropy
pub fn new_game(size: BoardSize, seed: Option<u64>) -> GameState {
    match seed {
        Some(seed) => GameState::new(size, StdRng::seed_from_u64(seed)),
        None => GameState::new(size, StdRng::from_entropy()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_games_repeat() {
        let mut a = new_game(BoardSize::default(), Some(7));
        let mut b = new_game(BoardSize::default(), Some(7));
        for _ in 0..20 {
            assert_eq!(a.active().kind(), b.active().kind());
            a.hard_drop();
            b.hard_drop();
        }
    }

    #[test]
    fn entropy_game_starts_running() {
        let game = new_game(BoardSize::new(8, 16).unwrap(), None);
        assert!(!game.is_game_over());
        assert_eq!(game.grid().width(), 8);
    }
}
