//! Shared helpers for integration tests

#![allow(dead_code)]

use rand::RngCore;

use blockfall::core::{random_kind, GameState};
use blockfall::types::{BoardSize, PieceKind};

/// RNG that returns the same word forever
#[derive(Debug, Clone, Copy)]
pub struct FixedRng(pub u64);

impl RngCore for FixedRng {
    fn next_u32(&mut self) -> u32 {
        (self.0 >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.0
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let bytes = self.0.to_le_bytes();
        for chunk in dest.chunks_mut(8) {
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// A fixed RNG that only ever yields `kind`.
///
/// Candidates sit in the middle of each of the seven uniform buckets, so
/// none of them is rejected by range sampling.
pub fn rng_always(kind: PieceKind) -> FixedRng {
    (0..7u128)
        .map(|k| FixedRng(((2 * k + 1) * (1u128 << 64) / 14) as u64))
        .find(|rng| random_kind(&mut rng.clone()) == kind)
        .unwrap_or_else(|| panic!("no fixed word selects {:?}", kind))
}

/// Two columns of squares only: every hard drop clears two rows
pub fn square_well(height: usize) -> GameState {
    GameState::new(
        BoardSize::new(2, height).unwrap(),
        rng_always(PieceKind::O),
    )
}

pub fn seeded(seed: u32) -> GameState {
    GameState::with_seed(BoardSize::default(), seed)
}

pub fn drop_until_game_over(state: &mut GameState) {
    for _ in 0..500 {
        if state.is_game_over() {
            return;
        }
        state.hard_drop();
    }
    panic!("stack never topped out");
}
