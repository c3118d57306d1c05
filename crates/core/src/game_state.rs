//! Game state module - the synchronous game state machine
//!
//! This module ties together the grid, pieces, RNG and scoring rules.
//! It handles piece movement, rotation, locking, line clears, leveling and
//! the pause/game-over lifecycle. It has no notion of time: the owner calls
//! [`GameState::soft_tick`] whenever its drop timer fires and reschedules the
//! timer from [`GameState::drop_interval`].
//!
//! Rejected actions (blocked moves, commands while paused or after game over)
//! are silent no-ops, never errors.

use std::fmt;
use std::time::Duration;

use rand::RngCore;

use crate::grid::Grid;
use crate::observer::Changes;
use crate::pieces::Piece;
use crate::rng::{random_kind, SimpleRng};
use crate::scoring::{drop_interval_ms, level_for_lines, line_clear_score};
use crate::snapshot::{GameSnapshot, NextPiece};
use crate::types::{BoardSize, Command, GameStatus, PieceKind};

/// Result of one lock event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LockEvent {
    pub lines_cleared: usize,
    /// Points awarded for the cleared lines
    pub points: u32,
}

/// Result of one attempt to move the active piece down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickOutcome {
    /// Game was paused or over; nothing happened
    Ignored,
    /// Active piece moved down one row
    Moved,
    /// Active piece could not move and was merged into the grid
    Locked(LockEvent),
}

/// Draw the opening piece, spawned top-center, and the queued kind
fn deal(size: BoardSize, rng: &mut (dyn RngCore + Send)) -> (Piece, PieceKind) {
    let first = random_kind(rng);
    let next = random_kind(rng);
    (Piece::spawn(first, size.width()), next)
}

/// Complete game state
pub struct GameState {
    size: BoardSize,
    grid: Grid,
    active: Piece,
    next: PieceKind,
    rng: Box<dyn RngCore + Send>,
    score: u32,
    level: u32,
    lines: u32,
    paused: bool,
    game_over: bool,
    /// Changes since the last drain (consumed by observers).
    changes: Changes,
}

impl GameState {
    /// Create a new game and spawn its first piece
    pub fn new<R: RngCore + Send + 'static>(size: BoardSize, rng: R) -> Self {
        Self::from_boxed_rng(size, Box::new(rng))
    }

    /// Create a new game driven by a [`SimpleRng`] with the given seed
    pub fn with_seed(size: BoardSize, seed: u32) -> Self {
        Self::new(size, SimpleRng::new(seed))
    }

    fn from_boxed_rng(size: BoardSize, mut rng: Box<dyn RngCore + Send>) -> Self {
        let (active, next) = deal(size, &mut *rng);
        let grid = Grid::new(size);
        let game_over = !grid.is_valid_position(active.blocks());

        Self {
            size,
            grid,
            active,
            next,
            rng,
            score: 0,
            level: 1,
            lines: 0,
            paused: false,
            game_over,
            changes: Changes::default(),
        }
    }

    pub fn size(&self) -> BoardSize {
        self.size
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

    fn is_running(&self) -> bool {
        self.status() == GameStatus::Running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Total lines cleared this game
    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn active(&self) -> &Piece {
        &self.active
    }

    pub fn next(&self) -> PieceKind {
        self.next
    }

    /// Preview of the queued piece for rendering
    pub fn next_piece(&self) -> NextPiece {
        NextPiece::from(&Piece::new(self.next))
    }

    /// Current autonomous drop interval
    pub fn drop_interval(&self) -> Duration {
        Duration::from_millis(drop_interval_ms(self.level) as u64)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            width: self.grid.width(),
            height: self.grid.height(),
            cells: self.grid.overlay(Some(&self.active)),
            next: self.next_piece(),
            score: self.score,
            level: self.level,
            lines: self.lines,
            paused: self.paused,
            game_over: self.game_over,
        }
    }

    /// Take and clear the pending change batch.
    pub fn take_changes(&mut self) -> Changes {
        std::mem::take(&mut self.changes)
    }

    /// Commit `candidate` as the active piece if it fits
    fn try_commit(&mut self, candidate: Piece) -> bool {
        if !self.grid.is_valid_position(candidate.blocks()) {
            return false;
        }
        self.active = candidate;
        self.changes.board = true;
        true
    }

    pub fn move_left(&mut self) -> bool {
        self.shift(-1)
    }

    pub fn move_right(&mut self) -> bool {
        self.shift(1)
    }

    fn shift(&mut self, dx: i32) -> bool {
        if !self.is_running() {
            return false;
        }
        self.try_commit(self.active.translated(dx, 0))
    }

    /// Rotate clockwise; no wall kicks
    pub fn rotate(&mut self) -> bool {
        if !self.is_running() || self.active.kind() == PieceKind::O {
            return false;
        }
        self.try_commit(self.active.rotated())
    }

    /// Move the active piece down one row, locking it if it cannot move
    pub fn soft_tick(&mut self) -> TickOutcome {
        if !self.is_running() {
            return TickOutcome::Ignored;
        }

        if self.try_commit(self.active.translated(0, 1)) {
            return TickOutcome::Moved;
        }

        TickOutcome::Locked(self.lock_active())
    }

    /// Drop the active piece until it locks.
    ///
    /// Terminates within `height` steps: every non-locking step moves the
    /// piece one row down.
    pub fn hard_drop(&mut self) -> Option<LockEvent> {
        if !self.is_running() {
            return None;
        }

        loop {
            match self.soft_tick() {
                TickOutcome::Moved => continue,
                TickOutcome::Locked(event) => {
                    self.changes.score = Some(self.score);
                    return Some(event);
                }
                TickOutcome::Ignored => return None,
            }
        }
    }

    /// Merge the active piece into the grid and bring in the next one
    fn lock_active(&mut self) -> LockEvent {
        self.grid.place(self.active.blocks());
        let lines_cleared = self.grid.clear_full_lines();
        let points = line_clear_score(lines_cleared);
        self.changes.board = true;

        if points > 0 {
            self.score = self.score.saturating_add(points);
            self.changes.score = Some(self.score);
        }
        if lines_cleared > 0 {
            self.record_lines(self.lines.saturating_add(lines_cleared as u32));
        }

        self.spawn_next();

        LockEvent {
            lines_cleared,
            points,
        }
    }

    /// Promote the queued piece and queue a fresh one
    fn spawn_next(&mut self) {
        let kind = self.next;
        self.next = random_kind(&mut *self.rng);
        self.active = Piece::spawn(kind, self.size.width());

        if !self.grid.is_valid_position(self.active.blocks()) {
            self.game_over = true;
            self.changes.game_over = true;
        }
    }

    /// Recompute level from the cumulative cleared line count.
    ///
    /// Returns true if the level rose. Level never decreases.
    pub fn update_level(&mut self, total_lines: u32) -> bool {
        if !self.is_running() {
            return false;
        }
        self.record_lines(total_lines)
    }

    fn record_lines(&mut self, total_lines: u32) -> bool {
        self.lines = self.lines.max(total_lines);
        let level = level_for_lines(self.lines);
        if level <= self.level {
            return false;
        }
        self.level = level;
        self.changes.level = Some(level);
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.game_over || self.paused {
            return false;
        }
        self.paused = true;
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.game_over || !self.paused {
            return false;
        }
        self.paused = false;
        true
    }

    /// Discard everything and start over; the RNG stream continues
    pub fn restart(&mut self) {
        let (active, next) = deal(self.size, &mut *self.rng);
        self.grid = Grid::new(self.size);
        self.active = active;
        self.next = next;
        self.score = 0;
        self.level = 1;
        self.lines = 0;
        self.paused = false;
        self.game_over = !self.grid.is_valid_position(self.active.blocks());
        self.changes = Changes {
            board: true,
            score: Some(0),
            level: Some(1),
            game_over: self.game_over,
            restarted: true,
        };
    }

    /// Apply a player command; returns true if state changed
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::MoveLeft => self.move_left(),
            Command::MoveRight => self.move_right(),
            Command::Rotate => self.rotate(),
            Command::HardDrop => self.hard_drop().is_some(),
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::Restart => {
                self.restart();
                true
            }
        }
    }
}

impl fmt::Debug for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameState")
            .field("size", &self.size)
            .field("active", &self.active)
            .field("next", &self.next)
            .field("score", &self.score)
            .field("level", &self.level)
            .field("lines", &self.lines)
            .field("paused", &self.paused)
            .field("game_over", &self.game_over)
            .finish_non_exhaustive()
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::with_seed(BoardSize::default(), 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EMPTY_CELL;

    fn game() -> GameState {
        GameState::with_seed(BoardSize::default(), 12345)
    }

    /// Fill rows `ys` completely except the given columns
    fn fill_rows_except(state: &mut GameState, ys: &[i32], holes: &[i32]) {
        for &y in ys {
            for x in 0..state.grid.width() as i32 {
                if !holes.contains(&x) {
                    state.grid.set(x, y, PieceKind::Z.color());
                }
            }
        }
    }

    fn drop_until_game_over(state: &mut GameState) {
        for _ in 0..500 {
            if state.is_game_over() {
                return;
            }
            state.hard_drop();
        }
        panic!("stack never topped out");
    }

    #[test]
    fn test_new_game_state() {
        let state = game();

        assert_eq!(state.status(), GameStatus::Running);
        assert_eq!(state.score(), 0);
        assert_eq!(state.level(), 1);
        assert_eq!(state.lines(), 0);
        assert_eq!(state.grid().occupied_count(), 0);
        assert!(state.changes.is_empty());
    }

    #[test]
    fn test_spawn_is_top_center() {
        let state = game();
        let min_x = state.active().blocks().iter().map(|b| b.x).min().unwrap();
        let min_y = state.active().blocks().iter().map(|b| b.y).min().unwrap();
        let local_min_x = Piece::new(state.active().kind())
            .blocks()
            .iter()
            .map(|b| b.x)
            .min()
            .unwrap();
        assert_eq!(min_x - local_min_x, 4);
        assert_eq!(min_y, 0);
    }

    #[test]
    fn test_move_commits_and_notifies() {
        let mut state = game();
        let before = state.active;

        assert!(state.move_left());
        assert_eq!(state.active, before.translated(-1, 0));
        assert!(state.take_changes().board);

        assert!(state.move_right());
        assert_eq!(state.active, before);
    }

    #[test]
    fn test_blocked_move_is_silent() {
        let mut state = game();
        let mut moved = 0;
        for _ in 0..20 {
            if state.move_left() {
                moved += 1;
            }
        }
        assert!(moved <= 5);
        state.take_changes();

        let before = state.active;
        assert!(!state.move_left());
        assert_eq!(state.active, before);
        assert!(state.take_changes().is_empty());
    }

    #[test]
    fn test_rotate_rejected_against_locked_cells() {
        let mut state = game();
        state.active = Piece::spawn(PieceKind::T, 10).translated(0, 5);
        // T pivot sits at (4, 6); rotation needs (5, 7)
        state.grid.set(5, 7, PieceKind::I.color());

        let before = state.active;
        assert!(!state.rotate());
        assert_eq!(state.active, before);
    }

    #[test]
    fn test_rotate_commits_when_free() {
        let mut state = game();
        state.active = Piece::spawn(PieceKind::L, 10).translated(0, 5);
        let expected = state.active.rotated();
        assert!(state.rotate());
        assert_eq!(state.active, expected);
        assert_eq!(state.active.rotation(), 1);
    }

    #[test]
    fn test_square_rotation_changes_nothing() {
        let mut state = game();
        state.active = Piece::spawn(PieceKind::O, 10);
        let before = state.active;
        assert!(!state.rotate());
        assert_eq!(state.active, before);
        assert!(state.take_changes().is_empty());
    }

    #[test]
    fn test_soft_tick_moves_then_locks() {
        let mut state = game();
        state.active = Piece::spawn(PieceKind::I, 10);

        for _ in 0..19 {
            assert_eq!(state.soft_tick(), TickOutcome::Moved);
        }
        let outcome = state.soft_tick();
        assert_eq!(
            outcome,
            TickOutcome::Locked(LockEvent {
                lines_cleared: 0,
                points: 0
            })
        );
        for x in 4..8 {
            assert_eq!(state.grid.get(x, 19), Some(PieceKind::I.color()));
        }
    }

    #[test]
    fn test_lock_promotes_queued_piece() {
        let mut state = game();
        let queued = state.next();
        state.hard_drop();
        assert_eq!(state.active().kind(), queued);
    }

    #[test]
    fn test_hard_drop_locks_at_bottom_once() {
        let mut state = game();
        let event = state.hard_drop();

        assert_eq!(
            event,
            Some(LockEvent {
                lines_cleared: 0,
                points: 0
            })
        );
        assert_eq!(state.grid.occupied_count(), 4);
        assert!(state.grid.row(19).unwrap().iter().any(|&c| c != EMPTY_CELL));

        let changes = state.take_changes();
        assert!(changes.board);
        assert_eq!(changes.score, Some(0));
    }

    #[test]
    fn test_double_clear_scores_300() {
        let mut state = game();
        state.score = 1200;
        fill_rows_except(&mut state, &[18, 19], &[4, 5]);
        state.active = Piece::spawn(PieceKind::O, 10);

        let event = state.hard_drop().unwrap();

        assert_eq!(event.lines_cleared, 2);
        assert_eq!(event.points, 300);
        assert_eq!(state.score(), 1500);
        assert_eq!(state.lines(), 2);
        assert_eq!(state.grid.occupied_count(), 0);
        assert_eq!(state.take_changes().score, Some(1500));
    }

    #[test]
    fn test_single_clear_scores_100() {
        let mut state = game();
        fill_rows_except(&mut state, &[19], &[4, 5, 6, 7]);
        state.active = Piece::spawn(PieceKind::I, 10);

        let event = state.hard_drop().unwrap();
        assert_eq!(event.points, 100);
        assert_eq!(state.score(), 100);
    }

    #[test]
    fn test_tenth_line_raises_level() {
        let mut state = game();
        state.lines = 8;
        fill_rows_except(&mut state, &[18, 19], &[4, 5]);
        state.active = Piece::spawn(PieceKind::O, 10);

        state.hard_drop();

        assert_eq!(state.lines(), 10);
        assert_eq!(state.level(), 2);
        assert_eq!(state.drop_interval(), Duration::from_millis(900));
        assert_eq!(state.take_changes().level, Some(2));
    }

    #[test]
    fn test_update_level_thresholds() {
        let mut state = game();
        assert!(!state.update_level(9));
        assert_eq!(state.level(), 1);

        assert!(state.update_level(10));
        assert_eq!(state.level(), 2);

        assert!(state.update_level(25));
        assert_eq!(state.level(), 3);

        assert!(!state.update_level(5));
        assert_eq!(state.level(), 3);
        assert_eq!(state.lines(), 25);
    }

    #[test]
    fn test_pause_blocks_everything_but_resume() {
        let mut state = game();
        assert!(state.pause());
        assert!(!state.pause());
        assert_eq!(state.status(), GameStatus::Paused);

        let before = state.active;
        assert!(!state.move_left());
        assert!(!state.rotate());
        assert_eq!(state.soft_tick(), TickOutcome::Ignored);
        assert_eq!(state.hard_drop(), None);
        assert!(!state.update_level(30));
        assert_eq!(state.active, before);
        assert_eq!(state.level(), 1);
        assert!(state.take_changes().is_empty());

        assert!(state.resume());
        assert_eq!(state.status(), GameStatus::Running);
        assert!(state.move_left());
    }

    #[test]
    fn test_game_over_when_spawn_blocked() {
        let mut state = game();
        drop_until_game_over(&mut state);

        assert_eq!(state.status(), GameStatus::GameOver);
        assert!(state.take_changes().game_over);
    }

    #[test]
    fn test_game_over_freezes_state() {
        let mut state = game();
        drop_until_game_over(&mut state);
        state.take_changes();

        let grid = state.grid.clone();
        let active = state.active;
        let (score, level) = (state.score(), state.level());

        assert!(!state.move_left());
        assert!(!state.move_right());
        assert!(!state.rotate());
        assert_eq!(state.hard_drop(), None);
        assert_eq!(state.soft_tick(), TickOutcome::Ignored);
        assert!(!state.pause());
        assert!(!state.resume());

        assert_eq!(state.grid, grid);
        assert_eq!(state.active, active);
        assert_eq!((state.score(), state.level()), (score, level));
        assert!(state.take_changes().is_empty());
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut state = game();
        state.score = 900;
        state.level = 4;
        state.lines = 33;
        state.paused = true;
        state.game_over = true;
        state.grid.set(0, 19, PieceKind::J.color());

        state.restart();

        assert_eq!(state.status(), GameStatus::Running);
        assert_eq!(state.score(), 0);
        assert_eq!(state.level(), 1);
        assert_eq!(state.lines(), 0);
        assert_eq!(state.grid.occupied_count(), 0);
        assert_eq!(state.active, Piece::spawn(state.active.kind(), 10));

        let changes = state.take_changes();
        assert!(changes.board && changes.restarted);
        assert_eq!(changes.score, Some(0));
        assert_eq!(changes.level, Some(1));
        assert!(!changes.game_over);
    }

    #[test]
    fn test_restart_continues_rng_stream() {
        let mut state = game();
        state.restart();

        let mut rng = SimpleRng::new(12345);
        let _opening = (random_kind(&mut rng), random_kind(&mut rng));
        assert_eq!(state.active().kind(), random_kind(&mut rng));
        assert_eq!(state.next(), random_kind(&mut rng));
    }

    #[test]
    fn test_same_seed_same_pieces() {
        let mut a = game();
        let mut b = game();
        for _ in 0..10 {
            assert_eq!(a.active().kind(), b.active().kind());
            assert_eq!(a.next(), b.next());
            a.hard_drop();
            b.hard_drop();
        }
    }

    #[test]
    fn test_snapshot_overlays_active_piece() {
        let state = game();
        let snap = state.snapshot();
        assert_eq!((snap.width, snap.height), (10, 20));
        for b in state.active().blocks() {
            if b.y >= 0 {
                assert_eq!(snap.cell(b.x as usize, b.y as usize), Some(b.color));
            }
        }
        assert_eq!(snap.next.kind, state.next());
        assert_eq!(snap.status(), GameStatus::Running);
    }

    #[test]
    fn test_narrow_board_is_over_at_spawn() {
        let size = BoardSize::new(1, 20).unwrap();
        let state = GameState::with_seed(size, 1);
        assert!(state.is_game_over());
    }

    #[test]
    fn test_apply_commands() {
        let mut state = game();
        assert!(state.apply(Command::MoveRight));
        assert!(state.apply(Command::Pause));
        assert!(!state.apply(Command::HardDrop));
        assert!(state.apply(Command::Resume));
        assert!(state.apply(Command::HardDrop));
        assert!(state.apply(Command::Restart));
        assert_eq!(state.grid().occupied_count(), 0);
    }
}
