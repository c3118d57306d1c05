//! Session module - one player's game, shared by the drop timer and commands
//!
//! A [`Session`] owns a [`GameState`] behind a single mutex. The autonomous
//! drop timer and every command take that mutex for the whole operation, so
//! a tick's lock-and-respawn can never interleave with a concurrent move or
//! rotation. Different sessions share nothing.
//!
//! The timer is a tokio task. Each time it is (re)scheduled the session's
//! epoch increments; a tick carrying an older epoch is discarded. A restart
//! or level change therefore never lets a stale tick fire into new state.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::core::{GameObserver, GameSnapshot, GameState, LockEvent, NextPiece, TickOutcome};
use crate::types::{Command, GameStatus};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum SessionError {
    #[display("a session must be started from inside a tokio runtime")]
    NoRuntime(tokio::runtime::TryCurrentError),
}

struct Inner {
    game: GameState,
    observer: Option<Box<dyn GameObserver>>,
    timer: Option<JoinHandle<()>>,
    epoch: u64,
    closed: bool,
}

impl Inner {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

struct Shared {
    inner: Mutex<Inner>,
    runtime: Handle,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace any running timer with one at the game's current interval.
    fn schedule_timer(self: &Arc<Self>, inner: &mut Inner) {
        inner.cancel_timer();
        inner.epoch += 1;

        let period = inner.game.drop_interval();
        let task = run_timer(Arc::downgrade(self), inner.epoch, period);
        inner.timer = Some(self.runtime.spawn(task));
    }

    /// Timer entry point. Returns false once this timer should stop.
    fn fire_tick(self: &Arc<Self>, epoch: u64) -> bool {
        let mut inner = self.lock();
        if inner.closed || inner.epoch != epoch {
            return false;
        }

        inner.game.soft_tick();
        self.settle(&mut inner);

        inner.epoch == epoch && inner.timer.is_some()
    }

    /// Deliver pending changes and bring the timer in line with the game.
    fn settle(self: &Arc<Self>, inner: &mut Inner) {
        let changes = inner.game.take_changes();
        if changes.is_empty() {
            return;
        }

        if let Some(observer) = inner.observer.as_mut() {
            changes.notify(observer.as_mut());
        }

        if inner.game.is_game_over() {
            if inner.timer.is_some() {
                println!("[Session] Game over, final score {}", inner.game.score());
            }
            inner.cancel_timer();
        } else if changes.restarted || changes.level.is_some() {
            if let Some(level) = changes.level.filter(|_| !changes.restarted) {
                println!(
                    "[Session] Level {} reached, drop interval {}ms",
                    level,
                    inner.game.drop_interval().as_millis()
                );
            }
            self.schedule_timer(inner);
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let inner = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        inner.cancel_timer();
    }
}

async fn run_timer(shared: Weak<Shared>, epoch: u64, period: Duration) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let Some(shared) = shared.upgrade() else {
            break;
        };
        if !shared.fire_tick(epoch) {
            break;
        }
    }
}

/// Handle to one player's running game.
///
/// Cloning the handle shares the game. Dropping the last handle stops the
/// timer; [`Session::shutdown`] stops it explicitly.
#[derive(Clone)]
pub struct Session {
    shared: Arc<Shared>,
}

impl Session {
    /// Start a session on the current tokio runtime
    pub fn start(
        game: GameState,
        observer: Option<Box<dyn GameObserver>>,
    ) -> Result<Self, SessionError> {
        let runtime = Handle::try_current().map_err(SessionError::NoRuntime)?;
        Ok(Self::start_on(game, observer, runtime))
    }

    /// Start a session whose timer runs on `runtime`
    pub fn start_on(
        game: GameState,
        observer: Option<Box<dyn GameObserver>>,
        runtime: Handle,
    ) -> Self {
        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner {
                game,
                observer,
                timer: None,
                epoch: 0,
                closed: false,
            }),
            runtime,
        });

        {
            let mut inner = shared.lock();
            if !inner.game.is_game_over() {
                shared.schedule_timer(&mut inner);
            }
        }

        Self { shared }
    }

    /// Run `op` on the game under the session lock, then notify
    fn with_game<T>(&self, op: impl FnOnce(&mut GameState) -> T) -> Option<T> {
        let mut inner = self.shared.lock();
        if inner.closed {
            return None;
        }
        let out = op(&mut inner.game);
        self.shared.settle(&mut inner);
        Some(out)
    }

    /// Read the game under the session lock
    pub fn with_state<T>(&self, read: impl FnOnce(&GameState) -> T) -> T {
        read(&self.shared.lock().game)
    }

    pub fn move_left(&self) -> bool {
        self.with_game(GameState::move_left).unwrap_or(false)
    }

    pub fn move_right(&self) -> bool {
        self.with_game(GameState::move_right).unwrap_or(false)
    }

    pub fn rotate(&self) -> bool {
        self.with_game(GameState::rotate).unwrap_or(false)
    }

    pub fn hard_drop(&self) -> Option<LockEvent> {
        self.with_game(GameState::hard_drop).flatten()
    }

    /// One drop step, exactly as the timer performs it
    pub fn tick(&self) -> TickOutcome {
        self.with_game(GameState::soft_tick)
            .unwrap_or(TickOutcome::Ignored)
    }

    pub fn pause(&self) -> bool {
        self.with_game(GameState::pause).unwrap_or(false)
    }

    pub fn resume(&self) -> bool {
        self.with_game(GameState::resume).unwrap_or(false)
    }

    /// Stop the timer, start a fresh game, start a new timer
    pub fn restart(&self) {
        self.with_game(GameState::restart);
    }

    pub fn update_level(&self, total_lines: u32) -> bool {
        self.with_game(|game| game.update_level(total_lines))
            .unwrap_or(false)
    }

    pub fn apply(&self, command: Command) -> bool {
        self.with_game(|game| game.apply(command)).unwrap_or(false)
    }

    /// Replace the notification sink
    pub fn set_observer(&self, observer: Option<Box<dyn GameObserver>>) {
        self.shared.lock().observer = observer;
    }

    /// Stop the timer; every later command is ignored
    pub fn shutdown(&self) {
        let mut inner = self.shared.lock();
        inner.closed = true;
        inner.cancel_timer();
    }

    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }

    /// Whether the drop timer is scheduled
    pub fn timer_active(&self) -> bool {
        self.shared.lock().timer.is_some()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.with_state(GameState::snapshot)
    }

    pub fn status(&self) -> GameStatus {
        self.with_state(GameState::status)
    }

    pub fn score(&self) -> u32 {
        self.with_state(GameState::score)
    }

    pub fn level(&self) -> u32 {
        self.with_state(GameState::level)
    }

    pub fn is_game_over(&self) -> bool {
        self.with_state(GameState::is_game_over)
    }

    pub fn is_paused(&self) -> bool {
        self.with_state(GameState::is_paused)
    }

    pub fn next_piece(&self) -> NextPiece {
        self.with_state(GameState::next_piece)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.shared.lock();
        f.debug_struct("Session")
            .field("game", &inner.game)
            .field("epoch", &inner.epoch)
            .field("timer_active", &inner.timer.is_some())
            .field("closed", &inner.closed)
            .finish_non_exhaustive()
    }
}
