//! Observer module - change batches and the notification sink
//!
//! [`GameState`](crate::GameState) records what each committed operation
//! changed into a [`Changes`] batch. Whoever owns the game drains the batch
//! after the operation and forwards it to a [`GameObserver`].

/// Receiver of game change notifications.
///
/// Called synchronously after a commit, never concurrently with itself.
/// Implementations must not call back into the game that notifies them.
pub trait GameObserver: Send {
    fn on_board_changed(&mut self) {}

    fn on_game_over(&mut self) {}

    fn on_score_changed(&mut self, _score: u32) {}

    fn on_level_changed(&mut self, _level: u32) {}
}

/// Observer that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl GameObserver for NoopObserver {}

/// What a batch of operations changed since the last drain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Changes {
    pub board: bool,
    /// New score, if it should be reported
    pub score: Option<u32>,
    /// New level, if it rose
    pub level: Option<u32>,
    pub game_over: bool,
    /// The game was reinitialized
    pub restarted: bool,
}

impl Changes {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Deliver the batch: board, then score, then level, then game over.
    pub fn notify(&self, observer: &mut dyn GameObserver) {
        if self.board {
            observer.on_board_changed();
        }
        if let Some(score) = self.score {
            observer.on_score_changed(score);
        }
        if let Some(level) = self.level {
            observer.on_level_changed(level);
        }
        if self.game_over {
            observer.on_game_over();
        }
    }
}
