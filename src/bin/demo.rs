//! Console demo.
//!
//! Plays one game on a small board with a naive bot that jiggles and rotates
//! the piece at random and hard-drops now and then. The board is printed in
//! ASCII whenever it changes, the final score when the game ends.
//!
//! Usage: `demo [seed]`

use std::time::Duration;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;

use blockfall::core::{GameObserver, GameSnapshot};
use blockfall::engine::{new_game, Session};
use blockfall::types::{BoardSize, Command, PieceKind, EMPTY_CELL};

const WIDTH: usize = 8;
const HEIGHT: usize = 14;
const BOT_STEP: Duration = Duration::from_millis(120);

enum DemoEvent {
    Board,
    GameOver(u32),
}

/// Forwards notifications to the render loop; rendering needs a snapshot,
/// which cannot be taken from inside the callback.
struct ConsoleObserver {
    tx: mpsc::UnboundedSender<DemoEvent>,
    score: u32,
}

impl GameObserver for ConsoleObserver {
    fn on_board_changed(&mut self) {
        let _ = self.tx.send(DemoEvent::Board);
    }

    fn on_score_changed(&mut self, score: u32) {
        self.score = score;
    }

    fn on_level_changed(&mut self, level: u32) {
        println!("*** level {} ***", level);
    }

    fn on_game_over(&mut self) {
        let _ = self.tx.send(DemoEvent::GameOver(self.score));
    }
}

fn render(snapshot: &GameSnapshot) -> String {
    let border = format!("+{}+\n", "-".repeat(snapshot.width));
    let mut out = String::with_capacity(border.len() * (snapshot.height + 3));

    out.push_str(&border);
    for row in snapshot.rows() {
        out.push('|');
        for &cell in row {
            out.push(match PieceKind::from_color(cell) {
                _ if cell == EMPTY_CELL => ' ',
                Some(kind) => kind.as_str().chars().next().map_or('#', |c| c.to_ascii_uppercase()),
                None => '#',
            });
        }
        out.push_str("|\n");
    }
    out.push_str(&border);
    out.push_str(&format!(
        "score {}  level {}  lines {}  next {}\n",
        snapshot.score,
        snapshot.level,
        snapshot.lines,
        snapshot.next.kind.as_str()
    ));
    out
}

fn bot_command(rng: &mut StdRng) -> Command {
    match rng.gen_range(0..10) {
        0..=2 => Command::MoveLeft,
        3..=5 => Command::MoveRight,
        6..=8 => Command::Rotate,
        _ => Command::HardDrop,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let seed = match std::env::args().nth(1) {
        Some(arg) => Some(arg.parse::<u64>().context("seed must be an integer")?),
        None => None,
    };

    let size = BoardSize::new(WIDTH, HEIGHT)?;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let observer = ConsoleObserver { tx, score: 0 };
    let session = Session::start(new_game(size, seed), Some(Box::new(observer)))?;

    println!("{}", render(&session.snapshot()));

    let bot = {
        let session = session.clone();
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(BOT_STEP);
            while !session.is_game_over() {
                ticker.tick().await;
                session.apply(bot_command(&mut rng));
            }
        })
    };

    while let Some(event) = rx.recv().await {
        match event {
            DemoEvent::Board => println!("{}", render(&session.snapshot())),
            DemoEvent::GameOver(score) => {
                println!("GAME OVER - final score {}", score);
                break;
            }
        }
    }

    session.shutdown();
    bot.abort();
    Ok(())
}
