//! Protocol module - JSON message types for the game socket
//!
//! One JSON object per line in each direction. Requests carry a client
//! chosen `seq` which every direct reply echoes; pushed events have none.

use serde::{Deserialize, Serialize};

use crate::core::GameSnapshot;
use crate::types::{Block, Cell, Command};

// ============== Client -> Server ==============

/// Client request: `{"seq": 1, "action": "moveLeft"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub seq: u64,
    pub action: String,
}

/// What a request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Command(Command),
    GetState,
}

impl Action {
    /// Parse an action name (case-insensitive)
    pub fn parse(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("getState") {
            return Some(Action::GetState);
        }
        Command::from_str(name).map(Action::Command)
    }
}

// ============== Server -> Client ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidJson,
    UnknownAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckStatus {
    Ok,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckMessage {
    pub seq: u64,
    pub status: AckStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    /// Echoed when it could be recovered from the request
    pub seq: Option<u64>,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockInfo {
    pub x: i32,
    pub y: i32,
    pub color: Cell,
}

impl From<&Block> for BlockInfo {
    fn from(block: &Block) -> Self {
        Self {
            x: block.x,
            y: block.y,
            color: block.color,
        }
    }
}

/// Full game view returned for `getState`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateMessage {
    pub seq: u64,
    /// Rows top to bottom, active piece overlaid
    pub grid: Vec<Vec<Cell>>,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub paused: bool,
    pub game_over: bool,
    pub next_shape: Vec<BlockInfo>,
}

impl StateMessage {
    pub fn from_snapshot(seq: u64, snapshot: &GameSnapshot) -> Self {
        Self {
            seq,
            grid: snapshot.rows().map(<[Cell]>::to_vec).collect(),
            score: snapshot.score,
            level: snapshot.level,
            lines: snapshot.lines,
            paused: snapshot.paused,
            game_over: snapshot.game_over,
            next_shape: snapshot.next.blocks.iter().map(BlockInfo::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Board,
    Score,
    Level,
    GameOver,
}

/// Pushed notification from the session observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMessage {
    pub event: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
}

impl EventMessage {
    pub fn board() -> Self {
        Self {
            event: EventKind::Board,
            score: None,
            level: None,
        }
    }

    pub fn score(score: u32) -> Self {
        Self {
            event: EventKind::Score,
            score: Some(score),
            level: None,
        }
    }

    pub fn level(level: u32) -> Self {
        Self {
            event: EventKind::Level,
            score: None,
            level: Some(level),
        }
    }

    /// Game over carries the final score
    pub fn game_over(score: u32) -> Self {
        Self {
            event: EventKind::GameOver,
            score: Some(score),
            level: None,
        }
    }
}

/// Anything the server writes to a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Response {
    Ack(AckMessage),
    State(StateMessage),
    Error(ErrorMessage),
    Event(EventMessage),
}

// ============== Parsing ==============

/// Parse one request line.
///
/// Unparseable input yields an `invalid_json` error echoing whatever `seq`
/// can be recovered; a well-formed request with an unknown action yields
/// `unknown_action`.
pub fn parse_request(line: &str) -> Result<(u64, Action), ErrorMessage> {
    let request: Request = serde_json::from_str(line).map_err(|e| ErrorMessage {
        seq: extract_seq_best_effort(line),
        code: ErrorCode::InvalidJson,
        message: e.to_string(),
    })?;

    match Action::parse(&request.action) {
        Some(action) => Ok((request.seq, action)),
        None => Err(create_error(
            Some(request.seq),
            ErrorCode::UnknownAction,
            &format!("unknown action: {}", request.action),
        )),
    }
}

fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let rest = after_key.trim_start().strip_prefix(':')?.trim_start();
    let end = rest
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}

pub fn create_ack(seq: u64) -> Response {
    Response::Ack(AckMessage {
        seq,
        status: AckStatus::Ok,
    })
}

pub fn create_error(seq: Option<u64>, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        seq,
        code,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameState;
    use crate::types::BoardSize;
    use serde_json::json;

    #[test]
    fn test_parse_command_request() {
        let (seq, action) = parse_request(r#"{"seq":4,"action":"moveLeft"}"#).unwrap();
        assert_eq!(seq, 4);
        assert_eq!(action, Action::Command(Command::MoveLeft));
    }

    #[test]
    fn test_parse_aliases_and_case() {
        assert_eq!(
            Action::parse("dropDown"),
            Some(Action::Command(Command::HardDrop))
        );
        assert_eq!(
            Action::parse("NEWGAME"),
            Some(Action::Command(Command::Restart))
        );
        assert_eq!(Action::parse("getstate"), Some(Action::GetState));
        assert_eq!(Action::parse("hold"), None);
    }

    #[test]
    fn test_invalid_json_recovers_seq() {
        let err = parse_request(r#"{"seq": 17, "action": }"#).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidJson);
        assert_eq!(err.seq, Some(17));

        let err = parse_request("not json").unwrap_err();
        assert_eq!(err.seq, None);
    }

    #[test]
    fn test_missing_field_is_invalid_json() {
        let err = parse_request(r#"{"seq":2}"#).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidJson);
        assert_eq!(err.seq, Some(2));
    }

    #[test]
    fn test_unknown_action() {
        let err = parse_request(r#"{"seq":9,"action":"teleport"}"#).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownAction);
        assert_eq!(err.seq, Some(9));
        assert!(err.message.contains("teleport"));
    }

    #[test]
    fn test_ack_wire_shape() {
        let value = serde_json::to_value(create_ack(3)).unwrap();
        assert_eq!(value, json!({"type": "ack", "seq": 3, "status": "ok"}));
    }

    #[test]
    fn test_error_wire_shape() {
        let err = Response::Error(create_error(None, ErrorCode::InvalidJson, "bad"));
        let value = serde_json::to_value(err).unwrap();
        assert_eq!(
            value,
            json!({"type": "error", "seq": null, "code": "invalid_json", "message": "bad"})
        );
    }

    #[test]
    fn test_event_wire_shape() {
        let value = serde_json::to_value(Response::Event(EventMessage::board())).unwrap();
        assert_eq!(value, json!({"type": "event", "event": "board"}));

        let value = serde_json::to_value(Response::Event(EventMessage::game_over(700))).unwrap();
        assert_eq!(value, json!({"type": "event", "event": "gameOver", "score": 700}));
    }

    #[test]
    fn test_state_from_snapshot() {
        let game = GameState::with_seed(BoardSize::new(6, 8).unwrap(), 3);
        let msg = StateMessage::from_snapshot(5, &game.snapshot());

        assert_eq!(msg.grid.len(), 8);
        assert!(msg.grid.iter().all(|row| row.len() == 6));
        assert_eq!(msg.next_shape.len(), 4);
        assert_eq!(msg.next_shape[0].color, game.next().color());

        let value = serde_json::to_value(Response::State(msg)).unwrap();
        assert_eq!(value["type"], "state");
        assert_eq!(value["seq"], 5);
        assert_eq!(value["gameOver"], false);
        assert_eq!(value["level"], 1);
        assert!(value["nextShape"].is_array());
    }
}
