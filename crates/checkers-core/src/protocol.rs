use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{Board, MalformedBoard};
use crate::perspective::{Absolute, Position};

/// Server frame rejecting a connection to a session that already has two players.
pub const FULL_FRAME: &str = "full";
/// Client frame releasing the piece that is mid capture chain.
pub const SKIP_FRAME: &str = "skip";

/// Side of the board a player controls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    #[default]
    White,
    Black,
}

impl Color {
    /// Wire literal, also used as the color-assignment frame.
    pub fn as_str(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while decoding a frame.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Board(#[from] MalformedBoard),

    #[error("just_take ({row}, {col}) is off the board")]
    OffBoard { row: u8, col: u8 },

    #[error("malformed move frame {0:?}")]
    BadMove(String),
}

/// Snapshot exactly as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotPayload {
    pub turn: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub just_take: Option<[u8; 2]>,
    pub board: String,
}

/// A decoded snapshot, still in the server's frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSnapshot {
    pub board: Board<Absolute>,
    pub turn: Color,
    /// Piece that must continue capturing (or be released with a skip).
    pub just_take: Option<Position<Absolute>>,
}

impl TryFrom<SnapshotPayload> for ServerSnapshot {
    type Error = ProtocolError;

    fn try_from(payload: SnapshotPayload) -> Result<Self, Self::Error> {
        let board = Board::decode(&payload.board)?;
        let just_take = payload
            .just_take
            .map(|[row, col]| Position::new(row, col).ok_or(ProtocolError::OffBoard { row, col }))
            .transpose()?;
        Ok(Self {
            board,
            turn: payload.turn,
            just_take,
        })
    }
}

impl From<&ServerSnapshot> for SnapshotPayload {
    fn from(snapshot: &ServerSnapshot) -> Self {
        Self {
            turn: snapshot.turn,
            just_take: snapshot.just_take.map(|p| [p.row(), p.col()]),
            board: snapshot.board.to_string(),
        }
    }
}

/// Messages sent from server to client.
///
/// Every inbound text frame decodes to exactly one of these or is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// The session already has two players.
    RoomFull,
    /// The color this connection plays.
    AssignColor(Color),
    /// Full authoritative board state.
    Snapshot(ServerSnapshot),
}

impl ServerMessage {
    /// Decode one inbound text frame.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        match text {
            FULL_FRAME => Ok(ServerMessage::RoomFull),
            "white" => Ok(ServerMessage::AssignColor(Color::White)),
            "black" => Ok(ServerMessage::AssignColor(Color::Black)),
            _ => {
                let payload: SnapshotPayload = serde_json::from_str(text)?;
                Ok(ServerMessage::Snapshot(payload.try_into()?))
            }
        }
    }
}

/// Encodes the message as its wire frame.
impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerMessage::RoomFull => f.write_str(FULL_FRAME),
            ServerMessage::AssignColor(color) => f.write_str(color.as_str()),
            ServerMessage::Snapshot(snapshot) => {
                let json = serde_json::to_string(&SnapshotPayload::from(snapshot))
                    .map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

/// Messages sent from client to server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMessage {
    /// Move a piece. Both squares are in the server's frame.
    Move {
        from: Position<Absolute>,
        to: Position<Absolute>,
    },
    /// End the turn instead of continuing a capture chain.
    Skip,
}

/// Encodes the message as its wire frame: `skip` or `fromRow,fromCol,toRow,toCol`.
impl fmt::Display for ClientMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientMessage::Move { from, to } => write!(
                f,
                "{},{},{},{}",
                from.row(),
                from.col(),
                to.row(),
                to.col()
            ),
            ClientMessage::Skip => f.write_str(SKIP_FRAME),
        }
    }
}

impl FromStr for ClientMessage {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == SKIP_FRAME {
            return Ok(ClientMessage::Skip);
        }
        let bad = || ProtocolError::BadMove(s.to_string());
        let coords = s
            .split(',')
            .map(|part| part.parse::<u8>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| bad())?;
        let [from_row, from_col, to_row, to_col] = coords[..] else {
            return Err(bad());
        };
        let from = Position::new(from_row, from_col).ok_or_else(bad)?;
        let to = Position::new(to_row, to_col).ok_or_else(bad)?;
        Ok(ClientMessage::Move { from, to })
    }
}

// ---------------------------------------------------------------------------
// Game URL
// ---------------------------------------------------------------------------

/// Errors raised while building the session URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameIdError {
    #[error("game ID cannot be empty")]
    Empty,
    #[error("game ID must be fewer than 64 characters")]
    TooLong,
    #[error("game ID may only contain letters, digits, '-' and '_'")]
    InvalidChars,
    #[error("server URL must start with ws:// or wss://, got {0:?}")]
    BadScheme(String),
}

/// Validate a game ID.
///
/// IDs are URL path segments: non-empty, fewer than 64 characters, and
/// limited to `[A-Za-z0-9_-]`.
pub fn validate_game_id(id: &str) -> Result<(), GameIdError> {
    if id.is_empty() {
        return Err(GameIdError::Empty);
    }
    if id.len() >= 64 {
        return Err(GameIdError::TooLong);
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(GameIdError::InvalidChars);
    }
    Ok(())
}

/// Build the WebSocket URL for a game session: `{server}/game/{id}`.
pub fn game_url(server: &str, game_id: &str) -> Result<String, GameIdError> {
    if !(server.starts_with("ws://") || server.starts_with("wss://")) {
        return Err(GameIdError::BadScheme(server.to_string()));
    }
    validate_game_id(game_id)?;
    Ok(format!("{}/game/{}", server.trim_end_matches('/'), game_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{CELL_COUNT, Cell};

    fn abs(row: u8, col: u8) -> Position<Absolute> {
        Position::new(row, col).unwrap()
    }

    fn empty_board() -> String {
        Cell::Empty.glyph().repeat(CELL_COUNT)
    }

    #[test]
    fn literal_frames() {
        assert_eq!(ServerMessage::parse("full").unwrap(), ServerMessage::RoomFull);
        assert_eq!(
            ServerMessage::parse("white").unwrap(),
            ServerMessage::AssignColor(Color::White)
        );
        assert_eq!(
            ServerMessage::parse("black").unwrap(),
            ServerMessage::AssignColor(Color::Black)
        );
    }

    #[test]
    fn snapshot_frame_with_capture_chain() {
        let text = format!(
            r#"{{ "turn": "black", "just_take": [2, 3], "board": "{}" }}"#,
            empty_board()
        );
        let ServerMessage::Snapshot(snapshot) = ServerMessage::parse(&text).unwrap() else {
            panic!("expected snapshot");
        };
        assert_eq!(snapshot.turn, Color::Black);
        assert_eq!(snapshot.just_take, Some(abs(2, 3)));
        assert_eq!(snapshot.board, Board::empty());
    }

    #[test]
    fn snapshot_without_just_take() {
        let text = format!(r#"{{"turn":"white","board":"{}"}}"#, empty_board());
        let ServerMessage::Snapshot(snapshot) = ServerMessage::parse(&text).unwrap() else {
            panic!("expected snapshot");
        };
        assert_eq!(snapshot.just_take, None);
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(matches!(
            ServerMessage::parse("hello"),
            Err(ProtocolError::Json(_))
        ));
        assert!(matches!(
            ServerMessage::parse(r#"{"turn":"red","board":""}"#),
            Err(ProtocolError::Json(_))
        ));
        assert!(matches!(
            ServerMessage::parse(r#"{"turn":"white","board":"🟦🟦"}"#),
            Err(ProtocolError::Board(MalformedBoard::WrongLength(2)))
        ));

        let off_board = format!(
            r#"{{"turn":"white","just_take":[8,0],"board":"{}"}}"#,
            empty_board()
        );
        assert!(matches!(
            ServerMessage::parse(&off_board),
            Err(ProtocolError::OffBoard { row: 8, col: 0 })
        ));
    }

    #[test]
    fn literal_match_is_exact() {
        assert!(ServerMessage::parse("White").is_err());
        assert!(ServerMessage::parse(" full").is_err());
    }

    #[test]
    fn server_snapshot_reencodes() {
        let snapshot = ServerSnapshot {
            board: Board::empty(),
            turn: Color::White,
            just_take: Some(abs(4, 5)),
        };
        let msg = ServerMessage::Snapshot(snapshot);
        assert_eq!(ServerMessage::parse(&msg.to_string()).unwrap(), msg);
    }

    #[test]
    fn client_move_frame() {
        let msg = ClientMessage::Move {
            from: abs(5, 2),
            to: abs(4, 3),
        };
        assert_eq!(msg.to_string(), "5,2,4,3");
        assert_eq!(ClientMessage::Skip.to_string(), "skip");
    }

    #[test]
    fn client_frame_parsing() {
        assert_eq!("skip".parse::<ClientMessage>().unwrap(), ClientMessage::Skip);
        assert_eq!(
            "0,0,1,1".parse::<ClientMessage>().unwrap(),
            ClientMessage::Move {
                from: abs(0, 0),
                to: abs(1, 1)
            }
        );
        for bad in ["", "1,2,3", "1,2,3,4,5", "1,2,3,8", "a,b,c,d", "-1,0,0,0", "skip "] {
            assert!(
                matches!(bad.parse::<ClientMessage>(), Err(ProtocolError::BadMove(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn valid_game_ids() {
        assert!(validate_game_id("abc123").is_ok());
        assert!(validate_game_id("V1StGXR8_Z5jdHi6B-myT").is_ok());
    }

    #[test]
    fn invalid_game_ids() {
        assert_eq!(validate_game_id(""), Err(GameIdError::Empty));
        assert_eq!(validate_game_id(&"a".repeat(64)), Err(GameIdError::TooLong));
        assert_eq!(validate_game_id("a/b"), Err(GameIdError::InvalidChars));
        assert_eq!(validate_game_id("room 1"), Err(GameIdError::InvalidChars));
    }

    #[test]
    fn builds_game_url() {
        assert_eq!(
            game_url("ws://127.0.0.1:3030/", "abc").unwrap(),
            "ws://127.0.0.1:3030/game/abc"
        );
        assert_eq!(
            game_url("wss://example.org", "x_y").unwrap(),
            "wss://example.org/game/x_y"
        );
        assert!(matches!(
            game_url("http://example.org", "abc"),
            Err(GameIdError::BadScheme(_))
        ));
    }
}
