use std::collections::VecDeque;

use checkers_core::board::Board;
use checkers_core::perspective::{Absolute, Local, Position, to_local};
use checkers_core::protocol::{ClientMessage, Color, ProtocolError, ServerMessage, ServerSnapshot};

use crate::selection::{self, LocalSession};

/// Maximum number of entries kept in [`ClientGameState::events`].
const EVENT_LOG_LEN: usize = 100;

/// The last server snapshot, in the viewer's frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    pub board: Board<Local>,
    pub turn: Color,
    pub just_take: Option<Position<Local>>,
}

impl GameSnapshot {
    /// Project a server snapshot into `viewer`'s frame. Board and `just_take`
    /// go through the same transform.
    pub fn from_server(snapshot: &ServerSnapshot, viewer: Color) -> Self {
        Self {
            board: snapshot.board.to_local(viewer),
            turn: snapshot.turn,
            just_take: snapshot.just_take.map(|p| to_local(p, viewer)),
        }
    }
}

/// Semantic category for log/event messages. The UI layer decides how to style each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCategory {
    System,
    Action,
    Error,
    Info,
}

/// A structured session event for the frontend's log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// The server rejected us because the session already has two players.
    RoomFull,
    /// We were told which side we play.
    ColorAssigned { color: Color },
    /// The side to move changed.
    TurnChanged { turn: Color, ours: bool },
    /// We must keep capturing with this piece, or end the turn.
    CaptureChain { at: Position<Local> },
    /// A move proposal went out.
    MoveSent {
        from: Position<Absolute>,
        to: Position<Absolute>,
    },
    /// We ended our turn mid capture chain.
    Skipped,
    /// An inbound frame was dropped; the previous snapshot is kept.
    FrameRejected { reason: String },
    /// Server disconnected.
    Disconnected,
    /// Generic text message (used by the UI layer for local feedback).
    Text { text: String, category: LogCategory },
}

impl GameEvent {
    /// Semantic category for styling purposes.
    pub fn category(&self) -> LogCategory {
        match self {
            Self::ColorAssigned { .. } | Self::TurnChanged { .. } => LogCategory::System,
            Self::MoveSent { .. } | Self::Skipped => LogCategory::Action,
            Self::RoomFull | Self::FrameRejected { .. } | Self::Disconnected => LogCategory::Error,
            Self::CaptureChain { .. } => LogCategory::Info,
            Self::Text { category, .. } => *category,
        }
    }
}

/// Describes what changed after applying a server message.
///
/// All flags default to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateChanged {
    /// Our color was assigned.
    pub color: bool,
    /// The board contents changed (or the first snapshot arrived).
    pub board: bool,
    /// The side to move or the pending capture changed.
    pub turn: bool,
    /// A user-facing notice (room full, disconnected) was raised.
    pub notice: bool,
}

impl StateChanged {
    /// Returns `true` if any flag is set.
    pub fn any(self) -> bool {
        self.color || self.board || self.turn || self.notice
    }
}

/// Everything the client tracks for one connection.
///
/// Created fresh when the connection opens and thrown away when it closes.
#[derive(Debug, Clone)]
pub struct ClientGameState {
    /// Structured session events, newest last.
    pub events: VecDeque<GameEvent>,
    /// Assigned color and current selection.
    pub session: LocalSession,
    /// Last accepted snapshot in the viewer's frame. `None` until the first
    /// one arrives.
    pub snapshot: Option<GameSnapshot>,
    /// The same snapshot in the server's frame, kept so the view can be
    /// rebuilt if the viewer changes.
    server_snapshot: Option<ServerSnapshot>,
    /// The server answered `full`.
    pub room_full: bool,
    /// Connection status. Once `false` the state ignores all input.
    pub connected: bool,
}

impl Default for ClientGameState {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientGameState {
    pub fn new() -> Self {
        Self {
            events: VecDeque::new(),
            session: LocalSession::default(),
            snapshot: None,
            server_snapshot: None,
            room_full: false,
            connected: true,
        }
    }

    /// Append a game event, keeping only the last 100 entries.
    pub fn add_event(&mut self, event: GameEvent) {
        self.events.push_back(event);
        if self.events.len() > EVENT_LOG_LEN {
            self.events.pop_front();
        }
    }

    /// Convenience: append a [`GameEvent::Text`] for ad-hoc messages.
    pub fn add_message(&mut self, text: String, category: LogCategory) {
        self.add_event(GameEvent::Text { text, category });
    }

    pub fn color(&self) -> Option<Color> {
        self.session.color
    }

    pub fn selected(&self) -> Option<Position<Local>> {
        self.session.selected
    }

    /// No snapshot has arrived yet.
    pub fn is_waiting(&self) -> bool {
        self.snapshot.is_none()
    }

    pub fn is_our_turn(&self) -> bool {
        match (&self.snapshot, self.session.color) {
            (Some(snapshot), Some(color)) => snapshot.turn == color,
            _ => false,
        }
    }

    /// Whether the end-turn action is currently offered.
    pub fn can_skip(&self) -> bool {
        selection::skip_available(&self.session, self.snapshot.as_ref())
    }

    /// Decode and apply one raw inbound text frame.
    ///
    /// A frame that fails to decode is logged and dropped; the previous
    /// snapshot stays authoritative.
    pub fn apply_frame(&mut self, text: &str) -> Result<StateChanged, ProtocolError> {
        match ServerMessage::parse(text) {
            Ok(msg) => Ok(self.apply_server_message(msg)),
            Err(e) => {
                self.reject_frame(&e);
                Err(e)
            }
        }
    }

    /// Record a frame that could not be decoded. State is left untouched.
    pub fn reject_frame(&mut self, error: &ProtocolError) {
        if !self.connected {
            return;
        }
        tracing::warn!(%error, "Dropping malformed server frame");
        self.add_event(GameEvent::FrameRejected {
            reason: error.to_string(),
        });
    }

    /// Apply a decoded server message.
    ///
    /// Returns a [`StateChanged`] describing which aspects of the state were
    /// modified, so the UI layer can decide what to re-render.
    pub fn apply_server_message(&mut self, msg: ServerMessage) -> StateChanged {
        let mut changed = StateChanged::default();
        if !self.connected {
            return changed;
        }

        match msg {
            ServerMessage::RoomFull => {
                self.room_full = true;
                self.add_event(GameEvent::RoomFull);
                changed.notice = true;
            }
            ServerMessage::AssignColor(color) => match self.session.color {
                None => {
                    tracing::debug!(%color, "Color assigned");
                    self.session.color = Some(color);
                    self.add_event(GameEvent::ColorAssigned { color });
                    changed.color = true;
                    if let Some(server) = &self.server_snapshot {
                        // Anything already on screen was drawn from white's side.
                        self.snapshot = Some(GameSnapshot::from_server(server, color));
                        self.session.selected = None;
                        changed.board = true;
                        changed.turn = true;
                    }
                }
                Some(current) => {
                    tracing::debug!(%current, repeated = %color, "Ignoring repeated color assignment");
                }
            },
            ServerMessage::Snapshot(snapshot) => {
                let next = GameSnapshot::from_server(&snapshot, self.session.viewer());
                changed = self.replace_snapshot(next);
                self.server_snapshot = Some(snapshot);
            }
        }

        changed
    }

    /// The connection closed. Raises the notice once and goes inert.
    pub fn mark_disconnected(&mut self) -> StateChanged {
        if !self.connected {
            return StateChanged::default();
        }
        tracing::info!("Disconnected from server");
        self.connected = false;
        self.add_event(GameEvent::Disconnected);
        StateChanged {
            notice: true,
            ..StateChanged::default()
        }
    }

    /// Handle a click on a local square, returning the frame to send (if any).
    pub fn click_cell(&mut self, at: Position<Local>) -> Option<ClientMessage> {
        if !self.connected {
            return None;
        }
        let (session, out) = selection::click(self.session, self.snapshot.as_ref(), at);
        self.session = session;
        if let Some(ClientMessage::Move { from, to }) = out {
            tracing::debug!(%from, %to, "Proposing move");
            self.add_event(GameEvent::MoveSent { from, to });
        }
        out
    }

    /// End the turn mid capture chain, if that is currently allowed.
    pub fn skip(&mut self) -> Option<ClientMessage> {
        if !self.connected {
            return None;
        }
        let out = selection::skip(&self.session, self.snapshot.as_ref());
        if out.is_some() {
            self.add_event(GameEvent::Skipped);
        }
        out
    }

    // -- private -----------------------------------------------------------

    fn replace_snapshot(&mut self, next: GameSnapshot) -> StateChanged {
        let mut changed = StateChanged::default();
        let ours = self.session.color == Some(next.turn);

        match &self.snapshot {
            Some(prev) => {
                changed.board = prev.board != next.board;
                changed.turn = prev.turn != next.turn || prev.just_take != next.just_take;
            }
            None => {
                changed.board = true;
                changed.turn = true;
            }
        }

        if changed.turn {
            if self.snapshot.as_ref().map(|s| s.turn) != Some(next.turn) {
                self.add_event(GameEvent::TurnChanged {
                    turn: next.turn,
                    ours,
                });
            }
            if let Some(at) = next.just_take.filter(|_| ours) {
                self.add_event(GameEvent::CaptureChain { at });
            }
        }

        tracing::debug!(turn = %next.turn, just_take = ?next.just_take, "Applied snapshot");
        self.snapshot = Some(next);
        changed
    }
}
