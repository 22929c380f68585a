//! Selection / move controller.
//!
//! Pure functions over the local session and the current snapshot. Nothing
//! here validates moves: the server is the only judge of legality, so the
//! client proposes and forgets.

use checkers_core::perspective::{Local, Position, to_absolute};
use checkers_core::protocol::{ClientMessage, Color};

use crate::game_state::GameSnapshot;

/// Per-connection UI state that is not part of the server snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalSession {
    /// Assigned once by the server.
    pub color: Option<Color>,
    /// Square picked as the origin of the next move (local frame).
    pub selected: Option<Position<Local>>,
}

impl LocalSession {
    /// Perspective to render from. Unassigned sessions view as white.
    pub fn viewer(&self) -> Color {
        self.color.unwrap_or_default()
    }
}

/// Handle a click on a local square.
///
/// With nothing selected, a click on one of our own pieces selects it and
/// anything else is ignored. With a square selected, any click emits a move
/// from the selection to the clicked square (both mapped to the server's
/// frame) and clears the selection.
pub fn click(
    session: LocalSession,
    snapshot: Option<&GameSnapshot>,
    at: Position<Local>,
) -> (LocalSession, Option<ClientMessage>) {
    match session.selected {
        Some(from) => {
            let viewer = session.viewer();
            let msg = ClientMessage::Move {
                from: to_absolute(from, viewer),
                to: to_absolute(at, viewer),
            };
            let next = LocalSession {
                selected: None,
                ..session
            };
            (next, Some(msg))
        }
        None => {
            let owner = snapshot.and_then(|s| s.board.get(at).color());
            if owner.is_some() && owner == session.color {
                let next = LocalSession {
                    selected: Some(at),
                    ..session
                };
                (next, None)
            } else {
                (session, None)
            }
        }
    }
}

/// Skip is offered only while we are the side to move mid capture chain.
pub fn skip_available(session: &LocalSession, snapshot: Option<&GameSnapshot>) -> bool {
    snapshot.is_some_and(|s| s.just_take.is_some() && Some(s.turn) == session.color)
}

/// The skip frame, when [`skip_available`]. Never touches the selection.
pub fn skip(session: &LocalSession, snapshot: Option<&GameSnapshot>) -> Option<ClientMessage> {
    skip_available(session, snapshot).then_some(ClientMessage::Skip)
}
