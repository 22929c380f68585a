//! Framework-agnostic client controller.
//!
//! Owns a [`NetClient`] and a [`ClientGameState`]:
//!
//! - inbound frames are applied to the state, in arrival order;
//! - clicks and skips go through the selection controller and whatever it
//!   emits is forwarded to the server.
//!
//! Frontends only need to:
//! 1. Call [`ClientController::connect_ws`] to open the session.
//! 2. Call [`ClientController::try_recv`] or [`ClientController::recv`]
//!    to process server frames.
//! 3. Call [`ClientController::click`] / [`ClientController::skip`] on input.

use checkers_core::perspective::{Local, Position};
use checkers_core::protocol::{ClientMessage, ProtocolError};

use crate::game_state::{ClientGameState, LogCategory, StateChanged};
use crate::net_client::{Inbound, NetClient};
#[cfg(feature = "native")]
use crate::transport::Transport;

/// Outcome of processing a single network event.
#[derive(Debug)]
pub enum PollResult {
    /// A server message was applied; the flags describe what was modified.
    Updated(StateChanged),
    /// A frame failed to decode and was dropped. The snapshot is unchanged.
    Rejected(ProtocolError),
    /// The server closed the connection. Terminal.
    Disconnected,
    /// No event was available (channel empty).
    Empty,
}

pub struct ClientController {
    net: NetClient,
    pub state: ClientGameState,
}

impl ClientController {
    /// Create a controller over any [`Transport`] implementation.
    #[cfg(feature = "native")]
    pub fn from_transport<T: Transport>(transport: T) -> Self {
        Self {
            net: NetClient::from_transport(transport),
            state: ClientGameState::new(),
        }
    }

    /// Connect to a game session (e.g. `ws://host:3030/game/<id>`).
    #[cfg(any(feature = "native", feature = "web"))]
    pub async fn connect_ws(url: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let net = NetClient::connect_ws(url).await?;
        Ok(Self {
            net,
            state: ClientGameState::new(),
        })
    }

    /// Try to receive and process one network event (non-blocking).
    pub fn try_recv(&mut self) -> PollResult {
        if !self.state.connected {
            return PollResult::Disconnected;
        }
        match self.net.incoming.try_recv() {
            Ok(inbound) => self.handle_inbound(inbound),
            Err(tokio::sync::mpsc::error::TryRecvError::Empty) => PollResult::Empty,
            Err(tokio::sync::mpsc::error::TryRecvError::Disconnected) => {
                self.state.mark_disconnected();
                PollResult::Disconnected
            }
        }
    }

    /// Await the next network event. Useful in `tokio::select!` loops.
    pub async fn recv(&mut self) -> PollResult {
        if !self.state.connected {
            return PollResult::Disconnected;
        }
        match self.net.incoming.recv().await {
            Some(inbound) => self.handle_inbound(inbound),
            None => {
                self.state.mark_disconnected();
                PollResult::Disconnected
            }
        }
    }

    /// Click a square in the rendered (local) frame. Sends a move if this
    /// click completes one.
    pub fn click(&mut self, at: Position<Local>) -> Option<ClientMessage> {
        let msg = self.state.click_cell(at)?;
        self.send(msg);
        Some(msg)
    }

    /// End the turn mid capture chain. No-op unless skip is available.
    pub fn skip(&mut self) -> Option<ClientMessage> {
        let msg = self.state.skip()?;
        self.send(msg);
        Some(msg)
    }

    /// Append a local feedback message to the event log.
    pub fn add_message(&mut self, text: String, category: LogCategory) {
        self.state.add_message(text, category);
    }

    // -- private -----------------------------------------------------------

    fn send(&self, msg: ClientMessage) {
        // A closed writer shows up as a disconnect on the read side.
        let _ = self.net.send(msg);
    }

    fn handle_inbound(&mut self, inbound: Inbound) -> PollResult {
        match inbound {
            Ok(msg) => PollResult::Updated(self.state.apply_server_message(msg)),
            Err(e) => {
                self.state.reject_frame(&e);
                PollResult::Rejected(e)
            }
        }
    }
}
