//! Channel-based network client for a game session.
//!
//! Spawns background reader/writer tasks and exposes channels so the
//! frontend never owns the socket. Inbound frames are decoded at this
//! boundary and forwarded in arrival order, including the ones that fail
//! to decode, so the state layer can report them. Outbound frames are
//! fire-and-forget: there is no acknowledgement, only the next snapshot.
//!
//! Use [`NetClient::from_transport`] to construct a client over any
//! [`Transport`](crate::transport::Transport) implementation, or
//! [`connect_ws`](NetClient::connect_ws) for a WebSocket.

use tokio::sync::mpsc;

#[cfg(feature = "native")]
use crate::transport::{Transport, TransportReader, TransportWriter};
use checkers_core::protocol::{ClientMessage, ProtocolError, ServerMessage};

/// One decoded inbound frame.
pub type Inbound = Result<ServerMessage, ProtocolError>;

pub struct NetClient {
    /// Decoded server frames. Channel close = disconnected.
    pub incoming: mpsc::UnboundedReceiver<Inbound>,
    outgoing: mpsc::UnboundedSender<ClientMessage>,
}

impl NetClient {
    /// Create a `NetClient` over any [`Transport`] implementation.
    ///
    /// The protocol has no client handshake: the server assigns a color as
    /// soon as the socket opens.
    #[cfg(feature = "native")]
    pub fn from_transport<T: Transport>(transport: T) -> Self {
        let (reader, writer) = transport.split();

        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<ClientMessage>();

        Self::spawn_reader_task(reader, msg_tx);
        Self::spawn_writer_task(writer, cmd_rx);

        Self {
            incoming: msg_rx,
            outgoing: cmd_tx,
        }
    }

    /// Connect to a game session over WebSocket and spawn background I/O tasks.
    #[cfg(feature = "native")]
    pub async fn connect_ws(url: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let transport = crate::ws_transport::WsTransport::connect(url).await?;
        Ok(Self::from_transport(transport))
    }

    /// Enqueue a [`ClientMessage`] for transmission. Never blocks.
    pub fn send(&self, msg: ClientMessage) -> Result<(), mpsc::error::SendError<ClientMessage>> {
        self.outgoing.send(msg)
    }

    /// Connect to a game session from a WASM environment.
    ///
    /// Uses `gloo-net` for the WebSocket and `wasm_bindgen_futures::spawn_local`
    /// for the background tasks (no `Send` requirement).
    #[cfg(all(feature = "web", not(feature = "native")))]
    pub async fn connect_ws(url: &str) -> Result<Self, Box<dyn std::error::Error>> {
        use futures_util::{SinkExt, StreamExt};
        use gloo_net::websocket::{Message, futures::WebSocket};

        let ws = WebSocket::open(url).map_err(|e| format!("WebSocket connect failed: {e}"))?;
        let (mut sink, mut stream) = ws.split();

        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<ClientMessage>();

        wasm_bindgen_futures::spawn_local(async move {
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        if msg_tx.send(ServerMessage::parse(&text)).is_err() {
                            break;
                        }
                    }
                    Ok(Message::Bytes(_)) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "WebSocket read failed");
                        break;
                    }
                }
            }
        });

        wasm_bindgen_futures::spawn_local(async move {
            while let Some(msg) = cmd_rx.recv().await {
                if sink.send(Message::Text(msg.to_string())).await.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            incoming: msg_rx,
            outgoing: cmd_tx,
        })
    }

    #[cfg(feature = "native")]
    fn spawn_reader_task<R: TransportReader>(mut reader: R, msg_tx: mpsc::UnboundedSender<Inbound>) {
        tokio::spawn(async move {
            loop {
                match reader.recv().await {
                    Ok(Some(text)) => {
                        if msg_tx.send(ServerMessage::parse(&text)).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!(error = %e, "Transport read failed");
                        break;
                    }
                }
            }
            // Dropping msg_tx closes the channel, which signals disconnect.
        });
    }

    #[cfg(feature = "native")]
    fn spawn_writer_task<W: TransportWriter>(
        mut writer: W,
        mut cmd_rx: mpsc::UnboundedReceiver<ClientMessage>,
    ) {
        tokio::spawn(async move {
            while let Some(msg) = cmd_rx.recv().await {
                let frame = msg.to_string();
                if let Err(e) = writer.send(&frame).await {
                    tracing::warn!(error = %e, %frame, "Transport write failed");
                    break;
                }
            }
        });
    }
}
