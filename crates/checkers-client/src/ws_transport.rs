//! Game-session socket for native targets, built on `tokio-tungstenite`.
//!
//! The server ends a session in more than one way: a close frame after a
//! normal game, or simply dropping the TCP stream right after answering
//! `full`. Both read as a clean end of session here; only genuine I/O and
//! protocol faults surface as [`TransportError::Io`].

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::error::ProtocolError as WsProtocolError;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::transport::{Transport, TransportError, TransportReader, TransportWriter};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Map a socket error onto the session's view of it.
fn session_error(e: WsError) -> TransportError {
    match e {
        WsError::ConnectionClosed
        | WsError::AlreadyClosed
        | WsError::Protocol(WsProtocolError::ResetWithoutClosingHandshake) => {
            TransportError::ConnectionClosed
        }
        WsError::Http(response) => {
            TransportError::Io(format!("game session refused: HTTP {}", response.status()))
        }
        other => TransportError::Io(other.to_string()),
    }
}

/// The socket for one game session (`{server}/game/{id}`).
pub struct WsTransport {
    stream: WsStream,
}

impl WsTransport {
    /// Open the session socket. The server assigns a color (or answers
    /// `full`) as soon as this returns; nothing is sent first.
    pub async fn connect(url: &str) -> Result<Self, TransportError> {
        let (stream, _response) = connect_async(url).await.map_err(session_error)?;
        tracing::info!(%url, "Joined game session");
        Ok(Self { stream })
    }
}

impl Transport for WsTransport {
    type Reader = WsReader;
    type Writer = WsWriter;

    fn split(self) -> (Self::Reader, Self::Writer) {
        let (sink, stream) = self.stream.split();
        (WsReader { stream }, WsWriter { sink })
    }
}

/// Inbound half: yields server frames as text, in arrival order.
pub struct WsReader {
    stream: SplitStream<WsStream>,
}

impl TransportReader for WsReader {
    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text.to_string())),
                Some(Ok(Message::Close(frame))) => {
                    tracing::debug!(?frame, "Server closed the session");
                    return Ok(None);
                }
                Some(Ok(Message::Binary(bytes))) => {
                    tracing::debug!(len = bytes.len(), "Ignoring binary frame");
                }
                // Ping/pong are answered by tungstenite itself.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    return match session_error(e) {
                        TransportError::ConnectionClosed => {
                            tracing::debug!("Server dropped the session socket");
                            Ok(None)
                        }
                        err => Err(err),
                    };
                }
                None => return Ok(None),
            }
        }
    }
}

/// Outbound half: move and skip frames.
pub struct WsWriter {
    sink: SplitSink<WsStream, Message>,
}

impl TransportWriter for WsWriter {
    async fn send(&mut self, text: &str) -> Result<(), TransportError> {
        self.sink
            .send(Message::text(text))
            .await
            .map_err(session_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropped_socket_is_a_clean_close() {
        assert!(matches!(
            session_error(WsError::ConnectionClosed),
            TransportError::ConnectionClosed
        ));
        assert!(matches!(
            session_error(WsError::Protocol(WsProtocolError::ResetWithoutClosingHandshake)),
            TransportError::ConnectionClosed
        ));
    }

    #[test]
    fn io_faults_are_reported() {
        let err = session_error(WsError::Io(std::io::Error::other("reset by peer")));
        assert!(matches!(err, TransportError::Io(msg) if msg.contains("reset by peer")));
    }
}
