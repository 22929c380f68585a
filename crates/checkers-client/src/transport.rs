//! Transport abstraction for the game connection.
//!
//! The checkers protocol is plain text frames over an ordered, reliable,
//! bidirectional channel. [`NetClient`](crate::net_client::NetClient) only
//! needs that much, so it talks to a [`Transport`] rather than to a
//! WebSocket directly. [`MemoryTransport`] is an in-process implementation
//! for embedding and tests.

use std::future::Future;

use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The remote peer closed the connection.
    #[error("connection closed")]
    ConnectionClosed,

    /// An I/O or protocol-level error.
    #[error("{0}")]
    Io(String),
}

/// Read half of a transport connection.
pub trait TransportReader: Send + 'static {
    /// Receive the next text frame, in the order the peer sent it.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    fn recv(&mut self) -> impl Future<Output = Result<Option<String>, TransportError>> + Send;
}

/// Write half of a transport connection.
pub trait TransportWriter: Send + 'static {
    /// Send one text frame to the peer.
    fn send(&mut self, text: &str) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// A bidirectional transport that can be split into independent read and write
/// halves, so each can live in its own task.
pub trait Transport: Send + 'static {
    type Reader: TransportReader;
    type Writer: TransportWriter;

    fn split(self) -> (Self::Reader, Self::Writer);
}

// ---------------------------------------------------------------------------
// In-memory transport
// ---------------------------------------------------------------------------

/// Channel-backed transport. The other end is a [`MemoryPeer`].
pub struct MemoryTransport {
    reader: MemoryReader,
    writer: MemoryWriter,
}

/// The far side of a [`MemoryTransport`], standing in for the server.
pub struct MemoryPeer {
    /// Frames to deliver to the client.
    pub to_client: mpsc::UnboundedSender<String>,
    /// Frames the client sent.
    pub from_client: mpsc::UnboundedReceiver<String>,
}

impl MemoryTransport {
    /// Create a connected transport / peer pair.
    pub fn pair() -> (Self, MemoryPeer) {
        let (to_client, client_rx) = mpsc::unbounded_channel();
        let (client_tx, from_client) = mpsc::unbounded_channel();
        let transport = Self {
            reader: MemoryReader { rx: client_rx },
            writer: MemoryWriter { tx: client_tx },
        };
        let peer = MemoryPeer {
            to_client,
            from_client,
        };
        (transport, peer)
    }
}

impl Transport for MemoryTransport {
    type Reader = MemoryReader;
    type Writer = MemoryWriter;

    fn split(self) -> (Self::Reader, Self::Writer) {
        (self.reader, self.writer)
    }
}

pub struct MemoryReader {
    rx: mpsc::UnboundedReceiver<String>,
}

impl TransportReader for MemoryReader {
    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        // Dropping the peer's sender is a clean close.
        Ok(self.rx.recv().await)
    }
}

pub struct MemoryWriter {
    tx: mpsc::UnboundedSender<String>,
}

impl TransportWriter for MemoryWriter {
    async fn send(&mut self, text: &str) -> Result<(), TransportError> {
        self.tx
            .send(text.to_string())
            .map_err(|_| TransportError::ConnectionClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_pair_delivers_in_order() {
        let (transport, mut peer) = MemoryTransport::pair();
        let (mut reader, mut writer) = transport.split();

        peer.to_client.send("white".to_string()).unwrap();
        peer.to_client.send("full".to_string()).unwrap();
        assert_eq!(reader.recv().await.unwrap().as_deref(), Some("white"));
        assert_eq!(reader.recv().await.unwrap().as_deref(), Some("full"));

        writer.send("skip").await.unwrap();
        assert_eq!(peer.from_client.recv().await.as_deref(), Some("skip"));

        drop(peer);
        assert_eq!(reader.recv().await.unwrap(), None);
        assert!(matches!(
            writer.send("0,0,1,1").await,
            Err(TransportError::ConnectionClosed)
        ));
    }
}
