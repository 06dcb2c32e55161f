//! In-memory transport: two connected endpoints backed by channels.
//!
//! Each endpoint sends into the other's queue. Closing one endpoint drops
//! its sender, so the peer's `recv` returns `Ok(None)` once the queue is
//! drained, the same signal a clean WebSocket close gives.

use tokio::sync::{mpsc, Mutex};

use crate::{next_connection_id, Connection, ConnectionId, TransportError};

/// One end of an in-memory connection pair.
pub struct ChannelConnection {
    id: ConnectionId,
    tx: Mutex<Option<mpsc::UnboundedSender<Vec<u8>>>>,
    rx: Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
}

impl ChannelConnection {
    /// Creates two endpoints wired to each other.
    pub fn pair() -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::unbounded_channel();
        let (b_tx, a_rx) = mpsc::unbounded_channel();
        let a = Self {
            id: next_connection_id(),
            tx: Mutex::new(Some(a_tx)),
            rx: Mutex::new(a_rx),
        };
        let b = Self {
            id: next_connection_id(),
            tx: Mutex::new(Some(b_tx)),
            rx: Mutex::new(b_rx),
        };
        (a, b)
    }
}

impl Connection for ChannelConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let tx = self.tx.lock().await;
        let tx = tx.as_ref().ok_or_else(|| {
            TransportError::ConnectionClosed("closed locally".into())
        })?;
        tx.send(data.to_vec()).map_err(|_| {
            TransportError::ConnectionClosed("peer dropped".into())
        })
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        Ok(self.rx.lock().await.recv().await)
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.tx.lock().await.take();
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pair_delivers_both_ways() {
        let (a, b) = ChannelConnection::pair();
        a.send(b"ping").await.unwrap();
        b.send(b"pong").await.unwrap();
        assert_eq!(b.recv().await.unwrap().unwrap(), b"ping");
        assert_eq!(a.recv().await.unwrap().unwrap(), b"pong");
        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn test_close_ends_peer_stream_after_drain() {
        let (a, b) = ChannelConnection::pair();
        a.send(b"last").await.unwrap();
        a.close().await.unwrap();

        assert_eq!(b.recv().await.unwrap().unwrap(), b"last");
        assert!(b.recv().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_send_after_close_fails() {
        let (a, _b) = ChannelConnection::pair();
        a.close().await.unwrap();
        let err = a.send(b"x").await.unwrap_err();
        assert!(matches!(err, TransportError::ConnectionClosed(_)));
    }
}
