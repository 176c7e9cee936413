//! In-process [`FrameSink`] that forwards frames to an mpsc channel.
//!
//! Used to embed the client without a socket, e.g. when a test harness plays
//! the server side.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::error::TransportError;
use crate::infrastructure::session::FrameSink;

/// Forwards each text frame to a channel; closing drops the sender so the
/// receiver sees the end of the stream.
#[derive(Debug)]
pub struct ChannelSink {
    tx: Option<mpsc::Sender<String>>,
}

impl ChannelSink {
    /// Creates a sink and the receiver that observes its frames.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx: Some(tx) }, rx)
    }
}

#[async_trait]
impl FrameSink for ChannelSink {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        let tx = self.tx.as_ref().ok_or(WsError::AlreadyClosed)?;
        tx.send(text)
            .await
            .map_err(|_| TransportError::WebSocket(WsError::ConnectionClosed))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.tx.take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_frames_reach_the_receiver_in_order() {
        let (mut sink, mut rx) = ChannelSink::new(4);

        sink.send_text("one".into()).await.unwrap();
        sink.send_text("two".into()).await.unwrap();

        assert_eq!(rx.recv().await.as_deref(), Some("one"));
        assert_eq!(rx.recv().await.as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn test_close_ends_the_receiver_and_refuses_writes() {
        let (mut sink, mut rx) = ChannelSink::new(4);

        sink.close().await.unwrap();

        assert_eq!(rx.recv().await, None);
        assert!(sink.send_text("late".into()).await.is_err());
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_a_transport_error() {
        let (mut sink, rx) = ChannelSink::new(4);
        drop(rx);

        let err = sink.send_text("lost".into()).await.unwrap_err();

        assert!(matches!(err, TransportError::WebSocket(WsError::ConnectionClosed)));
    }
}
