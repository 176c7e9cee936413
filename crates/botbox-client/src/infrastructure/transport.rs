//! WebSocket transport: handshake, receive loop and the production sink.
//!
//! The receive loop is strictly sequential: it reads a frame, decodes it,
//! hands the snapshot to the [`TurnDispatcher`] and immediately reads the
//! next frame.  It never waits for a turn to finish, so a slow agent cannot
//! delay the processing of later notifications.
//!
//! There is no reconnect.  When the connection ends the loop returns and the
//! caller decides what to do.

use std::sync::Arc;

use async_trait::async_trait;
use botbox_core::{decode_notification, render};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        client::IntoClientRequest, handshake::client::Request, http::HeaderValue,
        Error as WsError, Message as WsMessage,
    },
};
use tracing::{debug, info, warn};

use crate::application::dispatcher::{DecisionCallback, ResponseSender, TurnDispatcher};
use crate::domain::config::ClientConfig;
use crate::error::TransportError;
use crate::infrastructure::session::{FrameSink, SessionController};

/// Handshake header carrying the player's credential.
pub const AUTH_HEADER: &str = "Authentication";

/// Knobs for [`run_receive_loop`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ReceiveOptions {
    /// Log a text rendering of every decoded board.
    pub render_board: bool,
}

/// [`FrameSink`] over the write half of a WebSocket.
pub struct WsSink<S> {
    inner: S,
}

impl<S> WsSink<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S> FrameSink for WsSink<S>
where
    S: Sink<WsMessage, Error = WsError> + Unpin + Send,
{
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.inner.send(WsMessage::Text(text)).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.inner.close().await?;
        Ok(())
    }
}

/// Builds the handshake request for `url`, adding the credential header when
/// a key is configured.
///
/// # Errors
///
/// Returns [`TransportError::WebSocket`] for an unusable URL and
/// [`TransportError::InvalidHeader`] for a key that is not a valid header
/// value.
pub fn build_request(url: &str, key: Option<&str>) -> Result<Request, TransportError> {
    let mut request = url.into_client_request()?;
    if let Some(key) = key {
        let value =
            HeaderValue::from_str(key).map_err(|e| TransportError::InvalidHeader(e.to_string()))?;
        request.headers_mut().insert(AUTH_HEADER, value);
    }
    Ok(request)
}

/// Connects to the configured server and plays until the connection ends.
///
/// Drives `controller` through `Connecting` and `Open`; the receive loop
/// moves it to `Disconnected`.
///
/// # Errors
///
/// Returns a [`TransportError`] if the handshake fails or the connection
/// breaks.  A normal close returns `Ok(())`.
pub async fn connect_and_run(
    config: &ClientConfig,
    controller: Arc<SessionController>,
    agent: Arc<dyn DecisionCallback>,
) -> Result<(), TransportError> {
    let url = config.server_url();
    let request = build_request(&url, config.key.as_deref())?;

    controller.begin_connect();
    info!("session {}: connecting to {url}", controller.id());

    let (ws_stream, response) = match connect_async(request).await {
        Ok(connected) => connected,
        Err(source) => {
            let err = TransportError::Connect { url, source };
            controller.on_error(&err).await;
            return Err(err);
        }
    };
    debug!(
        "session {}: handshake complete ({})",
        controller.id(),
        response.status()
    );

    let (ws_tx, ws_rx) = ws_stream.split();
    controller.on_open(Box::new(WsSink::new(ws_tx))).await;

    let dispatcher = TurnDispatcher::new(
        agent,
        Arc::clone(&controller) as Arc<dyn ResponseSender>,
        config.fallback,
    );
    let options = ReceiveOptions {
        render_board: config.render_board,
    };

    let result = run_receive_loop(ws_rx, &controller, &dispatcher, options).await;
    info!(
        "session {}: receive loop ended after {} turns",
        controller.id(),
        dispatcher.dispatched()
    );
    result
}

/// Reads frames until the connection ends, dispatching every valid
/// notification.
///
/// - text and binary frames are decoded as JSON notifications; undecodable
///   frames are logged and dropped
/// - a close frame or the end of the stream calls
///   [`SessionController::on_close`] and returns `Ok(())`
/// - a stream error calls [`SessionController::on_error`] and is returned
pub async fn run_receive_loop<St>(
    mut stream: St,
    controller: &SessionController,
    dispatcher: &TurnDispatcher,
    options: ReceiveOptions,
) -> Result<(), TransportError>
where
    St: Stream<Item = Result<WsMessage, WsError>> + Unpin,
{
    let id = controller.id();

    while let Some(frame) = stream.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(WsError::ConnectionClosed) => {
                debug!("session {id}: connection closed");
                break;
            }
            Err(e) => {
                let err = TransportError::WebSocket(e);
                controller.on_error(&err).await;
                return Err(err);
            }
        };

        match frame {
            WsMessage::Text(text) => dispatch_frame(text.as_bytes(), controller, dispatcher, options),
            WsMessage::Binary(bytes) => dispatch_frame(&bytes, controller, dispatcher, options),
            WsMessage::Ping(data) => {
                debug!("session {id}: ping ({} bytes)", data.len());
            }
            WsMessage::Pong(_) => {
                debug!("session {id}: pong");
            }
            WsMessage::Close(frame) => {
                debug!("session {id}: close frame {frame:?}");
                break;
            }
            WsMessage::Frame(_) => {
                debug!("session {id}: raw frame (ignored)");
            }
        }
    }

    controller.on_close().await;
    Ok(())
}

fn dispatch_frame(
    raw: &[u8],
    controller: &SessionController,
    dispatcher: &TurnDispatcher,
    options: ReceiveOptions,
) {
    let snapshot = match decode_notification(raw, controller.variant()) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!("session {}: dropping notification: {e}", controller.id());
            return;
        }
    };

    if options.render_board {
        info!(
            "session {}: board at turn {:?}\n{}",
            controller.id(),
            snapshot.turn(),
            render(&snapshot)
        );
    }

    // Detached: the turn task runs on its own and reports through logs.
    drop(dispatcher.handle(snapshot));
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use botbox_core::{Action, ProtocolVariant, Snapshot};
    use futures_util::stream;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    use super::*;
    use crate::domain::config::FallbackPolicy;
    use crate::infrastructure::channel_sink::ChannelSink;
    use crate::infrastructure::session::SessionState;

    const NOTIFICATION: &str = r#"{"turn":1,"player":0,"actions":["north","south"],
        "state":{"w":2,"h":2,"players":[{"x":0,"y":0}]}}"#;

    async fn harness() -> (Arc<SessionController>, TurnDispatcher, mpsc::Receiver<String>) {
        let controller = Arc::new(SessionController::new(ProtocolVariant::PerPlayer));
        let (sink, rx) = ChannelSink::new(16);
        controller.begin_connect();
        controller.on_open(Box::new(sink)).await;
        let dispatcher = TurnDispatcher::new(
            Arc::new(|_: Option<usize>, actions: &[Action], _: &Snapshot| -> anyhow::Result<Action> {
                Ok(actions[0].clone())
            }),
            Arc::clone(&controller) as Arc<dyn ResponseSender>,
            FallbackPolicy::FirstLegal,
        );
        (controller, dispatcher, rx)
    }

    async fn next_frame(rx: &mut mpsc::Receiver<String>) -> Option<String> {
        timeout(Duration::from_secs(2), rx.recv()).await.ok().flatten()
    }

    #[test]
    fn test_build_request_adds_authentication_header() {
        let request = build_request("ws://localhost:12345/", Some("secret")).unwrap();

        let header = request.headers().get(AUTH_HEADER).unwrap();
        assert_eq!(header, "secret");
        assert_eq!(request.uri().port_u16(), Some(12345));
    }

    #[test]
    fn test_build_request_without_key_has_no_header() {
        let request = build_request("ws://localhost:12345/", None).unwrap();
        assert!(request.headers().get(AUTH_HEADER).is_none());
    }

    #[test]
    fn test_build_request_rejects_key_with_newline() {
        let err = build_request("ws://localhost:12345/", Some("bad\nkey")).unwrap_err();
        assert!(matches!(err, TransportError::InvalidHeader(_)));
    }

    #[test]
    fn test_build_request_rejects_garbage_url() {
        assert!(build_request("not a url", None).is_err());
    }

    #[tokio::test]
    async fn test_end_of_stream_disconnects_after_dispatch() {
        // Arrange
        let (controller, dispatcher, mut rx) = harness().await;
        let frames = stream::iter(vec![Ok(WsMessage::Text(NOTIFICATION.to_owned()))]);

        // Act
        run_receive_loop(frames, &controller, &dispatcher, ReceiveOptions::default())
            .await
            .unwrap();

        // Assert: the turn was dispatched, but the session closed before its
        // response could be written, so the sink saw nothing
        assert_eq!(controller.state(), SessionState::Disconnected);
        assert_eq!(dispatcher.dispatched(), 1);
        assert_eq!(next_frame(&mut rx).await, None);
    }

    #[tokio::test]
    async fn test_binary_frame_is_decoded_like_text() {
        // Arrange: keep the stream open so the response can be written
        let (controller, dispatcher, mut rx) = harness().await;
        let frames = stream::iter(vec![Ok(WsMessage::Binary(NOTIFICATION.as_bytes().to_vec()))])
            .chain(stream::pending());

        // Act
        let loop_task = async {
            let _ = run_receive_loop(frames, &controller, &dispatcher, ReceiveOptions::default()).await;
        };
        let frame = tokio::select! {
            _ = loop_task => None,
            frame = next_frame(&mut rx) => frame,
        };

        // Assert
        assert_eq!(frame.as_deref(), Some(r#"{"action":"north"}"#));
    }

    #[tokio::test]
    async fn test_bad_frames_are_dropped_and_loop_continues() {
        // Arrange
        let (controller, dispatcher, mut rx) = harness().await;
        let frames = stream::iter(vec![
            Ok(WsMessage::Text("not json".to_owned())),
            Ok(WsMessage::Text(r#"{"player":0,"actions":[]}"#.to_owned())),
            Ok(WsMessage::Ping(vec![1, 2, 3])),
            Ok(WsMessage::Text(NOTIFICATION.to_owned())),
        ])
        .chain(stream::pending());

        // Act
        let loop_task = async {
            let _ = run_receive_loop(frames, &controller, &dispatcher, ReceiveOptions { render_board: true }).await;
        };
        let frame = tokio::select! {
            _ = loop_task => None,
            frame = next_frame(&mut rx) => frame,
        };

        // Assert: only the valid notification produced a turn
        assert_eq!(frame.as_deref(), Some(r#"{"action":"north"}"#));
        assert_eq!(dispatcher.dispatched(), 1);
    }

    #[tokio::test]
    async fn test_close_frame_ends_loop_and_disconnects() {
        let (controller, dispatcher, _rx) = harness().await;
        let frames = stream::iter(vec![Ok(WsMessage::Close(None))]).chain(stream::pending());

        let result = run_receive_loop(frames, &controller, &dispatcher, ReceiveOptions::default()).await;

        assert!(result.is_ok());
        assert_eq!(controller.state(), SessionState::Disconnected);
        assert_eq!(dispatcher.dispatched(), 0);
    }

    #[tokio::test]
    async fn test_stream_error_is_returned_and_disconnects() {
        let (controller, dispatcher, _rx) = harness().await;
        let frames = stream::iter(vec![Err(WsError::AlreadyClosed)]);

        let result = run_receive_loop(frames, &controller, &dispatcher, ReceiveOptions::default()).await;

        assert!(matches!(result, Err(TransportError::WebSocket(WsError::AlreadyClosed))));
        assert_eq!(controller.state(), SessionState::Disconnected);
    }
}
