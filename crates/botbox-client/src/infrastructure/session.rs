//! Session controller: connection state and the single write path.
//!
//! # State machine
//!
//! ```text
//!  Disconnected ──begin_connect──> Connecting ──on_open──> Open
//!       ^                              │                    │
//!       │<──────────on_error───────────┘                    │ close
//!       │<──────────on_error / on_close─────────────────────┤
//!       │                                                   v
//!       └─────────────────────────────────────────────── Closing
//! ```
//!
//! The current state is published on a `tokio::sync::watch` channel so any
//! task can observe or await transitions.
//!
//! # Write path
//!
//! All outbound frames go through [`SessionController::send`], which holds a
//! `tokio::sync::Mutex` around the sink for the whole write.  Concurrent turn
//! tasks therefore never interleave frames, and they write in the order they
//! acquire the lock.  The state is checked *after* the lock is taken, so a
//! send that was queued behind the lock when the session closed is refused
//! without touching the sink.

use std::fmt;

use async_trait::async_trait;
use botbox_core::{encode_response, ProtocolVariant, Response};
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::application::dispatcher::ResponseSender;
use crate::error::{SendError, SessionClosedError, TransportError};

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Open,
    Closing,
}

impl SessionState {
    /// Returns `true` if the state machine allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Disconnected, Connecting)
                | (Connecting, Open)
                | (Connecting, Disconnected)
                | (Open, Closing)
                | (Open, Disconnected)
                | (Closing, Disconnected)
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connecting => "connecting",
            SessionState::Open => "open",
            SessionState::Closing => "closing",
        })
    }
}

/// Outbound half of a connection.
///
/// The production implementation wraps the WebSocket write half; tests use
/// in-memory sinks.
#[async_trait]
pub trait FrameSink: Send {
    /// Writes one text frame.
    async fn send_text(&mut self, text: String) -> Result<(), TransportError>;

    /// Sends a close frame and flushes.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Owns the connection state and serializes all writes.
pub struct SessionController {
    id: Uuid,
    variant: ProtocolVariant,
    state: watch::Sender<SessionState>,
    sink: Mutex<Option<Box<dyn FrameSink>>>,
}

impl SessionController {
    pub fn new(variant: ProtocolVariant) -> Self {
        let (state, _) = watch::channel(SessionState::Disconnected);
        Self {
            id: Uuid::new_v4(),
            variant,
            state,
            sink: Mutex::new(None),
        }
    }

    /// Identifier used in log lines.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn variant(&self) -> ProtocolVariant {
        self.variant
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Returns a receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn begin_connect(&self) {
        self.transition(SessionState::Connecting);
    }

    /// Installs the outbound sink and marks the session open.
    pub async fn on_open(&self, sink: Box<dyn FrameSink>) {
        let mut guard = self.sink.lock().await;
        *guard = Some(sink);
        self.transition(SessionState::Open);
        info!("session {}: open ({:?} protocol)", self.id, self.variant);
    }

    /// Records a transport failure and drops the sink.  No reconnect.
    pub async fn on_error(&self, err: &TransportError) {
        error!("session {}: transport error: {err}", self.id);
        self.transition(SessionState::Disconnected);
        self.sink.lock().await.take();
    }

    /// Records that the peer closed the connection.
    pub async fn on_close(&self) {
        if self.state() == SessionState::Disconnected {
            debug!("session {}: already disconnected", self.id);
            return;
        }
        info!("session {}: closed by peer", self.id);
        self.transition(SessionState::Disconnected);
        self.sink.lock().await.take();
    }

    /// Closes the session gracefully: `Closing`, close frame, `Disconnected`.
    pub async fn close(&self) {
        if self.state() != SessionState::Open {
            debug!("session {}: close requested while {}", self.id, self.state());
            self.transition_if_needed(SessionState::Disconnected);
            self.sink.lock().await.take();
            return;
        }

        self.transition(SessionState::Closing);
        let sink = self.sink.lock().await.take();
        if let Some(mut sink) = sink {
            if let Err(e) = sink.close().await {
                warn!("session {}: close frame failed: {e}", self.id);
            }
        }
        // The peer may have closed while the close frame was in flight.
        self.transition_if_needed(SessionState::Disconnected);
        info!("session {}: closed", self.id);
    }

    /// Encodes and writes one response.
    ///
    /// # Errors
    ///
    /// - [`SendError::Closed`] if the session is not open once the write lock
    ///   is held; nothing is written.
    /// - [`SendError::Transport`] if the write fails; the session becomes
    ///   `Disconnected`.
    /// - [`SendError::Encode`] if the response cannot be serialized.
    pub async fn send(&self, response: &Response) -> Result<(), SendError> {
        let text = encode_response(response, self.variant).map_err(SendError::Encode)?;

        let mut guard = self.sink.lock().await;
        if self.state() != SessionState::Open {
            return Err(SessionClosedError.into());
        }
        let Some(sink) = guard.as_mut() else {
            return Err(SessionClosedError.into());
        };

        if let Err(e) = sink.send_text(text).await {
            error!("session {}: write failed: {e}", self.id);
            guard.take();
            self.transition(SessionState::Disconnected);
            return Err(e.into());
        }
        debug!("session {}: sent {}", self.id, response.action());
        Ok(())
    }

    fn transition(&self, next: SessionState) {
        let previous = self.state.send_replace(next);
        if !previous.can_transition_to(next) {
            warn!("session {}: unexpected transition {previous} -> {next}", self.id);
        } else {
            debug!("session {}: {previous} -> {next}", self.id);
        }
    }

    fn transition_if_needed(&self, next: SessionState) {
        if self.state() != next {
            self.transition(next);
        }
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("id", &self.id)
            .field("variant", &self.variant)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ResponseSender for SessionController {
    async fn send_response(&self, response: Response) -> Result<(), SendError> {
        self.send(&response).await
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
