//! Connection-level error types shared by the application and infrastructure
//! layers.
//!
//! Every one of these is recovered inside the client: it is logged and the
//! affected turn or session winds down, but the process keeps running.

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

/// A failure reported by the WebSocket transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The WebSocket handshake with the server did not complete.
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: WsError,
    },

    /// The credential cannot be sent as an HTTP header value.
    #[error("invalid credential header: {0}")]
    InvalidHeader(String),

    /// The established connection failed while reading or writing.
    #[error("websocket error: {0}")]
    WebSocket(#[from] WsError),
}

/// A response was sent after the session stopped being open.
///
/// The response is dropped; the core never retries it.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("session is closed; response dropped")]
pub struct SessionClosedError;

/// Why a response did not reach the server.
#[derive(Debug, Error)]
pub enum SendError {
    #[error(transparent)]
    Closed(#[from] SessionClosedError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("failed to encode response: {0}")]
    Encode(#[source] serde_json::Error),
}
