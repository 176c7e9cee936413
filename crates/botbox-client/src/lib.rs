//! botbox-client library crate.
//!
//! Client side of the BotBox turn exchange: connect to the game server over
//! WebSocket, decode each turn notification, ask an agent for an action and
//! send the reply, with every turn handled independently.
//!
//! # Architecture
//!
//! ```text
//! Game server (JSON over WebSocket)
//!         ↕
//! [botbox-client]
//!   ├── domain/           ClientConfig, FallbackPolicy, AgentKind
//!   ├── application/      TurnDispatcher, DecisionCallback, built-in agents
//!   └── infrastructure/
//!         ├── transport/  handshake and receive loop (tokio-tungstenite)
//!         ├── session/    connection state and the locked write path
//!         └── storage/    TOML config files
//! ```
//!
//! Decoding, legal moves and board rendering live in `botbox-core`.
//!
//! # Embedding
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use botbox_client::application::DecisionCallback;
//! use botbox_client::domain::ClientConfig;
//! use botbox_client::infrastructure::{connect_and_run, SessionController};
//! use botbox_core::{Action, Snapshot};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ClientConfig::default();
//! let controller = Arc::new(SessionController::new(config.protocol));
//! let agent: Arc<dyn DecisionCallback> = Arc::new(
//!     |_player: Option<usize>, actions: &[Action], _snapshot: &Snapshot| -> anyhow::Result<Action> {
//!         Ok(actions[0].clone())
//!     },
//! );
//! connect_and_run(&config, controller, agent).await?;
//! # Ok(())
//! # }
//! ```

/// Domain layer: configuration types (no I/O).
pub mod domain;

/// Application layer: turn dispatch and agents.
pub mod application;

/// Infrastructure layer: WebSocket transport, session, config files.
pub mod infrastructure;

pub mod error;
