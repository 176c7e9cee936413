//! Domain layer for botbox-client.
//!
//! Plain configuration types with no I/O.  The game-state types themselves
//! live in `botbox-core`.

pub mod config;

pub use config::{AgentKind, ClientConfig, FallbackPolicy};
