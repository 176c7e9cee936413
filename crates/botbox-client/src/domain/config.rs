//! Client configuration types.
//!
//! [`ClientConfig`] is the single source of truth for runtime settings.  It is
//! a plain struct with no environment or file access of its own; `main.rs`
//! fills it from defaults, an optional TOML file, CLI flags and environment
//! variables, in that order of increasing precedence.

use std::fmt;
use std::str::FromStr;

use botbox_core::{Action, ProtocolVariant};
use serde::{Deserialize, Serialize};

/// What to send when the agent fails or picks an illegal action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackPolicy {
    /// Send the first action the server listed for the turn.
    #[default]
    FirstLegal,
    /// Send nothing and let the server time the turn out.
    #[serde(rename = "none")]
    NoResponse,
}

impl FallbackPolicy {
    /// Picks the fallback action for a turn, if this policy sends one.
    pub fn pick(self, legal: &[Action]) -> Option<Action> {
        match self {
            FallbackPolicy::FirstLegal => legal.first().cloned(),
            FallbackPolicy::NoResponse => None,
        }
    }
}

impl FromStr for FallbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first-legal" => Ok(FallbackPolicy::FirstLegal),
            "none" => Ok(FallbackPolicy::NoResponse),
            other => Err(format!(
                "unknown fallback policy {other:?} (expected \"first-legal\" or \"none\")"
            )),
        }
    }
}

/// Built-in decision logic shipped with the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentKind {
    /// Always plays the first action the server offers.
    #[default]
    First,
    /// Prefers an offered action whose target cell is free and on the grid.
    Cautious,
}

impl FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(AgentKind::First),
            "cautious" => Ok(AgentKind::Cautious),
            other => Err(format!(
                "unknown agent {other:?} (expected \"first\" or \"cautious\")"
            )),
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AgentKind::First => "first",
            AgentKind::Cautious => "cautious",
        })
    }
}

/// All runtime configuration for one client process.
///
/// Every field has a default, so a TOML file only needs to list what it
/// changes:
///
/// ```toml
/// host = "game.example.org"
/// protocol = "legacy"
/// fallback = "none"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// `ws` or `wss`.
    pub scheme: String,
    pub host: String,
    pub port: u16,
    /// Credential sent in the `Authentication` handshake header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Envelope the server speaks.
    pub protocol: ProtocolVariant,
    pub fallback: FallbackPolicy,
    pub agent: AgentKind,
    /// Log a text rendering of every received board.
    pub render_board: bool,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl ClientConfig {
    /// WebSocket URL of the game server, e.g. `ws://localhost:12345/`.
    pub fn server_url(&self) -> String {
        format!("{}://{}:{}/", self.scheme, self.host, self.port)
    }
}

impl Default for ClientConfig {
    /// Matches a game server running locally on its default port.
    fn default() -> Self {
        Self {
            scheme: "ws".to_string(),
            host: "localhost".to_string(),
            port: 12345,
            key: None,
            protocol: ProtocolVariant::PerPlayer,
            fallback: FallbackPolicy::FirstLegal,
            agent: AgentKind::First,
            render_board: false,
            log_level: "info".to_string(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_server_url() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.server_url(), "ws://localhost:12345/");
    }

    #[test]
    fn test_default_has_no_key() {
        assert!(ClientConfig::default().key.is_none());
    }

    #[test]
    fn test_server_url_uses_all_parts() {
        let cfg = ClientConfig {
            scheme: "wss".into(),
            host: "10.0.0.5".into(),
            port: 9000,
            ..Default::default()
        };
        assert_eq!(cfg.server_url(), "wss://10.0.0.5:9000/");
    }

    #[test]
    fn test_first_legal_fallback_picks_first_action() {
        let legal = [Action::from("west"), Action::from("east")];
        assert_eq!(FallbackPolicy::FirstLegal.pick(&legal), Some(Action::from("west")));
    }

    #[test]
    fn test_first_legal_fallback_with_no_actions() {
        assert_eq!(FallbackPolicy::FirstLegal.pick(&[]), None);
    }

    #[test]
    fn test_no_response_fallback_never_picks() {
        let legal = [Action::from("west")];
        assert_eq!(FallbackPolicy::NoResponse.pick(&legal), None);
    }

    #[test]
    fn test_policy_and_agent_parse_from_cli_strings() {
        assert_eq!("none".parse::<FallbackPolicy>(), Ok(FallbackPolicy::NoResponse));
        assert_eq!("first-legal".parse::<FallbackPolicy>(), Ok(FallbackPolicy::FirstLegal));
        assert_eq!("cautious".parse::<AgentKind>(), Ok(AgentKind::Cautious));
        assert!("random".parse::<AgentKind>().is_err());
    }

    #[test]
    fn test_fallback_serde_names_match_cli_names() {
        let json = serde_json::to_string(&FallbackPolicy::NoResponse).unwrap();
        assert_eq!(json, "\"none\"");
    }
}
