//! BotBox client: entry point.
//!
//! Connects to a BotBox game server, plays one session with a built-in agent
//! and exits when the server closes the connection or on Ctrl+C.
//!
//! # Usage
//!
//! ```text
//! botbox-client [OPTIONS]
//!
//! Options:
//!   --scheme   <ws|wss>                  [default: ws]
//!   --host     <HOST>                    [default: localhost]
//!   --port     <PORT>                    [default: 12345]
//!   --key      <KEY>                     credential for the Authentication header
//!   --protocol <per-player|legacy>       [default: per-player]
//!   --fallback <first-legal|none>        [default: first-legal]
//!   --agent    <first|cautious>          [default: first]
//!   --render                             log every board
//!   --config   <PATH>                    TOML file with any of the above
//! ```
//!
//! # Precedence
//!
//! Built-in defaults, then the `--config` file, then flags or their
//! environment variables.  The credential in `BOTBOX_KEY` beats `--key`.
//!
//! | Variable          | Flag         |
//! |-------------------|--------------|
//! | `BOTBOX_SCHEME`   | `--scheme`   |
//! | `BOTBOX_HOST`     | `--host`     |
//! | `BOTBOX_PORT`     | `--port`     |
//! | `BOTBOX_KEY`      | `--key`      |
//! | `BOTBOX_PROTOCOL` | `--protocol` |
//! | `BOTBOX_FALLBACK` | `--fallback` |
//! | `BOTBOX_AGENT`    | `--agent`    |
//! | `BOTBOX_CONFIG`   | `--config`   |

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use botbox_client::application::agent_for;
use botbox_client::domain::{AgentKind, ClientConfig, FallbackPolicy};
use botbox_client::infrastructure::{connect_and_run, load_config, SessionController};
use botbox_core::ProtocolVariant;

/// Environment variable holding the player credential.
const KEY_ENV: &str = "BOTBOX_KEY";

// ── CLI argument definitions ──────────────────────────────────────────────────

/// BotBox game client.
///
/// Every option is optional so that values from `--config` survive unless a
/// flag overrides them.
#[derive(Debug, Parser)]
#[command(
    name = "botbox-client",
    about = "Plays a BotBox game session over WebSocket",
    version
)]
struct Cli {
    /// `ws` or `wss`.
    #[arg(long, env = "BOTBOX_SCHEME")]
    scheme: Option<String>,

    /// Game server hostname or IP address.
    #[arg(long, env = "BOTBOX_HOST")]
    host: Option<String>,

    /// Game server port.
    #[arg(long, env = "BOTBOX_PORT")]
    port: Option<u16>,

    /// Player credential.  `BOTBOX_KEY` takes precedence when set.
    #[arg(long)]
    key: Option<String>,

    /// Message envelope the server speaks: `per-player` or `legacy`.
    #[arg(long, env = "BOTBOX_PROTOCOL")]
    protocol: Option<ProtocolVariant>,

    /// What to send when the agent fails: `first-legal` or `none`.
    #[arg(long, env = "BOTBOX_FALLBACK")]
    fallback: Option<FallbackPolicy>,

    /// Built-in agent: `first` or `cautious`.
    #[arg(long, env = "BOTBOX_AGENT")]
    agent: Option<AgentKind>,

    /// Log a text rendering of every received board.
    #[arg(long)]
    render: bool,

    /// TOML configuration file.
    #[arg(long, env = "BOTBOX_CONFIG")]
    config: Option<PathBuf>,
}

impl Cli {
    /// Layers the parsed flags over `base`.
    fn into_client_config(self, base: ClientConfig, env_key: Option<String>) -> ClientConfig {
        ClientConfig {
            scheme: self.scheme.unwrap_or(base.scheme),
            host: self.host.unwrap_or(base.host),
            port: self.port.unwrap_or(base.port),
            key: resolve_key(env_key, self.key).or(base.key),
            protocol: self.protocol.unwrap_or(base.protocol),
            fallback: self.fallback.unwrap_or(base.fallback),
            agent: self.agent.unwrap_or(base.agent),
            render_board: self.render || base.render_board,
            log_level: base.log_level,
        }
    }

    /// Loads the `--config` file, or the defaults when none is given.
    fn base_config(&self) -> anyhow::Result<ClientConfig> {
        match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("failed to load config from {}", path.display())),
            None => Ok(ClientConfig::default()),
        }
    }
}

/// The environment credential wins over the flag.  Empty values count as
/// unset.
fn resolve_key(env_key: Option<String>, cli_key: Option<String>) -> Option<String> {
    env_key
        .filter(|k| !k.is_empty())
        .or(cli_key.filter(|k| !k.is_empty()))
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let base = cli.base_config()?;
    let config = cli.into_client_config(base, std::env::var(KEY_ENV).ok());

    // ── Logging setup ─────────────────────────────────────────────────────────
    //
    // `RUST_LOG` wins; otherwise the configured level applies.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!(
        "BotBox client starting: server={}, protocol={:?}, agent={}, fallback={:?}",
        config.server_url(),
        config.protocol,
        config.agent,
        config.fallback
    );
    if config.key.is_none() {
        info!("no credential configured; connecting without {KEY_ENV}");
    }

    let controller = Arc::new(SessionController::new(config.protocol));
    let agent = agent_for(config.agent);

    tokio::select! {
        result = connect_and_run(&config, Arc::clone(&controller), agent) => {
            if let Err(e) = result {
                error!("session ended with error: {e}");
                return Err(e).context("BotBox session failed");
            }
        }
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("received Ctrl+C; closing session"),
                Err(e) => error!("failed to listen for Ctrl+C signal: {e}"),
            }
            controller.close().await;
        }
    }

    info!("BotBox client stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(args: &[&str]) -> ClientConfig {
        Cli::parse_from(args).into_client_config(ClientConfig::default(), None)
    }

    #[test]
    fn test_cli_defaults_match_client_config_defaults() {
        // Arrange: parse with no arguments (all defaults apply)
        let config = config_from(&["botbox-client"]);

        // Assert
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.server_url(), "ws://localhost:12345/");
    }

    #[test]
    fn test_cli_host_and_port_override() {
        let config = config_from(&["botbox-client", "--host", "10.0.0.5", "--port", "9000"]);
        assert_eq!(config.server_url(), "ws://10.0.0.5:9000/");
    }

    #[test]
    fn test_cli_protocol_fallback_and_agent() {
        let config = config_from(&[
            "botbox-client",
            "--protocol",
            "legacy",
            "--fallback",
            "none",
            "--agent",
            "cautious",
            "--render",
        ]);
        assert_eq!(config.protocol, ProtocolVariant::Legacy);
        assert_eq!(config.fallback, FallbackPolicy::NoResponse);
        assert_eq!(config.agent, AgentKind::Cautious);
        assert!(config.render_board);
    }

    #[test]
    fn test_cli_rejects_unknown_protocol() {
        let result = Cli::try_parse_from(["botbox-client", "--protocol", "v9"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_flags_override_config_file_values() {
        // Arrange: a base as if loaded from a file
        let base = ClientConfig {
            host: "file-host".into(),
            port: 4000,
            agent: AgentKind::Cautious,
            ..Default::default()
        };

        // Act
        let config = Cli::parse_from(["botbox-client", "--port", "5000"]).into_client_config(base, None);

        // Assert: the flag wins, untouched file values survive
        assert_eq!(config.port, 5000);
        assert_eq!(config.host, "file-host");
        assert_eq!(config.agent, AgentKind::Cautious);
    }

    #[test]
    fn test_env_key_beats_cli_key() {
        assert_eq!(
            resolve_key(Some("from-env".into()), Some("from-cli".into())),
            Some("from-env".to_string())
        );
    }

    #[test]
    fn test_cli_key_used_when_env_unset_or_empty() {
        assert_eq!(resolve_key(None, Some("cli".into())), Some("cli".to_string()));
        assert_eq!(resolve_key(Some(String::new()), Some("cli".into())), Some("cli".to_string()));
        assert_eq!(resolve_key(None, None), None);
    }

    #[test]
    fn test_key_flag_reaches_config() {
        let cli = Cli::parse_from(["botbox-client", "--key", "s3cret"]);
        let config = cli.into_client_config(ClientConfig::default(), None);
        assert_eq!(config.key.as_deref(), Some("s3cret"));
    }
}
