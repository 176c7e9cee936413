//! TOML configuration file loading.
//!
//! The file is optional and every key in it is optional; missing keys keep
//! their [`ClientConfig::default`] values:
//!
//! ```toml
//! host = "game.example.org"
//! port = 443
//! scheme = "wss"
//! agent = "cautious"
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::config::ClientConfig;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads a [`ClientConfig`] from the TOML file at `path`.
///
/// Unlike a default-location config, an explicitly named file must exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::Parse`] if the TOML is malformed or has wrongly typed keys.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Parses TOML text into a [`ClientConfig`].
pub fn parse_config(content: &str) -> Result<ClientConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}
