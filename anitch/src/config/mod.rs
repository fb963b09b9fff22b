//! Configuration for a simulator session
//!
//! Everything has a default, so an empty or missing file yields the stock
//! costs and timings. Example `anitch.toml`:
//!
//! ```toml
//! [coherence]
//! initial = 100
//!
//! [costs.manifest]
//! cube = 5
//! sphere = 8
//! pyramid = 6
//!
//! [timing]
//! stage_dwell_ms = 1500
//!
//! [collaborator]
//! provider = "ollama"
//! model = "mixtral"
//! ```

pub mod types;

pub use types::*;

use std::path::{Path, PathBuf};

/// Errors raised while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Locations searched by [`AnitchConfig::with_defaults`], in order
pub const DEFAULT_CONFIG_PATHS: [&str; 3] =
    ["../config/anitch.toml", "config/anitch.toml", "anitch.toml"];

impl AnitchConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the first config found in the default locations, or stock defaults
    pub fn with_defaults() -> Result<Self, ConfigError> {
        for candidate in DEFAULT_CONFIG_PATHS {
            let path = PathBuf::from(candidate);
            if path.exists() {
                tracing::info!("Using configuration: {}", path.display());
                return Self::load(&path);
            }
        }
        Ok(Self::default())
    }
}
