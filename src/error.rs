//! Error types for settings, item lists and logging setup.
//!
//! The widget itself never fails; these cover the layers around it.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in '{path}': {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid item list '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported item list '{path}' (expected .json or .toml)")]
    UnsupportedFormat { path: PathBuf },

    #[error("Cannot expand path '{path}': {message}")]
    PathExpansion { path: String, message: String },

    #[error("'{0}' in the config file is not a table")]
    NotATable(String),

    #[error("No home directory available")]
    NoHomeDir,

    #[error("Failed to install log subscriber: {0}")]
    Logging(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
