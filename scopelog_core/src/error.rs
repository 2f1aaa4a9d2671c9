//! Error types for the scopelog_core library.

use std::io;
use std::path::PathBuf;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for scopelog_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Initialization was attempted without a configuration
    #[error("Invalid logger config")]
    MissingConfig,

    /// The rotating file destination could not be opened
    #[error("Log destination {path:?} unavailable: {source}")]
    Destination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn destination(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Destination {
            path: path.into(),
            source,
        }
    }
}
