//! Infrastructure error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors from configuration, storage and logging setup
#[derive(Debug, Error)]
pub enum InfrastructureError {
    /// Configuration could not be read or deserialized
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Configuration was read but holds invalid values
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Tracing subscriber could not be installed
    #[error("Failed to initialize tracing: {0}")]
    Telemetry(String),
}

impl InfrastructureError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
