//! Typed errors for the failures callers branch on. Everything else travels
//! as `anyhow::Error` with context attached.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration problems. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Missing required configuration value `{0}`")]
    Missing(&'static str),
}

/// Errors that stop an import before any song is processed.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to read songbook {path}: {source}")]
    Input {
        path: PathBuf,
        source: std::io::Error,
    },
}
