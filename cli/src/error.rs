//! Unified error handling for the command-line host.

use crate::config::ConfigError;
use std::path::PathBuf;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Engine(#[from] refshelf_engine::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Library file {path} not readable: {source}")]
    Load {
        path: PathBuf,
        source: refshelf_engine::Error,
    },

    #[error("{0}")]
    Sort(#[from] refshelf_engine::sort::ParseSortModeError),
}

/// Result type alias for the host.
pub type Result<T> = std::result::Result<T, AppError>;
