//! Error types for the CLI application.

use crate::config::ConfigError;
use pairs_engine::errors::GameError;
use thiserror::Error;

/// Everything a command handler can fail with. Each variant maps to exit code `2`.
#[derive(Debug, Error)]
pub enum CliError {
    /// stdout/stderr writes, stdin reads
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Game error: {0}")]
    Game(#[from] GameError),
}
