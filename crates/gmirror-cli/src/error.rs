use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] gmirror_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("No snapshot for group {0}. Run `gmirror sync {0}` first.")]
    NoSnapshot(String),
    #[error("Interval must be at least one second")]
    InvalidInterval,
}

impl From<gmirror_core::remote::FetchError> for CliError {
    fn from(error: gmirror_core::remote::FetchError) -> Self {
        Self::Core(error.into())
    }
}
