//! Error types for gmirror-core

use thiserror::Error;

use crate::remote::FetchError;

/// Result type alias using gmirror-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in gmirror-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid input, rejected before any remote call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Stored state belongs to a different conversation
    #[error("Conversation mismatch: state holds '{found}', expected '{expected}'")]
    ConversationMismatch { expected: String, found: String },

    /// Non-recoverable remote failure
    #[error("Remote error: {0}")]
    Remote(#[from] FetchError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Background task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(String),
}
