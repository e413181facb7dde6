//! Error types for board catalog operations.

use std::path::PathBuf;

/// Errors that can occur while loading board definitions.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// TOML deserialization error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O error reading board files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Board file not found.
    #[error("board file not found: {}", path.display())]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// Unrecognized flash size label.
    #[error("unknown flash size '{label}'")]
    UnknownFlashSize {
        /// The rejected label.
        label: String,
    },

    /// Structural problem in a board definition.
    #[error("validation error: {detail}")]
    Validation {
        /// Description of the validation failure.
        detail: String,
    },
}

/// Result type for board operations.
pub type Result<T> = std::result::Result<T, BoardError>;
