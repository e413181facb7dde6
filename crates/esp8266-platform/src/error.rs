//! Platform error types.

use esp8266_core::ParseError;

/// Errors that abort validation or emission of an ESP8266 build.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// Structural or type violation in the input configuration.
    #[error("invalid configuration at '{path}': {detail}")]
    Schema { path: String, detail: String },

    /// Two configuration sources set the same underlying directive.
    #[error("conflicting options '{first}' and '{second}': {detail}")]
    Conflict {
        first: String,
        second: String,
        detail: String,
    },

    /// Malformed version or time period at a known field.
    #[error("invalid value at '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: ParseError,
    },

    /// An RTOS-SDK-only operation on a build using another framework.
    #[error("{operation} requires the esp8266-rtos-sdk framework")]
    NotRtosSdk { operation: &'static str },

    /// A list-valued build option extended with a scalar, or the reverse.
    #[error("build option '{key}' mixes list and scalar values")]
    OptionKindMismatch { key: String },

    /// Board catalog error.
    #[error("board catalog error: {0}")]
    Board(#[from] esp8266_boards::BoardError),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlatformError {
    pub(crate) fn schema(path: impl Into<String>, detail: impl Into<String>) -> Self {
        PlatformError::Schema {
            path: path.into(),
            detail: detail.into(),
        }
    }

    pub(crate) fn parse(path: impl Into<String>, source: ParseError) -> Self {
        PlatformError::Parse {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for platform operations.
pub type Result<T> = std::result::Result<T, PlatformError>;
