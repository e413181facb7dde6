//! Error types for scalar value parsing.

/// Errors raised while parsing version strings and time periods.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Malformed `major.minor.patch` version or version constraint.
    #[error("invalid version '{input}': {reason}")]
    Version {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Malformed duration-with-unit expression.
    #[error("invalid time period '{input}': {reason}")]
    TimePeriod {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Result type for parse operations.
pub type Result<T> = std::result::Result<T, ParseError>;
