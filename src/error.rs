use std::fmt::Display;
use std::sync::PoisonError;

use crate::sql::node::Pos;

/// Custom Result type for RustQL operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for RustQL
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// SQL parsing error
    Parse(String),
    /// A call or operand violates a semantic constraint; carries the
    /// offending node's position
    Validation { message: String, pos: Pos },
    /// Failure while parsing, validating, converting, or coercing a view
    /// definition; carries the view's SQL text for context
    Expansion { message: String, sql: String },
    /// Internal invariant violation (bad operand count, dangling edge, etc.)
    Internal(String),
}

impl Error {
    /// Creates a position-carrying validation error
    pub fn validation(pos: Pos, message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
            pos,
        }
    }

    /// Wraps a failure with the offending view's SQL text
    pub fn expansion(sql: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Expansion {
            message: message.into(),
            sql: sql.into(),
        }
    }
}

impl<T> From<PoisonError<T>> for Error {
    fn from(value: PoisonError<T>) -> Self {
        Error::Internal(value.to_string())
    }
}

impl std::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Parse(err) => write!(f, "parse error {}", err),
            Error::Validation { message, pos } => {
                write!(f, "validation error at {}: {}", pos, message)
            }
            Error::Expansion { message, sql } => {
                write!(f, "error while parsing view definition: {}: {}", sql, message)
            }
            Error::Internal(err) => write!(f, "internal error {}", err),
        }
    }
}
