//! Error types for the puzzle solver.
//!
//! Solving itself never fails with an error: unification failures and
//! contradictions are ordinary outcomes. These errors cover building a
//! knowledge base (rules, parsing), configuration and I/O.

use thiserror::Error;

/// A specialized `Result` type for puzzle solver operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Defines the errors that can occur while loading and configuring a puzzle.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// A rule was defined incorrectly (e.g. with no antecedents).
    #[error("Invalid rule definition: {0}")]
    InvalidRule(String),

    /// A line of puzzle text could not be parsed.
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A solver configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A parser pattern failed to compile.
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// Reading a puzzle or constraint file failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// An error occurred during data serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl Error {
    /// Builds a parse error for a 1-based line number.
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}

impl From<regex::Error> for Error {
    fn from(e: regex::Error) -> Self {
        Error::Pattern(e.to_string())
    }
}
