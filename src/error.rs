//! Error types for itemcf.

use thiserror::Error;

/// A line of the interaction file that cannot be turned into a user record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// Empty or whitespace-only line: a record needs at least the user identifier.
    #[error("line {line}: expected a user identifier, found an empty line")]
    MissingUser { line: usize },
}

#[derive(Debug, Error)]
pub enum CfError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("more than {limit} distinct identifiers")]
    TooManyIdentifiers { limit: u32 },
}

pub type Result<T> = std::result::Result<T, CfError>;
