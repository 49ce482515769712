use std::io;

use thiserror::Error;

/// Malformed input: either the caller's time pattern or a line in the log.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The pattern does not match `H:MM[:SS][-H:MM[:SS]]`.
    #[error("invalid timestamp pattern `{0}`")]
    InvalidPattern(String),

    /// The pattern has the right shape but names an impossible time.
    #[error("{component} {value} is out of range in pattern `{pattern}`")]
    ComponentOutOfRange {
        pattern: String,
        component: &'static str,
        value: u32,
    },

    /// A log line whose leading fields are not `<month> <day> <HH:MM:SS>`.
    #[error("unexpected log format at offset {offset}: {reason}. Log: {line}")]
    MalformedLine {
        offset: u64,
        line: String,
        reason: String,
    },
}

/// Errors surfaced by a search.
///
/// A search that simply finds nothing is not an error; it yields an empty
/// [`SearchResult`](crate::SearchResult).
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The request cannot be satisfied by this file's contents.
    #[error("searching error: {0}")]
    Searching(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
