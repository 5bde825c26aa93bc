//! Matrix error types

use thiserror::Error;

/// A token on an operator line that could not be applied.
///
/// Always non-fatal: the token is skipped and the rest of the line is
/// processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// `(r,c)` token without a comma
    #[error("Bad (r,c) pair: {0}")]
    BadPair(String),
    /// `(r,c)` token whose numbers do not parse or fall outside the matrix
    #[error("Bad coordinates: {0}")]
    BadCoordinates(String),
    /// Not a command and not a known key name
    #[error("Unrecognized command: {0}")]
    UnrecognizedCommand(String),
}

impl ParseError {
    /// The offending token
    pub fn token(&self) -> &str {
        match self {
            ParseError::BadPair(token)
            | ParseError::BadCoordinates(token)
            | ParseError::UnrecognizedCommand(token) => token,
        }
    }
}

/// Errors from direct matrix addressing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MatrixError {
    /// 1-based key index outside `1..=max`
    #[error("key index {index} is outside 1..={max}")]
    KeyIndexOutOfRange { index: usize, max: usize },
    #[error("position ({row},{col}) is outside the {rows}x{cols} matrix")]
    PositionOutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
}
