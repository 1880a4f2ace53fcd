//! Error types for the refshelf engine.

use crate::{Identifier, Position};
use thiserror::Error;

/// Whole-operation errors from the engine.
///
/// Per-item failures (a lookup that fails, a document that cannot be
/// stored) are never reported through this type; they are counted in a
/// [`BatchReport`](crate::BatchReport) instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Selection errors
    #[error("no references selected")]
    EmptySelection,

    #[error("invalid reference number '{0}'")]
    InvalidToken(String),

    #[error("invalid range {lo}-{hi}: lower bound exceeds upper bound")]
    InvertedRange { lo: Position, hi: Position },

    #[error("reference {position} out of range (library holds {len})")]
    PositionOutOfRange { position: Position, len: usize },

    #[error("invalid format '{0}'")]
    InvalidFormat(String),

    // State errors
    #[error("no articles have been loaded")]
    EmptyLibrary,

    #[error("DOI '{0}' already in library")]
    DuplicateIdentifier(Identifier),

    #[error("lookup result for '{0}' has no matching request")]
    Uncorrelated(Identifier),

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("unsupported snapshot format version {0}")]
    UnsupportedFormat(u32),
}

impl Error {
    /// Whether this error came from parsing or validating a selection
    /// or its format list.
    pub fn is_selection(&self) -> bool {
        matches!(
            self,
            Error::EmptySelection
                | Error::InvalidToken(_)
                | Error::InvertedRange { .. }
                | Error::PositionOutOfRange { .. }
                | Error::InvalidFormat(_)
        )
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
