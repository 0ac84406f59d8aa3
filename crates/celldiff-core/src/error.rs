//! Error types for celldiff-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in celldiff-core
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed cell reference string
    #[error("Invalid cell reference: {0}")]
    InvalidReference(String),

    /// Reference resolves outside the sheet's populated bounds
    #[error("Cell ({row}, {col}) is out of range: sheet has {rows} rows and {cols} columns")]
    CellOutOfRange {
        /// Requested row index (0-based)
        row: u32,
        /// Requested column index (0-based)
        col: u32,
        /// Populated row count of the sheet
        rows: u32,
        /// Populated column count of the sheet
        cols: u32,
    },

    /// Delimiter set could not be compiled into a split pattern
    #[error("Invalid delimiter set: {0}")]
    DelimiterPattern(#[from] regex::Error),
}
