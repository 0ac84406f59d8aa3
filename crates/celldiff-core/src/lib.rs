//! # celldiff-core
//!
//! Core comparison engine for celldiff.
//!
//! This crate provides the pieces of the cell-content comparison pipeline:
//! - [`CellRef`] - A1-style cell reference parsing
//! - [`CellGrid`] - the all-text worksheet view filled in by a spreadsheet
//!   reader
//! - [`Splitter`] - delimiter-based tokenization of cell content
//! - [`find_duplicates`], [`dedupe`], [`compare`] - duplicate detection,
//!   deduplication, and asymmetric set difference
//! - [`build_report`] - assembly of the six-column [`ComparisonReport`]
//!
//! ## Example
//!
//! ```rust
//! use celldiff_core::{build_report, compare, CellRef, Splitter};
//!
//! let splitter = Splitter::new(",").unwrap();
//! let cell1 = CellRef::parse("B2").unwrap();
//! # let _ = cell1;
//!
//! let cmp = compare(
//!     splitter.split("apple, banana, apple"),
//!     splitter.split("banana, cherry"),
//! );
//! assert_eq!(cmp.unique_left, vec!["apple"]);
//!
//! let report = build_report("B2", "C2", &cmp);
//! assert_eq!(report.columns.len(), 6);
//! ```
//!
//! Everything here is a pure function of its inputs; entities live for one
//! comparison and carry no shared state, so concurrent use from independent
//! requests is safe.

pub mod analyze;
pub mod compare;
pub mod error;
pub mod grid;
pub mod reference;
pub mod report;
pub mod tokenize;

// Re-exports for convenience
pub use analyze::{dedupe, find_duplicates};
pub use compare::{compare, diff, Comparison, SideAnalysis};
pub use error::{Error, Result};
pub use grid::CellGrid;
pub use reference::CellRef;
pub use report::{
    build_report, ComparisonReport, Highlight, ReportCell, ReportColumn, COLUMN_PADDING,
    DEFAULT_COLUMN_WIDTH, REPORT_SHEET_NAME,
};
pub use tokenize::Splitter;
