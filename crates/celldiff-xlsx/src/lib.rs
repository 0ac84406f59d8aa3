//! # celldiff-xlsx
//!
//! The spreadsheet collaborator for celldiff: a text-oriented XLSX reader
//! (sheet names plus an all-text cell grid) and the writer that serializes a
//! [`celldiff_core::ComparisonReport`] into a highlighted workbook.

pub mod error;
pub mod reader;
pub mod writer;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use writer::ReportWriter;
