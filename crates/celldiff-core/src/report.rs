//! Comparison report assembly

use crate::compare::Comparison;
use ahash::AHashSet;

/// Character padding added on top of a column's longest value
pub const COLUMN_PADDING: usize = 2;

/// Width used when a column has no measurable content
pub const DEFAULT_COLUMN_WIDTH: f64 = 10.0;

/// Sheet name of the generated report
pub const REPORT_SHEET_NAME: &str = "Comparison Result";

/// Highlight applied to a report cell
///
/// The color mapping (duplicate = blue fill, unique = yellow fill) is a
/// presentation constant of the workbook writer, not part of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Highlight {
    /// No highlight
    #[default]
    None,
    /// The value repeats within its own cell
    Duplicate,
    /// The value appears on this side only
    Unique,
}

/// A single rendered cell
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReportCell {
    /// Rendered text
    pub text: String,
    /// Highlight tag
    pub highlight: Highlight,
}

/// One report column: a header plus positionally filled cells
///
/// Columns are filled independently from their own source sequences; row *i*
/// of one column is unrelated to row *i* of another.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReportColumn {
    /// Header label
    pub header: String,
    /// Cells, top to bottom
    pub cells: Vec<ReportCell>,
}

impl ReportColumn {
    /// Width hint in characters: the longest rendered value (header included)
    /// plus [`COLUMN_PADDING`]
    ///
    /// Falls back to [`DEFAULT_COLUMN_WIDTH`] rather than failing when the
    /// column has nothing measurable.
    pub fn width_hint(&self) -> f64 {
        let longest = self
            .cells
            .iter()
            .map(|c| c.text.chars().count())
            .chain(std::iter::once(self.header.chars().count()))
            .max()
            .unwrap_or(0);

        if longest == 0 {
            DEFAULT_COLUMN_WIDTH
        } else {
            (longest + COLUMN_PADDING) as f64
        }
    }
}

/// The assembled six-column comparison report
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComparisonReport {
    /// Sheet name for the output workbook
    pub sheet_name: String,
    /// The six columns: raw-left, dedup-left, raw-right, dedup-right,
    /// unique-left, unique-right
    pub columns: Vec<ReportColumn>,
}

impl ComparisonReport {
    /// Number of data rows: the longest column's length
    pub fn row_count(&self) -> usize {
        self.columns
            .iter()
            .map(|c| c.cells.len())
            .max()
            .unwrap_or(0)
    }
}

fn column<F>(header: String, values: &[String], tag: F) -> ReportColumn
where
    F: Fn(&str) -> Highlight,
{
    let cells = values
        .iter()
        .map(|v| ReportCell {
            text: v.clone(),
            highlight: tag(v),
        })
        .collect();
    ReportColumn { header, cells }
}

/// Assemble the report for a comparison of two cells
///
/// The header labels carry the two cell-reference strings verbatim, as the
/// caller supplied them.
pub fn build_report(left_ref: &str, right_ref: &str, cmp: &Comparison) -> ComparisonReport {
    let unique_left: AHashSet<&str> = cmp.unique_left.iter().map(String::as_str).collect();
    let unique_right: AHashSet<&str> = cmp.unique_right.iter().map(String::as_str).collect();

    let columns = vec![
        column(
            format!("Cell {} raw content", left_ref),
            &cmp.left.tokens,
            |t| {
                if cmp.left.duplicates.contains(t) {
                    Highlight::Duplicate
                } else {
                    Highlight::None
                }
            },
        ),
        column(
            format!("Cell {} deduplicated content", left_ref),
            &cmp.left.deduped,
            |t| {
                if unique_left.contains(t) {
                    Highlight::Unique
                } else {
                    Highlight::None
                }
            },
        ),
        column(
            format!("Cell {} raw content", right_ref),
            &cmp.right.tokens,
            |t| {
                if cmp.right.duplicates.contains(t) {
                    Highlight::Duplicate
                } else {
                    Highlight::None
                }
            },
        ),
        column(
            format!("Cell {} deduplicated content", right_ref),
            &cmp.right.deduped,
            |t| {
                if unique_right.contains(t) {
                    Highlight::Unique
                } else {
                    Highlight::None
                }
            },
        ),
        column(
            format!("Cell {} unique content", left_ref),
            &cmp.unique_left,
            |_| Highlight::None,
        ),
        column(
            format!("Cell {} unique content", right_ref),
            &cmp.unique_right,
            |_| Highlight::None,
        ),
    ];

    ComparisonReport {
        sheet_name: REPORT_SHEET_NAME.to_string(),
        columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::compare;
    use pretty_assertions::assert_eq;

    fn tokens(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn sample_report() -> ComparisonReport {
        let cmp = compare(
            tokens(&["apple", "banana", "apple", "cherry"]),
            tokens(&["banana", "cherry", "date"]),
        );
        build_report("B2", "C2", &cmp)
    }

    #[test]
    fn test_headers_carry_references_verbatim() {
        let report = sample_report();
        let headers: Vec<&str> = report.columns.iter().map(|c| c.header.as_str()).collect();
        assert_eq!(
            headers,
            vec![
                "Cell B2 raw content",
                "Cell B2 deduplicated content",
                "Cell C2 raw content",
                "Cell C2 deduplicated content",
                "Cell B2 unique content",
                "Cell C2 unique content",
            ]
        );

        // Lowercase input stays lowercase
        let cmp = compare(Vec::new(), Vec::new());
        let report = build_report("b12", "c3", &cmp);
        assert_eq!(report.columns[0].header, "Cell b12 raw content");
    }

    #[test]
    fn test_row_count_is_longest_column() {
        let report = sample_report();
        assert_eq!(report.row_count(), 4); // raw-left has four tokens
    }

    #[test]
    fn test_raw_columns_tag_duplicates() {
        let report = sample_report();
        let raw_left = &report.columns[0];

        let highlights: Vec<Highlight> = raw_left.cells.iter().map(|c| c.highlight).collect();
        assert_eq!(
            highlights,
            vec![
                Highlight::Duplicate, // apple
                Highlight::None,      // banana
                Highlight::Duplicate, // apple again
                Highlight::None,      // cherry
            ]
        );

        // Right side has no duplicates
        assert!(report.columns[2]
            .cells
            .iter()
            .all(|c| c.highlight == Highlight::None));
    }

    #[test]
    fn test_dedup_columns_tag_unique_values() {
        let report = sample_report();

        let dedup_left = &report.columns[1];
        assert_eq!(dedup_left.cells[0].text, "apple");
        assert_eq!(dedup_left.cells[0].highlight, Highlight::Unique);
        assert_eq!(dedup_left.cells[1].highlight, Highlight::None);

        let dedup_right = &report.columns[3];
        assert_eq!(dedup_right.cells[2].text, "date");
        assert_eq!(dedup_right.cells[2].highlight, Highlight::Unique);
    }

    #[test]
    fn test_unique_columns_carry_no_highlight() {
        let report = sample_report();
        for col in &report.columns[4..] {
            assert!(col.cells.iter().all(|c| c.highlight == Highlight::None));
        }
        assert_eq!(report.columns[4].cells[0].text, "apple");
        assert_eq!(report.columns[5].cells[0].text, "date");
    }

    #[test]
    fn test_width_hint() {
        let report = sample_report();
        // "Cell B2 deduplicated content" is 28 chars, longer than any value
        assert_eq!(report.columns[1].width_hint(), 30.0);

        let empty = ReportColumn {
            header: String::new(),
            cells: Vec::new(),
        };
        assert_eq!(empty.width_hint(), DEFAULT_COLUMN_WIDTH);
    }

    #[test]
    fn test_empty_comparison_is_a_valid_report() {
        let cmp = compare(Vec::new(), Vec::new());
        let report = build_report("A1", "A2", &cmp);
        assert_eq!(report.columns.len(), 6);
        assert_eq!(report.row_count(), 0);
    }
}
