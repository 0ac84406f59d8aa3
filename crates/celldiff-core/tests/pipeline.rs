//! End-to-end engine pipeline: grid lookup through report assembly

use celldiff_core::{build_report, compare, CellGrid, CellRef, Error, Highlight, Splitter};
use pretty_assertions::assert_eq;

fn grid_with(cells: &[(u32, u32, &str)]) -> CellGrid {
    let mut grid = CellGrid::new();
    for (row, col, text) in cells {
        grid.set(*row, *col, text.to_string());
    }
    grid
}

#[test]
fn full_pipeline_matches_expected_report() {
    let grid = grid_with(&[
        (1, 1, "apple, banana, apple, cherry"),
        (1, 2, "banana, cherry, date"),
    ]);

    let cell1 = CellRef::parse("B2").unwrap();
    let cell2 = CellRef::parse("C2").unwrap();
    let splitter = Splitter::new(",").unwrap();

    let left = splitter.split(grid.text(cell1.row, cell1.col).unwrap());
    let right = splitter.split(grid.text(cell2.row, cell2.col).unwrap());
    let cmp = compare(left, right);
    let report = build_report("B2", "C2", &cmp);

    assert_eq!(report.row_count(), 4);
    assert_eq!(report.columns[0].cells[0].text, "apple");
    assert_eq!(report.columns[0].cells[0].highlight, Highlight::Duplicate);
    assert_eq!(report.columns[1].cells[0].highlight, Highlight::Unique);
    assert_eq!(report.columns[4].cells.len(), 1);
    assert_eq!(report.columns[4].cells[0].text, "apple");
    assert_eq!(report.columns[5].cells[0].text, "date");
}

#[test]
fn reference_outside_populated_bounds_is_an_error_not_a_panic() {
    let grid = grid_with(&[(0, 0, "only cell")]);

    let far = CellRef::parse("Z99").unwrap();
    let err = grid.text(far.row, far.col).unwrap_err();
    assert!(matches!(err, Error::CellOutOfRange { .. }));
}

#[test]
fn empty_cells_compare_to_an_empty_report() {
    let grid = grid_with(&[(0, 0, ""), (0, 1, "")]);
    let splitter = Splitter::new(";").unwrap();

    let cmp = compare(
        splitter.split(grid.text(0, 0).unwrap()),
        splitter.split(grid.text(0, 1).unwrap()),
    );
    assert!(cmp.left.tokens.is_empty());
    assert!(cmp.unique_left.is_empty());
    assert!(cmp.unique_right.is_empty());

    let report = build_report("A1", "B1", &cmp);
    assert_eq!(report.row_count(), 0);
    assert_eq!(report.columns.len(), 6);
}
