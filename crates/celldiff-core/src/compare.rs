//! Pairwise comparison of two cells' token sequences

use crate::analyze::{dedupe, find_duplicates};
use ahash::AHashSet;

/// Analysis of a single cell's tokens
#[derive(Debug, Clone)]
pub struct SideAnalysis {
    /// Tokens in order of appearance, duplicates retained
    pub tokens: Vec<String>,
    /// Values occurring at least twice in `tokens`
    pub duplicates: AHashSet<String>,
    /// `tokens` with second and later occurrences dropped
    pub deduped: Vec<String>,
}

impl SideAnalysis {
    /// Analyze one side's token sequence
    pub fn of(tokens: Vec<String>) -> Self {
        let duplicates = find_duplicates(&tokens);
        let deduped = dedupe(&tokens);
        Self {
            tokens,
            duplicates,
            deduped,
        }
    }
}

/// Result of comparing two analyzed cells
#[derive(Debug, Clone)]
pub struct Comparison {
    /// Analysis of the first cell
    pub left: SideAnalysis,
    /// Analysis of the second cell
    pub right: SideAnalysis,
    /// Deduplicated values present only in the first cell
    pub unique_left: Vec<String>,
    /// Deduplicated values present only in the second cell
    pub unique_right: Vec<String>,
}

/// Asymmetric difference of two deduplicated sequences
///
/// Equality is exact string equality. Each output keeps its own side's
/// first-occurrence order so downstream rendering is stable across runs.
pub fn diff(deduped_left: &[String], deduped_right: &[String]) -> (Vec<String>, Vec<String>) {
    let left_set: AHashSet<&str> = deduped_left.iter().map(String::as_str).collect();
    let right_set: AHashSet<&str> = deduped_right.iter().map(String::as_str).collect();

    let unique_left = deduped_left
        .iter()
        .filter(|t| !right_set.contains(t.as_str()))
        .cloned()
        .collect();
    let unique_right = deduped_right
        .iter()
        .filter(|t| !left_set.contains(t.as_str()))
        .cloned()
        .collect();

    (unique_left, unique_right)
}

/// Run the full analysis for two token sequences
pub fn compare(left_tokens: Vec<String>, right_tokens: Vec<String>) -> Comparison {
    let left = SideAnalysis::of(left_tokens);
    let right = SideAnalysis::of(right_tokens);
    let (unique_left, unique_right) = diff(&left.deduped, &right.deduped);

    Comparison {
        left,
        right,
        unique_left,
        unique_right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn tokens(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_diff() {
        let (left, right) = diff(
            &tokens(&["a", "b", "c"]),
            &tokens(&["b", "d", "c", "e"]),
        );
        assert_eq!(left, tokens(&["a"]));
        assert_eq!(right, tokens(&["d", "e"]));
    }

    #[test]
    fn test_diff_disjoint_and_equal() {
        let (left, right) = diff(&tokens(&["a"]), &tokens(&["b"]));
        assert_eq!(left, tokens(&["a"]));
        assert_eq!(right, tokens(&["b"]));

        let (left, right) = diff(&tokens(&["a", "b"]), &tokens(&["a", "b"]));
        assert_eq!(left, Vec::<String>::new());
        assert_eq!(right, Vec::<String>::new());
    }

    #[test]
    fn test_diff_is_case_sensitive() {
        let (left, right) = diff(&tokens(&["Apple"]), &tokens(&["apple"]));
        assert_eq!(left, tokens(&["Apple"]));
        assert_eq!(right, tokens(&["apple"]));
    }

    #[test]
    fn test_unique_output_keeps_first_occurrence_order() {
        let (left, _) = diff(
            &tokens(&["z", "m", "a", "k"]),
            &tokens(&["m"]),
        );
        assert_eq!(left, tokens(&["z", "a", "k"]));
    }

    #[test]
    fn test_compare_end_to_end() {
        let cmp = compare(
            tokens(&["apple", "banana", "apple", "cherry"]),
            tokens(&["banana", "cherry", "date"]),
        );

        assert_eq!(
            cmp.left.tokens,
            tokens(&["apple", "banana", "apple", "cherry"])
        );
        assert_eq!(cmp.left.duplicates.len(), 1);
        assert!(cmp.left.duplicates.contains("apple"));
        assert_eq!(cmp.left.deduped, tokens(&["apple", "banana", "cherry"]));

        assert_eq!(cmp.right.tokens, tokens(&["banana", "cherry", "date"]));
        assert!(cmp.right.duplicates.is_empty());
        assert_eq!(cmp.right.deduped, tokens(&["banana", "cherry", "date"]));

        assert_eq!(cmp.unique_left, tokens(&["apple"]));
        assert_eq!(cmp.unique_right, tokens(&["date"]));
    }

    #[test]
    fn test_compare_empty_sides() {
        let cmp = compare(Vec::new(), tokens(&["a"]));
        assert!(cmp.left.tokens.is_empty());
        assert!(cmp.unique_left.is_empty());
        assert_eq!(cmp.unique_right, tokens(&["a"]));
    }

    proptest! {
        #[test]
        fn prop_diff_is_symmetric(
            a in proptest::collection::vec("[a-d]{0,3}", 0..30),
            b in proptest::collection::vec("[a-d]{0,3}", 0..30),
        ) {
            let a = crate::analyze::dedupe(&a);
            let b = crate::analyze::dedupe(&b);
            let (left, right) = diff(&a, &b);
            let (swapped_left, swapped_right) = diff(&b, &a);
            prop_assert_eq!(left, swapped_right);
            prop_assert_eq!(right, swapped_left);
        }

        #[test]
        fn prop_unique_sides_are_disjoint_from_other_side(
            a in proptest::collection::vec("[a-d]{0,3}", 0..30),
            b in proptest::collection::vec("[a-d]{0,3}", 0..30),
        ) {
            let cmp = compare(a, b);
            for token in &cmp.unique_left {
                prop_assert!(!cmp.right.deduped.contains(token));
            }
            for token in &cmp.unique_right {
                prop_assert!(!cmp.left.deduped.contains(token));
            }
        }
    }
}
