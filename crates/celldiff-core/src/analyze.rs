//! Duplicate detection and order-preserving deduplication

use ahash::AHashSet;

/// Values occurring two or more times in `tokens`
///
/// Membership only — the count beyond the second occurrence is not tracked.
pub fn find_duplicates(tokens: &[String]) -> AHashSet<String> {
    let mut seen: AHashSet<&str> = AHashSet::with_capacity(tokens.len());
    let mut duplicates = AHashSet::new();

    for token in tokens {
        if !seen.insert(token.as_str()) {
            duplicates.insert(token.clone());
        }
    }

    duplicates
}

/// First occurrence of each distinct value, in original order
pub fn dedupe(tokens: &[String]) -> Vec<String> {
    let mut seen: AHashSet<&str> = AHashSet::with_capacity(tokens.len());
    let mut deduped = Vec::new();

    for token in tokens {
        if seen.insert(token.as_str()) {
            deduped.push(token.clone());
        }
    }

    deduped
}
