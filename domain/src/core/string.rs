//! String utilities for the domain layer.

use std::collections::HashSet;

/// Case-insensitive substring check.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Lowercased whitespace-separated words of `s`.
pub fn word_set(s: &str) -> HashSet<String> {
    s.split_whitespace().map(str::to_lowercase).collect()
}

/// Whether two purpose statements overlap by more than `ratio` of the
/// larger word set.
pub fn purposes_overlap(a: &str, b: &str, ratio: f64) -> bool {
    let left = word_set(a);
    let right = word_set(b);
    let larger = left.len().max(right.len());
    if larger == 0 {
        return false;
    }
    let shared = left.intersection(&right).count();
    shared as f64 > larger as f64 * ratio
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Relay Emergency Data", "emergency data"));
        assert!(!contains_ignore_case("Relay data", "emergency"));
        assert!(contains_ignore_case("anything", ""));
    }

    #[test]
    fn test_purposes_overlap() {
        // 2 shared of 4 words: 2 > 1.2
        assert!(purposes_overlap(
            "survey northern grid sector",
            "survey southern grid area",
            0.3
        ));
        // 1 shared of 5 words: 1 > 1.5 is false
        assert!(!purposes_overlap(
            "survey northern grid sector now",
            "relay data to base survey",
            0.3
        ));
        assert!(!purposes_overlap("", "", 0.3));
    }
}
