//! Keyword-set similarity.
//!
//! Similarity is computed on normalized terms, never on keyword identifiers:
//! two keyword records created independently for the same text are the same
//! concept.

use std::collections::HashSet;

use proposal_types::normalize_term;

/// Jaccard similarity `|A ∩ B| / |A ∪ B|`.
///
/// Returns a value in [0.0, 1.0]; 0.0 when either set is empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let intersection = small.iter().filter(|t| large.contains(*t)).count();
    let union = a.len() + b.len() - intersection;

    intersection as f64 / union as f64
}

/// Normalize terms and drop duplicates, keeping first-appearance order.
pub fn term_list<I, T>(terms: I) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for term in terms {
        let term = normalize_term(term.as_ref());
        if term.is_empty() {
            continue;
        }
        if seen.insert(term.clone()) {
            out.push(term);
        }
    }
    out
}

/// Terms of `current` that also appear in `candidate`, in `current` order.
pub fn matched_terms(current: &[String], candidate: &HashSet<String>) -> Vec<String> {
    current
        .iter()
        .filter(|t| candidate.contains(*t))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(terms: &[&str]) -> HashSet<String> {
        terms.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_jaccard_identical() {
        let a = set(&["rust", "memory"]);
        assert!((jaccard(&a, &a) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_jaccard_partial_overlap() {
        let a = set(&["rust", "concurrency"]);
        let b = set(&["rust", "memory"]);
        assert!((jaccard(&a, &b) - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_jaccard_disjoint() {
        let a = set(&["rust"]);
        let b = set(&["python"]);
        assert!(jaccard(&a, &b).abs() < f64::EPSILON);
    }

    #[test]
    fn test_jaccard_empty_is_zero() {
        let a = set(&["rust"]);
        let empty = HashSet::new();
        assert!(jaccard(&a, &empty).abs() < f64::EPSILON);
        assert!(jaccard(&empty, &a).abs() < f64::EPSILON);
        assert!(jaccard(&empty, &empty).abs() < f64::EPSILON);
    }

    #[test]
    fn test_jaccard_symmetric() {
        let a = set(&["a", "b", "c", "d"]);
        let b = set(&["c", "d", "e"]);
        assert_eq!(jaccard(&a, &b), jaccard(&b, &a));
    }

    #[test]
    fn test_term_list_normalizes_and_dedupes() {
        let terms = term_list(["Rust", " rust ", "Memory", "", "rust", "memory"]);
        assert_eq!(terms, vec!["rust", "memory"]);
    }

    #[test]
    fn test_matched_terms_order_follows_current() {
        let current = vec![
            "memory".to_string(),
            "rust".to_string(),
            "async".to_string(),
        ];
        let candidate = set(&["async", "rust", "tokio"]);
        assert_eq!(matched_terms(&current, &candidate), vec!["rust", "async"]);
    }
}
