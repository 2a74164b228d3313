//! Name-collection alignment for nc-compare.
//!
//! Two files rarely contain the same set of groups, variables, or attribute
//! names. This crate turns two unordered name collections into a
//! deterministic, ordered sequence of paired-or-absent items so the rest of
//! the comparison can walk both files in lock-step, plus a cheaper
//! set-arithmetic variant when only the difference counts are needed.

use std::collections::BTreeSet;

/// One aligned item from two name collections.
///
/// At least one of `left`/`right` is always present; the absent side is kept
/// as an explicit `None` rather than being dropped, so downstream consumers
/// can render the missing side and tally it as a one-sided difference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedPair {
    /// Position in the aligned sequence, strictly increasing from 0.
    pub index: usize,
    /// The item as it appears in the first (left) collection.
    pub left: Option<String>,
    /// The item as it appears in the second (right) collection.
    pub right: Option<String>,
}

impl AlignedPair {
    /// The left item, or an empty string when absent.
    pub fn left_str(&self) -> &str {
        self.left.as_deref().unwrap_or("")
    }

    /// The right item, or an empty string when absent.
    pub fn right_str(&self) -> &str {
        self.right.as_deref().unwrap_or("")
    }

    /// The name of this pair, preferring the left side.
    pub fn name(&self) -> &str {
        match &self.left {
            Some(name) => name,
            None => self.right_str(),
        }
    }
}

/// Align two name collections over the sorted union of their items.
///
/// Duplicates within a collection are collapsed. The result is ordered
/// lexicographically and covers exactly the union of both collections; for
/// each item the side that lacks it is `None`.
///
/// Both collections empty yields an empty sequence.
pub fn align<A, B>(a: A, b: B) -> Vec<AlignedPair>
where
    A: IntoIterator,
    A::Item: Into<String>,
    B: IntoIterator,
    B::Item: Into<String>,
{
    let set_a: BTreeSet<String> = a.into_iter().map(Into::into).collect();
    let set_b: BTreeSet<String> = b.into_iter().map(Into::into).collect();

    set_a
        .union(&set_b)
        .enumerate()
        .map(|(index, item)| AlignedPair {
            index,
            left: set_a.contains(item).then(|| item.clone()),
            right: set_b.contains(item).then(|| item.clone()),
        })
        .collect()
}

/// Count how many items are unique to each collection, and how many are
/// shared, ignoring duplicates and ordering.
///
/// Returns `(left_only, right_only, shared)`.
pub fn count_diffs<A, B>(a: A, b: B) -> (usize, usize, usize)
where
    A: IntoIterator,
    A::Item: Into<String>,
    B: IntoIterator,
    B::Item: Into<String>,
{
    let set_a: BTreeSet<String> = a.into_iter().map(Into::into).collect();
    let set_b: BTreeSet<String> = b.into_iter().map(Into::into).collect();

    let left = set_a.difference(&set_b).count();
    let right = set_b.difference(&set_a).count();
    let shared = set_a.intersection(&set_b).count();

    (left, right, shared)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_align_covers_sorted_union() {
        let pairs = align(names(&["z1", "x"]), names(&["x", "a", "z2"]));

        let keys: Vec<&str> = pairs.iter().map(|p| p.name()).collect();
        assert_eq!(keys, vec!["a", "x", "z1", "z2"]);

        // Indices are strictly increasing from 0.
        for (i, pair) in pairs.iter().enumerate() {
            assert_eq!(pair.index, i);
            assert!(pair.left.is_some() || pair.right.is_some());
        }

        assert_eq!(pairs[0].left, None);
        assert_eq!(pairs[0].right.as_deref(), Some("a"));
        assert_eq!(pairs[1].left.as_deref(), Some("x"));
        assert_eq!(pairs[1].right.as_deref(), Some("x"));
        assert_eq!(pairs[2].right, None);
        assert_eq!(pairs[3].left, None);
    }

    #[test]
    fn test_align_identical_collections() {
        let items = names(&["time", "x", "y"]);
        let pairs = align(items.clone(), items);

        assert_eq!(pairs.len(), 3);
        for pair in &pairs {
            assert_eq!(pair.left, pair.right);
            assert!(pair.left.is_some());
        }
    }

    #[test]
    fn test_align_collapses_duplicates() {
        let pairs = align(names(&["x", "x", "y"]), names(&["y"]));
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn test_align_both_empty() {
        let pairs = align(Vec::<String>::new(), Vec::<String>::new());
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_count_diffs_set_arithmetic() {
        let a = names(&["x", "y", "z1"]);
        let b = names(&["y", "z2", "w", "q"]);

        assert_eq!(count_diffs(a, b), (2, 3, 1));
    }

    #[test]
    fn test_count_diffs_self_comparison() {
        let a = names(&["x", "y", "time"]);
        assert_eq!(count_diffs(a.clone(), a), (0, 0, 3));
    }

    #[test]
    fn test_count_diffs_empty() {
        assert_eq!(
            count_diffs(Vec::<String>::new(), Vec::<String>::new()),
            (0, 0, 0)
        );
    }

    #[test]
    fn test_count_diffs_ignores_duplicates() {
        let a = names(&["x", "x", "x"]);
        let b = names(&["x"]);
        assert_eq!(count_diffs(a, b), (0, 0, 1));
    }
}
