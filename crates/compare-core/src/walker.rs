//! Lock-step traversal of two group hierarchies.

use nc_compare_align::align;
use nc_compare_container::{join_group_path, ContainerAccess, ContainerError};

/// One aligned group pair produced by the walk.
///
/// A side is `None` when the group exists only in the other file. At least
/// one side is always present. Paths are slash-delimited and relative to
/// the root (the root itself is the empty string).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPair {
    pub path_a: Option<String>,
    pub path_b: Option<String>,
    pub depth: usize,
}

impl GroupPair {
    pub fn is_root(&self) -> bool {
        self.depth == 0
    }

    /// Display form of the left path, with a leading slash; empty when the
    /// group is absent on that side.
    pub fn display_a(&self) -> String {
        display_path(self.path_a.as_deref())
    }

    pub fn display_b(&self) -> String {
        display_path(self.path_b.as_deref())
    }
}

fn display_path(path: Option<&str>) -> String {
    match path {
        Some(path) => format!("/{path}"),
        None => String::new(),
    }
}

/// Enumerate every group pair reachable by aligning subgroup names level by
/// level, in pre-order: each pair is listed before its children, and its
/// children before its later siblings.
///
/// Uses an explicit work-list instead of recursion, so traversal depth is
/// bounded only by memory and the order is testable in isolation. A missing
/// side contributes an empty subgroup list, which classifies every group in
/// that subtree as one-sided.
///
/// # Errors
///
/// Fails when either backend cannot list the subgroups of a group it
/// reported earlier.
pub fn walk_group_pairs(
    file_a: &dyn ContainerAccess,
    file_b: &dyn ContainerAccess,
) -> Result<Vec<GroupPair>, ContainerError> {
    let mut pairs = Vec::new();
    let mut work = vec![GroupPair {
        path_a: Some(String::new()),
        path_b: Some(String::new()),
        depth: 0,
    }];

    while let Some(pair) = work.pop() {
        let subgroups_a = match &pair.path_a {
            Some(path) => file_a.subgroup_names(path)?,
            None => Vec::new(),
        };
        let subgroups_b = match &pair.path_b {
            Some(path) => file_b.subgroup_names(path)?,
            None => Vec::new(),
        };

        // Push children in reverse so the stack visits them in sorted
        // order, each subtree completing before the next sibling starts.
        for child in align(subgroups_a, subgroups_b).into_iter().rev() {
            let path_a = match (&pair.path_a, child.left.as_deref()) {
                (Some(parent), Some(name)) => Some(join_group_path(parent, name)),
                _ => None,
            };
            let path_b = match (&pair.path_b, child.right.as_deref()) {
                (Some(parent), Some(name)) => Some(join_group_path(parent, name)),
                _ => None,
            };
            work.push(GroupPair {
                path_a,
                path_b,
                depth: pair.depth + 1,
            });
        }

        pairs.push(pair);
    }

    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryContainer;

    #[test]
    fn test_walk_identical_hierarchies() {
        let file = MemoryContainer::new()
            .with_group("Group1")
            .with_group("Group1/inner")
            .with_group("Group2");

        let pairs = walk_group_pairs(&file, &file).unwrap();
        let paths: Vec<&str> = pairs
            .iter()
            .map(|p| p.path_a.as_deref().unwrap())
            .collect();

        // Pre-order: a subtree completes before the next sibling starts.
        assert_eq!(paths, vec!["", "Group1", "Group1/inner", "Group2"]);
        for pair in &pairs {
            assert_eq!(pair.path_a, pair.path_b);
        }
        assert_eq!(pairs[0].depth, 0);
        assert_eq!(pairs[2].depth, 2);
    }

    #[test]
    fn test_missing_side_reports_whole_subtree_one_sided() {
        let left = MemoryContainer::new();
        let right = MemoryContainer::new()
            .with_group("Group1")
            .with_group("Group1/inner");

        let pairs = walk_group_pairs(&left, &right).unwrap();
        assert_eq!(pairs.len(), 3);
        assert!(pairs[0].is_root());
        assert_eq!(pairs[1].path_a, None);
        assert_eq!(pairs[1].path_b.as_deref(), Some("Group1"));
        assert_eq!(pairs[2].path_a, None);
        assert_eq!(pairs[2].path_b.as_deref(), Some("Group1/inner"));
    }

    #[test]
    fn test_display_paths_carry_leading_slash() {
        let pair = GroupPair {
            path_a: Some("Group1/inner".to_string()),
            path_b: None,
            depth: 2,
        };
        assert_eq!(pair.display_a(), "/Group1/inner");
        assert_eq!(pair.display_b(), "");

        let root = GroupPair {
            path_a: Some(String::new()),
            path_b: Some(String::new()),
            depth: 0,
        };
        assert_eq!(root.display_a(), "/");
    }
}
