//! The capability interface the comparison engine is written against.

use ndarray::ArrayD;

use crate::{ContainerError, ContainerKind};

/// A variable attribute value, normalized across backends.
///
/// `Unreadable` carries the error text for an attribute the backend could
/// not retrieve; one bad attribute must never abort a comparison, so the
/// failure is surfaced as a visible value instead of an error.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Str(String),
    Int(i64),
    Float(f64),
    Ints(Vec<i64>),
    Floats(Vec<f64>),
    Strs(Vec<String>),
    Unreadable(String),
}

/// Raw metadata for one variable, before stringification.
#[derive(Debug, Clone, Default)]
pub struct VariableMeta {
    pub name: String,
    /// Element type, in the backend's canonical short form (e.g. "f64").
    pub dtype: String,
    /// Ordered dimension names; empty for formats without named dimensions.
    pub dimension_names: Vec<String>,
    pub shape: Vec<usize>,
    /// Chunk sizes per dimension; `None` means contiguous storage.
    pub chunking: Option<Vec<usize>>,
    /// Decode multiplier, when the variable carries one.
    pub scale_factor: Option<f64>,
    /// Attribute name/value pairs in backend iteration order.
    pub attributes: Vec<(String, AttrValue)>,
}

/// Read access to one hierarchical container file.
///
/// Group paths are slash-delimited and relative to the root; the empty
/// string addresses the root group itself. Implementations hold the file
/// handle open for their own lifetime, so a comparison scopes both handles
/// to the full traversal and releases them on every exit path.
pub trait ContainerAccess {
    /// The format family this backend reads.
    fn kind(&self) -> ContainerKind;

    /// Root-level dimension names and lengths.
    fn root_dimensions(&self) -> Result<Vec<(String, usize)>, ContainerError>;

    /// Sorted names of the immediate subgroups of `group_path`.
    fn subgroup_names(&self, group_path: &str) -> Result<Vec<String>, ContainerError>;

    /// Sorted names of the variables directly inside `group_path`.
    fn variable_names(&self, group_path: &str) -> Result<Vec<String>, ContainerError>;

    /// Metadata for one variable.
    fn variable_meta(&self, group_path: &str, name: &str)
        -> Result<VariableMeta, ContainerError>;

    /// The variable's full value array, converted to `f64`.
    ///
    /// Used only by the sample-value check, which probes individual indices;
    /// non-numeric variables are a legitimate error here.
    fn variable_values(&self, group_path: &str, name: &str)
        -> Result<ArrayD<f64>, ContainerError>;
}

/// Join a parent group path and a child name into a child path.
///
/// Paths carry no leading slash internally; the root is the empty string.
pub fn join_group_path(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}/{child}")
    }
}

#[cfg(test)]
mod tests {
    use super::join_group_path;

    #[test]
    fn test_join_group_path() {
        assert_eq!(join_group_path("", "Group1"), "Group1");
        assert_eq!(join_group_path("Group1", "sub"), "Group1/sub");
    }
}
