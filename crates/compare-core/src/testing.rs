//! In-memory container backend for tests.

use std::collections::BTreeMap;

use ndarray::ArrayD;

use nc_compare_container::{
    ContainerAccess, ContainerError, ContainerKind, VariableMeta,
};

#[derive(Debug, Default)]
struct MemoryGroup {
    variables: BTreeMap<String, VariableMeta>,
    values: BTreeMap<String, ArrayD<f64>>,
}

/// A hand-built hierarchy implementing [`ContainerAccess`], so the engine
/// can be exercised without touching real files.
#[derive(Debug)]
pub struct MemoryContainer {
    kind: ContainerKind,
    root_dimensions: Vec<(String, usize)>,
    groups: BTreeMap<String, MemoryGroup>,
}

impl MemoryContainer {
    /// An empty container with just a root group.
    pub fn new() -> Self {
        let mut groups = BTreeMap::new();
        groups.insert(String::new(), MemoryGroup::default());
        MemoryContainer {
            kind: ContainerKind::Netcdf,
            root_dimensions: Vec::new(),
            groups,
        }
    }

    pub fn with_dimension(mut self, name: &str, len: usize) -> Self {
        self.root_dimensions.push((name.to_string(), len));
        self
    }

    /// Add a group (and any missing ancestors) by slash-delimited path.
    pub fn with_group(mut self, path: &str) -> Self {
        let mut current = String::new();
        for segment in path.split('/') {
            if current.is_empty() {
                current = segment.to_string();
            } else {
                current = format!("{current}/{segment}");
            }
            self.groups.entry(current.clone()).or_default();
        }
        self
    }

    pub fn with_variable(mut self, group_path: &str, meta: VariableMeta) -> Self {
        self = self.ensure_group(group_path);
        let group = self.groups.get_mut(group_path).unwrap();
        group.variables.insert(meta.name.clone(), meta);
        self
    }

    pub fn with_values(mut self, group_path: &str, name: &str, values: ArrayD<f64>) -> Self {
        self = self.ensure_group(group_path);
        let group = self.groups.get_mut(group_path).unwrap();
        group.values.insert(name.to_string(), values);
        self
    }

    fn ensure_group(self, path: &str) -> Self {
        if path.is_empty() || self.groups.contains_key(path) {
            self
        } else {
            self.with_group(path)
        }
    }

    fn group(&self, path: &str) -> Result<&MemoryGroup, ContainerError> {
        self.groups
            .get(path)
            .ok_or_else(|| ContainerError::GroupNotFound(path.to_string()))
    }
}

impl Default for MemoryContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerAccess for MemoryContainer {
    fn kind(&self) -> ContainerKind {
        self.kind
    }

    fn root_dimensions(&self) -> Result<Vec<(String, usize)>, ContainerError> {
        Ok(self.root_dimensions.clone())
    }

    fn subgroup_names(&self, group_path: &str) -> Result<Vec<String>, ContainerError> {
        self.group(group_path)?;
        let prefix = if group_path.is_empty() {
            String::new()
        } else {
            format!("{group_path}/")
        };
        let names = self
            .groups
            .keys()
            .filter(|path| !path.is_empty() && path.starts_with(&prefix))
            .filter_map(|path| {
                let rest = &path[prefix.len()..];
                if rest.is_empty() || rest.contains('/') {
                    None
                } else {
                    Some(rest.to_string())
                }
            })
            .collect();
        Ok(names)
    }

    fn variable_names(&self, group_path: &str) -> Result<Vec<String>, ContainerError> {
        Ok(self.group(group_path)?.variables.keys().cloned().collect())
    }

    fn variable_meta(
        &self,
        group_path: &str,
        name: &str,
    ) -> Result<VariableMeta, ContainerError> {
        self.group(group_path)?
            .variables
            .get(name)
            .cloned()
            .ok_or_else(|| ContainerError::VariableNotFound {
                group: group_path.to_string(),
                name: name.to_string(),
            })
    }

    fn variable_values(
        &self,
        group_path: &str,
        name: &str,
    ) -> Result<ArrayD<f64>, ContainerError> {
        self.group(group_path)?
            .values
            .get(name)
            .cloned()
            .ok_or_else(|| ContainerError::VariableNotFound {
                group: group_path.to_string(),
                name: name.to_string(),
            })
    }
}

/// Shorthand for a metadata-only variable with a dtype and shape.
pub fn simple_variable(name: &str, dtype: &str, shape: &[usize]) -> VariableMeta {
    VariableMeta {
        name: name.to_string(),
        dtype: dtype.to_string(),
        shape: shape.to_vec(),
        ..Default::default()
    }
}
