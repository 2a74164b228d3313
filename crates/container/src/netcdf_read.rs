//! netCDF backend for [`ContainerAccess`].

use std::path::Path;

use ndarray::ArrayD;
use netcdf::types::{FloatType, IntType, NcVariableType};
use netcdf::AttributeValue;

use crate::access::{AttrValue, ContainerAccess, VariableMeta};
use crate::{ContainerError, ContainerKind};

/// Read-only view of a netCDF file.
pub struct NetcdfReader {
    file: netcdf::File,
}

/// The root of a netCDF file and its groups expose the same queries through
/// different types; this enum lets path resolution treat them uniformly.
enum Node<'f> {
    Root(&'f netcdf::File),
    Group(netcdf::Group<'f>),
}

impl NetcdfReader {
    pub fn open(path: &Path) -> Result<Self, ContainerError> {
        Ok(NetcdfReader {
            file: netcdf::open(path)?,
        })
    }

    /// Resolve a slash-delimited group path; the empty path is the root.
    fn node(&self, group_path: &str) -> Result<Node<'_>, ContainerError> {
        let mut segments = group_path.split('/').filter(|s| !s.is_empty());

        let first = match segments.next() {
            None => return Ok(Node::Root(&self.file)),
            Some(first) => first,
        };
        // Resolve segment by segment, but always from the file root: a group
        // returned by `Group::group` borrows its parent, which would not
        // survive reassignment in the loop.
        let mut resolved = first.to_string();
        let mut group = self
            .file
            .group(&resolved)?
            .ok_or_else(|| ContainerError::GroupNotFound(group_path.to_string()))?;
        for segment in segments {
            resolved.push('/');
            resolved.push_str(segment);
            group = self
                .file
                .group(&resolved)?
                .ok_or_else(|| ContainerError::GroupNotFound(group_path.to_string()))?;
        }
        Ok(Node::Group(group))
    }
}

impl<'f> Node<'f> {
    fn subgroup_names(&self) -> Result<Vec<String>, ContainerError> {
        let mut names: Vec<String> = match self {
            Node::Root(file) => file.groups()?.map(|g| g.name()).collect(),
            Node::Group(group) => group.groups().map(|g| g.name()).collect(),
        };
        names.sort();
        Ok(names)
    }

    fn variable_names(&self) -> Vec<String> {
        let mut names: Vec<String> = match self {
            Node::Root(file) => file.variables().map(|v| v.name()).collect(),
            Node::Group(group) => group.variables().map(|v| v.name()).collect(),
        };
        names.sort();
        names
    }

    fn variable(&self, name: &str) -> Option<netcdf::Variable<'_>> {
        match self {
            Node::Root(file) => file.variable(name),
            Node::Group(group) => group.variable(name),
        }
    }
}

impl ContainerAccess for NetcdfReader {
    fn kind(&self) -> ContainerKind {
        ContainerKind::Netcdf
    }

    fn root_dimensions(&self) -> Result<Vec<(String, usize)>, ContainerError> {
        let mut dims: Vec<(String, usize)> = self
            .file
            .dimensions()
            .map(|d| (d.name(), d.len()))
            .collect();
        dims.sort();
        Ok(dims)
    }

    fn subgroup_names(&self, group_path: &str) -> Result<Vec<String>, ContainerError> {
        self.node(group_path)?.subgroup_names()
    }

    fn variable_names(&self, group_path: &str) -> Result<Vec<String>, ContainerError> {
        Ok(self.node(group_path)?.variable_names())
    }

    fn variable_meta(
        &self,
        group_path: &str,
        name: &str,
    ) -> Result<VariableMeta, ContainerError> {
        let node = self.node(group_path)?;
        let variable = node
            .variable(name)
            .ok_or_else(|| ContainerError::VariableNotFound {
                group: group_path.to_string(),
                name: name.to_string(),
            })?;

        let dimension_names = variable.dimensions().iter().map(|d| d.name()).collect();
        let shape = variable.dimensions().iter().map(|d| d.len()).collect();

        let mut attributes = Vec::new();
        for attribute in variable.attributes() {
            let value = match attribute.value() {
                Ok(value) => convert_attribute(value),
                // One unreadable attribute must not abort the comparison.
                Err(err) => AttrValue::Unreadable(format!("netCDF error: {err}")),
            };
            attributes.push((attribute.name().to_string(), value));
        }
        let scale_factor = scale_factor_of(&attributes);

        Ok(VariableMeta {
            name: name.to_string(),
            dtype: dtype_string(&variable.vartype()),
            dimension_names,
            shape,
            chunking: variable.chunking()?,
            scale_factor,
            attributes,
        })
    }

    fn variable_values(
        &self,
        group_path: &str,
        name: &str,
    ) -> Result<ArrayD<f64>, ContainerError> {
        let node = self.node(group_path)?;
        let variable = node
            .variable(name)
            .ok_or_else(|| ContainerError::VariableNotFound {
                group: group_path.to_string(),
                name: name.to_string(),
            })?;
        Ok(variable.get::<f64, _>(..)?)
    }
}

fn dtype_string(vartype: &NcVariableType) -> String {
    match vartype {
        NcVariableType::Int(int) => match int {
            IntType::I8 => "i8".to_string(),
            IntType::U8 => "u8".to_string(),
            IntType::I16 => "i16".to_string(),
            IntType::U16 => "u16".to_string(),
            IntType::I32 => "i32".to_string(),
            IntType::U32 => "u32".to_string(),
            IntType::I64 => "i64".to_string(),
            IntType::U64 => "u64".to_string(),
        },
        NcVariableType::Float(float) => match float {
            FloatType::F32 => "f32".to_string(),
            FloatType::F64 => "f64".to_string(),
        },
        NcVariableType::String => "string".to_string(),
        other => format!("{other:?}"),
    }
}

fn convert_attribute(value: AttributeValue) -> AttrValue {
    match value {
        AttributeValue::Schar(v) => AttrValue::Int(v.into()),
        AttributeValue::Uchar(v) => AttrValue::Int(v.into()),
        AttributeValue::Short(v) => AttrValue::Int(v.into()),
        AttributeValue::Ushort(v) => AttrValue::Int(v.into()),
        AttributeValue::Int(v) => AttrValue::Int(v.into()),
        AttributeValue::Uint(v) => AttrValue::Int(v.into()),
        AttributeValue::Longlong(v) => AttrValue::Int(v),
        AttributeValue::Ulonglong(v) => AttrValue::Int(v as i64),
        AttributeValue::Float(v) => AttrValue::Float(v.into()),
        AttributeValue::Double(v) => AttrValue::Float(v),
        AttributeValue::Str(v) => AttrValue::Str(v),
        AttributeValue::Schars(v) => AttrValue::Ints(v.into_iter().map(i64::from).collect()),
        AttributeValue::Uchars(v) => AttrValue::Ints(v.into_iter().map(i64::from).collect()),
        AttributeValue::Shorts(v) => AttrValue::Ints(v.into_iter().map(i64::from).collect()),
        AttributeValue::Ushorts(v) => AttrValue::Ints(v.into_iter().map(i64::from).collect()),
        AttributeValue::Ints(v) => AttrValue::Ints(v.into_iter().map(i64::from).collect()),
        AttributeValue::Uints(v) => AttrValue::Ints(v.into_iter().map(i64::from).collect()),
        AttributeValue::Longlongs(v) => AttrValue::Ints(v),
        AttributeValue::Ulonglongs(v) => {
            AttrValue::Ints(v.into_iter().map(|x| x as i64).collect())
        }
        AttributeValue::Floats(v) => AttrValue::Floats(v.into_iter().map(f64::from).collect()),
        AttributeValue::Doubles(v) => AttrValue::Floats(v),
        AttributeValue::Strs(v) => AttrValue::Strs(v),
        #[allow(unreachable_patterns)]
        other => AttrValue::Unreadable(format!("unsupported attribute type: {other:?}")),
    }
}

fn scale_factor_of(attributes: &[(String, AttrValue)]) -> Option<f64> {
    attributes
        .iter()
        .find(|(name, _)| name == "scale_factor")
        .and_then(|(_, value)| match value {
            AttrValue::Float(v) => Some(*v),
            AttrValue::Int(v) => Some(*v as f64),
            _ => None,
        })
}
