//! HDF5 backend for [`ContainerAccess`].
//!
//! Plain HDF5 has no netCDF-style named dimensions; this backend reports
//! empty dimension-name lists and an empty root-dimension list. Both sides
//! of an HDF5/HDF5 comparison get the same treatment, so the omission never
//! manufactures a difference.

use std::path::Path;

use hdf5::types::{FloatSize, IntSize, TypeDescriptor, VarLenUnicode};
use ndarray::ArrayD;

use crate::access::{AttrValue, ContainerAccess, VariableMeta};
use crate::{ContainerError, ContainerKind};

/// Read-only view of an HDF5 file.
pub struct Hdf5Reader {
    file: hdf5::File,
}

impl Hdf5Reader {
    pub fn open(path: &Path) -> Result<Self, ContainerError> {
        Ok(Hdf5Reader {
            file: hdf5::File::open(path)?,
        })
    }

    fn group(&self, group_path: &str) -> Result<hdf5::Group, ContainerError> {
        let result = if group_path.is_empty() {
            self.file.as_group()
        } else {
            self.file.group(group_path)
        };
        result.map_err(|_| ContainerError::GroupNotFound(group_path.to_string()))
    }

    fn dataset(&self, group_path: &str, name: &str) -> Result<hdf5::Dataset, ContainerError> {
        self.group(group_path)?
            .dataset(name)
            .map_err(|_| ContainerError::VariableNotFound {
                group: group_path.to_string(),
                name: name.to_string(),
            })
    }
}

impl ContainerAccess for Hdf5Reader {
    fn kind(&self) -> ContainerKind {
        ContainerKind::Hdf5
    }

    fn root_dimensions(&self) -> Result<Vec<(String, usize)>, ContainerError> {
        // No named dimensions outside netCDF conventions.
        Ok(Vec::new())
    }

    fn subgroup_names(&self, group_path: &str) -> Result<Vec<String>, ContainerError> {
        let group = self.group(group_path)?;
        let mut names: Vec<String> = group
            .member_names()?
            .into_iter()
            .filter(|name| group.group(name).is_ok())
            .collect();
        names.sort();
        Ok(names)
    }

    fn variable_names(&self, group_path: &str) -> Result<Vec<String>, ContainerError> {
        let group = self.group(group_path)?;
        let mut names: Vec<String> = group
            .member_names()?
            .into_iter()
            .filter(|name| group.dataset(name).is_ok())
            .collect();
        names.sort();
        Ok(names)
    }

    fn variable_meta(
        &self,
        group_path: &str,
        name: &str,
    ) -> Result<VariableMeta, ContainerError> {
        let dataset = self.dataset(group_path, name)?;

        let dtype = match dataset.dtype().and_then(|d| d.to_descriptor()) {
            Ok(descriptor) => format!("{descriptor:?}"),
            Err(err) => format!("HDF5 error: {err}"),
        };

        let mut attributes = Vec::new();
        for attr_name in dataset.attr_names()? {
            let value = read_attribute(&dataset, &attr_name);
            attributes.push((attr_name, value));
        }
        let scale_factor = attributes
            .iter()
            .find(|(attr_name, _)| attr_name == "scale_factor")
            .and_then(|(_, value)| match value {
                AttrValue::Float(v) => Some(*v),
                AttrValue::Int(v) => Some(*v as f64),
                _ => None,
            });

        Ok(VariableMeta {
            name: name.to_string(),
            dtype,
            dimension_names: Vec::new(),
            shape: dataset.shape(),
            chunking: dataset.chunk(),
            scale_factor,
            attributes,
        })
    }

    fn variable_values(
        &self,
        group_path: &str,
        name: &str,
    ) -> Result<ArrayD<f64>, ContainerError> {
        Ok(self.dataset(group_path, name)?.read_dyn::<f64>()?)
    }
}

/// Read one attribute, converting any failure into a visible placeholder so
/// a single unreadable attribute never aborts the comparison.
fn read_attribute(dataset: &hdf5::Dataset, name: &str) -> AttrValue {
    match try_read_attribute(dataset, name) {
        Ok(value) => value,
        Err(err) => AttrValue::Unreadable(format!("HDF5 error: {err}")),
    }
}

fn try_read_attribute(dataset: &hdf5::Dataset, name: &str) -> hdf5::Result<AttrValue> {
    let attribute = dataset.attr(name)?;
    let descriptor = attribute.dtype()?.to_descriptor()?;
    let scalar = attribute.ndim() == 0;

    let value = match descriptor {
        TypeDescriptor::Integer(IntSize::U1) => read_ints::<i8>(&attribute, scalar)?,
        TypeDescriptor::Integer(IntSize::U2) => read_ints::<i16>(&attribute, scalar)?,
        TypeDescriptor::Integer(IntSize::U4) => read_ints::<i32>(&attribute, scalar)?,
        TypeDescriptor::Integer(IntSize::U8) => read_ints::<i64>(&attribute, scalar)?,
        TypeDescriptor::Unsigned(IntSize::U1) => read_uints::<u8>(&attribute, scalar)?,
        TypeDescriptor::Unsigned(IntSize::U2) => read_uints::<u16>(&attribute, scalar)?,
        TypeDescriptor::Unsigned(IntSize::U4) => read_uints::<u32>(&attribute, scalar)?,
        TypeDescriptor::Unsigned(IntSize::U8) => read_uints::<u64>(&attribute, scalar)?,
        TypeDescriptor::Float(FloatSize::U4) => read_floats::<f32>(&attribute, scalar)?,
        TypeDescriptor::Float(FloatSize::U8) => read_floats::<f64>(&attribute, scalar)?,
        TypeDescriptor::VarLenAscii
        | TypeDescriptor::VarLenUnicode
        | TypeDescriptor::FixedAscii(_)
        | TypeDescriptor::FixedUnicode(_) => read_strings(&attribute, scalar)?,
        other => AttrValue::Unreadable(format!("unsupported attribute type: {other:?}")),
    };
    Ok(value)
}

fn read_ints<T>(attribute: &hdf5::Attribute, scalar: bool) -> hdf5::Result<AttrValue>
where
    T: hdf5::H5Type + Copy + Into<i64>,
{
    if scalar {
        Ok(AttrValue::Int(attribute.read_scalar::<T>()?.into()))
    } else {
        let values = attribute.read_raw::<T>()?;
        Ok(AttrValue::Ints(values.into_iter().map(Into::into).collect()))
    }
}

fn read_uints<T>(attribute: &hdf5::Attribute, scalar: bool) -> hdf5::Result<AttrValue>
where
    T: hdf5::H5Type + Copy + TryInto<i64>,
{
    let widen = |v: T| v.try_into().unwrap_or(i64::MAX);
    if scalar {
        Ok(AttrValue::Int(widen(attribute.read_scalar::<T>()?)))
    } else {
        let values = attribute.read_raw::<T>()?;
        Ok(AttrValue::Ints(values.into_iter().map(widen).collect()))
    }
}

fn read_floats<T>(attribute: &hdf5::Attribute, scalar: bool) -> hdf5::Result<AttrValue>
where
    T: hdf5::H5Type + Copy + Into<f64>,
{
    if scalar {
        Ok(AttrValue::Float(attribute.read_scalar::<T>()?.into()))
    } else {
        let values = attribute.read_raw::<T>()?;
        Ok(AttrValue::Floats(
            values.into_iter().map(Into::into).collect(),
        ))
    }
}

fn read_strings(attribute: &hdf5::Attribute, scalar: bool) -> hdf5::Result<AttrValue> {
    if scalar {
        Ok(AttrValue::Str(
            attribute.read_scalar::<VarLenUnicode>()?.to_string(),
        ))
    } else {
        let values = attribute.read_raw::<VarLenUnicode>()?;
        Ok(AttrValue::Strs(
            values.into_iter().map(|s| s.to_string()).collect(),
        ))
    }
}
