//! Container-format detection and hierarchical file access.
//!
//! The comparison engine never touches a file format directly. This crate
//! exposes the [`ContainerAccess`] capability trait (list subgroups, list
//! variables, get variable metadata, read variable values) with one backend
//! per supported format family, selected once at open time from the file
//! extension:
//!
//! - `.nc`, `.nc3`, `.nc4`: netCDF, via the `netcdf` crate
//! - `.h5`, `.hdf5`, `.he5`: HDF5, via the `hdf5` crate
//!
//! Everything above this crate is written only against the trait.

use std::path::{Path, PathBuf};

mod access;
mod hdf5_read;
mod netcdf_read;

pub use access::{join_group_path, AttrValue, ContainerAccess, VariableMeta};
pub use hdf5_read::Hdf5Reader;
pub use netcdf_read::NetcdfReader;

/// Error type for container operations.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// The input path does not exist
    #[error("expected file does not exist: {0}")]
    MissingFile(PathBuf),

    /// The input path has no recognized container extension
    #[error(
        "{0} is not a valid file type: expected netcdf (.nc, .nc4, .nc3) \
         or hdf5 (.h5, .hdf5, .he5)"
    )]
    UnsupportedExtension(PathBuf),

    /// A group path could not be resolved within the container
    #[error("group not found: /{0}")]
    GroupNotFound(String),

    /// A variable name could not be resolved within a group
    #[error("variable not found: {name} in group /{group}")]
    VariableNotFound { group: String, name: String },

    /// Error reported by the netCDF library
    #[error("netCDF error: {0}")]
    Netcdf(#[from] netcdf::Error),

    /// Error reported by the HDF5 library
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),

    /// Value array could not be shaped
    #[error("array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// The two supported container format families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Netcdf,
    Hdf5,
}

impl ContainerKind {
    /// Detect the format family from a file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Result<Self, ContainerError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .ok_or_else(|| ContainerError::UnsupportedExtension(path.to_path_buf()))?;

        match extension.as_str() {
            "nc" | "nc3" | "nc4" => Ok(ContainerKind::Netcdf),
            "h5" | "hdf5" | "he5" => Ok(ContainerKind::Hdf5),
            _ => Err(ContainerError::UnsupportedExtension(path.to_path_buf())),
        }
    }

    /// Human-readable family name, used in messages.
    pub fn name(&self) -> &'static str {
        match self {
            ContainerKind::Netcdf => "netcdf",
            ContainerKind::Hdf5 => "hdf5",
        }
    }
}

/// A validated input file: an existing path plus its detected format family.
#[derive(Debug, Clone)]
pub struct FileToCompare {
    path: PathBuf,
    kind: ContainerKind,
}

impl FileToCompare {
    /// Validate that `path` exists and carries a supported extension.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, ContainerError> {
        let path = path.into();
        if !path.exists() {
            return Err(ContainerError::MissingFile(path));
        }
        let kind = ContainerKind::from_path(&path)?;
        Ok(FileToCompare { path, kind })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Open the file with the backend matching its format family.
    pub fn open(&self) -> Result<Box<dyn ContainerAccess>, ContainerError> {
        tracing::debug!(path = %self.path.display(), kind = self.kind.name(), "opening container");
        match self.kind {
            ContainerKind::Netcdf => Ok(Box::new(NetcdfReader::open(&self.path)?)),
            ContainerKind::Hdf5 => Ok(Box::new(Hdf5Reader::open(&self.path)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_netcdf_extensions() {
        for name in ["a.nc", "b.nc3", "c.nc4", "d.NC", "e.Nc4"] {
            assert_eq!(
                ContainerKind::from_path(Path::new(name)).unwrap(),
                ContainerKind::Netcdf,
                "extension of {name}"
            );
        }
    }

    #[test]
    fn test_kind_from_hdf5_extensions() {
        for name in ["a.h5", "b.hdf5", "c.he5", "d.H5"] {
            assert_eq!(
                ContainerKind::from_path(Path::new(name)).unwrap(),
                ContainerKind::Hdf5,
                "extension of {name}"
            );
        }
    }

    #[test]
    fn test_kind_rejects_unknown_extension() {
        assert!(matches!(
            ContainerKind::from_path(Path::new("a.txt")),
            Err(ContainerError::UnsupportedExtension(_))
        ));
        assert!(matches!(
            ContainerKind::from_path(Path::new("no_extension")),
            Err(ContainerError::UnsupportedExtension(_))
        ));
    }

    #[test]
    fn test_file_to_compare_requires_existing_path() {
        assert!(matches!(
            FileToCompare::new("/definitely/not/here.nc"),
            Err(ContainerError::MissingFile(_))
        ));
    }

    #[test]
    fn test_file_to_compare_detects_kind_of_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("granule.nc4");
        std::fs::write(&path, b"").unwrap();

        let file = FileToCompare::new(&path).unwrap();
        assert_eq!(file.kind(), ContainerKind::Netcdf);
        assert_eq!(file.path(), path);
    }
}
