//! Read-only access to hierarchical trajectory archives.
//!
//! An archive is a directory tree: groups are subdirectories, scalar
//! metadata lives in per-group `attrs.toml` tables (with `<name>.attrs.toml`
//! sidecars for dataset attributes), and bulk arrays are `.npy` datasets.
//! Every attribute or dataset access opens the underlying file fresh; no
//! handle is held across an object's lifetime, so index objects stay safe
//! across the process forks used by multi-worker data loading.

mod attrs;

pub use attrs::Attributes;

use ndarray::{Array1, Array3};
use ndarray_npy::{ReadNpyError, ReadNpyExt};
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Archive not found at '{path}'", path = path.display())]
    ArchiveNotFound { path: PathBuf },

    #[error("Group not found at '{path}'")]
    GroupNotFound { path: String },

    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },

    #[error("Failed to read dataset '{path}': {source}")]
    Npy { path: String, source: ReadNpyError },

    #[error("Missing attribute '{name}' on '{owner}'")]
    MissingAttribute { owner: String, name: String },

    #[error("Attribute '{name}' on '{owner}' is not {expected}")]
    AttributeType {
        owner: String,
        name: String,
        expected: &'static str,
    },
}

/// A handle on one on-disk archive. Holds only the root path; see the
/// module docs for the per-read open policy.
#[derive(Debug, Clone)]
pub struct Archive {
    root: PathBuf,
}

impl Archive {
    /// Opens the archive rooted at `path`. Fails with
    /// [`StoreError::ArchiveNotFound`] if no directory exists there.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = path.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(StoreError::ArchiveNotFound { path: root });
        }
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn root(&self) -> Group {
        Group {
            dir: self.root.clone(),
        }
    }
}

/// One named group within an archive.
#[derive(Debug, Clone)]
pub struct Group {
    dir: PathBuf,
}

impl Group {
    pub fn child(&self, name: &str) -> Group {
        Group {
            dir: self.dir.join(name),
        }
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.dir.join(name).is_dir()
    }

    pub fn exists(&self) -> bool {
        self.dir.is_dir()
    }

    /// Names of all child groups, in sorted order. Iteration order over an
    /// archive must be deterministic for index construction to be
    /// restartable.
    pub fn child_names(&self) -> Result<Vec<String>, StoreError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| self.io_error(e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| self.io_error(e))?;
            if entry.path().is_dir() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// This group's attribute table. A group without an `attrs.toml` has an
    /// empty table, which is not an error until a required key is read.
    pub fn attrs(&self) -> Result<Attributes, StoreError> {
        self.read_attr_table(&self.dir.join("attrs.toml"), self.label())
    }

    /// The sidecar attribute table of a dataset within this group.
    pub fn dataset_attrs(&self, dataset: &str) -> Result<Attributes, StoreError> {
        let path = self.dir.join(format!("{dataset}.attrs.toml"));
        let owner = format!("{}/{dataset}", self.label());
        self.read_attr_table(&path, owner)
    }

    pub fn read_i64_1d(&self, dataset: &str) -> Result<Array1<i64>, StoreError> {
        let (file, path) = self.open_dataset(dataset)?;
        Array1::<i64>::read_npy(file).map_err(|source| StoreError::Npy { path, source })
    }

    pub fn read_f64_1d(&self, dataset: &str) -> Result<Array1<f64>, StoreError> {
        let (file, path) = self.open_dataset(dataset)?;
        Array1::<f64>::read_npy(file).map_err(|source| StoreError::Npy { path, source })
    }

    pub fn read_f32_3d(&self, dataset: &str) -> Result<Array3<f32>, StoreError> {
        let (file, path) = self.open_dataset(dataset)?;
        Array3::<f32>::read_npy(file).map_err(|source| StoreError::Npy { path, source })
    }

    fn open_dataset(&self, dataset: &str) -> Result<(File, String), StoreError> {
        let path = self.dir.join(format!("{dataset}.npy"));
        let label = path.to_string_lossy().to_string();
        let file = File::open(&path).map_err(|source| StoreError::Io {
            path: label.clone(),
            source,
        })?;
        Ok((file, label))
    }

    fn read_attr_table(&self, path: &Path, owner: String) -> Result<Attributes, StoreError> {
        if !path.exists() {
            return Ok(Attributes::empty(owner));
        }
        let content = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_string_lossy().to_string(),
            source,
        })?;
        let table = toml::from_str(&content).map_err(|source| StoreError::Toml {
            path: path.to_string_lossy().to_string(),
            source,
        })?;
        Ok(Attributes::new(owner, table))
    }

    fn label(&self) -> String {
        self.dir.to_string_lossy().to_string()
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.label(),
            source,
        }
    }
}
