//! Dataset construction: filter, flatten, lazily materialize.

pub mod config;
pub mod error;
mod flatten;
pub mod molecules;
pub mod progress;
pub mod suite;
pub mod trajectories;

pub use config::{
    ConfigError, ConfigLoadError, StructureFractions, TrajectoryConfig, TrajectoryConfigBuilder,
};
pub use error::DatasetError;
pub use molecules::{MoleculeArchives, MoleculeDataset, SampleStream};
pub use progress::{Progress, ProgressCallback, ProgressReporter};
pub use suite::SuiteDataset;
pub use trajectories::{DomainSelection, QualifyingUnit, TrajectoryDataset};

use crate::core::models::sample::Sample;
use crate::core::store::{Archive, StoreError};
use std::path::Path;

/// Inclusion predicate over a fully-built sample; a `false` return excludes
/// the sample before any transform runs.
pub type SampleFilter = Box<dyn Fn(&Sample) -> bool + Send + Sync>;

/// Rewrites a sample immediately before it is handed to the consumer.
pub type SampleTransform = Box<dyn Fn(Sample) -> Sample + Send + Sync>;

/// A flat, randomly addressable sequence of conformation samples.
pub trait Dataset {
    /// Number of samples. Must be cheap and stable across calls.
    fn len(&self) -> usize;

    /// The sample at flat position `index`; fatal on out-of-range.
    fn get(&self, index: usize) -> Result<Sample, DatasetError>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub(crate) fn open_archive(path: &Path) -> Result<Archive, DatasetError> {
    Archive::open(path).map_err(|e| match e {
        StoreError::ArchiveNotFound { path } => DatasetError::MissingArchive { path },
        other => DatasetError::Store(other),
    })
}
