//! Metadata-driven selective indexing of domain trajectory collections.
//!
//! Construction runs the cheap qualification scan (attributes only) and
//! fixes the dataset length; the expensive flat index over the bulk
//! coordinate/force arrays is materialized once, on first sample access.

mod filters;

use super::config::TrajectoryConfig;
use super::error::DatasetError;
use super::flatten::OffsetTable;
use super::progress::{Progress, ProgressReporter};
use super::{Dataset, SampleTransform, open_archive};
use crate::core::models::sample::Sample;
use crate::core::store::{Group, StoreError};
use ndarray::{Array3, Axis, Slice};
use std::cell::OnceCell;
use std::sync::Arc;
use tracing::{debug, info};

/// One qualifying (temperature, replica) pair of a domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifyingUnit {
    pub temperature: String,
    pub replica: String,
}

/// A domain together with its qualifying units, in scan order. Domains with
/// zero qualifying units never appear in a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSelection {
    pub id: String,
    pub units: Vec<QualifyingUnit>,
}

#[derive(Debug, Clone, Default)]
struct Selection {
    domains: Vec<DomainSelection>,
    total_frames: usize,
}

/// Bulk arrays of one replica, shared across every frame it contributes.
struct ReplicaBlock {
    atomic_numbers: Arc<[i64]>,
    coords: Array3<f32>,
    forces: Array3<f32>,
}

struct FlatIndex {
    blocks: Vec<ReplicaBlock>,
    offsets: OffsetTable,
}

/// A flat dataset over the qualifying frames of a trajectory collection.
///
/// The qualification scan runs at construction and reads metadata only; no
/// bulk array is touched until the first [`Dataset::get`]. First access is
/// not thread-safe (the lazy index cell is not `Sync`); pre-trigger
/// materialization before fanning out across threads.
pub struct TrajectoryDataset {
    config: TrajectoryConfig,
    selection: Selection,
    transform: Option<SampleTransform>,
    index: OnceCell<FlatIndex>,
}

impl TrajectoryDataset {
    /// Scans the collection under `config.root` and fixes the dataset
    /// length. Equivalent to [`Self::scan`] with a silent reporter.
    pub fn new(config: TrajectoryConfig) -> Result<Self, DatasetError> {
        Self::scan(config, &ProgressReporter::new())
    }

    /// Runs the qualification scan, reporting per-domain progress.
    pub fn scan(
        config: TrajectoryConfig,
        reporter: &ProgressReporter,
    ) -> Result<Self, DatasetError> {
        let manifest = open_archive(&config.manifest_path())?;
        let root = manifest.root();
        let candidates = match &config.domains {
            Some(ids) => ids.clone(),
            None => root.child_names()?,
        };
        reporter.report(Progress::ScanStart {
            domains: candidates.len() as u64,
        });

        let mut selection = Selection::default();
        for id in candidates {
            let domain = root.child(&id);
            if !domain.exists() {
                return Err(StoreError::GroupNotFound {
                    path: format!("{}/{id}", config.manifest_path().display()),
                }
                .into());
            }
            match Self::scan_domain(&config, &domain, &id)? {
                Some((units, frames)) => {
                    selection.total_frames += frames;
                    selection.domains.push(DomainSelection { id, units });
                }
                None => debug!(domain = %id, "domain rejected by metadata filters"),
            }
            reporter.report(Progress::DomainScanned);
        }

        info!(
            domains = selection.domains.len(),
            conformations = selection.total_frames,
            "qualification scan complete"
        );
        reporter.report(Progress::ScanFinish {
            selected: selection.domains.len() as u64,
            conformations: selection.total_frames as u64,
        });

        Ok(Self {
            config,
            selection,
            transform: None,
            index: OnceCell::new(),
        })
    }

    /// Rewrites each sample immediately before [`Dataset::get`] returns it.
    pub fn with_transform(
        mut self,
        transform: impl Fn(Sample) -> Sample + Send + Sync + 'static,
    ) -> Self {
        self.transform = Some(Box::new(transform));
        self
    }

    /// The qualifying domains, in scan order.
    pub fn selected_domains(&self) -> &[DomainSelection] {
        &self.selection.domains
    }

    pub fn config(&self) -> &TrajectoryConfig {
        &self.config
    }

    fn scan_domain(
        config: &TrajectoryConfig,
        domain: &Group,
        id: &str,
    ) -> Result<Option<(Vec<QualifyingUnit>, usize)>, DatasetError> {
        let attrs = domain.attrs()?;
        if !filters::passes_all(filters::DOMAIN_FILTERS, config, &attrs)? {
            return Ok(None);
        }

        let mut units = Vec::new();
        let mut frames = 0usize;
        for temperature in &config.temperatures {
            // A requested temperature absent from the domain ends the scan
            // for this domain; later requested temperatures are not
            // examined. Absence is silent, not an error.
            if !domain.has_child(temperature) {
                break;
            }
            let temp_group = domain.child(temperature);
            for replica in temp_group.child_names()? {
                let replica_attrs = temp_group.child(&replica).attrs()?;
                if !filters::passes_all(filters::REPLICA_FILTERS, config, &replica_attrs)? {
                    debug!(
                        domain = %id,
                        temperature = %temperature,
                        replica = %replica,
                        "replica rejected by metadata filters"
                    );
                    continue;
                }
                let num_frames = replica_attrs.require_u64("num_frames")? as usize;
                frames += num_frames.div_ceil(config.stride);
                units.push(QualifyingUnit {
                    temperature: temperature.clone(),
                    replica,
                });
            }
        }

        if units.is_empty() {
            return Ok(None);
        }
        Ok(Some((units, frames)))
    }

    fn flat_index(&self) -> Result<&FlatIndex, DatasetError> {
        if let Some(index) = self.index.get() {
            return Ok(index);
        }
        let built = self.build_index()?;
        Ok(self.index.get_or_init(|| built))
    }

    fn build_index(&self) -> Result<FlatIndex, DatasetError> {
        info!(
            domains = self.selection.domains.len(),
            "materializing flat conformation index"
        );
        let mut blocks = Vec::new();
        for domain in &self.selection.domains {
            let archive = open_archive(&self.config.domain_archive_path(&domain.id))?;
            let root = archive.root();
            let atomic_numbers: Arc<[i64]> = root.read_i64_1d("z")?.to_vec().into();
            for unit in &domain.units {
                let group = root
                    .child(&format!("sims{}K", unit.temperature))
                    .child(&unit.replica);
                blocks.push(Self::read_block(
                    &self.config,
                    &domain.id,
                    unit,
                    &group,
                    atomic_numbers.clone(),
                )?);
            }
        }

        let offsets = OffsetTable::from_lens(blocks.iter().map(|b| b.coords.len_of(Axis(0))));
        if offsets.total() != self.selection.total_frames {
            return Err(DatasetError::IndexCountMismatch {
                expected: self.selection.total_frames,
                actual: offsets.total(),
            });
        }
        Ok(FlatIndex { blocks, offsets })
    }

    fn read_block(
        config: &TrajectoryConfig,
        domain_id: &str,
        unit: &QualifyingUnit,
        group: &Group,
        atomic_numbers: Arc<[i64]>,
    ) -> Result<ReplicaBlock, DatasetError> {
        let mismatch = |detail: String| DatasetError::UnitOrShapeMismatch {
            group: format!("{domain_id}/sims{}K/{}", unit.temperature, unit.replica),
            detail,
        };

        let coords_attrs = group.dataset_attrs("coords")?;
        let coords_unit = coords_attrs.require_str("unit")?;
        if coords_unit != "Angstrom" {
            return Err(mismatch(format!(
                "coords unit is '{coords_unit}', expected 'Angstrom'"
            )));
        }
        let forces_attrs = group.dataset_attrs("forces")?;
        let forces_unit = forces_attrs.require_str("unit")?;
        if forces_unit != "kcal/mol/Angstrom" {
            return Err(mismatch(format!(
                "forces unit is '{forces_unit}', expected 'kcal/mol/Angstrom'"
            )));
        }

        let coords = strided(group.read_f32_3d("coords")?, config.stride);
        let forces = strided(group.read_f32_3d("forces")?, config.stride);

        if coords.len_of(Axis(0)) != forces.len_of(Axis(0)) {
            return Err(mismatch(format!(
                "coords hold {} frames but forces hold {}",
                coords.len_of(Axis(0)),
                forces.len_of(Axis(0))
            )));
        }
        if coords.len_of(Axis(1)) != atomic_numbers.len() {
            return Err(mismatch(format!(
                "coords hold {} atoms but the atomic-number array has {}",
                coords.len_of(Axis(1)),
                atomic_numbers.len()
            )));
        }
        if forces.len_of(Axis(1)) != atomic_numbers.len() {
            return Err(mismatch(format!(
                "forces hold {} atoms but the atomic-number array has {}",
                forces.len_of(Axis(1)),
                atomic_numbers.len()
            )));
        }

        Ok(ReplicaBlock {
            atomic_numbers,
            coords,
            forces,
        })
    }
}

/// Keep every Nth frame starting at frame 0.
fn strided(array: Array3<f32>, stride: usize) -> Array3<f32> {
    if stride <= 1 {
        return array;
    }
    array
        .slice_axis(Axis(0), Slice::new(0, None, stride as isize))
        .to_owned()
}

impl Dataset for TrajectoryDataset {
    /// The phase-1 frame count; never triggers index materialization.
    fn len(&self) -> usize {
        self.selection.total_frames
    }

    fn get(&self, index: usize) -> Result<Sample, DatasetError> {
        if index >= self.len() {
            return Err(DatasetError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        let flat = self.flat_index()?;
        let (block_index, frame) =
            flat.offsets
                .locate(index)
                .ok_or(DatasetError::IndexOutOfRange {
                    index,
                    len: self.len(),
                })?;
        let block = &flat.blocks[block_index];
        let mut sample = Sample {
            atomic_numbers: block.atomic_numbers.clone(),
            positions: block.coords.index_axis(Axis(0), frame).to_owned(),
            forces: Some(block.forces.index_axis(Axis(0), frame).to_owned()),
            energy: None,
            provenance: None,
        };
        if let Some(transform) = &self.transform {
            sample = transform(sample);
        }
        Ok(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::config::StructureFractions;
    use crate::testing;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::tempdir;

    fn config(root: &Path) -> TrajectoryConfig {
        TrajectoryConfig::builder().root(root).build().unwrap()
    }

    /// One domain, two replicas at 348 K with 10 and 5 frames.
    fn two_replica_manifest(root: &Path) {
        testing::write_manifest_domain(root, "1abcA00", 50, 10, 40);
        testing::write_manifest_replica(
            root,
            "1abcA00",
            "348",
            "0",
            &testing::ReplicaMeta::with_frames(10),
        );
        testing::write_manifest_replica(
            root,
            "1abcA00",
            "348",
            "1",
            &testing::ReplicaMeta::with_frames(5),
        );
    }

    /// Manifest plus matching data archive: 2 atoms, replicas of 2 and 3
    /// frames.
    fn small_collection(root: &Path) {
        testing::write_manifest_domain(root, "dom1", 2, 1, 1);
        testing::write_manifest_replica(
            root,
            "dom1",
            "348",
            "0",
            &testing::ReplicaMeta::with_frames(2),
        );
        testing::write_manifest_replica(
            root,
            "dom1",
            "348",
            "1",
            &testing::ReplicaMeta::with_frames(3),
        );
        testing::write_domain_z(root, "dom1", &[1, 8]);
        testing::write_replica_arrays(
            root,
            "dom1",
            "348",
            "0",
            &testing::frame_fill(2, 2, 0.0),
            &testing::frame_fill(2, 2, 100.0),
        );
        testing::write_replica_arrays(
            root,
            "dom1",
            "348",
            "1",
            &testing::frame_fill(3, 2, 50000.0),
            &testing::frame_fill(3, 2, 70000.0),
        );
    }

    #[test]
    fn length_accumulates_ceil_of_frames_over_stride() {
        let dir = tempdir().unwrap();
        two_replica_manifest(dir.path());

        let dataset = TrajectoryDataset::new(config(dir.path())).unwrap();
        assert_eq!(dataset.len(), 15);

        let strided = TrajectoryConfig::builder()
            .root(dir.path())
            .stride(2)
            .build()
            .unwrap();
        let dataset = TrajectoryDataset::new(strided).unwrap();
        assert_eq!(dataset.len(), 8);
    }

    #[test]
    fn length_is_stable_and_does_not_materialize() {
        // No domains/ directory at all: any phase-2 attempt would fail.
        let dir = tempdir().unwrap();
        two_replica_manifest(dir.path());

        let dataset = TrajectoryDataset::new(config(dir.path())).unwrap();
        assert_eq!(dataset.len(), 15);
        assert_eq!(dataset.len(), 15);
        assert_eq!(dataset.selected_domains().len(), 1);
    }

    #[test]
    fn domain_filters_exclude_whole_domains() {
        let dir = tempdir().unwrap();
        two_replica_manifest(dir.path());

        let over_atoms = TrajectoryConfig::builder()
            .root(dir.path())
            .max_atoms(49)
            .build()
            .unwrap();
        let dataset = TrajectoryDataset::new(over_atoms).unwrap();
        assert!(dataset.selected_domains().is_empty());
        assert_eq!(dataset.len(), 0);

        let over_residues = TrajectoryConfig::builder()
            .root(dir.path())
            .max_residues(9)
            .build()
            .unwrap();
        assert!(TrajectoryDataset::new(over_residues)
            .unwrap()
            .selected_domains()
            .is_empty());

        let over_heavy = TrajectoryConfig::builder()
            .root(dir.path())
            .max_no_h_atoms(39)
            .build()
            .unwrap();
        assert!(TrajectoryDataset::new(over_heavy)
            .unwrap()
            .selected_domains()
            .is_empty());
    }

    #[test]
    fn no_selected_domain_exceeds_configured_thresholds() {
        let dir = tempdir().unwrap();
        testing::write_manifest_domain(dir.path(), "small", 50, 10, 40);
        testing::write_manifest_replica(
            dir.path(),
            "small",
            "348",
            "0",
            &testing::ReplicaMeta::with_frames(4),
        );
        testing::write_manifest_domain(dir.path(), "large", 600, 10, 40);
        testing::write_manifest_replica(
            dir.path(),
            "large",
            "348",
            "0",
            &testing::ReplicaMeta::with_frames(4),
        );

        let config = TrajectoryConfig::builder()
            .root(dir.path())
            .max_atoms(100)
            .build()
            .unwrap();
        let dataset = TrajectoryDataset::new(config).unwrap();
        let ids: Vec<_> = dataset.selected_domains().iter().map(|d| &d.id).collect();
        assert_eq!(ids, ["small"]);
    }

    #[test]
    fn replica_filters_reject_individually() {
        let dir = tempdir().unwrap();
        testing::write_manifest_domain(dir.path(), "dom1", 50, 10, 40);
        let mut short = testing::ReplicaMeta::with_frames(3);
        short.min_gyration_radius = 0.5;
        testing::write_manifest_replica(dir.path(), "dom1", "348", "0", &short);
        testing::write_manifest_replica(
            dir.path(),
            "dom1",
            "348",
            "1",
            &testing::ReplicaMeta::with_frames(8),
        );

        let config = TrajectoryConfig::builder()
            .root(dir.path())
            .min_frames(5)
            .min_gyration_radius(0.8)
            .build()
            .unwrap();
        let dataset = TrajectoryDataset::new(config).unwrap();
        assert_eq!(
            dataset.selected_domains()[0].units,
            vec![QualifyingUnit {
                temperature: "348".to_string(),
                replica: "1".to_string(),
            }]
        );
        assert_eq!(dataset.len(), 8);
    }

    #[test]
    fn structure_fraction_filter_selects_matching_replicas() {
        let dir = tempdir().unwrap();
        two_replica_manifest(dir.path());

        let matching = TrajectoryConfig::builder()
            .root(dir.path())
            .secondary_structure(StructureFractions {
                alpha: 0.3,
                beta: 0.2,
                coil: 0.5,
            })
            .build()
            .unwrap();
        assert_eq!(TrajectoryDataset::new(matching).unwrap().len(), 15);

        let mismatching = TrajectoryConfig::builder()
            .root(dir.path())
            .secondary_structure(StructureFractions {
                alpha: 0.4,
                beta: 0.2,
                coil: 0.4,
            })
            .build()
            .unwrap();
        assert_eq!(TrajectoryDataset::new(mismatching).unwrap().len(), 0);
    }

    #[test]
    fn domain_with_zero_qualifying_units_is_absent() {
        let dir = tempdir().unwrap();
        two_replica_manifest(dir.path());

        let config = TrajectoryConfig::builder()
            .root(dir.path())
            .min_frames(100)
            .build()
            .unwrap();
        let dataset = TrajectoryDataset::new(config).unwrap();
        assert!(dataset.selected_domains().is_empty());
    }

    #[test]
    fn missing_requested_temperature_ends_the_domain_scan() {
        let dir = tempdir().unwrap();
        testing::write_manifest_domain(dir.path(), "dom1", 50, 10, 40);
        testing::write_manifest_replica(
            dir.path(),
            "dom1",
            "348",
            "0",
            &testing::ReplicaMeta::with_frames(10),
        );

        // "320" is requested first and absent: "348" is never examined.
        let config = TrajectoryConfig::builder()
            .root(dir.path())
            .temperatures(["320", "348"])
            .build()
            .unwrap();
        let dataset = TrajectoryDataset::new(config).unwrap();
        assert!(dataset.selected_domains().is_empty());

        // "348" first and present keeps its units even though "413" is
        // absent afterwards.
        let config = TrajectoryConfig::builder()
            .root(dir.path())
            .temperatures(["348", "413"])
            .build()
            .unwrap();
        let dataset = TrajectoryDataset::new(config).unwrap();
        assert_eq!(dataset.len(), 10);
    }

    #[test]
    fn allowlist_restricts_and_orders_the_scan() {
        let dir = tempdir().unwrap();
        for id in ["a", "b", "c"] {
            testing::write_manifest_domain(dir.path(), id, 50, 10, 40);
            testing::write_manifest_replica(
                dir.path(),
                id,
                "348",
                "0",
                &testing::ReplicaMeta::with_frames(2),
            );
        }

        let config = TrajectoryConfig::builder()
            .root(dir.path())
            .domains(["c", "a"])
            .build()
            .unwrap();
        let dataset = TrajectoryDataset::new(config).unwrap();
        let ids: Vec<_> = dataset.selected_domains().iter().map(|d| &d.id).collect();
        assert_eq!(ids, ["c", "a"]);
    }

    #[test]
    fn allowlisted_domain_missing_from_manifest_is_fatal() {
        let dir = tempdir().unwrap();
        two_replica_manifest(dir.path());

        let config = TrajectoryConfig::builder()
            .root(dir.path())
            .domains(["nope"])
            .build()
            .unwrap();
        assert!(matches!(
            TrajectoryDataset::new(config),
            Err(DatasetError::Store(StoreError::GroupNotFound { .. }))
        ));
    }

    #[test]
    fn missing_manifest_archive_is_fatal() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            TrajectoryDataset::new(config(dir.path())),
            Err(DatasetError::MissingArchive { .. })
        ));
    }

    #[test]
    fn get_routes_flat_indices_across_replicas() {
        let dir = tempdir().unwrap();
        small_collection(dir.path());

        let dataset = TrajectoryDataset::new(config(dir.path())).unwrap();
        assert_eq!(dataset.len(), 5);

        let first = dataset.get(0).unwrap();
        assert_eq!(&*first.atomic_numbers, &[1, 8]);
        assert_eq!(first.positions[[0, 0]], 0.0);
        assert_eq!(first.forces.as_ref().unwrap()[[0, 0]], 100.0);
        assert_eq!(first.energy, None);

        // Index 2 is frame 0 of the second replica.
        let third = dataset.get(2).unwrap();
        assert_eq!(third.positions[[0, 0]], 50000.0);
        let last = dataset.get(4).unwrap();
        assert_eq!(last.positions[[0, 0]], 52000.0);
    }

    #[test]
    fn stride_keeps_every_nth_frame_from_zero() {
        let dir = tempdir().unwrap();
        testing::write_manifest_domain(dir.path(), "dom1", 2, 1, 1);
        testing::write_manifest_replica(
            dir.path(),
            "dom1",
            "348",
            "0",
            &testing::ReplicaMeta::with_frames(5),
        );
        testing::write_domain_z(dir.path(), "dom1", &[1, 8]);
        testing::write_replica_arrays(
            dir.path(),
            "dom1",
            "348",
            "0",
            &testing::frame_fill(5, 2, 0.0),
            &testing::frame_fill(5, 2, 0.0),
        );

        let config = TrajectoryConfig::builder()
            .root(dir.path())
            .stride(2)
            .build()
            .unwrap();
        let dataset = TrajectoryDataset::new(config).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.get(0).unwrap().positions[[0, 0]], 0.0);
        assert_eq!(dataset.get(1).unwrap().positions[[0, 0]], 2000.0);
        assert_eq!(dataset.get(2).unwrap().positions[[0, 0]], 4000.0);
    }

    #[test]
    fn get_past_the_end_is_out_of_range() {
        let dir = tempdir().unwrap();
        small_collection(dir.path());

        let dataset = TrajectoryDataset::new(config(dir.path())).unwrap();
        assert!(matches!(
            dataset.get(5),
            Err(DatasetError::IndexOutOfRange { index: 5, len: 5 })
        ));
    }

    #[test]
    fn atomic_numbers_are_shared_across_frames_of_a_domain() {
        let dir = tempdir().unwrap();
        small_collection(dir.path());

        let dataset = TrajectoryDataset::new(config(dir.path())).unwrap();
        let a = dataset.get(0).unwrap();
        let b = dataset.get(4).unwrap();
        assert!(Arc::ptr_eq(&a.atomic_numbers, &b.atomic_numbers));
    }

    #[test]
    fn independent_constructions_yield_identical_samples() {
        let dir = tempdir().unwrap();
        small_collection(dir.path());

        let first = TrajectoryDataset::new(config(dir.path())).unwrap();
        let second = TrajectoryDataset::new(config(dir.path())).unwrap();
        assert_eq!(first.len(), second.len());
        for index in 0..first.len() {
            assert_eq!(first.get(index).unwrap(), second.get(index).unwrap());
        }
    }

    #[test]
    fn transform_rewrites_returned_samples() {
        let dir = tempdir().unwrap();
        small_collection(dir.path());

        let dataset = TrajectoryDataset::new(config(dir.path()))
            .unwrap()
            .with_transform(|mut sample| {
                sample.provenance = Some("tagged".to_string());
                sample
            });
        assert_eq!(dataset.get(0).unwrap().provenance.as_deref(), Some("tagged"));
    }

    #[test]
    fn manifest_and_data_frame_disagreement_is_an_index_count_mismatch() {
        let dir = tempdir().unwrap();
        small_collection(dir.path());
        // Manifest promises 3 frames for replica 1; overwrite with 2.
        testing::write_replica_arrays(
            dir.path(),
            "dom1",
            "348",
            "1",
            &testing::frame_fill(2, 2, 0.0),
            &testing::frame_fill(2, 2, 0.0),
        );

        let dataset = TrajectoryDataset::new(config(dir.path())).unwrap();
        assert_eq!(dataset.len(), 5);
        assert!(matches!(
            dataset.get(0),
            Err(DatasetError::IndexCountMismatch {
                expected: 5,
                actual: 4,
            })
        ));
    }

    #[test]
    fn wrong_declared_units_are_fatal() {
        let dir = tempdir().unwrap();
        small_collection(dir.path());
        testing::write_replica_arrays_with_units(
            dir.path(),
            "dom1",
            "348",
            "0",
            &testing::frame_fill(2, 2, 0.0),
            &testing::frame_fill(2, 2, 0.0),
            "nm",
            "kcal/mol/Angstrom",
        );

        let dataset = TrajectoryDataset::new(config(dir.path())).unwrap();
        assert!(matches!(
            dataset.get(0),
            Err(DatasetError::UnitOrShapeMismatch { .. })
        ));
    }

    #[test]
    fn atom_count_disagreement_with_z_is_fatal() {
        let dir = tempdir().unwrap();
        small_collection(dir.path());
        testing::write_domain_z(dir.path(), "dom1", &[1, 8, 6]);

        let dataset = TrajectoryDataset::new(config(dir.path())).unwrap();
        assert!(matches!(
            dataset.get(0),
            Err(DatasetError::UnitOrShapeMismatch { .. })
        ));
    }

    #[test]
    fn missing_domain_archive_is_fatal_on_first_get() {
        let dir = tempdir().unwrap();
        two_replica_manifest(dir.path());

        let dataset = TrajectoryDataset::new(config(dir.path())).unwrap();
        assert!(matches!(
            dataset.get(0),
            Err(DatasetError::MissingArchive { .. })
        ));
    }

    #[test]
    fn scan_reports_progress_per_domain() {
        let dir = tempdir().unwrap();
        two_replica_manifest(dir.path());
        testing::write_manifest_domain(dir.path(), "huge", 9999, 10, 40);
        testing::write_manifest_replica(
            dir.path(),
            "huge",
            "348",
            "0",
            &testing::ReplicaMeta::with_frames(4),
        );

        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));
        let dataset = TrajectoryDataset::scan(config(dir.path()), &reporter).unwrap();
        assert_eq!(dataset.len(), 15);

        drop(reporter);
        let events = events.into_inner().unwrap();
        assert!(matches!(events[0], Progress::ScanStart { domains: 2 }));
        let scanned = events
            .iter()
            .filter(|e| matches!(e, Progress::DomainScanned))
            .count();
        assert_eq!(scanned, 2);
        assert!(matches!(
            events.last(),
            Some(Progress::ScanFinish {
                selected: 1,
                conformations: 15,
            })
        ));
    }
}
