//! Per-archive sample enumeration: every frame of every molecule in a set
//! of archives, with unit conversion and reference-energy correction.

use super::error::DatasetError;
use super::{Dataset, SampleFilter, SampleTransform, open_archive};
use crate::core::elements;
use crate::core::models::sample::Sample;
use crate::core::store::Group;
use ndarray::Axis;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// An ordered set of molecule archives to enumerate.
///
/// Each archive holds a single top-level group whose children are molecules;
/// every molecule contributes one sample per stored frame. The enumeration
/// is restartable: [`MoleculeArchives::samples`] always produces the
/// identical sequence over the same (read-only) archives.
pub struct MoleculeArchives {
    paths: Vec<PathBuf>,
    filter: Option<SampleFilter>,
    transform: Option<SampleTransform>,
    tag_provenance: bool,
}

impl MoleculeArchives {
    pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            filter: None,
            transform: None,
            tag_provenance: false,
        }
    }

    /// Inclusion predicate applied to each fully-built sample, before any
    /// transform.
    pub fn with_filter(mut self, filter: impl Fn(&Sample) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Rewrites each accepted sample before it is yielded.
    pub fn with_transform(
        mut self,
        transform: impl Fn(Sample) -> Sample + Send + Sync + 'static,
    ) -> Self {
        self.transform = Some(Box::new(transform));
        self
    }

    /// Tag each sample with "<archive name>_<molecule id>".
    pub fn with_provenance_tags(mut self) -> Self {
        self.tag_provenance = true;
        self
    }

    /// A lazy iterator over every sample. Molecules are read one at a time;
    /// archives are visited in input order, molecules in sorted group order,
    /// frames in storage order.
    pub fn samples(&self) -> Result<SampleStream<'_>, DatasetError> {
        let mut molecules = Vec::new();
        for path in &self.paths {
            let archive = open_archive(path)?;
            let root = archive.root();
            let tag = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.to_string_lossy().to_string());
            // One top-level group per archive; its children are molecules.
            let Some(top) = root.child_names()?.into_iter().next() else {
                continue;
            };
            let top_group = root.child(&top);
            for id in top_group.child_names()? {
                molecules.push(MoleculeRef {
                    group: top_group.child(&id),
                    archive_tag: tag.clone(),
                    id,
                });
            }
        }
        Ok(SampleStream {
            source: self,
            molecules: molecules.into_iter(),
            pending: VecDeque::new(),
            failed: false,
        })
    }
}

struct MoleculeRef {
    group: Group,
    archive_tag: String,
    id: String,
}

/// Iterator over the samples of a [`MoleculeArchives`] set. Fused after the
/// first error: a malformed molecule aborts the whole pass.
pub struct SampleStream<'a> {
    source: &'a MoleculeArchives,
    molecules: std::vec::IntoIter<MoleculeRef>,
    pending: VecDeque<Sample>,
    failed: bool,
}

impl Iterator for SampleStream<'_> {
    type Item = Result<Sample, DatasetError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.failed {
                return None;
            }
            if let Some(sample) = self.pending.pop_front() {
                return Some(Ok(sample));
            }
            let molecule = self.molecules.next()?;
            match self.load_molecule(&molecule) {
                Ok(samples) => self.pending = samples,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl SampleStream<'_> {
    fn load_molecule(&self, molecule: &MoleculeRef) -> Result<VecDeque<Sample>, DatasetError> {
        let attrs = molecule.group.attrs()?;
        let species = attrs.require_str_list("species")?;

        let mut numbers = Vec::with_capacity(species.len());
        let mut reference = 0.0;
        for symbol in &species {
            let z = elements::atomic_number(symbol).ok_or_else(|| {
                DatasetError::UnknownElement {
                    molecule: molecule.id.clone(),
                    symbol: symbol.clone(),
                }
            })?;
            reference += elements::baseline_energy(z).ok_or_else(|| {
                DatasetError::UnknownElement {
                    molecule: molecule.id.clone(),
                    symbol: symbol.clone(),
                }
            })?;
            numbers.push(z);
        }
        let reference_ev = reference * elements::HARTREE_TO_EV;

        let coordinates = molecule.group.read_f32_3d("coordinates")?;
        let energies = molecule.group.read_f64_1d("energies")?;
        let forces = molecule.group.read_f32_3d("forces")?;

        let frames = coordinates.len_of(Axis(0));
        let mismatch = |detail: String| DatasetError::ShapeMismatch {
            molecule: molecule.id.clone(),
            detail,
        };
        if energies.len() != frames {
            return Err(mismatch(format!(
                "coordinates hold {frames} frames but energies hold {}",
                energies.len()
            )));
        }
        if forces.len_of(Axis(0)) != frames {
            return Err(mismatch(format!(
                "coordinates hold {frames} frames but forces hold {}",
                forces.len_of(Axis(0))
            )));
        }
        if coordinates.len_of(Axis(1)) != numbers.len() {
            return Err(mismatch(format!(
                "coordinates hold {} atoms but the species list has {}",
                coordinates.len_of(Axis(1)),
                numbers.len()
            )));
        }
        if forces.len_of(Axis(1)) != numbers.len() {
            return Err(mismatch(format!(
                "forces hold {} atoms but the species list has {}",
                forces.len_of(Axis(1)),
                numbers.len()
            )));
        }

        let numbers: Arc<[i64]> = numbers.into();
        let tag = self
            .source
            .tag_provenance
            .then(|| format!("{}_{}", molecule.archive_tag, molecule.id));

        let mut out = VecDeque::with_capacity(frames);
        for frame in 0..frames {
            let sample = Sample {
                atomic_numbers: numbers.clone(),
                positions: coordinates.index_axis(Axis(0), frame).to_owned(),
                forces: Some(
                    forces
                        .index_axis(Axis(0), frame)
                        .mapv(|v| v * elements::HARTREE_TO_EV as f32),
                ),
                energy: Some(energies[frame] * elements::HARTREE_TO_EV - reference_ev),
                provenance: tag.clone(),
            };
            if let Some(filter) = &self.source.filter {
                if !filter(&sample) {
                    continue;
                }
            }
            let sample = match &self.source.transform {
                Some(transform) => transform(sample),
                None => sample,
            };
            out.push_back(sample);
        }
        Ok(out)
    }
}

/// A molecule-archive enumeration materialized into a flat in-memory
/// sequence, usable as a building block of a [`super::SuiteDataset`].
pub struct MoleculeDataset {
    samples: Vec<Sample>,
}

impl MoleculeDataset {
    pub fn load(archives: &MoleculeArchives) -> Result<Self, DatasetError> {
        let samples = archives.samples()?.collect::<Result<Vec<_>, _>>()?;
        info!(samples = samples.len(), "molecule archives materialized");
        Ok(Self { samples })
    }
}

impl Dataset for MoleculeDataset {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn get(&self, index: usize) -> Result<Sample, DatasetError> {
        self.samples
            .get(index)
            .cloned()
            .ok_or(DatasetError::IndexOutOfRange {
                index,
                len: self.samples.len(),
            })
    }
}
