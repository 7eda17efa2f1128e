//! Composition of independently-built flat datasets into one index space.

use super::error::DatasetError;
use super::flatten::OffsetTable;
use super::Dataset;
use crate::core::models::sample::Sample;

/// A suite of sub-datasets exposed as a single flat dataset.
///
/// The offset table is built once at construction; `get` resolves the
/// owning sub-dataset and delegates, with no re-filtering or re-validation
/// of sub-dataset contents.
pub struct SuiteDataset {
    subsets: Vec<Box<dyn Dataset>>,
    offsets: OffsetTable,
}

impl SuiteDataset {
    pub fn new(subsets: Vec<Box<dyn Dataset>>) -> Self {
        let offsets = OffsetTable::from_lens(subsets.iter().map(|s| s.len()));
        Self { subsets, offsets }
    }

    pub fn num_subsets(&self) -> usize {
        self.subsets.len()
    }
}

impl Dataset for SuiteDataset {
    fn len(&self) -> usize {
        self.offsets.total()
    }

    fn get(&self, index: usize) -> Result<Sample, DatasetError> {
        let (subset, local) = self
            .offsets
            .locate(index)
            .ok_or(DatasetError::IndexOutOfRange {
                index,
                len: self.len(),
            })?;
        self.subsets[subset].get(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use std::sync::Arc;

    /// Stand-in sub-dataset whose samples are identifiable by (tag, local).
    struct Tagged {
        tag: i64,
        len: usize,
    }

    impl Dataset for Tagged {
        fn len(&self) -> usize {
            self.len
        }

        fn get(&self, index: usize) -> Result<Sample, DatasetError> {
            if index >= self.len {
                return Err(DatasetError::IndexOutOfRange {
                    index,
                    len: self.len,
                });
            }
            Ok(Sample {
                atomic_numbers: Arc::from(vec![self.tag, index as i64]),
                positions: Array2::zeros((2, 3)),
                forces: None,
                energy: None,
                provenance: None,
            })
        }
    }

    fn suite() -> SuiteDataset {
        SuiteDataset::new(vec![
            Box::new(Tagged { tag: 0, len: 3 }),
            Box::new(Tagged { tag: 1, len: 4 }),
        ])
    }

    #[test]
    fn length_is_the_sum_of_subset_lengths() {
        assert_eq!(suite().len(), 7);
        assert_eq!(suite().num_subsets(), 2);
    }

    #[test]
    fn get_routes_to_the_owning_subset_with_local_index() {
        let suite = suite();
        for (global, expected) in [(0, [0, 0]), (2, [0, 2]), (3, [1, 0]), (6, [1, 3])] {
            let sample = suite.get(global).unwrap();
            assert_eq!(&*sample.atomic_numbers, &expected.map(i64::from));
        }
    }

    #[test]
    fn get_past_the_end_is_out_of_range() {
        assert!(matches!(
            suite().get(7),
            Err(DatasetError::IndexOutOfRange { index: 7, len: 7 })
        ));
    }

    #[test]
    fn suite_composes_materialized_molecule_datasets() {
        use crate::data::molecules::{MoleculeArchives, MoleculeDataset};
        use crate::testing;
        use tempfile::tempdir;

        let dir_a = tempdir().unwrap();
        let dir_b = tempdir().unwrap();
        let coords = testing::frame_fill(2, 1, 0.0);
        let forces = testing::frame_fill(2, 1, 0.0);
        testing::write_molecule_group(
            dir_a.path(),
            "molecules",
            "m0",
            &["H"],
            &coords,
            &[-1.0, -1.1],
            &forces,
        );
        testing::write_molecule_group(
            dir_b.path(),
            "molecules",
            "m1",
            &["O"],
            &coords,
            &[-2.0, -2.1],
            &forces,
        );

        let suite = SuiteDataset::new(vec![
            Box::new(MoleculeDataset::load(&MoleculeArchives::new([dir_a.path()])).unwrap()),
            Box::new(MoleculeDataset::load(&MoleculeArchives::new([dir_b.path()])).unwrap()),
        ]);

        assert_eq!(suite.len(), 4);
        assert_eq!(&*suite.get(1).unwrap().atomic_numbers, &[1]);
        assert_eq!(&*suite.get(2).unwrap().atomic_numbers, &[8]);
    }

    #[test]
    fn empty_suite_is_empty() {
        let suite = SuiteDataset::new(Vec::new());
        assert!(suite.is_empty());
        assert!(matches!(
            suite.get(0),
            Err(DatasetError::IndexOutOfRange { .. })
        ));
    }
}
