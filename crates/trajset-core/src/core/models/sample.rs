use ndarray::Array2;
use std::sync::Arc;

/// One conformation as handed to a training loop.
///
/// A sample is derived on demand from an archive read and is immutable once
/// produced. The atomic-number list is shared (one allocation per molecule
/// or domain) across every frame emitted for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Atomic numbers, one per atom.
    pub atomic_numbers: Arc<[i64]>,
    /// Cartesian positions for this frame, atoms x 3, in Angstrom.
    pub positions: Array2<f32>,
    /// Negated energy gradient for this frame, atoms x 3, when the source
    /// provides forces.
    pub forces: Option<Array2<f32>>,
    /// Potential energy of this frame in eV, reduced by the molecule's total
    /// reference energy, when the source provides energies.
    pub energy: Option<f64>,
    /// Source tag ("<archive>_<molecule>") when provenance tagging is on.
    pub provenance: Option<String>,
}

impl Sample {
    /// Number of atoms in this conformation.
    pub fn num_atoms(&self) -> usize {
        self.atomic_numbers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn num_atoms_follows_atomic_number_list() {
        let sample = Sample {
            atomic_numbers: vec![1, 1, 8].into(),
            positions: Array2::zeros((3, 3)),
            forces: None,
            energy: None,
            provenance: None,
        };
        assert_eq!(sample.num_atoms(), 3);
    }
}
