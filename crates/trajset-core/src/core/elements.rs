use phf::{Map, phf_map};

/// Conversion factor from Hartree (archive-native energy unit) to eV.
pub const HARTREE_TO_EV: f64 = 27.211386246;

static ATOMIC_NUMBERS: Map<&'static str, i64> = phf_map! {
    "H" => 1,
    "C" => 6,
    "N" => 7,
    "O" => 8,
};

// Per-element baseline energies in Hartree (ANI-1x single-atom values).
static BASELINE_ENERGIES: Map<i64, f64> = phf_map! {
    1i64 => -0.500607632585,
    6i64 => -37.8302333826,
    7i64 => -54.5680045287,
    8i64 => -75.0362229210,
};

/// Maps an element symbol to its atomic number, or `None` for symbols
/// outside the fixed H/C/N/O table.
pub fn atomic_number(symbol: &str) -> Option<i64> {
    ATOMIC_NUMBERS.get(symbol.trim()).copied()
}

/// Per-atom baseline energy in Hartree for one atomic number.
pub fn baseline_energy(atomic_number: i64) -> Option<f64> {
    BASELINE_ENERGIES.get(&atomic_number).copied()
}

/// Total reference energy of a molecule in eV: the sum of per-atom baseline
/// energies at the given atomic numbers, converted from Hartree. `None` if
/// any atomic number is outside the table.
pub fn total_reference_energy(atomic_numbers: &[i64]) -> Option<f64> {
    let mut total = 0.0;
    for z in atomic_numbers {
        total += BASELINE_ENERGIES.get(z)?;
    }
    Some(total * HARTREE_TO_EV)
}
