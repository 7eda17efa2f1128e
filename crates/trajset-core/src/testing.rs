//! Fixture writers shared by the dataset tests: build archive directory
//! trees with `.npy` datasets and TOML attribute tables under a tempdir.

use ndarray::{Array1, Array3};
use ndarray_npy::WriteNpyExt;
use std::fs::{self, File};
use std::path::Path;

pub(crate) fn write_npy_i64(path: &Path, values: &[i64]) {
    let array = Array1::<i64>::from(values.to_vec());
    array.write_npy(File::create(path).unwrap()).unwrap();
}

pub(crate) fn write_npy_f64(path: &Path, values: &[f64]) {
    let array = Array1::<f64>::from(values.to_vec());
    array.write_npy(File::create(path).unwrap()).unwrap();
}

pub(crate) fn write_npy_f32_3d(path: &Path, array: &Array3<f32>) {
    array.write_npy(File::create(path).unwrap()).unwrap();
}

/// Deterministic frames x atoms x 3 array; distinct per (seed, frame, atom,
/// axis) so tests can assert exact routing of flat indices.
pub(crate) fn frame_fill(frames: usize, atoms: usize, seed: f32) -> Array3<f32> {
    Array3::from_shape_fn((frames, atoms, 3), |(f, a, d)| {
        seed + (f * 1000 + a * 10 + d) as f32
    })
}

pub(crate) fn write_molecule_group(
    archive: &Path,
    top: &str,
    id: &str,
    species: &[&str],
    coords: &Array3<f32>,
    energies: &[f64],
    forces: &Array3<f32>,
) {
    let dir = archive.join(top).join(id);
    fs::create_dir_all(&dir).unwrap();
    let list = species
        .iter()
        .map(|s| format!("\"{s}\""))
        .collect::<Vec<_>>()
        .join(", ");
    fs::write(dir.join("attrs.toml"), format!("species = [{list}]\n")).unwrap();
    write_npy_f32_3d(&dir.join("coordinates.npy"), coords);
    write_npy_f64(&dir.join("energies.npy"), energies);
    write_npy_f32_3d(&dir.join("forces.npy"), forces);
}

pub(crate) struct ReplicaMeta {
    pub num_frames: u64,
    pub min_gyration_radius: f64,
    pub max_gyration_radius: f64,
    pub alpha: f64,
    pub beta: f64,
    pub coil: f64,
}

impl ReplicaMeta {
    pub fn with_frames(num_frames: u64) -> Self {
        Self {
            num_frames,
            min_gyration_radius: 1.0,
            max_gyration_radius: 2.0,
            alpha: 0.3,
            beta: 0.2,
            coil: 0.5,
        }
    }
}

pub(crate) fn write_manifest_domain(
    root: &Path,
    id: &str,
    num_protein_atoms: u64,
    num_residues: u64,
    num_no_h_atoms: u64,
) {
    let dir = root.join("manifest").join(id);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("attrs.toml"),
        format!(
            "num_protein_atoms = {num_protein_atoms}\n\
             num_residues = {num_residues}\n\
             num_no_h_atoms = {num_no_h_atoms}\n"
        ),
    )
    .unwrap();
}

pub(crate) fn write_manifest_replica(
    root: &Path,
    id: &str,
    temperature: &str,
    replica: &str,
    meta: &ReplicaMeta,
) {
    let dir = root.join("manifest").join(id).join(temperature).join(replica);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("attrs.toml"),
        format!(
            "num_frames = {}\n\
             min_gyration_radius = {}\n\
             max_gyration_radius = {}\n\
             alpha = {}\n\
             beta = {}\n\
             coil = {}\n",
            meta.num_frames,
            meta.min_gyration_radius,
            meta.max_gyration_radius,
            meta.alpha,
            meta.beta,
            meta.coil
        ),
    )
    .unwrap();
}

pub(crate) fn write_domain_z(root: &Path, id: &str, atomic_numbers: &[i64]) {
    let dir = root.join("domains").join(id);
    fs::create_dir_all(&dir).unwrap();
    write_npy_i64(&dir.join("z.npy"), atomic_numbers);
}

pub(crate) fn write_replica_arrays_with_units(
    root: &Path,
    id: &str,
    temperature: &str,
    replica: &str,
    coords: &Array3<f32>,
    forces: &Array3<f32>,
    coords_unit: &str,
    forces_unit: &str,
) {
    let dir = root
        .join("domains")
        .join(id)
        .join(format!("sims{temperature}K"))
        .join(replica);
    fs::create_dir_all(&dir).unwrap();
    write_npy_f32_3d(&dir.join("coords.npy"), coords);
    write_npy_f32_3d(&dir.join("forces.npy"), forces);
    fs::write(
        dir.join("coords.attrs.toml"),
        format!("unit = \"{coords_unit}\"\n"),
    )
    .unwrap();
    fs::write(
        dir.join("forces.attrs.toml"),
        format!("unit = \"{forces_unit}\"\n"),
    )
    .unwrap();
}

pub(crate) fn write_replica_arrays(
    root: &Path,
    id: &str,
    temperature: &str,
    replica: &str,
    coords: &Array3<f32>,
    forces: &Array3<f32>,
) {
    write_replica_arrays_with_units(
        root,
        id,
        temperature,
        replica,
        coords,
        forces,
        "Angstrom",
        "kcal/mol/Angstrom",
    );
}
