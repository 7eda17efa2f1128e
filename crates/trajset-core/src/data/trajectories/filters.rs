//! Metadata predicates for the qualification scan.
//!
//! Each filter is one function over (config, attribute table); a record
//! qualifies when every filter in the list passes. An unconfigured filter
//! passes without reading the attribute it would test.

use super::super::config::TrajectoryConfig;
use crate::core::store::{Attributes, StoreError};

/// Floating-point closeness with the conventional isclose tolerances
/// (rtol 1e-5, atol 1e-8, relative to the target).
pub(crate) fn is_close(actual: f64, target: f64) -> bool {
    (actual - target).abs() <= 1e-8 + 1e-5 * target.abs()
}

type MetadataPredicate = fn(&TrajectoryConfig, &Attributes) -> Result<bool, StoreError>;

pub(crate) const DOMAIN_FILTERS: &[MetadataPredicate] =
    &[atom_count, residue_count, heavy_atom_count];

pub(crate) const REPLICA_FILTERS: &[MetadataPredicate] = &[
    frame_count,
    gyration_floor,
    gyration_ceiling,
    structure_fractions,
];

pub(crate) fn passes_all(
    filters: &[MetadataPredicate],
    config: &TrajectoryConfig,
    attrs: &Attributes,
) -> Result<bool, StoreError> {
    for filter in filters {
        if !filter(config, attrs)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn atom_count(config: &TrajectoryConfig, attrs: &Attributes) -> Result<bool, StoreError> {
    Ok(attrs.require_u64("num_protein_atoms")? <= config.max_atoms)
}

fn residue_count(config: &TrajectoryConfig, attrs: &Attributes) -> Result<bool, StoreError> {
    Ok(attrs.require_u64("num_residues")? <= config.max_residues)
}

fn heavy_atom_count(config: &TrajectoryConfig, attrs: &Attributes) -> Result<bool, StoreError> {
    match config.max_no_h_atoms {
        Some(max) => Ok(attrs.require_u64("num_no_h_atoms")? <= max),
        None => Ok(true),
    }
}

fn frame_count(config: &TrajectoryConfig, attrs: &Attributes) -> Result<bool, StoreError> {
    match config.min_frames {
        Some(min) => Ok(attrs.require_u64("num_frames")? >= min),
        None => Ok(true),
    }
}

fn gyration_floor(config: &TrajectoryConfig, attrs: &Attributes) -> Result<bool, StoreError> {
    match config.min_gyration_radius {
        Some(floor) => Ok(attrs.require_f64("min_gyration_radius")? >= floor),
        None => Ok(true),
    }
}

fn gyration_ceiling(config: &TrajectoryConfig, attrs: &Attributes) -> Result<bool, StoreError> {
    match config.max_gyration_radius {
        Some(ceiling) => Ok(attrs.require_f64("max_gyration_radius")? <= ceiling),
        None => Ok(true),
    }
}

fn structure_fractions(config: &TrajectoryConfig, attrs: &Attributes) -> Result<bool, StoreError> {
    let Some(target) = &config.secondary_structure else {
        return Ok(true);
    };
    Ok(is_close(attrs.require_f64("alpha")?, target.alpha)
        && is_close(attrs.require_f64("beta")?, target.beta)
        && is_close(attrs.require_f64("coil")?, target.coil))
}
