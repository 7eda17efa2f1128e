use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
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
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Target secondary-structure composition of a replica, as fractions of
/// residues in alpha-helix, beta-sheet, and coil states.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructureFractions {
    pub alpha: f64,
    pub beta: f64,
    pub coil: f64,
}

/// Construction-time configuration of the selective trajectory indexer.
///
/// All filters are optional except the structural maxima, which default to
/// values large enough to accept typical single-domain proteins. A filter
/// left unset never reads the attribute it would test.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrajectoryConfig {
    /// Root directory holding the `manifest` archive and the `domains/`
    /// data archives.
    pub root: PathBuf,
    /// Maximum number of protein atoms in a qualifying domain.
    #[serde(default = "default_max_atoms")]
    pub max_atoms: u64,
    /// Maximum number of residues in a qualifying domain.
    #[serde(default = "default_max_residues")]
    pub max_residues: u64,
    /// Maximum number of non-hydrogen atoms, when set.
    #[serde(default)]
    pub max_no_h_atoms: Option<u64>,
    /// Temperature labels to index, in evaluation order.
    #[serde(default = "default_temperatures")]
    pub temperatures: Vec<String>,
    /// Keep every Nth frame of each trajectory, starting at frame 0.
    #[serde(default = "default_stride")]
    pub stride: usize,
    /// Explicit domain-id allowlist; all manifest domains when unset.
    #[serde(default)]
    pub domains: Option<Vec<String>>,
    /// Floor on a replica's minimum gyration radius, when set.
    #[serde(default)]
    pub min_gyration_radius: Option<f64>,
    /// Ceiling on a replica's maximum gyration radius, when set.
    #[serde(default)]
    pub max_gyration_radius: Option<f64>,
    /// Required secondary-structure composition, when set.
    #[serde(default)]
    pub secondary_structure: Option<StructureFractions>,
    /// Minimum trajectory length for a replica to qualify, when set.
    #[serde(default)]
    pub min_frames: Option<u64>,
}

fn default_max_atoms() -> u64 {
    5000
}
fn default_max_residues() -> u64 {
    1000
}
fn default_temperatures() -> Vec<String> {
    vec!["348".to_string()]
}
fn default_stride() -> usize {
    1
}

impl TrajectoryConfig {
    pub fn builder() -> TrajectoryConfigBuilder {
        TrajectoryConfigBuilder::new()
    }

    /// Loads a configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let config: TrajectoryConfig =
            toml::from_str(&content).map_err(|e| ConfigLoadError::Toml {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
        if config.stride == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "stride",
                reason: "must be at least 1",
            }
            .into());
        }
        Ok(config)
    }

    pub(crate) fn manifest_path(&self) -> PathBuf {
        self.root.join("manifest")
    }

    pub(crate) fn domain_archive_path(&self, domain_id: &str) -> PathBuf {
        self.root.join("domains").join(domain_id)
    }
}

#[derive(Debug, Default)]
pub struct TrajectoryConfigBuilder {
    root: Option<PathBuf>,
    max_atoms: Option<u64>,
    max_residues: Option<u64>,
    max_no_h_atoms: Option<u64>,
    temperatures: Option<Vec<String>>,
    stride: Option<usize>,
    domains: Option<Vec<String>>,
    min_gyration_radius: Option<f64>,
    max_gyration_radius: Option<f64>,
    secondary_structure: Option<StructureFractions>,
    min_frames: Option<u64>,
}

impl TrajectoryConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }
    pub fn max_atoms(mut self, max: u64) -> Self {
        self.max_atoms = Some(max);
        self
    }
    pub fn max_residues(mut self, max: u64) -> Self {
        self.max_residues = Some(max);
        self
    }
    pub fn max_no_h_atoms(mut self, max: u64) -> Self {
        self.max_no_h_atoms = Some(max);
        self
    }
    pub fn temperatures(mut self, labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.temperatures = Some(labels.into_iter().map(Into::into).collect());
        self
    }
    pub fn stride(mut self, stride: usize) -> Self {
        self.stride = Some(stride);
        self
    }
    pub fn domains(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.domains = Some(ids.into_iter().map(Into::into).collect());
        self
    }
    pub fn min_gyration_radius(mut self, radius: f64) -> Self {
        self.min_gyration_radius = Some(radius);
        self
    }
    pub fn max_gyration_radius(mut self, radius: f64) -> Self {
        self.max_gyration_radius = Some(radius);
        self
    }
    pub fn secondary_structure(mut self, fractions: StructureFractions) -> Self {
        self.secondary_structure = Some(fractions);
        self
    }
    pub fn min_frames(mut self, min: u64) -> Self {
        self.min_frames = Some(min);
        self
    }

    pub fn build(self) -> Result<TrajectoryConfig, ConfigError> {
        let stride = self.stride.unwrap_or_else(default_stride);
        if stride == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "stride",
                reason: "must be at least 1",
            });
        }
        Ok(TrajectoryConfig {
            root: self.root.ok_or(ConfigError::MissingParameter("root"))?,
            max_atoms: self.max_atoms.unwrap_or_else(default_max_atoms),
            max_residues: self.max_residues.unwrap_or_else(default_max_residues),
            max_no_h_atoms: self.max_no_h_atoms,
            temperatures: self.temperatures.unwrap_or_else(default_temperatures),
            stride,
            domains: self.domains,
            min_gyration_radius: self.min_gyration_radius,
            max_gyration_radius: self.max_gyration_radius,
            secondary_structure: self.secondary_structure,
            min_frames: self.min_frames,
        })
    }
}
