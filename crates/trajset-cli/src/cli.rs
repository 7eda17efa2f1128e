use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "trajset CLI - Index trajectory archive collections and fetch archive bundles.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the metadata qualification scan over a trajectory collection and
    /// report qualifying domains and the total conformation count.
    Scan(ScanArgs),
    /// Download and unpack a trajectory archive bundle.
    Fetch(FetchArgs),
}

/// Arguments for the `scan` subcommand.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Root directory holding the manifest archive and the domain archives.
    #[arg(
        short,
        long,
        value_name = "PATH",
        required_unless_present = "config",
        conflicts_with = "config"
    )]
    pub root: Option<PathBuf>,

    /// Read the full scan configuration from a TOML file instead of flags.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Temperature label to index; repeat for several labels.
    #[arg(short, long = "temperature", value_name = "LABEL")]
    pub temperatures: Vec<String>,

    /// Maximum number of protein atoms in a qualifying domain.
    #[arg(long, value_name = "INT")]
    pub max_atoms: Option<u64>,

    /// Maximum number of residues in a qualifying domain.
    #[arg(long, value_name = "INT")]
    pub max_residues: Option<u64>,

    /// Maximum number of non-hydrogen atoms in a qualifying domain.
    #[arg(long, value_name = "INT")]
    pub max_no_h_atoms: Option<u64>,

    /// Keep every Nth frame of each trajectory.
    #[arg(long, value_name = "INT")]
    pub stride: Option<usize>,

    /// Restrict the scan to this domain id; repeat for several domains.
    #[arg(long = "domain", value_name = "ID")]
    pub domains: Vec<String>,

    /// Floor on a replica's minimum gyration radius.
    #[arg(long, value_name = "FLOAT")]
    pub min_gyration: Option<f64>,

    /// Ceiling on a replica's maximum gyration radius.
    #[arg(long, value_name = "FLOAT")]
    pub max_gyration: Option<f64>,

    /// Required alpha,beta,coil secondary-structure fractions, e.g. '0.3,0.2,0.5'.
    #[arg(long, value_name = "A,B,C")]
    pub ss_fractions: Option<String>,

    /// Minimum trajectory length for a replica to qualify.
    #[arg(long, value_name = "INT")]
    pub min_frames: Option<u64>,
}

/// Arguments for the `fetch` subcommand.
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// URL of the .tar.zst archive bundle to download.
    #[arg(short, long, required = true, value_name = "URL")]
    pub url: String,

    /// Destination directory for the unpacked archives.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub dest: PathBuf,

    /// Overwrite an existing destination directory.
    #[arg(long)]
    pub force: bool,
}
