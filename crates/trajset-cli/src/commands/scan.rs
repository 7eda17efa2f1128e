use crate::cli::ScanArgs;
use crate::error::{CliError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use trajset::data::{
    Dataset, Progress, ProgressReporter, StructureFractions, TrajectoryConfig, TrajectoryDataset,
};

pub fn run(args: ScanArgs) -> Result<()> {
    let config = build_config(&args)?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} domains scanned",
        )
        .unwrap()
        .progress_chars("#>-"),
    );
    pb.set_draw_target(indicatif::ProgressDrawTarget::stderr_with_hz(4));

    let reporter = ProgressReporter::with_callback(Box::new(|event| match event {
        Progress::ScanStart { domains } => pb.set_length(domains),
        Progress::DomainScanned => pb.inc(1),
        Progress::ScanFinish { .. } => {}
    }));
    let dataset = TrajectoryDataset::scan(config, &reporter)?;
    pb.finish_and_clear();

    println!("Qualifying domains: {}", dataset.selected_domains().len());
    for domain in dataset.selected_domains() {
        println!("  {:<12} {:>3} unit(s)", domain.id, domain.units.len());
    }
    println!("Total conformations: {}", dataset.len());
    Ok(())
}

fn build_config(args: &ScanArgs) -> Result<TrajectoryConfig> {
    if let Some(path) = &args.config {
        return Ok(TrajectoryConfig::load(path)?);
    }
    let root = args
        .root
        .as_ref()
        .ok_or_else(|| CliError::Argument("either --root or --config is required".to_string()))?;
    let mut builder = TrajectoryConfig::builder().root(root);
    if !args.temperatures.is_empty() {
        builder = builder.temperatures(args.temperatures.iter().cloned());
    }
    if let Some(max) = args.max_atoms {
        builder = builder.max_atoms(max);
    }
    if let Some(max) = args.max_residues {
        builder = builder.max_residues(max);
    }
    if let Some(max) = args.max_no_h_atoms {
        builder = builder.max_no_h_atoms(max);
    }
    if let Some(stride) = args.stride {
        builder = builder.stride(stride);
    }
    if !args.domains.is_empty() {
        builder = builder.domains(args.domains.iter().cloned());
    }
    if let Some(radius) = args.min_gyration {
        builder = builder.min_gyration_radius(radius);
    }
    if let Some(radius) = args.max_gyration {
        builder = builder.max_gyration_radius(radius);
    }
    if let Some(raw) = &args.ss_fractions {
        builder = builder.secondary_structure(parse_fractions(raw)?);
    }
    if let Some(min) = args.min_frames {
        builder = builder.min_frames(min);
    }
    Ok(builder.build()?)
}

fn parse_fractions(raw: &str) -> Result<StructureFractions> {
    let parts: Vec<_> = raw.split(',').map(str::trim).collect();
    let [alpha, beta, coil] = parts[..] else {
        return Err(CliError::Argument(format!(
            "expected three comma-separated fractions, got '{raw}'"
        )));
    };
    let parse = |field: &str| {
        field
            .parse::<f64>()
            .map_err(|_| CliError::Argument(format!("invalid fraction '{field}'")))
    };
    Ok(StructureFractions {
        alpha: parse(alpha)?,
        beta: parse(beta)?,
        coil: parse(coil)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn args(root: &std::path::Path) -> ScanArgs {
        ScanArgs {
            root: Some(root.to_path_buf()),
            config: None,
            temperatures: Vec::new(),
            max_atoms: None,
            max_residues: None,
            max_no_h_atoms: None,
            stride: None,
            domains: Vec::new(),
            min_gyration: None,
            max_gyration: None,
            ss_fractions: None,
            min_frames: None,
        }
    }

    #[test]
    fn parse_fractions_accepts_three_floats() {
        let fractions = parse_fractions("0.3, 0.2, 0.5").unwrap();
        assert_eq!(fractions.alpha, 0.3);
        assert_eq!(fractions.beta, 0.2);
        assert_eq!(fractions.coil, 0.5);
    }

    #[test]
    fn parse_fractions_rejects_wrong_arity_and_bad_numbers() {
        assert!(matches!(
            parse_fractions("0.3,0.2"),
            Err(CliError::Argument(_))
        ));
        assert!(matches!(
            parse_fractions("0.3,x,0.5"),
            Err(CliError::Argument(_))
        ));
    }

    #[test]
    fn build_config_maps_arguments_onto_the_builder() {
        let mut args = args(std::path::Path::new("/data"));
        args.temperatures = vec!["320".to_string()];
        args.max_atoms = Some(100);
        args.stride = Some(4);
        args.ss_fractions = Some("0.3,0.2,0.5".to_string());

        let config = build_config(&args).unwrap();
        assert_eq!(config.temperatures, vec!["320"]);
        assert_eq!(config.max_atoms, 100);
        assert_eq!(config.stride, 4);
        assert!(config.secondary_structure.is_some());
    }

    #[test]
    fn build_config_prefers_a_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scan.toml");
        fs::write(&path, "root = \"/data\"\nstride = 3\n").unwrap();

        let mut args = args(std::path::Path::new("/ignored"));
        args.root = None;
        args.config = Some(path);

        let config = build_config(&args).unwrap();
        assert_eq!(config.root, std::path::PathBuf::from("/data"));
        assert_eq!(config.stride, 3);
    }

    #[test]
    fn scan_runs_over_a_minimal_collection() {
        let dir = tempdir().unwrap();
        let replica = dir.path().join("manifest/dom1/348/0");
        fs::create_dir_all(&replica).unwrap();
        fs::write(
            dir.path().join("manifest/dom1/attrs.toml"),
            "num_protein_atoms = 50\nnum_residues = 10\nnum_no_h_atoms = 30\n",
        )
        .unwrap();
        fs::write(
            replica.join("attrs.toml"),
            "num_frames = 7\nmin_gyration_radius = 1.0\nmax_gyration_radius = 2.0\n\
             alpha = 0.3\nbeta = 0.2\ncoil = 0.5\n",
        )
        .unwrap();

        run(args(dir.path())).unwrap();
    }
}
