use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{debug, info, warn};
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use nave_profile::config::SupportConfig;
use nave_profile::experiment::{FlatPanel, MonochromaticBeam, RotationScan, SingleAxisGoniometer};
use nave_profile::interfaces::{MosaicitySpread, RockingCurveParams};
use nave_profile::shoebox::{BoundingBox, MaskCode, Shoebox};
use nave_profile::support::{PartialitySupport, ProfileSupport};

#[derive(Parser)]
#[command(name = "nave-profile")]
#[command(about = "Predict bounding boxes, masks and profiles of reflections in a rotation scan")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Number of threads to use (default: all available cores)
    #[arg(short, long)]
    threads: Option<usize>,
}

#[derive(clap::Args)]
struct Inputs {
    /// Experiment description (JSON)
    #[arg(short, long)]
    experiment: PathBuf,

    /// Reflection list (JSON array of {panel, s1, phi})
    #[arg(short, long)]
    reflections: PathBuf,

    /// Output file; stdout if omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the bounding box of each reflection
    Bbox {
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Compute the bounding box and foreground/background mask of each reflection
    Mask {
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Compute the bounding box and predicted profile of each reflection
    Profile {
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Compute the fraction of each reflection recorded inside its bounding box
    Partiality {
        #[command(flatten)]
        inputs: Inputs,
    },
}

#[derive(Debug, Deserialize)]
struct CrystalFile {
    /// Setting matrix A, row-major
    a_matrix: [f64; 9],
}

#[derive(Debug, Deserialize)]
struct ExperimentFile {
    beam: MonochromaticBeam,
    panels: Vec<FlatPanel>,
    goniometer: SingleAxisGoniometer,
    scan: RotationScan,
    crystal: CrystalFile,
    mosaicity: MosaicitySpread,
    #[serde(default)]
    rocking: Option<RockingCurveParams>,
    #[serde(default)]
    support: SupportConfig,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct Reflection {
    panel: usize,
    s1: Vector3<f64>,
    phi: f64,
}

#[derive(Debug, Serialize)]
struct Record<T: Serialize> {
    index: usize,
    #[serde(flatten)]
    outcome: Outcome<T>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Outcome<T: Serialize> {
    Ok(T),
    Failed { error: String },
}

#[derive(Debug, Serialize)]
struct MaskRecord {
    bbox: BoundingBox,
    shape: (usize, usize, usize),
    foreground: usize,
    background: usize,
    mask: Vec<u8>,
}

#[derive(Debug, Serialize)]
struct ProfileRecord {
    bbox: BoundingBox,
    shape: (usize, usize, usize),
    profile: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct PartialityRecord {
    bbox: BoundingBox,
    partiality: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Set thread pool size if specified
    if let Some(threads) = cli.threads {
        #[cfg(feature = "parallel")]
        {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build_global()
                .map_err(|e| anyhow!("Failed to set thread pool size: {}", e))?;
            info!("Using {} threads", threads);
        }
        #[cfg(not(feature = "parallel"))]
        {
            warn!("Thread count {} specified but parallel feature not enabled. Ignoring.", threads);
        }
    }

    info!("Starting nave-profile v{}", nave_profile::VERSION);

    match cli.command {
        Commands::Bbox { inputs } => run_bbox(&inputs),
        Commands::Mask { inputs } => run_mask(&inputs),
        Commands::Profile { inputs } => run_profile(&inputs),
        Commands::Partiality { inputs } => run_partiality(&inputs),
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

fn load(inputs: &Inputs) -> Result<(ExperimentFile, Vec<Reflection>)> {
    let mut experiment: ExperimentFile = read_json(&inputs.experiment)?;
    // Re-validate the plain structs through their checked constructors
    experiment.beam = MonochromaticBeam::new(experiment.beam.direction, experiment.beam.wavelength)
        .context("Invalid beam")?;
    experiment.goniometer =
        SingleAxisGoniometer::new(experiment.goniometer.axis).context("Invalid goniometer")?;
    experiment.support.validate().context("Invalid support config")?;

    let reflections: Vec<Reflection> = read_json(&inputs.reflections)?;
    info!(
        "Loaded {} panels and {} reflections",
        experiment.panels.len(),
        reflections.len()
    );
    Ok((experiment, reflections))
}

fn profile_support(experiment: &ExperimentFile) -> Result<ProfileSupport<'_, Vec<FlatPanel>, RotationScan>> {
    let support = ProfileSupport::new(
        &experiment.beam,
        &experiment.panels,
        &experiment.goniometer,
        &experiment.scan,
        Matrix3::from_row_slice(&experiment.crystal.a_matrix),
        experiment.mosaicity,
        experiment.support,
    )?;
    debug!("Support config: {:?}", experiment.support);
    Ok(support)
}

/// Apply `f` to every reflection, in parallel when the feature is enabled.
fn map_reflections<T, F>(reflections: &[Reflection], f: F) -> Vec<Record<T>>
where
    T: Serialize + Send,
    F: Fn(&Reflection) -> nave_profile::Result<T> + Sync + Send,
{
    let run = |(index, reflection): (usize, &Reflection)| Record {
        index,
        outcome: match f(reflection) {
            Ok(value) => Outcome::Ok(value),
            Err(e) => {
                warn!("Reflection {}: {}", index, e);
                Outcome::Failed { error: e.to_string() }
            }
        },
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        reflections.par_iter().enumerate().map(run).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        reflections.iter().enumerate().map(run).collect()
    }
}

fn write_records<T: Serialize>(records: &[Record<T>], output: Option<&Path>) -> Result<()> {
    let failed = records
        .iter()
        .filter(|r| matches!(r.outcome, Outcome::Failed { .. }))
        .count();
    info!("{} of {} reflections processed", records.len() - failed, records.len());

    let text = serde_json::to_string_pretty(records)?;
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Results written to {}", path.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn run_bbox(inputs: &Inputs) -> Result<()> {
    let (experiment, reflections) = load(inputs)?;
    let support = profile_support(&experiment)?;
    let records = map_reflections(&reflections, |r| support.compute_bbox(r.panel, r.s1, r.phi));
    write_records(&records, inputs.output.as_deref())
}

fn run_mask(inputs: &Inputs) -> Result<()> {
    let (experiment, reflections) = load(inputs)?;
    let support = profile_support(&experiment)?;
    let records = map_reflections(&reflections, |r| {
        let bbox = support.compute_bbox(r.panel, r.s1, r.phi)?;
        let mut shoebox = Shoebox::allocate(r.panel, bbox);
        support.compute_mask(r.panel, r.s1, r.phi, &mut shoebox)?;
        Ok(MaskRecord {
            bbox,
            shape: bbox.shape(),
            foreground: shoebox.count(MaskCode::FOREGROUND),
            background: shoebox.count(MaskCode::BACKGROUND),
            mask: shoebox.mask.iter().map(|m| m.bits()).collect(),
        })
    });
    write_records(&records, inputs.output.as_deref())
}

fn run_profile(inputs: &Inputs) -> Result<()> {
    let (experiment, reflections) = load(inputs)?;
    let support = profile_support(&experiment)?;
    let records = map_reflections(&reflections, |r| {
        let bbox = support.compute_bbox(r.panel, r.s1, r.phi)?;
        let mut profile = ndarray::Array3::zeros(bbox.shape());
        support.compute_prof(r.panel, r.s1, r.phi, &bbox, &mut profile)?;
        Ok(ProfileRecord {
            bbox,
            shape: bbox.shape(),
            profile: profile.iter().copied().collect(),
        })
    });
    write_records(&records, inputs.output.as_deref())
}

fn run_partiality(inputs: &Inputs) -> Result<()> {
    let (experiment, reflections) = load(inputs)?;
    let params = experiment
        .rocking
        .ok_or_else(|| anyhow!("Experiment file has no \"rocking\" parameters"))?;
    let support = profile_support(&experiment)?;
    let partiality = PartialitySupport::new(
        &experiment.beam,
        &experiment.goniometer,
        &experiment.scan,
        params,
        experiment.support.terms,
    )?;
    let records = map_reflections(&reflections, |r| {
        let bbox = support.compute_bbox(r.panel, r.s1, r.phi)?;
        Ok(PartialityRecord {
            bbox,
            partiality: partiality.compute_partiality(r.s1, r.phi, &bbox)?,
        })
    });
    write_records(&records, inputs.output.as_deref())
}
