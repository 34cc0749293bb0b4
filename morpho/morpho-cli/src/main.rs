//! Morphometry command-line front end.
//!
//! Reads an already-decoded scan as JSON and prints the measurement record
//! as JSON on stdout. Logs go to stderr.
//!
//! # Commands
//!
//! - `morpho measure <scan.json>` - Measure one scan
//! - `morpho config` - Print the default configuration
//!
//! # Input
//!
//! ```json
//! { "vertices": [[x, y, z], ...], "faces": [[i, j, k], ...] }
//! ```
//!
//! `faces` is optional. When present, the vertices and faces form the
//! reference surface used for volume estimation.
//!
//! # Failure
//!
//! A failed measurement prints an error descriptor instead of a record and
//! exits with status 1:
//!
//! ```json
//! { "error": "empty_cloud", "message": "point cloud is empty after sanitizing" }
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use morpho_measure::{SurfaceMesh, VolumeSurface};
use morpho_scan::{Degradation, MorphometryConfig, ScanError, measure_scan_with_report};
use morpho_types::{MetricsRecord, Point3, PointCloud};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Body measurements from a 3D livestock scan
#[derive(Parser)]
#[command(name = "morpho")]
#[command(about = "Body measurements from a 3D livestock scan", long_about = None)]
#[command(version)]
struct Cli {
    /// Log filter (overrides RUST_LOG), e.g. "debug" or "morpho_scan=trace"
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure one scan
    Measure {
        /// Scan file: {"vertices": [[x,y,z], ...], "faces"?: [[i,j,k], ...]}
        #[arg(name = "INPUT")]
        input: PathBuf,

        /// Configuration file (partial JSON objects are filled with defaults)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Multiplier from scan units to meters (overrides the config file)
        #[arg(long)]
        scale: Option<f64>,

        /// Print the full report with degradations instead of the bare record
        #[arg(long)]
        report: bool,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the default configuration
    Config {
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

/// A decoded scan.
#[derive(Debug, Deserialize)]
struct ScanInput {
    vertices: Vec<[f64; 3]>,
    #[serde(default)]
    faces: Option<Vec<[usize; 3]>>,
}

impl ScanInput {
    fn cloud(&self) -> PointCloud {
        PointCloud::from_coords(&self.vertices)
    }

    fn surface(&self) -> Option<SurfaceMesh> {
        self.faces.as_ref().map(|faces| {
            let vertices = self
                .vertices
                .iter()
                .map(|&[x, y, z]| Point3::new(x, y, z))
                .collect();
            SurfaceMesh::new(vertices, faces.clone())
        })
    }
}

/// The `--report` output.
#[derive(Serialize)]
struct ReportOutput<'a> {
    record: &'a MetricsRecord,
    raw_points: usize,
    retained_points: usize,
    thoracic_points: usize,
    rump_points: usize,
    degradations: &'a [Degradation],
}

/// What a caller sees when no record could be produced.
#[derive(Debug, Serialize)]
struct ErrorDescriptor {
    error: &'static str,
    message: String,
}

impl ErrorDescriptor {
    fn from_error(err: &anyhow::Error) -> Self {
        let error = match err.downcast_ref::<ScanError>() {
            Some(ScanError::EmptyCloud { .. }) => "empty_cloud",
            Some(ScanError::InvalidConfig { .. }) => "invalid_config",
            Some(ScanError::Transform(_)) => "computation_failed",
            None => "input_error",
        };
        Self {
            error,
            message: format!("{err:#}"),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let result = match cli.command {
        Commands::Measure {
            input,
            config,
            scale,
            report,
            pretty,
        } => measure(&input, config.as_deref(), scale, report, pretty),
        Commands::Config { pretty } => to_json(&MorphometryConfig::default(), pretty),
    };

    match result {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %format!("{err:#}"), "measurement failed");
            let descriptor = ErrorDescriptor::from_error(&err);
            match to_json(&descriptor, true) {
                Ok(json) => println!("{json}"),
                Err(_) => println!("{{\"error\": \"{}\"}}", descriptor.error),
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn measure(
    input: &Path,
    config_path: Option<&Path>,
    scale: Option<f64>,
    report: bool,
    pretty: bool,
) -> Result<String> {
    let mut config = match config_path {
        Some(path) => load_config(path)?,
        None => MorphometryConfig::default(),
    };
    if let Some(scale) = scale {
        config = config.with_scale(scale);
    }

    let scan = load_scan(input)?;
    info!(
        path = %input.display(),
        vertices = scan.vertices.len(),
        faces = scan.faces.as_ref().map_or(0, Vec::len),
        "scan loaded"
    );

    let surface = scan.surface();
    let result = measure_scan_with_report(
        &scan.cloud(),
        surface.as_ref().map(|s| s as &dyn VolumeSurface),
        &config,
    )?;

    if report {
        to_json(
            &ReportOutput {
                record: &result.record,
                raw_points: result.raw_points,
                retained_points: result.retained_points,
                thoracic_points: result.thoracic_points,
                rump_points: result.rump_points,
                degradations: &result.degradations,
            },
            pretty,
        )
    } else {
        to_json(&result.record, pretty)
    }
}

fn load_scan(path: &Path) -> Result<ScanInput> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scan {}", path.display()))?;
    parse_scan(&text).with_context(|| format!("Failed to parse scan {}", path.display()))
}

fn parse_scan(text: &str) -> Result<ScanInput> {
    Ok(serde_json::from_str(text)?)
}

fn load_config(path: &Path) -> Result<MorphometryConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse config {}", path.display()))
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}
