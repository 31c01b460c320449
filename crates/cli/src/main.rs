//! sedra CLI - sediment-transport indicators from 2-D hydraulic model output

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use sedra_core::io::read_geotiff;
use sedra_core::{Crs, Raster};
use sedra_hydro::boundary::Boundary;
use sedra_hydro::config::{FieldNames, PhysicalConstants, PipelineConfig};
use sedra_hydro::pipeline::run_to_dir;
use sedra_hydro::points::load_samples_from_path;

#[derive(Parser)]
#[command(name = "sedra")]
#[command(author, version, about = "Sediment-transport rasters from hydraulic model output", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: points → TIN → raster → clip → transport chain
    Run {
        /// Sample table: CSV with x, y, depth and velocity columns
        #[arg(long)]
        points: PathBuf,
        /// Boundary polygon (GeoJSON)
        #[arg(long)]
        boundary: PathBuf,
        /// Output directory for the five rasters
        #[arg(short, long, default_value = "out")]
        out: PathBuf,
        /// Output cell size in map units
        #[arg(long, default_value = "3.0")]
        cell_size: f64,
        /// EPSG code of the boundary's (and therefore all outputs')
        /// spatial reference
        #[arg(long, default_value = "4326")]
        epsg: u32,

        /// X column name
        #[arg(long, default_value = "X")]
        x_field: String,
        /// Y column name
        #[arg(long, default_value = "Y")]
        y_field: String,
        /// Depth column name
        #[arg(long, default_value = "D")]
        depth_field: String,
        /// Velocity column name
        #[arg(long, default_value = "V")]
        velocity_field: String,

        /// Manning's roughness n
        #[arg(long)]
        manning_n: Option<f64>,
        /// Water density in lb/ft³
        #[arg(long)]
        water_density: Option<f64>,
        /// Gravitational acceleration in ft/s²
        #[arg(long)]
        gravity: Option<f64>,
        /// Sediment specific gravity
        #[arg(long)]
        specific_gravity: Option<f64>,
        /// Representative grain diameter in mm
        #[arg(long)]
        grain_diameter_mm: Option<f64>,
        /// Critical Shields stress
        #[arg(long)]
        critical_shields: Option<f64>,
    },
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

#[allow(clippy::too_many_arguments)]
fn run_command(
    points: PathBuf,
    boundary: PathBuf,
    out: PathBuf,
    cell_size: f64,
    epsg: u32,
    fields: FieldNames,
    constants: PhysicalConstants,
) -> Result<()> {
    let config = PipelineConfig {
        cell_size,
        fields,
        constants,
    };

    let pb = spinner("Loading sample table...");
    let samples = load_samples_from_path(&points, &config.fields)
        .context("Failed to load the sample table")?;
    pb.finish_and_clear();
    info!(count = samples.len(), "samples loaded");

    let pb = spinner("Loading boundary polygon...");
    let boundary = Boundary::from_geojson_file(&boundary, Crs::from_epsg(epsg))
        .context("Failed to load the boundary polygon")?;
    pb.finish_and_clear();

    let pb = spinner("Running transport pipeline...");
    let start = Instant::now();
    let rasters =
        run_to_dir(&samples, &boundary, &config, &out).context("Pipeline run failed")?;
    let elapsed = start.elapsed();
    pb.finish_and_clear();

    let (rows, cols) = rasters.depth.shape();
    println!("Outputs saved to: {}", out.display());
    println!("  Grid: {} x {} cells at {} units", cols, rows, cell_size);
    println!("  Processing time: {:.2?}", elapsed);
    Ok(())
}

fn info_command(input: PathBuf) -> Result<()> {
    let pb = spinner("Reading raster...");
    let raster: Raster<f64> = read_geotiff(&input).context("Failed to read raster")?;
    pb.finish_and_clear();

    let (rows, cols) = raster.shape();
    let bounds = raster.bounds();
    let stats = raster.statistics();

    println!("File: {}", input.display());
    println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
    println!("Cell size: {}", raster.cell_size());
    println!(
        "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
        bounds.0, bounds.1, bounds.2, bounds.3
    );
    if let Some(crs) = raster.crs() {
        println!("CRS: {}", crs);
    }
    println!("\nStatistics:");
    if let Some(min) = stats.min {
        println!("  Min: {:.4}", min);
    }
    if let Some(max) = stats.max {
        println!("  Max: {:.4}", max);
    }
    if let Some(mean) = stats.mean {
        println!("  Mean: {:.4}", mean);
    }
    println!(
        "  Valid cells: {} ({:.1}%)",
        stats.valid_count,
        100.0 * stats.valid_count as f64 / raster.len() as f64
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            points,
            boundary,
            out,
            cell_size,
            epsg,
            x_field,
            y_field,
            depth_field,
            velocity_field,
            manning_n,
            water_density,
            gravity,
            specific_gravity,
            grain_diameter_mm,
            critical_shields,
        } => {
            let fields = FieldNames {
                x: x_field,
                y: y_field,
                depth: depth_field,
                velocity: velocity_field,
            };

            let mut constants = PhysicalConstants::default();
            if let Some(n) = manning_n {
                constants.manning_n = n;
            }
            if let Some(rho) = water_density {
                constants.water_density = rho;
            }
            if let Some(g) = gravity {
                constants.gravity = g;
            }
            if let Some(sg) = specific_gravity {
                constants.sediment_specific_gravity = sg;
            }
            if let Some(d_mm) = grain_diameter_mm {
                constants.grain_diameter = d_mm * sedra_hydro::config::MM_TO_FT;
            }
            if let Some(tc) = critical_shields {
                constants.critical_shields = tc;
            }

            run_command(points, boundary, out, cell_size, epsg, fields, constants)
        }
        Commands::Info { input } => info_command(input),
    }
}
