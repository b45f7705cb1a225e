//! Icosphere CLI - generate and inspect geodesic sphere meshes.
//!
//! Usage: icosphere <COMMAND> [OPTIONS]
//!
//! Run `icosphere --help` for available commands.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};

use icosphere::algo::dual::build_tiles;
use icosphere::algo::relax::RelaxOptions;
use icosphere::algo::Progress;
use icosphere::mesh::MeshStats;
use icosphere::planet::{generate_planet_mesh, PlanetOptions};
use icosphere::Icosphere;

#[derive(Parser)]
#[command(name = "icosphere")]
#[command(author, version, about = "Geodesic sphere mesh CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display statistics of a subdivided sphere
    Info {
        /// Subdivision degree (0 for the plain icosahedron)
        #[arg(short, long, default_value = "4")]
        degree: usize,
    },

    /// Generate an irregular planet mesh
    Planet {
        /// Subdivision degree
        #[arg(short, long, default_value = "20")]
        degree: usize,

        /// Edge rotations as a fraction of the edge count
        #[arg(long, default_value = "1.0")]
        distortion: f64,

        /// Random seed
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// Maximum relaxation passes after distortion
        #[arg(long, default_value = "300")]
        max_relax_iterations: usize,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },

    /// Relax an undistorted sphere and print the displacement of each pass
    Relax {
        /// Subdivision degree
        #[arg(short, long, default_value = "8")]
        degree: usize,

        /// Number of passes
        #[arg(short, long, default_value = "20")]
        iterations: usize,

        /// Centroid pull strength
        #[arg(short, long, default_value = "0.5")]
        multiplier: f64,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { degree } => {
            cmd_info(degree)?;
        }

        Commands::Planet {
            degree,
            distortion,
            seed,
            max_relax_iterations,
            sequential,
        } => {
            cmd_planet(degree, distortion, seed, max_relax_iterations, sequential)?;
        }

        Commands::Relax {
            degree,
            iterations,
            multiplier,
            sequential,
        } => {
            cmd_relax(degree, iterations, multiplier, sequential)?;
        }
    }

    Ok(())
}

/// Create a progress reporter that prints a bar to stderr.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let raw_percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        // Only ever move forward
        let previous = max_percent.fetch_max(raw_percent, Ordering::Relaxed);
        if raw_percent <= previous && raw_percent != 100 {
            return;
        }

        let bar_width = 30;
        let filled = (raw_percent * bar_width) / 100;
        let bar = "=".repeat(filled);
        let space = " ".repeat(bar_width - filled);

        eprint!("\r[{}{}] {:3}% {:<16}", bar, space, raw_percent, message);
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}

fn cmd_info(degree: usize) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let sphere: Icosphere = Icosphere::new(degree, 0.0)?;
    let elapsed = start.elapsed();

    println!("Subdivision degree: {} ({:.2?})", degree, elapsed);
    println!("{}", MeshStats::compute(sphere.mesh()));
    sphere.mesh().validate()?;
    println!("Topology: valid closed sphere");

    Ok(())
}

fn cmd_planet(
    degree: usize,
    distortion: f64,
    seed: u64,
    max_relax_iterations: usize,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = PlanetOptions::new(degree)
        .with_distortion_rate(distortion)
        .with_max_relax_iterations(max_relax_iterations)
        .with_parallel(!sequential);
    let mode = if sequential { "sequential" } else { "parallel" };
    println!(
        "Generating planet mesh (degree {}, distortion {}, seed {}, {})...",
        degree, distortion, seed, mode
    );

    let mut rng = fastrand::Rng::with_seed(seed);
    let progress = create_progress();

    let start = Instant::now();
    let planet: Icosphere = generate_planet_mesh(&options, &mut rng, &progress)?;
    let elapsed = start.elapsed();

    println!("Done ({:.2?})", elapsed);
    println!("{}", MeshStats::compute(planet.mesh()));

    let tiles = build_tiles(planet.mesh())?;
    let pentagons = tiles.iter().filter(|t| t.is_pentagon()).count();
    let hexagons = tiles.iter().filter(|t| t.is_hexagon()).count();
    let heptagons = tiles.len() - pentagons - hexagons;
    println!(
        "Tiles: {} ({} pentagons, {} hexagons, {} heptagons)",
        tiles.len(),
        pentagons,
        hexagons,
        heptagons
    );

    let areas: Vec<f64> = tiles.iter().map(|t| t.area()).collect();
    let min_area = areas.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_area = areas.iter().cloned().fold(0.0_f64, f64::max);
    println!("Tile area range: [{:.6}, {:.6}]", min_area, max_area);

    Ok(())
}

fn cmd_relax(
    degree: usize,
    iterations: usize,
    multiplier: f64,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut sphere: Icosphere = Icosphere::new(degree, 0.0)?;
    let options = RelaxOptions::default()
        .with_multiplier(multiplier)
        .with_parallel(!sequential);

    println!(
        "Relaxing {} nodes ({} passes, multiplier={})...",
        sphere.mesh().num_nodes(),
        iterations,
        multiplier
    );

    let start = Instant::now();
    for i in 0..iterations {
        let shift = sphere.relax_mesh_with_options(&options);
        println!("{:4}  {:.6e}", i + 1, shift);
    }
    println!("Done ({:.2?})", start.elapsed());

    Ok(())
}
