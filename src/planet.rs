//! Irregular planet meshes.
//!
//! The planet pipeline turns a regular geodesic sphere into an irregular
//! one suitable for a tile-based planet: edges are rotated at random in a
//! few rounds, each followed by a relaxation pass, then the mesh is relaxed
//! until node movement settles and the face fans are restored.
//!
//! # Example
//!
//! ```
//! use icosphere::algo::Progress;
//! use icosphere::planet::{generate_planet_mesh, PlanetOptions};
//! use icosphere::Icosphere;
//!
//! let options = PlanetOptions::new(5).with_distortion_rate(0.2);
//! let mut rng = fastrand::Rng::with_seed(7);
//! let planet: Icosphere = generate_planet_mesh(&options, &mut rng, &Progress::none()).unwrap();
//!
//! assert!(planet.mesh().is_valid());
//! ```

use std::f64::consts::PI;

use crate::algo::distort::distort_mesh;
use crate::algo::face_order::correct_face_order;
use crate::algo::relax::{relax_mesh, RelaxOptions};
use crate::algo::Progress;
use crate::error::{MeshError, Result};
use crate::mesh::MeshIndex;
use crate::random::RandomSource;
use crate::sphere::Icosphere;

/// Stages reported through [`Progress::report_sub`].
const STAGES: usize = 4;

/// Options for [`generate_planet_mesh`].
#[derive(Debug, Clone)]
pub struct PlanetOptions {
    /// Subdivision degree of the underlying icosphere.
    pub subdivision: usize,

    /// Number of edge rotations as a fraction of the edge count.
    pub distortion_rate: f64,

    /// Rounds the rotations are spread over (default: 6).
    pub distortion_rounds: usize,

    /// Relaxation multiplier used throughout (default: 0.5).
    pub relax_multiplier: f64,

    /// Upper bound on convergence passes (default: 300).
    pub max_relax_iterations: usize,

    /// Whether relaxation runs in parallel (default: true).
    pub parallel: bool,
}

impl Default for PlanetOptions {
    fn default() -> Self {
        Self {
            subdivision: 20,
            distortion_rate: 1.0,
            distortion_rounds: 6,
            relax_multiplier: 0.5,
            max_relax_iterations: 300,
            parallel: true,
        }
    }
}

impl PlanetOptions {
    /// Default options for the given subdivision degree.
    pub fn new(subdivision: usize) -> Self {
        Self {
            subdivision,
            ..Self::default()
        }
    }

    /// Set the distortion rate.
    pub fn with_distortion_rate(mut self, rate: f64) -> Self {
        self.distortion_rate = rate;
        self
    }

    /// Set the number of distortion rounds.
    pub fn with_distortion_rounds(mut self, rounds: usize) -> Self {
        self.distortion_rounds = rounds;
        self
    }

    /// Set the relaxation multiplier.
    pub fn with_relax_multiplier(mut self, multiplier: f64) -> Self {
        self.relax_multiplier = multiplier;
        self
    }

    /// Set the maximum number of convergence passes.
    pub fn with_max_relax_iterations(mut self, iterations: usize) -> Self {
        self.max_relax_iterations = iterations;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Check every option for a usable value.
    pub fn validate(&self) -> Result<()> {
        if !self.distortion_rate.is_finite() || self.distortion_rate < 0.0 {
            return Err(MeshError::invalid_param(
                "distortion_rate",
                self.distortion_rate,
                "must be finite and non-negative",
            ));
        }
        if self.distortion_rounds == 0 {
            return Err(MeshError::invalid_param(
                "distortion_rounds",
                self.distortion_rounds,
                "must be at least 1",
            ));
        }
        if !self.relax_multiplier.is_finite() || self.relax_multiplier < 0.0 {
            return Err(MeshError::invalid_param(
                "relax_multiplier",
                self.relax_multiplier,
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }

    fn relax_options(&self) -> RelaxOptions {
        RelaxOptions::default()
            .with_multiplier(self.relax_multiplier)
            .with_parallel(self.parallel)
    }
}

/// What the pipeline did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanetSummary {
    /// Edge rotations requested.
    pub rotations: usize,

    /// False if some round ran out of rotatable edges.
    pub distortion_complete: bool,

    /// Convergence passes run after distortion.
    pub relax_iterations: usize,

    /// Total displacement of the last pass.
    pub final_shift: f64,
}

/// Build an icosphere and run the planet pipeline on it.
///
/// # Errors
///
/// [`MeshError::InvalidParameter`] for unusable options; any error of
/// [`Icosphere::new`] or [`shape_planet`].
pub fn generate_planet_mesh<I, R>(options: &PlanetOptions, rng: &mut R, progress: &Progress) -> Result<Icosphere<I>>
where
    I: MeshIndex,
    R: RandomSource + ?Sized,
{
    options.validate()?;
    progress.report_sub(0, 1, 0, STAGES, "Subdividing");
    let mut sphere = Icosphere::new(options.subdivision, options.distortion_rate)?;
    shape_planet(&mut sphere, options, rng, progress)?;
    Ok(sphere)
}

/// Distort, relax and re-order an existing icosphere.
///
/// The sphere's own subdivision is kept; `options.subdivision` is ignored.
pub fn shape_planet<I, R>(
    sphere: &mut Icosphere<I>,
    options: &PlanetOptions,
    rng: &mut R,
    progress: &Progress,
) -> Result<PlanetSummary>
where
    I: MeshIndex,
    R: RandomSource + ?Sized,
{
    options.validate()?;
    let relax = options.relax_options();
    let mesh = sphere.mesh_mut();

    let rotations = (mesh.num_edges() as f64 * options.distortion_rate).ceil() as usize;
    let mut remaining = rotations;
    let mut distortion_complete = true;
    for round in 0..options.distortion_rounds {
        progress.report_sub(round, options.distortion_rounds, 1, STAGES, "Distorting");
        let count = remaining / (options.distortion_rounds - round);
        remaining -= count;
        if !distort_mesh(mesh, count, rng)? {
            log::warn!("distortion round {} ran out of rotatable edges", round + 1);
            distortion_complete = false;
        }
        relax_mesh(mesh, &relax);
    }
    log::debug!("requested {} edge rotations", rotations);

    let num_nodes = mesh.num_nodes() as f64;
    let average_node_radius = (4.0 * PI / num_nodes).sqrt();
    let min_shift_delta = average_node_radius / 50000.0 * num_nodes;

    let mut current = relax_mesh(mesh, &relax);
    let mut iterations = 0;
    while iterations < options.max_relax_iterations {
        progress.report_sub(iterations, options.max_relax_iterations, 2, STAGES, "Relaxing");
        let prior = current;
        current = relax_mesh(mesh, &relax);
        iterations += 1;
        if (current - prior).abs() < min_shift_delta {
            break;
        }
    }
    log::debug!(
        "relaxation settled after {} passes (shift {:.4})",
        iterations,
        current
    );

    progress.report_sub(0, 1, 3, STAGES, "Ordering faces");
    correct_face_order(mesh)?;
    progress.report(STAGES * 1000, STAGES * 1000, "Done");

    Ok(PlanetSummary {
        rotations,
        distortion_complete,
        relax_iterations: iterations,
        final_shift: current,
    })
}
