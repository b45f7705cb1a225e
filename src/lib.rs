//! # Icosphere
//!
//! Geodesic sphere meshes built from a subdivided icosahedron, with the
//! tools to turn them into irregular planet surfaces.
//!
//! The mesh is an explicit node/edge/face store with typed indices and
//! full back-references, so every adjacency query is a lookup rather than
//! a search.
//!
//! ## Features
//!
//! - **Subdivision**: split each icosahedron edge into `d` segments, giving
//!   `20·d²` faces on the unit sphere
//! - **Flexible indexing**: 16-bit, 32-bit and 64-bit indices
//! - **Distortion**: random edge rotations that keep valences between 5 and 7
//! - **Relaxation**: centroid-driven smoothing toward equal-area faces,
//!   optionally parallel
//! - **Dual tiles**: the pentagon and hexagon cells around every node
//!
//! ## Quick Start
//!
//! ```
//! use icosphere::prelude::*;
//!
//! let mut sphere: Icosphere = Icosphere::new(6, 0.5).unwrap();
//! assert_eq!(sphere.mesh().num_faces(), 20 * 36);
//!
//! let mut rng = fastrand::Rng::with_seed(42);
//! sphere.distort_mesh(50, &mut rng).unwrap();
//! for _ in 0..20 {
//!     sphere.relax_mesh(0.5);
//! }
//! sphere.correct_face_order().unwrap();
//!
//! let tiles = build_tiles(sphere.mesh()).unwrap();
//! assert_eq!(tiles.len(), sphere.mesh().num_nodes());
//! ```
//!
//! ## Planet Meshes
//!
//! ```
//! use icosphere::prelude::*;
//!
//! let options = PlanetOptions::new(8).with_distortion_rate(0.5);
//! let mut rng = fastrand::Rng::with_seed(1);
//! let planet: Icosphere = generate_planet_mesh(&options, &mut rng, &Progress::none()).unwrap();
//!
//! let stats = MeshStats::compute(planet.mesh());
//! println!("{}", stats);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod mesh;
pub mod planet;
pub mod random;
pub mod sphere;

pub use sphere::Icosphere;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use icosphere::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::dual::{build_tiles, Tile};
    pub use crate::algo::relax::RelaxOptions;
    pub use crate::algo::Progress;
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        generate_icosahedron, Edge, EdgeId, Face, FaceId, IcosahedronMesh, MeshIndex, MeshStats,
        Node, NodeId,
    };
    pub use crate::planet::{generate_planet_mesh, PlanetOptions, PlanetSummary};
    pub use crate::random::RandomSource;
    pub use crate::sphere::Icosphere;
}

// Re-export nalgebra types for convenience
pub use nalgebra;
