//! Relaxation of node positions toward equal-area faces.
//!
//! One relaxation pass pushes every node toward or away from the centroids
//! of its incident faces, so that each node ends up at a fixed ideal
//! distance from them. The ideal distance is derived from the area a face
//! would have if all faces tiled the unit sphere equally:
//!
//! ```text
//! ideal_area     = 4π / F
//! ideal_edge     = sqrt(ideal_area * 4 / sqrt(3))
//! ideal_distance = ideal_edge * sqrt(3) / 3 * 0.9
//! ```
//!
//! Shifts are projected onto each node's tangent plane. Nodes whose edges
//! would swing around sharply are damped by a rotation suppression factor
//! so a pass never folds triangles over. Every node stays on the unit
//! sphere; topology is untouched.
//!
//! # Example
//!
//! ```
//! use icosphere::algo::relax::{relax_mesh, RelaxOptions};
//! use icosphere::algo::subdivide::subdivide;
//! use icosphere::mesh::{generate_icosahedron, IcosahedronMesh};
//!
//! let mut base: IcosahedronMesh = generate_icosahedron();
//! let mut mesh = subdivide(&mut base, 3).unwrap();
//!
//! let first = relax_mesh(&mut mesh, &RelaxOptions::default());
//! let later = relax_mesh(&mut mesh, &RelaxOptions::default());
//! assert!(later < first);
//! ```

use std::f64::consts::PI;

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use crate::mesh::{EdgeId, IcosahedronMesh, MeshIndex, NodeId};

use super::lerp_on_sphere;

/// Centroid distances are scaled down slightly so faces pull nodes inward.
const CENTROID_DISTANCE_SCALE: f64 = 0.9;

/// Options for a relaxation pass.
#[derive(Debug, Clone)]
pub struct RelaxOptions {
    /// Strength of the centroid pull. The planet pipeline uses 0.5.
    pub multiplier: f64,

    /// Whether to use parallel execution (default: true).
    pub parallel: bool,
}

impl Default for RelaxOptions {
    fn default() -> Self {
        Self {
            multiplier: 0.5,
            parallel: true,
        }
    }
}

impl RelaxOptions {
    /// Set the centroid pull strength.
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
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
}

/// Distance from a node to the centroid of an ideal equilateral face.
pub fn ideal_distance_to_centroid(num_faces: usize) -> f64 {
    let ideal_face_area = 4.0 * PI / num_faces as f64;
    let ideal_edge_length = (ideal_face_area * 4.0 / 3f64.sqrt()).sqrt();
    ideal_edge_length * 3f64.sqrt() / 3.0 * CENTROID_DISTANCE_SCALE
}

/// Run one relaxation pass and return the total node displacement.
///
/// The return value is the sum of the distances every node moved. It
/// shrinks toward zero as the mesh settles, which is what convergence
/// loops compare between passes.
pub fn relax_mesh<I: MeshIndex>(mesh: &mut IcosahedronMesh<I>, options: &RelaxOptions) -> f64 {
    if mesh.num_faces() == 0 {
        return 0.0;
    }

    let ideal = ideal_distance_to_centroid(mesh.num_faces());
    let centroids = mesh.face_centroids();

    let (targets, suppressions) = if options.parallel {
        let targets: Vec<Point3<f64>> = (0..mesh.num_nodes())
            .into_par_iter()
            .map(|i| {
                let node = NodeId::new(i);
                let shift = gather_shift(mesh, node, &centroids, ideal, options.multiplier);
                tentative_position(mesh.position(node), &shift)
            })
            .collect();
        let suppressions: Vec<f64> = (0..mesh.num_nodes())
            .into_par_iter()
            .map(|i| {
                mesh.node(NodeId::new(i))
                    .edges
                    .iter()
                    .map(|&e| edge_suppression(mesh, e, &targets))
                    .fold(0.0, f64::max)
            })
            .collect();
        (targets, suppressions)
    } else {
        let shifts = scatter_shifts(mesh, &centroids, ideal, options.multiplier);
        let targets: Vec<Point3<f64>> = mesh
            .nodes()
            .iter()
            .zip(&shifts)
            .map(|(node, shift)| tentative_position(&node.position, shift))
            .collect();
        let mut suppressions = vec![0.0f64; mesh.num_nodes()];
        for e in mesh.edge_ids() {
            let s = edge_suppression(mesh, e, &targets);
            for n in mesh.edge(e).nodes {
                let slot = &mut suppressions[n.index()];
                *slot = slot.max(s);
            }
        }
        (targets, suppressions)
    };

    let mut total_shift = 0.0;
    for ((node, target), suppression) in mesh.nodes.iter_mut().zip(&targets).zip(&suppressions) {
        let old = node.position;
        node.position = lerp_on_sphere(&old, target, 1.0 - suppression.sqrt());
        total_shift += (old - node.position).norm();
    }

    log::trace!("relaxation pass moved nodes by {:.3e} in total", total_shift);
    total_shift
}

/// Pull of one face centroid on a node at `position`.
#[inline]
fn centroid_pull(position: &Point3<f64>, centroid: &Point3<f64>, ideal: f64, multiplier: f64) -> Vector3<f64> {
    let v = centroid - position;
    let length = v.norm();
    if length <= f64::EPSILON {
        return Vector3::zeros();
    }
    v * (multiplier * (length - ideal) / length)
}

fn gather_shift<I: MeshIndex>(
    mesh: &IcosahedronMesh<I>,
    node: NodeId<I>,
    centroids: &[Point3<f64>],
    ideal: f64,
    multiplier: f64,
) -> Vector3<f64> {
    let position = mesh.position(node);
    mesh.node(node)
        .faces
        .iter()
        .map(|f| centroid_pull(position, &centroids[f.index()], ideal, multiplier))
        .sum()
}

fn scatter_shifts<I: MeshIndex>(
    mesh: &IcosahedronMesh<I>,
    centroids: &[Point3<f64>],
    ideal: f64,
    multiplier: f64,
) -> Vec<Vector3<f64>> {
    let mut shifts = vec![Vector3::zeros(); mesh.num_nodes()];
    for (face, centroid) in mesh.faces().iter().zip(centroids) {
        for n in face.nodes {
            shifts[n.index()] += centroid_pull(mesh.position(n), centroid, ideal, multiplier);
        }
    }
    shifts
}

/// Apply a shift within the tangent plane at `position`, back on the sphere.
fn tentative_position(position: &Point3<f64>, shift: &Vector3<f64>) -> Point3<f64> {
    let p = position.coords;
    let tangent = shift - p * (shift.dot(&p) / p.dot(&p));
    Point3::from((p + tangent).try_normalize(0.0).unwrap_or(p))
}

/// How much an edge would rotate if both endpoints moved to their targets.
///
/// 0 when the direction is unchanged, 1 when it reverses.
fn edge_suppression<I: MeshIndex>(mesh: &IcosahedronMesh<I>, edge: EdgeId<I>, targets: &[Point3<f64>]) -> f64 {
    let [n0, n1] = mesh.edge(edge).nodes;
    let old = (mesh.position(n1) - mesh.position(n0)).try_normalize(0.0);
    let new = (targets[n1.index()] - targets[n0.index()]).try_normalize(0.0);
    match (old, new) {
        (Some(old), Some(new)) => 0.5 * (1.0 - old.dot(&new)),
        _ => 0.0,
    }
}
