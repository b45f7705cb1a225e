//! Sphere mesh algorithms.
//!
//! - **Subdivision**: split every icosahedron edge and face by an integer degree
//! - **Face ordering**: arrange each node's faces into a cyclic fan
//! - **Distortion**: random, constraint-checked edge rotations
//! - **Relaxation**: centroid-driven smoothing toward equal-area faces
//! - **Dual tiles**: the hexagon/pentagon cells around each node

pub mod distort;
pub mod dual;
pub mod face_order;
pub mod progress;
pub mod relax;
pub mod subdivide;

pub use progress::Progress;

use nalgebra::Point3;

/// Linear interpolation between two points, projected back onto the unit sphere.
///
/// Falls back to `a` if the interpolated point is at the origin.
#[inline]
pub(crate) fn lerp_on_sphere(a: &Point3<f64>, b: &Point3<f64>, t: f64) -> Point3<f64> {
    let p = a.coords.lerp(&b.coords, t);
    match p.try_normalize(f64::EPSILON) {
        Some(n) => Point3::from(n),
        None => *a,
    }
}
