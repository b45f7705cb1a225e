//! The [`Icosphere`] facade.
//!
//! An `Icosphere` owns a subdivided, face-order-corrected icosahedron mesh
//! and exposes the operations that reshape it: random edge rotations and
//! relaxation passes. Every operation keeps the mesh a valid closed sphere.

use crate::algo::{distort, face_order, Progress};
use crate::algo::relax::{self, RelaxOptions};
use crate::algo::subdivide::subdivide;
use crate::error::{MeshError, Result};
use crate::mesh::{generate_icosahedron, IcosahedronMesh, MeshIndex};
use crate::planet::{shape_planet, PlanetOptions, PlanetSummary};
use crate::random::RandomSource;

/// A geodesic sphere built from a subdivided icosahedron.
///
/// # Example
///
/// ```
/// use icosphere::Icosphere;
///
/// let mut sphere: Icosphere = Icosphere::new(4, 0.2).unwrap();
/// assert_eq!(sphere.mesh().num_faces(), 20 * 16);
///
/// let mut rng = fastrand::Rng::with_seed(1);
/// sphere.distort_mesh(10, &mut rng).unwrap();
/// let shift = sphere.relax_mesh(0.5);
/// assert!(shift > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct Icosphere<I: MeshIndex = u32> {
    subdivision: usize,
    distortion_rate: f64,
    mesh: IcosahedronMesh<I>,
}

impl<I: MeshIndex> Icosphere<I> {
    /// Build the base icosahedron, subdivide it and order every node's faces.
    ///
    /// A `subdivision_degree` of 0 keeps the plain icosahedron (12 nodes,
    /// 20 faces); degree `d` splits every edge into `d` segments. The
    /// distortion rate is stored for [`generate`](Self::generate).
    ///
    /// # Errors
    ///
    /// [`MeshError::InvalidParameter`] if the distortion rate is negative or
    /// not finite, or the subdivided mesh does not fit in the index type.
    pub fn new(subdivision_degree: usize, distortion_rate: f64) -> Result<Self> {
        if !distortion_rate.is_finite() || distortion_rate < 0.0 {
            return Err(MeshError::invalid_param(
                "distortion_rate",
                distortion_rate,
                "must be finite and non-negative",
            ));
        }

        let mut base: IcosahedronMesh<I> = generate_icosahedron();
        let mut mesh = if subdivision_degree == 0 {
            base
        } else {
            subdivide(&mut base, subdivision_degree)?
        };
        face_order::correct_face_order(&mut mesh)?;

        log::debug!(
            "icosphere of degree {}: {} nodes, {} edges, {} faces",
            subdivision_degree,
            mesh.num_nodes(),
            mesh.num_edges(),
            mesh.num_faces()
        );

        Ok(Self {
            subdivision: subdivision_degree,
            distortion_rate,
            mesh,
        })
    }

    /// Subdivision degree the sphere was built with.
    pub fn subdivision(&self) -> usize {
        self.subdivision
    }

    /// Fraction of edges [`generate`](Self::generate) rotates.
    pub fn distortion_rate(&self) -> f64 {
        self.distortion_rate
    }

    /// Borrow the mesh.
    pub fn mesh(&self) -> &IcosahedronMesh<I> {
        &self.mesh
    }

    /// Take ownership of the mesh.
    pub fn into_mesh(self) -> IcosahedronMesh<I> {
        self.mesh
    }

    /// Rotate `degree` randomly chosen edges.
    ///
    /// Returns `Ok(false)` if the mesh ran out of rotatable edges first.
    /// Face lists are no longer in fan order afterwards; call
    /// [`correct_face_order`](Self::correct_face_order) before building tiles.
    pub fn distort_mesh<R: RandomSource + ?Sized>(&mut self, degree: usize, rng: &mut R) -> Result<bool> {
        distort::distort_mesh(&mut self.mesh, degree, rng)
    }

    /// Run one relaxation pass and return the total node displacement.
    pub fn relax_mesh(&mut self, multiplier: f64) -> f64 {
        self.relax_mesh_with_options(&RelaxOptions::default().with_multiplier(multiplier))
    }

    /// Run one relaxation pass with explicit options.
    pub fn relax_mesh_with_options(&mut self, options: &RelaxOptions) -> f64 {
        relax::relax_mesh(&mut self.mesh, options)
    }

    /// Restore fan order of every node's face list.
    pub fn correct_face_order(&mut self) -> Result<()> {
        face_order::correct_face_order(&mut self.mesh)
    }

    /// Run the planet pipeline on this sphere using its stored distortion rate.
    ///
    /// See [`planet::shape_planet`](crate::planet::shape_planet).
    pub fn generate<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> Result<PlanetSummary> {
        let options = PlanetOptions::new(self.subdivision)
            .with_distortion_rate(self.distortion_rate);
        shape_planet(self, &options, rng, &Progress::none())
    }

    pub(crate) fn mesh_mut(&mut self) -> &mut IcosahedronMesh<I> {
        &mut self.mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::face_order::is_fan_ordered;

    #[test]
    fn test_degree_zero_is_icosahedron() {
        let sphere: Icosphere = Icosphere::new(0, 0.0).unwrap();
        let mesh = sphere.mesh();
        assert_eq!((mesh.num_nodes(), mesh.num_edges(), mesh.num_faces()), (12, 30, 20));
        assert!(is_fan_ordered(mesh));
    }

    #[test]
    fn test_counts_and_accessors() {
        let sphere: Icosphere = Icosphere::new(5, 0.3).unwrap();
        assert_eq!(sphere.subdivision(), 5);
        assert_eq!(sphere.distortion_rate(), 0.3);
        let mesh = sphere.into_mesh();
        assert_eq!(mesh.num_faces(), 500);
        assert_eq!(mesh.num_edges(), 750);
        assert_eq!(mesh.num_nodes(), 252);
        mesh.validate().unwrap();
    }

    #[test]
    fn test_rejects_bad_distortion_rate() {
        for rate in [-0.1, f64::NAN, f64::INFINITY] {
            let err = Icosphere::<u32>::new(2, rate).unwrap_err();
            assert!(matches!(err, MeshError::InvalidParameter { name: "distortion_rate", .. }));
        }
    }

    #[test]
    fn test_index_capacity_is_checked() {
        assert!(Icosphere::<u16>::new(64, 0.0).is_err());
        assert!(Icosphere::<u16>::new(8, 0.0).is_ok());
    }

    #[test]
    fn test_distort_relax_correct_cycle() {
        let mut sphere: Icosphere = Icosphere::new(4, 0.0).unwrap();
        let mut rng = fastrand::Rng::with_seed(21);
        assert!(sphere.distort_mesh(20, &mut rng).unwrap());
        for _ in 0..10 {
            sphere.relax_mesh(0.5);
        }
        sphere.correct_face_order().unwrap();
        assert!(is_fan_ordered(sphere.mesh()));
        sphere.mesh().validate().unwrap();
    }

    #[test]
    fn test_sequential_relaxation() {
        let mut sphere: Icosphere = Icosphere::new(3, 0.0).unwrap();
        let shift = sphere.relax_mesh_with_options(&RelaxOptions::default().sequential());
        assert!(shift > 0.0);
    }

    #[test]
    fn test_generate_uses_stored_rate() {
        let mut sphere: Icosphere = Icosphere::new(4, 0.1).unwrap();
        let before: Vec<_> = sphere.mesh().edges().iter().map(|e| e.nodes).collect();
        let mut rng = fastrand::Rng::with_seed(8);
        let summary = sphere.generate(&mut rng).unwrap();
        assert!(summary.distortion_complete);
        let after: Vec<_> = sphere.mesh().edges().iter().map(|e| e.nodes).collect();
        assert_ne!(before, after);
        assert!(is_fan_ordered(sphere.mesh()));
    }
}
