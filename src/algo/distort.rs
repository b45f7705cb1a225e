//! Topology distortion by constrained edge rotation.
//!
//! A subdivided icosahedron is very regular: twelve valence-5 nodes and
//! every other node valence 6, arranged in long straight grid lines.
//! Distortion breaks that regularity by rotating ("flipping") randomly
//! chosen edges. Rotating an edge replaces the diagonal of the quad formed
//! by its two faces with the other diagonal:
//!
//! ```text
//!        new0                      new0
//!        /  \                      / | \
//!   old0 ---- old1    ==>      old0  |  old1
//!        \  /                      \ | /
//!        new1                      new1
//! ```
//!
//! Only topology changes; node positions are untouched. Each rotation is
//! checked by [`evaluate_rotation`] before it is applied, which keeps node
//! valences between 5 and 7 and rejects rotations that would create very
//! long, very short or folded triangles.

use std::fmt;

use crate::error::{MeshError, Result};
use crate::mesh::{EdgeId, FaceId, IcosahedronMesh, MeshIndex, Node, NodeId};
use crate::random::RandomSource;

/// Minimum cosine between the rotated edge and the new connecting edges.
const MIN_ROTATION_COSINE: f64 = 0.2;

/// Largest allowed ratio between the old and new edge lengths.
const MAX_LENGTH_RATIO: f64 = 2.0;

/// Why a candidate rotation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationRejection {
    /// A new endpoint would exceed 7 faces or an old endpoint drop below 5.
    Valence,
    /// Zero-length edge, coincident nodes, or the new edge already exists.
    Degenerate,
    /// The new edge would be more than twice or less than half the old length.
    LengthRatio,
    /// A resulting triangle would be nearly flat or folded over.
    Angle,
}

impl fmt::Display for RotationRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            RotationRejection::Valence => "valence limit",
            RotationRejection::Degenerate => "degenerate geometry",
            RotationRejection::LengthRatio => "edge length ratio",
            RotationRejection::Angle => "triangle angle",
        };
        f.write_str(reason)
    }
}

/// Decide whether the edge `old0-old1` may be rotated to `new0-new1`.
///
/// `old0`/`old1` are the current endpoints and `new0`/`new1` the far
/// corners of the two incident faces.
pub fn evaluate_rotation<I: MeshIndex>(
    old0: &Node<I>,
    old1: &Node<I>,
    new0: &Node<I>,
    new1: &Node<I>,
) -> std::result::Result<(), RotationRejection> {
    if new0.valence() >= 7 || new1.valence() >= 7 || old0.valence() <= 5 || old1.valence() <= 5 {
        return Err(RotationRejection::Valence);
    }

    let old_length = nalgebra::distance(&old0.position, &old1.position);
    if old_length == 0.0 {
        return Err(RotationRejection::Degenerate);
    }
    let new_length = nalgebra::distance(&new0.position, &new1.position);
    let ratio = old_length / new_length;
    if ratio >= MAX_LENGTH_RATIO || ratio <= 1.0 / MAX_LENGTH_RATIO {
        return Err(RotationRejection::LengthRatio);
    }

    let along = (old1.position - old0.position) / old_length;
    for (origin, direction) in [(old0, along), (old1, -along)] {
        for target in [new0, new1] {
            let to_target = (target.position - origin.position)
                .try_normalize(0.0)
                .ok_or(RotationRejection::Degenerate)?;
            if direction.dot(&to_target) < MIN_ROTATION_COSINE {
                return Err(RotationRejection::Angle);
            }
        }
    }

    Ok(())
}

/// Acceptance predicate used by [`distort_mesh`].
pub fn is_acceptable_rotation<I: MeshIndex>(
    old0: &Node<I>,
    old1: &Node<I>,
    new0: &Node<I>,
    new1: &Node<I>,
) -> bool {
    match evaluate_rotation(old0, old1, new0, new1) {
        Ok(()) => true,
        Err(reason) => {
            log::trace!("rotation rejected: {}", reason);
            false
        }
    }
}

/// Rotate `edge` if `predicate` accepts the rotation.
///
/// The predicate receives `(old0, old1, new0, new1)`. Returns `Ok(true)` if
/// the edge was rotated and `Ok(false)` if the predicate refused or the
/// rotation would duplicate an existing edge. On success the edge, both
/// faces, the two side edges that change faces and all four nodes are
/// updated together.
///
/// # Errors
///
/// [`MeshError::NonManifold`] or [`MeshError::Inconsistent`] if the
/// adjacency around `edge` is malformed. The mesh is not modified.
pub fn conditional_rotate_edge<I, P>(
    mesh: &mut IcosahedronMesh<I>,
    edge: EdgeId<I>,
    mut predicate: P,
) -> Result<bool>
where
    I: MeshIndex,
    P: FnMut(&Node<I>, &Node<I>, &Node<I>, &Node<I>) -> bool,
{
    let [f0, f1] = mesh.edge_faces(edge)?;
    let far0 = mesh.far_node_slot(f0, edge)?;
    let far1 = mesh.far_node_slot(f1, edge)?;
    let face0 = *mesh.face(f0);
    let face1 = *mesh.face(f1);

    let new0 = face0.nodes[far0];
    let old0 = face0.nodes[(far0 + 1) % 3];
    let new1 = face1.nodes[far1];
    let old1 = face1.nodes[(far1 + 1) % 3];

    // Consistent winding means each face holds the other's old endpoint in
    // its last slot.
    if face0.nodes[(far0 + 2) % 3] != old1 || face1.nodes[(far1 + 2) % 3] != old0 {
        return Err(MeshError::inconsistent(format!(
            "{} and {} traverse {} in the same direction",
            f0, f1, edge
        )));
    }

    // Side edges that swap faces: old0-new1 joins face 0, old1-new0 joins face 1.
    let side_to_face0 = face1.edges[(far1 + 2) % 3];
    let side_to_face1 = face0.edges[(far0 + 2) % 3];

    if new0 == new1 || already_connected(mesh, new0, new1) {
        log::trace!("rotation of {} rejected: {}", edge, RotationRejection::Degenerate);
        return Ok(false);
    }

    if !predicate(mesh.node(old0), mesh.node(old1), mesh.node(new0), mesh.node(new1)) {
        return Ok(false);
    }

    remove_id(&mut mesh.nodes[old0.index()].edges, edge)?;
    remove_id(&mut mesh.nodes[old1.index()].edges, edge)?;
    mesh.nodes[new0.index()].edges.push(edge);
    mesh.nodes[new1.index()].edges.push(edge);

    mesh.edges[edge.index()].nodes = [new0, new1];

    replace_face(mesh, side_to_face0, f1, f0)?;
    replace_face(mesh, side_to_face1, f0, f1)?;

    remove_id(&mut mesh.nodes[old0.index()].faces, f1)?;
    remove_id(&mut mesh.nodes[old1.index()].faces, f0)?;
    mesh.nodes[new0.index()].faces.push(f1);
    mesh.nodes[new1.index()].faces.push(f0);

    let face0 = &mut mesh.faces[f0.index()];
    face0.nodes[(far0 + 2) % 3] = new1;
    face0.edges[(far0 + 1) % 3] = side_to_face0;
    face0.edges[(far0 + 2) % 3] = edge;

    let face1 = &mut mesh.faces[f1.index()];
    face1.nodes[(far1 + 2) % 3] = new0;
    face1.edges[(far1 + 1) % 3] = side_to_face1;
    face1.edges[(far1 + 2) % 3] = edge;

    Ok(true)
}

fn already_connected<I: MeshIndex>(mesh: &IcosahedronMesh<I>, a: NodeId<I>, b: NodeId<I>) -> bool {
    mesh.node(a)
        .edges
        .iter()
        .any(|&e| mesh.edge(e).has_node(b))
}

fn remove_id<T: PartialEq + Copy + fmt::Debug>(list: &mut Vec<T>, id: T) -> Result<()> {
    let pos = list
        .iter()
        .position(|&x| x == id)
        .ok_or_else(|| MeshError::inconsistent(format!("{:?} missing from adjacency list", id)))?;
    list.remove(pos);
    Ok(())
}

fn replace_face<I: MeshIndex>(
    mesh: &mut IcosahedronMesh<I>,
    edge: EdgeId<I>,
    from: FaceId<I>,
    to: FaceId<I>,
) -> Result<()> {
    let faces = &mut mesh.edges[edge.index()].faces;
    remove_id(faces, from)?;
    faces.push(to);
    Ok(())
}

/// Perform `degree` successful random edge rotations.
///
/// Each rotation starts at an edge drawn uniformly from `rng`. If that edge
/// cannot be rotated the following edges are tried in index order, wrapping
/// around. Returns `Ok(false)` once a full sweep of every edge has failed:
/// the mesh accepts no more rotations. Rotations performed before that
/// point are kept.
///
/// # Example
///
/// ```
/// use icosphere::algo::distort::distort_mesh;
/// use icosphere::algo::subdivide::subdivide;
/// use icosphere::mesh::{generate_icosahedron, IcosahedronMesh};
///
/// let mut base: IcosahedronMesh = generate_icosahedron();
/// let mut mesh = subdivide(&mut base, 4).unwrap();
/// let mut rng = fastrand::Rng::with_seed(11);
///
/// assert!(distort_mesh(&mut mesh, 10, &mut rng).unwrap());
/// assert!(mesh.is_valid());
/// ```
pub fn distort_mesh<I, R>(mesh: &mut IcosahedronMesh<I>, degree: usize, rng: &mut R) -> Result<bool>
where
    I: MeshIndex,
    R: RandomSource + ?Sized,
{
    let num_edges = mesh.num_edges();
    if degree == 0 {
        return Ok(true);
    }
    if num_edges == 0 {
        return Ok(false);
    }

    for rotated in 0..degree {
        let mut failures = 0;
        let mut index = rng.integer_exclusive(0, num_edges);
        while !conditional_rotate_edge(mesh, EdgeId::new(index), is_acceptable_rotation::<I>)? {
            failures += 1;
            if failures >= num_edges {
                log::debug!(
                    "distortion exhausted after {} of {} rotations",
                    rotated,
                    degree
                );
                return Ok(false);
            }
            index = (index + 1) % num_edges;
        }
    }

    log::debug!("rotated {} edges", degree);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::face_order::{correct_face_order, is_fan_ordered};
    use crate::algo::subdivide::subdivide;
    use crate::mesh::generate_icosahedron;
    use nalgebra::Point3;

    /// Replays a fixed list of indices, then repeats the last one.
    struct Scripted(Vec<usize>);

    impl RandomSource for Scripted {
        fn integer_exclusive(&mut self, min: usize, max: usize) -> usize {
            let v = if self.0.len() > 1 { self.0.remove(0) } else { self.0[0] };
            min + v % (max - min)
        }
    }

    fn subdivided(degree: usize) -> IcosahedronMesh {
        let mut base = generate_icosahedron();
        subdivide(&mut base, degree).unwrap()
    }

    fn node_with(valence: usize, position: Point3<f64>) -> Node {
        let mut node = Node::new(position);
        node.faces = (0..valence).map(FaceId::new).collect();
        node
    }

    #[test]
    fn test_evaluate_rotation_accepts_square() {
        let old0 = node_with(6, Point3::new(-1.0, 0.0, 0.0));
        let old1 = node_with(6, Point3::new(1.0, 0.0, 0.0));
        let new0 = node_with(6, Point3::new(0.0, 1.0, 0.0));
        let new1 = node_with(6, Point3::new(0.0, -1.0, 0.0));
        assert_eq!(evaluate_rotation(&old0, &old1, &new0, &new1), Ok(()));
    }

    #[test]
    fn test_evaluate_rotation_valence_limits() {
        let old0 = node_with(6, Point3::new(-1.0, 0.0, 0.0));
        let old1 = node_with(6, Point3::new(1.0, 0.0, 0.0));
        let new0 = node_with(6, Point3::new(0.0, 1.0, 0.0));
        let new1 = node_with(6, Point3::new(0.0, -1.0, 0.0));

        let crowded = node_with(7, new0.position);
        assert_eq!(
            evaluate_rotation(&old0, &old1, &crowded, &new1),
            Err(RotationRejection::Valence)
        );

        let sparse = node_with(5, old0.position);
        assert_eq!(
            evaluate_rotation(&sparse, &old1, &new0, &new1),
            Err(RotationRejection::Valence)
        );
    }

    #[test]
    fn test_evaluate_rotation_length_ratio() {
        let old0 = node_with(6, Point3::new(-1.0, 0.0, 0.0));
        let old1 = node_with(6, Point3::new(1.0, 0.0, 0.0));
        // New diagonal is a quarter of the old one.
        let new0 = node_with(6, Point3::new(0.0, 0.25, 0.0));
        let new1 = node_with(6, Point3::new(0.0, -0.25, 0.0));
        assert_eq!(
            evaluate_rotation(&old0, &old1, &new0, &new1),
            Err(RotationRejection::LengthRatio)
        );
    }

    #[test]
    fn test_evaluate_rotation_angle() {
        let old0 = node_with(6, Point3::new(-1.0, 0.0, 0.0));
        let old1 = node_with(6, Point3::new(1.0, 0.0, 0.0));
        // new0 sits behind old0: the quad is not convex.
        let new0 = node_with(6, Point3::new(-1.5, 1.0, 0.0));
        let new1 = node_with(6, Point3::new(0.0, -1.0, 0.0));
        assert_eq!(
            evaluate_rotation(&old0, &old1, &new0, &new1),
            Err(RotationRejection::Angle)
        );
    }

    #[test]
    fn test_evaluate_rotation_zero_length_edge() {
        let p = Point3::new(1.0, 0.0, 0.0);
        let old0 = node_with(6, p);
        let old1 = node_with(6, p);
        let new0 = node_with(6, Point3::new(0.0, 1.0, 0.0));
        let new1 = node_with(6, Point3::new(0.0, -1.0, 0.0));
        assert_eq!(
            evaluate_rotation(&old0, &old1, &new0, &new1),
            Err(RotationRejection::Degenerate)
        );
    }

    #[test]
    fn test_unconditional_rotation_keeps_mesh_valid() {
        let mut mesh = subdivided(3);
        let edge = EdgeId::new(0);
        let [f0, f1] = mesh.edge_faces(edge).unwrap();
        let before = mesh.edge(edge).nodes;

        let rotated = conditional_rotate_edge(&mut mesh, edge, |_, _, _, _| true).unwrap();
        assert!(rotated);

        let after = mesh.edge(edge).nodes;
        assert!(!after.contains(&before[0]) && !after.contains(&before[1]));
        // Edge keeps its faces; both faces now contain the rotated edge.
        assert_eq!(mesh.edge_faces(edge).unwrap(), [f0, f1]);
        assert!(mesh.face(f0).edges.contains(&edge));
        assert!(mesh.face(f1).edges.contains(&edge));
        mesh.validate().unwrap();
    }

    #[test]
    fn test_rotating_twice_restores_endpoints() {
        let mut mesh = subdivided(3);
        let edge = EdgeId::new(5);
        let original = {
            let mut n = mesh.edge(edge).nodes;
            n.sort();
            n
        };
        conditional_rotate_edge(&mut mesh, edge, |_, _, _, _| true).unwrap();
        conditional_rotate_edge(&mut mesh, edge, |_, _, _, _| true).unwrap();
        let mut restored = mesh.edge(edge).nodes;
        restored.sort();
        assert_eq!(restored, original);
        mesh.validate().unwrap();
    }

    #[test]
    fn test_refused_rotation_changes_nothing() {
        let mut mesh = subdivided(2);
        let edge = EdgeId::new(3);
        let nodes_before = mesh.edge(edge).nodes;
        let faces_before = mesh.face(FaceId::new(0)).nodes;

        let rotated = conditional_rotate_edge(&mut mesh, edge, |_, _, _, _| false).unwrap();
        assert!(!rotated);
        assert_eq!(mesh.edge(edge).nodes, nodes_before);
        assert_eq!(mesh.face(FaceId::new(0)).nodes, faces_before);
    }

    #[test]
    fn test_distortion_preserves_counts_and_validity() {
        let mut mesh = subdivided(5);
        let positions = mesh.positions();
        let (v, e, f) = (mesh.num_nodes(), mesh.num_edges(), mesh.num_faces());

        let mut rng = fastrand::Rng::with_seed(42);
        assert!(distort_mesh(&mut mesh, 40, &mut rng).unwrap());

        assert_eq!((mesh.num_nodes(), mesh.num_edges(), mesh.num_faces()), (v, e, f));
        assert_eq!(mesh.euler_characteristic(), 2);
        assert_eq!(mesh.positions(), positions);
        mesh.validate().unwrap();
        for node in mesh.nodes() {
            assert!((5..=7).contains(&node.valence()));
        }
    }

    #[test]
    fn test_distortion_changes_topology() {
        let mut mesh = subdivided(4);
        let before: Vec<[NodeId; 2]> = mesh.edges().iter().map(|e| e.nodes).collect();
        let mut rng = fastrand::Rng::with_seed(3);
        assert!(distort_mesh(&mut mesh, 5, &mut rng).unwrap());
        let after: Vec<[NodeId; 2]> = mesh.edges().iter().map(|e| e.nodes).collect();
        assert_ne!(before, after);
    }

    #[test]
    fn test_face_order_recoverable_after_distortion() {
        let mut mesh = subdivided(4);
        let mut rng = fastrand::Rng::with_seed(9);
        distort_mesh(&mut mesh, 25, &mut rng).unwrap();
        correct_face_order(&mut mesh).unwrap();
        assert!(is_fan_ordered(&mesh));
    }

    #[test]
    fn test_icosahedron_cannot_be_distorted() {
        // Every node has valence 5, so no rotation is allowed.
        let mut mesh: IcosahedronMesh = generate_icosahedron();
        let mut rng = Scripted(vec![17]);
        assert!(!distort_mesh(&mut mesh, 1, &mut rng).unwrap());
        mesh.validate().unwrap();
    }

    #[test]
    fn test_zero_degree_is_noop() {
        let mut mesh: IcosahedronMesh = generate_icosahedron();
        let mut rng = Scripted(vec![0]);
        assert!(distort_mesh(&mut mesh, 0, &mut rng).unwrap());
    }

    #[test]
    fn test_malformed_edge_is_an_error() {
        let mut mesh = subdivided(2);
        mesh.edges[0].faces.pop();
        let mut rng = Scripted(vec![0]);
        assert!(distort_mesh(&mut mesh, 1, &mut rng).is_err());
    }
}
