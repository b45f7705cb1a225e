//! Cyclic ordering of each node's incident faces.
//!
//! Construction appends faces to a node's list in whatever order they are
//! created, and edge rotations add and remove entries. Anything that walks
//! around a node (dual tiles, per-node cell construction) needs the faces
//! as a fan: consecutive entries share an edge incident to the node, and
//! the last entry wraps around to the first.
//!
//! The next face in a fan is found across the edge `e[(k + 2) % 3]` of the
//! current face, where `k` is the node's slot in that face. Because all
//! faces are wound consistently this always steps around the node in the
//! same rotational direction.

use crate::error::{MeshError, Result};
use crate::mesh::{FaceId, IcosahedronMesh, MeshIndex, NodeId};

/// The face after `face` in the fan around `node`.
///
/// # Errors
///
/// [`MeshError::Inconsistent`] if `node` is not a corner of `face` or the
/// stepping edge does not have `face` as one of exactly two faces.
pub fn next_fan_face<I: MeshIndex>(
    mesh: &IcosahedronMesh<I>,
    node: NodeId<I>,
    face: FaceId<I>,
) -> Result<FaceId<I>> {
    let slot = mesh.node_slot_in_face(face, node)?;
    let edge = mesh.face(face).edges[(slot + 2) % 3];
    mesh.opposite_face(edge, face)
}

/// Reorder every node's face list into fan order, in place.
///
/// The walk around each node is bounded by the length of its face list, so
/// it terminates on any input. A lookup failure, a fan that revisits a face
/// or a fan that does not close is reported as an error rather than leaving
/// a silently wrong order behind.
///
/// # Example
///
/// ```
/// use icosphere::algo::face_order::{correct_face_order, is_fan_ordered};
/// use icosphere::algo::subdivide::subdivide;
/// use icosphere::mesh::{generate_icosahedron, IcosahedronMesh};
///
/// let mut base: IcosahedronMesh = generate_icosahedron();
/// let mut mesh = subdivide(&mut base, 2).unwrap();
/// correct_face_order(&mut mesh).unwrap();
/// assert!(is_fan_ordered(&mesh));
/// ```
pub fn correct_face_order<I: MeshIndex>(mesh: &mut IcosahedronMesh<I>) -> Result<()> {
    for i in 0..mesh.num_nodes() {
        let node = NodeId::new(i);
        let mut faces = std::mem::take(&mut mesh.nodes[i].faces);
        let result = order_fan(mesh, node, &mut faces);
        mesh.nodes[i].faces = faces;
        result?;
    }
    Ok(())
}

fn order_fan<I: MeshIndex>(
    mesh: &IcosahedronMesh<I>,
    node: NodeId<I>,
    faces: &mut [FaceId<I>],
) -> Result<()> {
    let len = faces.len();
    if len < 3 {
        return Err(MeshError::non_manifold(format!(
            "{} has only {} incident faces",
            node, len
        )));
    }

    let mut current = faces[0];
    for j in 1..len - 1 {
        current = next_fan_face(mesh, node, current)?;
        let k = faces[j..]
            .iter()
            .position(|&f| f == current)
            .map(|offset| offset + j)
            .ok_or_else(|| {
                MeshError::inconsistent(format!(
                    "fan around {} reaches {} which is not among its remaining faces",
                    node, current
                ))
            })?;
        faces.swap(j, k);
    }

    let last = faces[len - 1];
    if next_fan_face(mesh, node, last)? != faces[0] {
        return Err(MeshError::non_manifold(format!(
            "fan around {} does not close",
            node
        )));
    }
    Ok(())
}

/// Check whether every node's face list is in fan order.
pub fn is_fan_ordered<I: MeshIndex>(mesh: &IcosahedronMesh<I>) -> bool {
    mesh.node_ids().all(|n| {
        let faces = &mesh.node(n).faces;
        let len = faces.len();
        len >= 3
            && (0..len).all(|j| {
                matches!(next_fan_face(mesh, n, faces[j]), Ok(f) if f == faces[(j + 1) % len])
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::subdivide::subdivide;
    use crate::mesh::generate_icosahedron;

    fn corrected(degree: usize) -> IcosahedronMesh {
        let mut base = generate_icosahedron();
        let mut mesh = subdivide(&mut base, degree).unwrap();
        correct_face_order(&mut mesh).unwrap();
        mesh
    }

    #[test]
    fn test_icosahedron_fans() {
        let mut mesh: IcosahedronMesh = generate_icosahedron();
        correct_face_order(&mut mesh).unwrap();
        assert!(is_fan_ordered(&mesh));
    }

    #[test]
    fn test_subdivided_fans() {
        for d in 1..=5 {
            let mesh = corrected(d);
            assert!(is_fan_ordered(&mesh), "degree {}", d);
            mesh.validate().unwrap();
        }
    }

    #[test]
    fn test_consecutive_faces_share_node_edge() {
        let mesh = corrected(3);
        for n in mesh.node_ids() {
            let faces = &mesh.node(n).faces;
            let len = faces.len();
            let mut seen = std::collections::HashSet::new();
            for j in 0..len {
                assert!(seen.insert(faces[j]));
                let a = mesh.face(faces[j]);
                let b = mesh.face(faces[(j + 1) % len]);
                let shared = a
                    .edges
                    .iter()
                    .filter(|e| b.edges.contains(e))
                    .any(|&e| mesh.edge(e).has_node(n));
                assert!(shared, "{:?} faces {} and {} are not adjacent", n, j, j + 1);
            }
        }
    }

    #[test]
    fn test_order_preserves_face_set() {
        let mut base: IcosahedronMesh = generate_icosahedron();
        let mut mesh = subdivide(&mut base, 3).unwrap();
        let before: Vec<Vec<FaceId>> = mesh
            .nodes()
            .iter()
            .map(|n| {
                let mut f = n.faces.clone();
                f.sort();
                f
            })
            .collect();

        correct_face_order(&mut mesh).unwrap();

        for (node, mut expected) in mesh.nodes().iter().zip(before) {
            let mut after = node.faces.clone();
            after.sort();
            expected.sort();
            assert_eq!(after, expected);
        }
    }

    #[test]
    fn test_correction_is_idempotent() {
        let mut mesh = corrected(2);
        let first: Vec<Vec<FaceId>> = mesh.nodes().iter().map(|n| n.faces.clone()).collect();
        correct_face_order(&mut mesh).unwrap();
        let second: Vec<Vec<FaceId>> = mesh.nodes().iter().map(|n| n.faces.clone()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_mesh_is_reported() {
        let mut mesh: IcosahedronMesh = generate_icosahedron();
        // Detach a face from one of its edges.
        let e = mesh.faces[0].edges[0];
        mesh.edges[e.index()].faces.retain(|&f| f != FaceId::new(0));

        assert!(correct_face_order(&mut mesh).is_err());
    }

    #[test]
    fn test_next_fan_face_rejects_foreign_node() {
        let mesh: IcosahedronMesh = generate_icosahedron();
        // Node 11 is not a corner of face 0 (nodes 0, 1, 8).
        assert!(next_fan_face(&mesh, NodeId::new(11), FaceId::new(0)).is_err());
    }
}
