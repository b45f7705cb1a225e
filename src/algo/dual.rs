//! Dual tiles: the polygonal cell around each node.
//!
//! Every node of the triangle mesh becomes one tile whose corners are the
//! centroids of the node's faces. Nodes of valence 5 give pentagons, 6
//! hexagons and 7 heptagons. The face lists must be in fan order (see
//! [`correct_face_order`](super::face_order::correct_face_order)).
//!
//! # Example
//!
//! ```
//! use icosphere::algo::dual::build_tiles;
//! use icosphere::algo::face_order::correct_face_order;
//! use icosphere::algo::subdivide::subdivide;
//! use icosphere::mesh::{generate_icosahedron, IcosahedronMesh};
//!
//! let mut base: IcosahedronMesh = generate_icosahedron();
//! let mut mesh = subdivide(&mut base, 3).unwrap();
//! correct_face_order(&mut mesh).unwrap();
//!
//! let tiles = build_tiles(&mesh).unwrap();
//! assert_eq!(tiles.len(), mesh.num_nodes());
//! assert_eq!(tiles.iter().filter(|t| t.is_pentagon()).count(), 12);
//! ```

use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::{IcosahedronMesh, MeshIndex, NodeId};

/// The cell around one node.
#[derive(Debug, Clone)]
pub struct Tile<I: MeshIndex = u32> {
    /// Node this tile is centred on.
    pub node: NodeId<I>,

    /// Position of that node.
    pub position: Point3<f64>,

    /// Face centroids, in fan order.
    pub corners: Vec<Point3<f64>>,

    /// `neighbors[j]` lies across the edge shared by fan faces `j` and `j + 1`.
    pub neighbors: Vec<NodeId<I>>,
}

impl<I: MeshIndex> Tile<I> {
    /// Number of corners.
    pub fn num_corners(&self) -> usize {
        self.corners.len()
    }

    /// Check if the tile has five corners.
    pub fn is_pentagon(&self) -> bool {
        self.corners.len() == 5
    }

    /// Check if the tile has six corners.
    pub fn is_hexagon(&self) -> bool {
        self.corners.len() == 6
    }

    /// Flat area of the triangle fan around the tile centre.
    pub fn area(&self) -> f64 {
        let n = self.corners.len();
        (0..n)
            .map(|j| {
                let a = self.corners[j] - self.position;
                let b = self.corners[(j + 1) % n] - self.position;
                0.5 * a.cross(&b).norm()
            })
            .sum()
    }
}

/// Build one tile per node, indexed by node.
///
/// # Errors
///
/// [`MeshError::Inconsistent`] if a node's face list is not a closed fan.
pub fn build_tiles<I: MeshIndex>(mesh: &IcosahedronMesh<I>) -> Result<Vec<Tile<I>>> {
    let centroids = mesh.face_centroids();
    mesh.node_ids()
        .map(|node| build_tile(mesh, node, &centroids))
        .collect()
}

fn build_tile<I: MeshIndex>(
    mesh: &IcosahedronMesh<I>,
    node: NodeId<I>,
    centroids: &[Point3<f64>],
) -> Result<Tile<I>> {
    let faces = &mesh.node(node).faces;
    let len = faces.len();
    let mut neighbors = Vec::with_capacity(len);

    for (j, &face) in faces.iter().enumerate() {
        let slot = mesh.node_slot_in_face(face, node)?;
        let edge = mesh.face(face).edges[(slot + 2) % 3];
        let next = faces[(j + 1) % len];
        if mesh.opposite_face(edge, face)? != next {
            return Err(MeshError::inconsistent(format!(
                "faces of {} are not in fan order at position {}",
                node, j
            )));
        }
        let neighbor = mesh.edge(edge).other_node(node).ok_or_else(|| {
            MeshError::inconsistent(format!("{} does not touch {}", edge, node))
        })?;
        neighbors.push(neighbor);
    }

    Ok(Tile {
        node,
        position: *mesh.position(node),
        corners: faces.iter().map(|f| centroids[f.index()]).collect(),
        neighbors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::face_order::correct_face_order;
    use crate::algo::subdivide::subdivide;
    use crate::mesh::generate_icosahedron;
    use std::f64::consts::PI;

    fn ordered(degree: usize) -> IcosahedronMesh {
        let mut base = generate_icosahedron();
        let mut mesh = subdivide(&mut base, degree).unwrap();
        correct_face_order(&mut mesh).unwrap();
        mesh
    }

    #[test]
    fn test_tile_census() {
        let mesh = ordered(4);
        let tiles = build_tiles(&mesh).unwrap();
        assert_eq!(tiles.iter().filter(|t| t.is_pentagon()).count(), 12);
        assert_eq!(tiles.iter().filter(|t| t.is_hexagon()).count(), mesh.num_nodes() - 12);

        let corners: usize = tiles.iter().map(|t| t.num_corners()).sum();
        assert_eq!(corners, 3 * mesh.num_faces());
    }

    #[test]
    fn test_neighbors_are_adjacent() {
        let mesh = ordered(3);
        let tiles = build_tiles(&mesh).unwrap();
        for tile in &tiles {
            assert_eq!(tile.neighbors.len(), tile.corners.len());
            for &n in &tile.neighbors {
                assert_ne!(n, tile.node);
                // Adjacency is symmetric.
                assert!(tiles[n.index()].neighbors.contains(&tile.node));
            }
        }
    }

    #[test]
    fn test_icosahedron_tiles_are_regular() {
        let mesh = ordered(1);
        let tiles = build_tiles(&mesh).unwrap();
        let first = tiles[0].area();
        for tile in &tiles {
            assert!(tile.is_pentagon());
            assert!((tile.area() - first).abs() < 1e-12);
        }
    }

    #[test]
    fn test_total_area_approaches_sphere() {
        let mesh = ordered(4);
        let total: f64 = build_tiles(&mesh).unwrap().iter().map(|t| t.area()).sum();
        let sphere = 4.0 * PI;
        assert!(total < sphere);
        assert!(total > 0.98 * sphere, "total {}", total);
    }

    #[test]
    fn test_unordered_fan_is_reported() {
        let mut mesh = ordered(2);
        mesh.nodes[0].faces.swap(0, 1);
        let err = build_tiles(&mesh).unwrap_err();
        assert!(matches!(err, MeshError::Inconsistent { .. }));
    }
}
