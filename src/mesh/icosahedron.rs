//! The regular icosahedron every sphere starts from.

use nalgebra::Point3;

use super::index::{EdgeId, MeshIndex, NodeId};
use super::topology::IcosahedronMesh;

/// Number of nodes in the base icosahedron.
pub const ICOSAHEDRON_NODES: usize = 12;
/// Number of edges in the base icosahedron.
pub const ICOSAHEDRON_EDGES: usize = 30;
/// Number of faces in the base icosahedron.
pub const ICOSAHEDRON_FACES: usize = 20;

#[rustfmt::skip]
const EDGES: [[usize; 2]; ICOSAHEDRON_EDGES] = [
    [0, 1], [0, 4], [0, 5], [0, 8], [0, 10], [1, 6], [1, 7], [1, 8],
    [1, 10], [2, 3], [2, 4], [2, 5], [2, 9], [2, 11], [3, 6], [3, 7],
    [3, 9], [3, 11], [4, 5], [4, 8], [4, 9], [5, 10], [5, 11], [6, 7],
    [6, 8], [6, 9], [7, 10], [7, 11], [8, 9], [10, 11],
];

// (nodes, edges) with edges[i] joining nodes[i] and nodes[(i + 1) % 3].
const FACES: [([usize; 3], [usize; 3]); ICOSAHEDRON_FACES] = [
    ([0, 1, 8], [0, 7, 3]),
    ([0, 4, 5], [1, 18, 2]),
    ([0, 5, 10], [2, 21, 4]),
    ([0, 8, 4], [3, 19, 1]),
    ([0, 10, 1], [4, 8, 0]),
    ([1, 6, 8], [5, 24, 7]),
    ([1, 7, 6], [6, 23, 5]),
    ([1, 10, 7], [8, 26, 6]),
    ([2, 3, 11], [9, 17, 13]),
    ([2, 4, 9], [10, 20, 12]),
    ([2, 5, 4], [11, 18, 10]),
    ([2, 9, 3], [12, 16, 9]),
    ([2, 11, 5], [13, 22, 11]),
    ([3, 6, 7], [14, 23, 15]),
    ([3, 7, 11], [15, 27, 17]),
    ([3, 9, 6], [16, 25, 14]),
    ([4, 8, 9], [19, 28, 20]),
    ([5, 11, 10], [22, 29, 21]),
    ([6, 9, 8], [25, 28, 24]),
    ([7, 10, 11], [26, 29, 27]),
];

/// Golden-ratio coordinates `(du, dv)` that place the icosahedron's
/// vertices on the unit sphere.
fn unit_coordinates() -> (f64, f64) {
    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let du = 1.0 / (phi * phi + 1.0).sqrt();
    (du, phi * du)
}

/// Build the regular icosahedron inscribed in the unit sphere.
///
/// The result has 12 nodes, 30 edges and 20 faces, with every node, edge
/// and face back-reference populated. Each node has five edges and five
/// faces; the face lists are not yet in fan order.
///
/// # Example
///
/// ```
/// use icosphere::mesh::{generate_icosahedron, IcosahedronMesh};
///
/// let mesh: IcosahedronMesh = generate_icosahedron();
/// assert_eq!(mesh.num_nodes(), 12);
/// assert_eq!(mesh.num_edges(), 30);
/// assert_eq!(mesh.num_faces(), 20);
/// ```
pub fn generate_icosahedron<I: MeshIndex>() -> IcosahedronMesh<I> {
    let (du, dv) = unit_coordinates();
    let positions = [
        Point3::new(0.0, dv, du),
        Point3::new(0.0, dv, -du),
        Point3::new(0.0, -dv, du),
        Point3::new(0.0, -dv, -du),
        Point3::new(du, 0.0, dv),
        Point3::new(-du, 0.0, dv),
        Point3::new(du, 0.0, -dv),
        Point3::new(-du, 0.0, -dv),
        Point3::new(dv, du, 0.0),
        Point3::new(dv, -du, 0.0),
        Point3::new(-dv, du, 0.0),
        Point3::new(-dv, -du, 0.0),
    ];

    let mut mesh = IcosahedronMesh::with_capacity(ICOSAHEDRON_NODES, ICOSAHEDRON_EDGES, ICOSAHEDRON_FACES);
    for p in positions {
        mesh.add_node(p);
    }
    for [a, b] in EDGES {
        mesh.add_edge(NodeId::new(a), NodeId::new(b));
    }
    for (nodes, edges) in FACES {
        mesh.add_face(nodes.map(NodeId::new), edges.map(EdgeId::new));
    }
    mesh
}
