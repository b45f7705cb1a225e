//! Index-based triangle mesh topology.
//!
//! An [`IcosahedronMesh`] stores three flat arrays (nodes, edges and faces)
//! that refer to each other only through typed indices. Every element keeps
//! back-references to the elements incident to it:
//!
//! - a [`Node`] knows its incident edges and faces,
//! - an [`Edge`] knows its two endpoints and its incident faces,
//! - a [`Face`] knows its three nodes and three edges.
//!
//! # Face Layout
//!
//! Face edge `e[i]` joins nodes `n[i]` and `n[(i + 1) % 3]`, and all faces are
//! wound the same way, so the two faces sharing an edge traverse it in
//! opposite directions. The distortion and face-ordering passes rely on this
//! layout; [`IcosahedronMesh::validate`] checks it.
//!
//! Elements are only ever appended, never removed, so an index handed out
//! once stays valid for the lifetime of the mesh.

use std::collections::HashSet;

use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};

use super::index::{EdgeId, FaceId, MeshIndex, NodeId};

/// A node (vertex) of the sphere mesh.
#[derive(Debug, Clone)]
pub struct Node<I: MeshIndex = u32> {
    /// Position on the unit sphere.
    pub position: Point3<f64>,

    /// Edges incident to this node (unordered).
    pub edges: Vec<EdgeId<I>>,

    /// Faces incident to this node. Cyclic fan order once the face-order
    /// pass has run.
    pub faces: Vec<FaceId<I>>,
}

impl<I: MeshIndex> Node<I> {
    /// Create a node with no incident elements.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            edges: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Number of incident faces.
    #[inline]
    pub fn valence(&self) -> usize {
        self.faces.len()
    }
}

/// Ordered output of splitting one edge, kept on the edge while the faces
/// on either side are subdivided.
#[derive(Debug, Clone, Default)]
pub struct EdgeSubdivision<I: MeshIndex = u32> {
    /// Interior nodes from `n[0]` towards `n[1]`.
    pub nodes: Vec<NodeId<I>>,

    /// Sub-edges from `n[0]` towards `n[1]`.
    pub edges: Vec<EdgeId<I>>,
}

/// An undirected edge between two nodes.
#[derive(Debug, Clone)]
pub struct Edge<I: MeshIndex = u32> {
    /// The two endpoints.
    pub nodes: [NodeId<I>; 2],

    /// Faces incident to this edge.
    pub faces: Vec<FaceId<I>>,

    /// Subdivision scratch; only present during a subdivision pass.
    pub subdivision: Option<EdgeSubdivision<I>>,
}

impl<I: MeshIndex> Edge<I> {
    /// Create an edge with no incident faces.
    pub fn new(n0: NodeId<I>, n1: NodeId<I>) -> Self {
        Self {
            nodes: [n0, n1],
            faces: Vec::with_capacity(2),
            subdivision: None,
        }
    }

    /// Check whether `node` is one of the endpoints.
    #[inline]
    pub fn has_node(&self, node: NodeId<I>) -> bool {
        self.nodes[0] == node || self.nodes[1] == node
    }

    /// The endpoint that is not `node`.
    pub fn other_node(&self, node: NodeId<I>) -> Option<NodeId<I>> {
        if self.nodes[0] == node {
            Some(self.nodes[1])
        } else if self.nodes[1] == node {
            Some(self.nodes[0])
        } else {
            None
        }
    }
}

/// A triangular face.
#[derive(Debug, Clone, Copy)]
pub struct Face<I: MeshIndex = u32> {
    /// The three corner nodes.
    pub nodes: [NodeId<I>; 3],

    /// The three edges; `edges[i]` joins `nodes[i]` and `nodes[(i + 1) % 3]`.
    pub edges: [EdgeId<I>; 3],
}

impl<I: MeshIndex> Face<I> {
    /// Create a face from its nodes and edges.
    pub fn new(nodes: [NodeId<I>; 3], edges: [EdgeId<I>; 3]) -> Self {
        Self { nodes, edges }
    }

    /// Slot (0..3) of `node` in this face.
    #[inline]
    pub fn node_slot(&self, node: NodeId<I>) -> Option<usize> {
        self.nodes.iter().position(|&n| n == node)
    }

    /// Slot of the corner that is not an endpoint of `edge`.
    #[inline]
    pub fn far_node_slot(&self, edge: &Edge<I>) -> Option<usize> {
        self.nodes.iter().position(|&n| !edge.has_node(n))
    }
}

/// Triangle mesh of the unit sphere with full adjacency.
#[derive(Debug, Clone)]
pub struct IcosahedronMesh<I: MeshIndex = u32> {
    pub(crate) nodes: Vec<Node<I>>,
    pub(crate) edges: Vec<Edge<I>>,
    pub(crate) faces: Vec<Face<I>>,
}

impl<I: MeshIndex> Default for IcosahedronMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> IcosahedronMesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_nodes: usize, num_edges: usize, num_faces: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(num_nodes),
            edges: Vec::with_capacity(num_edges),
            faces: Vec::with_capacity(num_faces),
        }
    }

    // ==================== Accessors ====================

    /// Get the number of nodes.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Get the number of edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get a node by ID.
    #[inline]
    pub fn node(&self, id: NodeId<I>) -> &Node<I> {
        &self.nodes[id.index()]
    }

    /// Get an edge by ID.
    #[inline]
    pub fn edge(&self, id: EdgeId<I>) -> &Edge<I> {
        &self.edges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        &self.faces[id.index()]
    }

    /// Get the position of a node.
    #[inline]
    pub fn position(&self, id: NodeId<I>) -> &Point3<f64> {
        &self.node(id).position
    }

    /// Number of faces incident to a node.
    #[inline]
    pub fn valence(&self, id: NodeId<I>) -> usize {
        self.node(id).valence()
    }

    /// All nodes as a slice.
    #[inline]
    pub fn nodes(&self) -> &[Node<I>] {
        &self.nodes
    }

    /// All edges as a slice.
    #[inline]
    pub fn edges(&self) -> &[Edge<I>] {
        &self.edges
    }

    /// All faces as a slice.
    #[inline]
    pub fn faces(&self) -> &[Face<I>] {
        &self.faces
    }

    /// Iterate over all node IDs.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId<I>> + '_ {
        (0..self.nodes.len()).map(NodeId::new)
    }

    /// Iterate over all edge IDs.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId<I>> + '_ {
        (0..self.edges.len()).map(EdgeId::new)
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// `V - E + F`; 2 for a closed sphere.
    pub fn euler_characteristic(&self) -> i64 {
        self.nodes.len() as i64 - self.edges.len() as i64 + self.faces.len() as i64
    }

    // ==================== Construction ====================

    /// Append a node with no incident elements.
    pub fn add_node(&mut self, position: Point3<f64>) -> NodeId<I> {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node::new(position));
        id
    }

    /// Append an edge and register it with both endpoints.
    pub fn add_edge(&mut self, n0: NodeId<I>, n1: NodeId<I>) -> EdgeId<I> {
        let id = EdgeId::new(self.edges.len());
        self.nodes[n0.index()].edges.push(id);
        self.nodes[n1.index()].edges.push(id);
        self.edges.push(Edge::new(n0, n1));
        id
    }

    /// Append a face and register it with its nodes and edges.
    pub fn add_face(&mut self, nodes: [NodeId<I>; 3], edges: [EdgeId<I>; 3]) -> FaceId<I> {
        let id = FaceId::new(self.faces.len());
        for n in nodes {
            self.nodes[n.index()].faces.push(id);
        }
        for e in edges {
            self.edges[e.index()].faces.push(id);
        }
        self.faces.push(Face::new(nodes, edges));
        id
    }

    // ==================== Adjacency Lookups ====================

    /// Slot of `node` within `face`.
    pub fn node_slot_in_face(&self, face: FaceId<I>, node: NodeId<I>) -> Result<usize> {
        self.face(face).node_slot(node).ok_or_else(|| {
            MeshError::inconsistent(format!("{} is not a corner of {}", node, face))
        })
    }

    /// Slot of the corner of `face` that does not lie on `edge`.
    pub fn far_node_slot(&self, face: FaceId<I>, edge: EdgeId<I>) -> Result<usize> {
        self.face(face)
            .far_node_slot(self.edge(edge))
            .ok_or_else(|| MeshError::inconsistent(format!("{} has no corner off {}", face, edge)))
    }

    /// The face on the other side of `edge` from `face`.
    pub fn opposite_face(&self, edge: EdgeId<I>, face: FaceId<I>) -> Result<FaceId<I>> {
        match self.edge(edge).faces.as_slice() {
            [f0, f1] if *f0 == face => Ok(*f1),
            [f0, f1] if *f1 == face => Ok(*f0),
            faces => Err(MeshError::inconsistent(format!(
                "{} does not separate {} from another face (faces: {:?})",
                edge, face, faces
            ))),
        }
    }

    /// Both incident faces of `edge`.
    pub fn edge_faces(&self, edge: EdgeId<I>) -> Result<[FaceId<I>; 2]> {
        match self.edge(edge).faces.as_slice() {
            [f0, f1] => Ok([*f0, *f1]),
            faces => Err(MeshError::non_manifold(format!(
                "{} has {} incident faces",
                edge,
                faces.len()
            ))),
        }
    }

    // ==================== Geometry ====================

    /// Positions of the three corners of a face.
    pub fn face_positions(&self, f: FaceId<I>) -> [Point3<f64>; 3] {
        let [n0, n1, n2] = self.face(f).nodes;
        [*self.position(n0), *self.position(n1), *self.position(n2)]
    }

    /// Face centroid projected onto the unit sphere.
    pub fn face_centroid(&self, f: FaceId<I>) -> Point3<f64> {
        let [p0, p1, p2] = self.face_positions(f);
        Point3::from(triangle_centroid(&p0, &p1, &p2).coords.normalize())
    }

    /// Sphere-projected centroid of every face, indexed by face.
    pub fn face_centroids(&self) -> Vec<Point3<f64>> {
        self.face_ids().map(|f| self.face_centroid(f)).collect()
    }

    /// Flat (chordal) area of a face.
    pub fn face_area(&self, f: FaceId<I>) -> f64 {
        let [p0, p1, p2] = self.face_positions(f);
        0.5 * (p1 - p0).cross(&(p2 - p0)).norm()
    }

    /// Unit normal of a face, following its winding.
    pub fn face_normal(&self, f: FaceId<I>) -> Vector3<f64> {
        let [p0, p1, p2] = self.face_positions(f);
        (p1 - p0).cross(&(p2 - p0)).normalize()
    }

    /// Sum of flat face areas.
    pub fn surface_area(&self) -> f64 {
        self.face_ids().map(|f| self.face_area(f)).sum()
    }

    /// Chord length of an edge.
    pub fn edge_length(&self, e: EdgeId<I>) -> f64 {
        let [n0, n1] = self.edge(e).nodes;
        nalgebra::distance(self.position(n0), self.position(n1))
    }

    /// Positions of every node, indexed by node.
    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.nodes.iter().map(|n| n.position).collect()
    }

    // ==================== Validation ====================

    /// Check every topological invariant of a closed sphere mesh.
    ///
    /// Verifies the Euler characteristic, that each edge joins two distinct
    /// nodes and touches exactly two faces, that face edges match face
    /// corners, that winding is consistent, and that every back-reference
    /// is present exactly once.
    pub fn validate(&self) -> Result<()> {
        if self.faces.is_empty() {
            return Err(MeshError::EmptyMesh);
        }

        let euler = self.euler_characteristic();
        if euler != 2 {
            return Err(MeshError::EulerCharacteristic {
                expected: 2,
                actual: euler,
            });
        }

        for (i, edge) in self.edges.iter().enumerate() {
            let eid = EdgeId::<I>::new(i);
            let [n0, n1] = edge.nodes;
            if n0 == n1 {
                return Err(MeshError::non_manifold(format!("{} is a loop at {}", eid, n0)));
            }
            if edge.faces.len() != 2 || edge.faces[0] == edge.faces[1] {
                return Err(MeshError::non_manifold(format!(
                    "{} has faces {:?}",
                    eid, edge.faces
                )));
            }
            for &f in &edge.faces {
                if !self.face(f).edges.contains(&eid) {
                    return Err(MeshError::inconsistent(format!(
                        "{} lists {} but the face does not list the edge",
                        eid, f
                    )));
                }
            }
            for n in edge.nodes {
                if !self.node(n).edges.contains(&eid) {
                    return Err(MeshError::inconsistent(format!(
                        "{} is missing from the edge list of {}",
                        eid, n
                    )));
                }
            }
        }

        let mut directed: HashSet<(NodeId<I>, NodeId<I>)> = HashSet::with_capacity(self.faces.len() * 3);
        for (i, face) in self.faces.iter().enumerate() {
            let fid = FaceId::<I>::new(i);
            for k in 0..3 {
                let a = face.nodes[k];
                let b = face.nodes[(k + 1) % 3];
                let edge = self.edge(face.edges[k]);
                if !(edge.has_node(a) && edge.has_node(b)) {
                    return Err(MeshError::inconsistent(format!(
                        "{} slot {} holds {} which does not join {} and {}",
                        fid, k, face.edges[k], a, b
                    )));
                }
                if !directed.insert((a, b)) {
                    return Err(MeshError::non_manifold(format!(
                        "directed edge {} -> {} appears twice (inconsistent winding at {})",
                        a, b, fid
                    )));
                }
                if !self.node(a).faces.contains(&fid) {
                    return Err(MeshError::inconsistent(format!(
                        "{} is missing from the face list of {}",
                        fid, a
                    )));
                }
            }
        }

        let mut edge_refs = 0usize;
        let mut face_refs = 0usize;
        for (i, node) in self.nodes.iter().enumerate() {
            let nid = NodeId::<I>::new(i);
            if has_duplicates(&node.edges) || has_duplicates(&node.faces) {
                return Err(MeshError::inconsistent(format!(
                    "{} lists an incident element twice",
                    nid
                )));
            }
            if node.edges.len() != node.faces.len() || node.faces.len() < 3 {
                return Err(MeshError::non_manifold(format!(
                    "{} has {} edges and {} faces",
                    nid,
                    node.edges.len(),
                    node.faces.len()
                )));
            }
            if let Some(&e) = node.edges.iter().find(|&&e| !self.edge(e).has_node(nid)) {
                return Err(MeshError::inconsistent(format!("{} lists foreign {}", nid, e)));
            }
            if let Some(&f) = node.faces.iter().find(|&&f| self.face(f).node_slot(nid).is_none()) {
                return Err(MeshError::inconsistent(format!("{} lists foreign {}", nid, f)));
            }
            edge_refs += node.edges.len();
            face_refs += node.faces.len();
        }

        if edge_refs != 2 * self.edges.len() || face_refs != 3 * self.faces.len() {
            return Err(MeshError::inconsistent(format!(
                "back-reference totals {}/{} do not match {} edges and {} faces",
                edge_refs,
                face_refs,
                self.edges.len(),
                self.faces.len()
            )));
        }

        Ok(())
    }

    /// Check if the mesh satisfies every invariant checked by [`validate`](Self::validate).
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Arithmetic mean of three points.
#[inline]
pub fn triangle_centroid(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> Point3<f64> {
    Point3::from((p0.coords + p1.coords + p2.coords) / 3.0)
}

fn has_duplicates<T: Eq + std::hash::Hash + Copy>(items: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(items.len());
    items.iter().any(|&x| !seen.insert(x))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tetrahedron with consistent winding, built through the public API.
    fn create_tetrahedron() -> IcosahedronMesh {
        let mut mesh = IcosahedronMesh::new();
        let s = 1.0 / 3.0_f64.sqrt();
        let n: Vec<NodeId> = [
            Point3::new(s, s, s),
            Point3::new(s, -s, -s),
            Point3::new(-s, s, -s),
            Point3::new(-s, -s, s),
        ]
        .into_iter()
        .map(|p| mesh.add_node(p))
        .collect();

        let e01 = mesh.add_edge(n[0], n[1]);
        let e02 = mesh.add_edge(n[0], n[2]);
        let e03 = mesh.add_edge(n[0], n[3]);
        let e12 = mesh.add_edge(n[1], n[2]);
        let e13 = mesh.add_edge(n[1], n[3]);
        let e23 = mesh.add_edge(n[2], n[3]);

        mesh.add_face([n[0], n[1], n[2]], [e01, e12, e02]);
        mesh.add_face([n[0], n[3], n[1]], [e03, e13, e01]);
        mesh.add_face([n[0], n[2], n[3]], [e02, e23, e03]);
        mesh.add_face([n[1], n[3], n[2]], [e13, e23, e12]);
        mesh
    }

    #[test]
    fn test_tetrahedron_is_valid() {
        let mesh = create_tetrahedron();
        assert_eq!(mesh.num_nodes(), 4);
        assert_eq!(mesh.num_edges(), 6);
        assert_eq!(mesh.num_faces(), 4);
        assert_eq!(mesh.euler_characteristic(), 2);
        mesh.validate().unwrap();
    }

    #[test]
    fn test_empty_mesh_is_invalid() {
        let mesh: IcosahedronMesh = IcosahedronMesh::new();
        assert_eq!(mesh.validate(), Err(MeshError::EmptyMesh));
    }

    #[test]
    fn test_validate_detects_missing_back_reference() {
        let mut mesh = create_tetrahedron();
        mesh.nodes[0].faces.pop();
        assert!(!mesh.is_valid());
    }

    #[test]
    fn test_validate_detects_inconsistent_winding() {
        let mut mesh = create_tetrahedron();
        let face = &mut mesh.faces[0];
        face.nodes.swap(1, 2);
        // Keep edge slots matching the corners so only the winding is wrong.
        let [e0, e1, e2] = face.edges;
        face.edges = [e2, e1, e0];
        assert!(matches!(mesh.validate(), Err(MeshError::NonManifold { .. })));
    }

    #[test]
    fn test_opposite_face() {
        let mesh = create_tetrahedron();
        let e01 = EdgeId::new(0);
        let [f0, f1] = mesh.edge_faces(e01).unwrap();
        assert_eq!(mesh.opposite_face(e01, f0).unwrap(), f1);
        assert_eq!(mesh.opposite_face(e01, f1).unwrap(), f0);

        // Face 2 does not touch edge 0-1.
        assert!(mesh.opposite_face(e01, FaceId::new(2)).is_err());
    }

    #[test]
    fn test_far_node_slot() {
        let mesh = create_tetrahedron();
        let f = FaceId::new(0);
        let e12 = EdgeId::new(3);
        assert_eq!(mesh.far_node_slot(f, e12).unwrap(), 0);
        assert!(mesh.node_slot_in_face(f, NodeId::new(3)).is_err());
    }

    #[test]
    fn test_tetrahedron_normals_point_outward() {
        let mesh = create_tetrahedron();
        for f in mesh.face_ids() {
            let centroid = mesh.face_centroid(f);
            assert!(mesh.face_normal(f).dot(&centroid.coords) > 0.0);
        }
    }

    #[test]
    fn test_face_centroid_on_unit_sphere() {
        let mesh = create_tetrahedron();
        for c in mesh.face_centroids() {
            assert!((c.coords.norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_edge_other_node() {
        let edge: Edge = Edge::new(NodeId::new(2), NodeId::new(5));
        assert_eq!(edge.other_node(NodeId::new(2)), Some(NodeId::new(5)));
        assert_eq!(edge.other_node(NodeId::new(5)), Some(NodeId::new(2)));
        assert_eq!(edge.other_node(NodeId::new(1)), None);
    }
}
