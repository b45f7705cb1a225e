//! Geodesic subdivision of a closed triangle mesh.
//!
//! Each edge of the base mesh is split into `degree` sub-edges and each
//! face into `degree²` sub-faces laid out on a triangular grid. New nodes
//! are placed by linear interpolation and projected onto the unit sphere.
//!
//! An edge is shared by two faces, so it is split exactly once. The ordered
//! interior nodes and sub-edges are stored on the base edge as an
//! [`EdgeSubdivision`] while the faces are processed; a face that walks the
//! edge against its stored direction reads the lists back to front. The
//! scratch is cleared before returning.
//!
//! # Face Grid
//!
//! For a base face `(n0, n1, n2)` with edges `(n0-n1, n1-n2, n0-n2)` the grid
//! is built row by row: row 0 runs along the first edge from `n0` to `n1`,
//! row `s` runs from the `s`-th node of the third edge to the `s`-th node of
//! the second edge, and the last row is the single node `n2`. Sub-faces are
//! emitted in two passes, first the "upright" triangles and then the
//! "inverted" ones between them.
//!
//! # Example
//!
//! ```
//! use icosphere::algo::subdivide::subdivide;
//! use icosphere::mesh::{generate_icosahedron, IcosahedronMesh};
//!
//! let mut base: IcosahedronMesh = generate_icosahedron();
//! let mesh = subdivide(&mut base, 3).unwrap();
//!
//! assert_eq!(mesh.num_faces(), 20 * 9);
//! assert_eq!(mesh.euler_characteristic(), 2);
//! ```

use nalgebra::Point3;

use crate::algo::{lerp_on_sphere, Progress};
use crate::error::{MeshError, Result};
use crate::mesh::{Edge, EdgeId, EdgeSubdivision, Face, IcosahedronMesh, MeshIndex, NodeId};

/// Element counts `(nodes, edges, faces)` after subdividing `base` by `degree`.
pub fn subdivided_counts<I: MeshIndex>(base: &IcosahedronMesh<I>, degree: usize) -> (usize, usize, usize) {
    let v = base.num_nodes();
    let e = base.num_edges();
    let f = base.num_faces();
    if degree == 0 {
        return (v, e, f);
    }
    let nodes = v + e * (degree - 1) + f * (degree - 1) * degree.saturating_sub(2) / 2;
    let edges = e * degree + f * 3 * degree * (degree - 1) / 2;
    let faces = f * degree * degree;
    (nodes, edges, faces)
}

/// Subdivide every edge and face of `base` by `degree`.
///
/// Returns a new mesh; the nodes of `base` keep their indices. `base` is
/// borrowed mutably only to hold per-edge scratch, which is removed again
/// before returning.
///
/// # Errors
///
/// - [`MeshError::InvalidParameter`] if `degree` is 0 or the result would
///   not fit in the index type `I`.
/// - [`MeshError::Inconsistent`] if a face of `base` references an edge
///   that does not join its corners.
pub fn subdivide<I: MeshIndex>(base: &mut IcosahedronMesh<I>, degree: usize) -> Result<IcosahedronMesh<I>> {
    subdivide_with_progress(base, degree, &Progress::none())
}

/// Subdivide with progress reporting (one step per base face).
pub fn subdivide_with_progress<I: MeshIndex>(
    base: &mut IcosahedronMesh<I>,
    degree: usize,
    progress: &Progress,
) -> Result<IcosahedronMesh<I>> {
    if degree == 0 {
        return Err(MeshError::invalid_param("degree", degree, "must be at least 1"));
    }
    if base.num_faces() == 0 {
        return Err(MeshError::EmptyMesh);
    }

    let (num_nodes, num_edges, num_faces) = subdivided_counts(base, degree);
    if num_nodes.max(num_edges).max(num_faces) > I::capacity() {
        return Err(MeshError::invalid_param(
            "degree",
            degree,
            "subdivided mesh exceeds the index capacity",
        ));
    }

    let mut mesh = IcosahedronMesh::with_capacity(num_nodes, num_edges, num_faces);
    for node in &base.nodes {
        mesh.add_node(node.position);
    }

    for edge in base.edges.iter_mut() {
        let split = split_edge(&mut mesh, edge, degree);
        edge.subdivision = Some(split);
    }

    let result = subdivide_faces(&mut mesh, &base.edges, &base.faces, degree, progress);

    for edge in base.edges.iter_mut() {
        edge.subdivision = None;
    }

    result.map(|()| {
        log::debug!(
            "subdivided {} faces by degree {}: {} nodes, {} edges, {} faces",
            base.num_faces(),
            degree,
            mesh.num_nodes(),
            mesh.num_edges(),
            mesh.num_faces()
        );
        mesh
    })
}

/// Split one base edge into `degree` sub-edges in `mesh`.
fn split_edge<I: MeshIndex>(mesh: &mut IcosahedronMesh<I>, edge: &Edge<I>, degree: usize) -> EdgeSubdivision<I> {
    let [n0, n1] = edge.nodes;
    let p0 = *mesh.position(n0);
    let p1 = *mesh.position(n1);

    let mut split = EdgeSubdivision {
        nodes: Vec::with_capacity(degree - 1),
        edges: Vec::with_capacity(degree),
    };

    let mut prior = n0;
    for s in 1..degree {
        let node = mesh.add_node(lerp_on_sphere(&p0, &p1, s as f64 / degree as f64));
        split.edges.push(mesh.add_edge(prior, node));
        split.nodes.push(node);
        prior = node;
    }
    split.edges.push(mesh.add_edge(prior, n1));
    split
}

/// One side of a base face, read in the face's direction.
struct Side<'a, I: MeshIndex> {
    split: &'a EdgeSubdivision<I>,
    forward: bool,
}

impl<'a, I: MeshIndex> Side<'a, I> {
    /// `from` is the face corner the side is walked away from.
    fn new(edges: &'a [Edge<I>], edge: EdgeId<I>, from: NodeId<I>) -> Result<Self> {
        let base_edge = &edges[edge.index()];
        let split = base_edge
            .subdivision
            .as_ref()
            .ok_or_else(|| MeshError::inconsistent(format!("{} was not split", edge)))?;
        if !base_edge.has_node(from) {
            return Err(MeshError::inconsistent(format!(
                "{} does not touch face corner {}",
                edge, from
            )));
        }
        Ok(Self {
            split,
            forward: base_edge.nodes[0] == from,
        })
    }

    #[inline]
    fn node(&self, k: usize) -> NodeId<I> {
        if self.forward {
            self.split.nodes[k]
        } else {
            self.split.nodes[self.split.nodes.len() - 1 - k]
        }
    }

    #[inline]
    fn edge(&self, k: usize) -> EdgeId<I> {
        if self.forward {
            self.split.edges[k]
        } else {
            self.split.edges[self.split.edges.len() - 1 - k]
        }
    }
}

fn subdivide_faces<I: MeshIndex>(
    mesh: &mut IcosahedronMesh<I>,
    base_edges: &[Edge<I>],
    base_faces: &[Face<I>],
    degree: usize,
    progress: &Progress,
) -> Result<()> {
    let total = base_faces.len();
    for (i, face) in base_faces.iter().enumerate() {
        subdivide_face(mesh, base_edges, face, degree)?;
        progress.report(i + 1, total, "Subdividing faces");
    }
    Ok(())
}

fn subdivide_face<I: MeshIndex>(
    mesh: &mut IcosahedronMesh<I>,
    base_edges: &[Edge<I>],
    face: &Face<I>,
    degree: usize,
) -> Result<()> {
    let d = degree;
    let [c0, c1, c2] = face.nodes;
    let side0 = Side::new(base_edges, face.edges[0], c0)?;
    let side1 = Side::new(base_edges, face.edges[1], c1)?;
    let side2 = Side::new(base_edges, face.edges[2], c0)?;

    // Grid nodes, row by row.
    let mut grid: Vec<NodeId<I>> = Vec::with_capacity((d + 1) * (d + 2) / 2);
    grid.push(c0);
    grid.extend((0..d - 1).map(|j| side0.node(j)));
    grid.push(c1);
    for s in 1..d {
        let a = side2.node(s - 1);
        let b = side1.node(s - 1);
        let pa: Point3<f64> = *mesh.position(a);
        let pb: Point3<f64> = *mesh.position(b);
        grid.push(a);
        for t in 1..d - s {
            let node = mesh.add_node(lerp_on_sphere(&pa, &pb, t as f64 / (d - s) as f64));
            grid.push(node);
        }
        grid.push(b);
    }
    grid.push(c2);

    // Edges parallel to the first side.
    let mut edges0: Vec<EdgeId<I>> = Vec::with_capacity(d * (d + 1) / 2);
    edges0.extend((0..d).map(|j| side0.edge(j)));
    let mut k = d + 1;
    for s in 1..d {
        for _ in 0..d - s {
            edges0.push(mesh.add_edge(grid[k], grid[k + 1]));
            k += 1;
        }
        k += 1;
    }

    // Edges parallel to the second side.
    let mut edges1: Vec<EdgeId<I>> = Vec::with_capacity(d * (d + 1) / 2);
    k = 1;
    for s in 0..d {
        for _ in 1..d - s {
            edges1.push(mesh.add_edge(grid[k], grid[k + d - s]));
            k += 1;
        }
        edges1.push(side1.edge(s));
        k += 2;
    }

    // Edges parallel to the third side.
    let mut edges2: Vec<EdgeId<I>> = Vec::with_capacity(d * (d + 1) / 2);
    k = 1;
    for s in 0..d {
        edges2.push(side2.edge(s));
        for _ in 1..d - s {
            edges2.push(mesh.add_edge(grid[k], grid[k + d - s + 1]));
            k += 1;
        }
        k += 2;
    }

    // Upright triangles.
    k = 0;
    let mut e = 0;
    for s in 0..d {
        for _ in 0..d - s {
            mesh.add_face(
                [grid[k], grid[k + 1], grid[k + d - s + 1]],
                [edges0[e], edges1[e], edges2[e]],
            );
            k += 1;
            e += 1;
        }
        k += 1;
    }

    // Inverted triangles.
    k = 1;
    e = 0;
    for s in 1..d {
        for _ in 0..d - s {
            mesh.add_face(
                [grid[k], grid[k + d - s + 2], grid[k + d - s + 1]],
                [edges2[e + 1], edges0[e + d - s + 1], edges1[e]],
            );
            k += 1;
            e += 1;
        }
        k += 2;
        e += 1;
    }

    Ok(())
}
