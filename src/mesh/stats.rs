//! Summary statistics for a sphere mesh.

use std::collections::BTreeMap;
use std::fmt;

use super::index::MeshIndex;
use super::topology::IcosahedronMesh;

/// Element counts, edge lengths, face areas and valence distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshStats {
    /// Number of nodes.
    pub nodes: usize,
    /// Number of edges.
    pub edges: usize,
    /// Number of faces.
    pub faces: usize,
    /// `V - E + F`.
    pub euler_characteristic: i64,
    /// Shortest edge (chord length).
    pub min_edge_length: f64,
    /// Longest edge.
    pub max_edge_length: f64,
    /// Mean edge length.
    pub average_edge_length: f64,
    /// Smallest flat face area.
    pub min_face_area: f64,
    /// Largest flat face area.
    pub max_face_area: f64,
    /// Sum of flat face areas.
    pub surface_area: f64,
    /// Number of nodes per valence (incident face count).
    pub valence_histogram: BTreeMap<usize, usize>,
}

impl MeshStats {
    /// Gather statistics for `mesh`.
    pub fn compute<I: MeshIndex>(mesh: &IcosahedronMesh<I>) -> Self {
        let mut min_edge_length = f64::INFINITY;
        let mut max_edge_length = 0.0_f64;
        let mut total_edge_length = 0.0;
        for e in mesh.edge_ids() {
            let len = mesh.edge_length(e);
            min_edge_length = min_edge_length.min(len);
            max_edge_length = max_edge_length.max(len);
            total_edge_length += len;
        }

        let mut min_face_area = f64::INFINITY;
        let mut max_face_area = 0.0_f64;
        let mut surface_area = 0.0;
        for f in mesh.face_ids() {
            let area = mesh.face_area(f);
            min_face_area = min_face_area.min(area);
            max_face_area = max_face_area.max(area);
            surface_area += area;
        }

        let mut valence_histogram = BTreeMap::new();
        for node in mesh.nodes() {
            *valence_histogram.entry(node.valence()).or_insert(0) += 1;
        }

        let average_edge_length = if mesh.num_edges() > 0 {
            total_edge_length / mesh.num_edges() as f64
        } else {
            0.0
        };

        Self {
            nodes: mesh.num_nodes(),
            edges: mesh.num_edges(),
            faces: mesh.num_faces(),
            euler_characteristic: mesh.euler_characteristic(),
            min_edge_length: if mesh.num_edges() > 0 { min_edge_length } else { 0.0 },
            max_edge_length,
            average_edge_length,
            min_face_area: if mesh.num_faces() > 0 { min_face_area } else { 0.0 },
            max_face_area,
            surface_area,
            valence_histogram,
        }
    }

    /// Ratio of longest to shortest edge; 1.0 for a perfectly uniform mesh.
    pub fn edge_length_ratio(&self) -> f64 {
        if self.min_edge_length > 0.0 {
            self.max_edge_length / self.min_edge_length
        } else {
            f64::INFINITY
        }
    }
}

impl fmt::Display for MeshStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Nodes: {}", self.nodes)?;
        writeln!(f, "Edges: {}", self.edges)?;
        writeln!(f, "Faces: {}", self.faces)?;
        writeln!(f, "Euler characteristic: {}", self.euler_characteristic)?;
        writeln!(
            f,
            "Edge length: min={:.6}, max={:.6}, avg={:.6}",
            self.min_edge_length, self.max_edge_length, self.average_edge_length
        )?;
        writeln!(
            f,
            "Face area range: [{:.6}, {:.6}]",
            self.min_face_area, self.max_face_area
        )?;
        writeln!(f, "Surface area: {:.6}", self.surface_area)?;
        write!(f, "Valence:")?;
        for (valence, count) in &self.valence_histogram {
            write!(f, " {}x{}", valence, count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::generate_icosahedron;

    #[test]
    fn test_icosahedron_stats() {
        let mesh: IcosahedronMesh = generate_icosahedron();
        let stats = MeshStats::compute(&mesh);

        assert_eq!(stats.nodes, 12);
        assert_eq!(stats.edges, 30);
        assert_eq!(stats.faces, 20);
        assert_eq!(stats.euler_characteristic, 2);
        assert_eq!(stats.valence_histogram.get(&5), Some(&12));
        assert!((stats.edge_length_ratio() - 1.0).abs() < 1e-12);
        // Inscribed polyhedron has less area than the sphere.
        assert!(stats.surface_area < 4.0 * std::f64::consts::PI);
    }

    #[test]
    fn test_empty_stats() {
        let mesh: IcosahedronMesh = IcosahedronMesh::new();
        let stats = MeshStats::compute(&mesh);
        assert_eq!(stats.nodes, 0);
        assert_eq!(stats.min_edge_length, 0.0);
        assert!(stats.valence_histogram.is_empty());
    }

    #[test]
    fn test_display_lists_valences() {
        let mesh: IcosahedronMesh = generate_icosahedron();
        let text = MeshStats::compute(&mesh).to_string();
        assert!(text.contains("Faces: 20"));
        assert!(text.contains("5x12"));
    }
}
