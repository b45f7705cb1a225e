//! Core mesh data structures.
//!
//! This module provides the index-based sphere mesh and the generator for
//! the base icosahedron.
//!
//! # Overview
//!
//! The primary type is [`IcosahedronMesh`], which stores nodes, edges and
//! faces in flat arrays. Elements refer to each other through integer
//! indices only, so the mesh has a single owner and no reference cycles.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`NodeId`] - Identifies a node
//! - [`EdgeId`] - Identifies an edge
//! - [`FaceId`] - Identifies a face
//!
//! These indices are generic over the underlying integer type ([`MeshIndex`] trait),
//! allowing you to choose `u16`, `u32`, or `u64` based on mesh size.
//!
//! # Construction
//!
//! ```
//! use icosphere::mesh::{generate_icosahedron, IcosahedronMesh};
//!
//! let mesh: IcosahedronMesh = generate_icosahedron();
//! assert!(mesh.is_valid());
//! ```

mod icosahedron;
mod index;
mod stats;
mod topology;

pub use icosahedron::{generate_icosahedron, ICOSAHEDRON_EDGES, ICOSAHEDRON_FACES, ICOSAHEDRON_NODES};
pub use index::{EdgeId, FaceId, MeshIndex, NodeId};
pub use stats::MeshStats;
pub use topology::{triangle_centroid, Edge, EdgeSubdivision, Face, IcosahedronMesh, Node};
