//! Error types for icosphere.
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// An adjacency lookup failed to find an index that a well-formed mesh
    /// always contains.
    #[error("inconsistent mesh topology: {details}")]
    Inconsistent {
        /// Description of the failed lookup.
        details: String,
    },

    /// The mesh has non-manifold topology.
    #[error("mesh has non-manifold topology: {details}")]
    NonManifold {
        /// Description of the non-manifold condition.
        details: String,
    },

    /// The mesh is not a topological sphere.
    #[error("euler characteristic is {actual}, expected {expected}")]
    EulerCharacteristic {
        /// The expected value (2 for a sphere).
        expected: i64,
        /// The value computed from the element counts.
        actual: i64,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create an inconsistent-topology error.
    pub fn inconsistent(details: impl Into<String>) -> Self {
        MeshError::Inconsistent {
            details: details.into(),
        }
    }

    /// Create a non-manifold error.
    pub fn non_manifold(details: impl Into<String>) -> Self {
        MeshError::NonManifold {
            details: details.into(),
        }
    }
}
