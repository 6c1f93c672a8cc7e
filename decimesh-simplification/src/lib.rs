//! Mesh simplification with quadric error metrics
//!
//! This crate reduces the triangle count of a closed manifold mesh by
//! iterative edge contraction. A half-edge mesh provides constant-time
//! neighborhood traversal and local collapse; per-vertex error quadrics
//! rank the candidate contractions so the cheapest geometric change is
//! applied first.
//!
//! The main entry point is [`simplify`]:
//!
//! ```
//! use decimesh_core::IndexedMesh;
//! use decimesh_simplification::simplify;
//! use nalgebra::Point3;
//!
//! let tetrahedron = IndexedMesh::from_positions_and_indices(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!         Point3::new(0.0, 0.0, 1.0),
//!     ],
//!     vec![0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3],
//! );
//! let simplified = simplify(&tetrahedron, 0.5).unwrap();
//! assert!(simplified.face_count() <= tetrahedron.face_count());
//! ```

pub mod contraction;
pub mod face;
pub mod half_edge;
pub mod half_edge_mesh;
pub mod quadric;
pub mod report;
pub mod vertex;

pub use contraction::{simplify, simplify_with_report, ContractionCandidate, ContractionScheduler};
pub use face::{Face, FaceKey, FaceRef};
pub use half_edge::{EdgeKey, EdgeRef, HalfEdge};
pub use half_edge_mesh::HalfEdgeMesh;
pub use quadric::QuadricStore;
pub use report::SimplificationReport;
pub use vertex::{Vertex, VertexId};

use decimesh_core::{IndexedMesh, Result};

/// Simplify a mesh by reducing the number of faces/vertices
pub trait MeshSimplifier {
    /// Simplify mesh with target reduction rate (0.0 = no reduction, 1.0 =
    /// maximum reduction)
    fn simplify(&self, mesh: &IndexedMesh, rate: f32) -> Result<IndexedMesh>;
}

/// Quadric error decimation simplifier
pub struct QuadricErrorSimplifier;

impl MeshSimplifier for QuadricErrorSimplifier {
    fn simplify(&self, mesh: &IndexedMesh, rate: f32) -> Result<IndexedMesh> {
        contraction::simplify(mesh, rate)
    }
}
