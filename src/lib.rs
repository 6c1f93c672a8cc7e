//! # decimesh
//!
//! Triangle mesh simplification for Rust.
//!
//! This is the umbrella crate that provides convenient access to the decimesh
//! member crates. You can use this crate to get everything in one place, or
//! depend on the individual crates for more granular control.
//!
//! - **Core**: the `IndexedMesh` boundary type, transforms, and errors
//! - **Simplification**: quadric-error edge contraction over a half-edge mesh
//!
//! ## Quick Start
//!
//! ```rust
//! use decimesh::prelude::*;
//! use decimesh::Point3;
//!
//! let mesh = IndexedMesh::from_positions_and_indices(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!         Point3::new(0.0, 0.0, 1.0),
//!     ],
//!     vec![0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3],
//! );
//!
//! // Remove roughly half of the triangles.
//! let simplified = simplify(&mesh, 0.5).unwrap();
//! assert!(simplified.face_count() <= mesh.face_count());
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: enables `simplification`
//! - `simplification`: the half-edge mesh and contraction scheduler

// Re-export core functionality
pub use decimesh_core::*;

#[cfg(feature = "simplification")]
pub use decimesh_simplification as simplification;

#[cfg(feature = "simplification")]
pub use decimesh_simplification::simplify;

/// Convenient imports for common use cases
pub mod prelude {
    pub use decimesh_core::*;

    #[cfg(feature = "simplification")]
    pub use decimesh_simplification::*;
}
