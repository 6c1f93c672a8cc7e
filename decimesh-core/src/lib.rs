//! Core data structures for decimesh
//!
//! This crate provides the boundary types shared by the decimesh workspace:
//! the indexed triangle mesh exchanged with loaders and renderers, point and
//! vector aliases, model transforms, and the common error type.

pub mod error;
pub mod mesh;
pub mod point;
pub mod traits;
pub mod transform;

pub use error::*;
pub use mesh::*;
pub use point::*;
pub use traits::*;
pub use transform::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Matrix3, Matrix4, Point3, Vector2, Vector3, Vector4};
