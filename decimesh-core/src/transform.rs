//! 3D transformation utilities

use nalgebra::{Matrix4, Vector3};
use serde::{Deserialize, Serialize};

/// An affine model-to-world transformation carried alongside a mesh
///
/// Simplification never applies or alters the transform; it travels with
/// the mesh and is handed back verbatim on output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    pub matrix: Matrix4<f32>,
}

impl Transform3D {
    /// Create an identity transformation
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Create a translation transformation
    pub fn translation(translation: Vector3<f32>) -> Self {
        Self {
            matrix: Matrix4::new_translation(&translation),
        }
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}
