//! Indexed triangle mesh boundary type

use crate::error::{Error, Result};
use crate::point::*;
use crate::transform::Transform3D;
use serde::{Deserialize, Serialize};

/// An indexed triangle mesh with optional per-vertex attributes
///
/// Every three consecutive entries of `indices` name one triangle in
/// counter-clockwise winding. When `indices` is empty, every three
/// consecutive positions form a triangle instead. `texture_coordinates` and
/// `normals` are either empty or aligned element-for-element with
/// `positions`. The model transform travels with the mesh and is never
/// applied to the stored positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedMesh {
    pub positions: Vec<Point3f>,
    pub texture_coordinates: Vec<Vector2f>,
    pub normals: Vec<Vector3f>,
    pub indices: Vec<u32>,
    pub model_transform: Transform3D,
}

impl IndexedMesh {
    /// Create a mesh from its full attribute set
    pub fn new(
        positions: Vec<Point3f>,
        texture_coordinates: Vec<Vector2f>,
        normals: Vec<Vector3f>,
        indices: Vec<u32>,
        model_transform: Transform3D,
    ) -> Self {
        Self {
            positions,
            texture_coordinates,
            normals,
            indices,
            model_transform,
        }
    }

    /// Create a mesh from positions and triangle indices alone
    pub fn from_positions_and_indices(positions: Vec<Point3f>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            texture_coordinates: Vec::new(),
            normals: Vec::new(),
            indices,
            model_transform: Transform3D::identity(),
        }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of triangles
    pub fn face_count(&self) -> usize {
        if self.indices.is_empty() {
            self.positions.len() / 3
        } else {
            self.indices.len() / 3
        }
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Iterate the triangles of the mesh as index triples
    ///
    /// Indexed meshes yield their index triples; unindexed meshes yield
    /// consecutive position triples.
    pub fn triangles(&self) -> Box<dyn Iterator<Item = [u32; 3]> + '_> {
        if self.indices.is_empty() {
            let whole_triangles = self.positions.len() as u32 / 3;
            Box::new((0..whole_triangles).map(|i| [3 * i, 3 * i + 1, 3 * i + 2]))
        } else {
            Box::new(self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]))
        }
    }

    /// Verify the indexed-mesh contract
    ///
    /// Checks that positions are present, that the face stream is made of
    /// whole triangles, that every index is in range, and that optional
    /// attributes align with the positions.
    pub fn validate(&self) -> Result<()> {
        if self.positions.is_empty() {
            return Err(Error::InvalidMesh("mesh has no positions".to_string()));
        }

        if self.indices.is_empty() {
            if self.positions.len() % 3 != 0 {
                return Err(Error::InvalidMesh(format!(
                    "unindexed position count {} is not divisible by 3",
                    self.positions.len()
                )));
            }
        } else {
            if self.indices.len() % 3 != 0 {
                return Err(Error::InvalidMesh(format!(
                    "index count {} is not divisible by 3",
                    self.indices.len()
                )));
            }
            if let Some(&index) = self
                .indices
                .iter()
                .find(|&&index| index as usize >= self.positions.len())
            {
                return Err(Error::InvalidMesh(format!(
                    "index {index} is out of range for {} positions",
                    self.positions.len()
                )));
            }
        }

        if !self.texture_coordinates.is_empty()
            && self.texture_coordinates.len() != self.positions.len()
        {
            return Err(Error::InvalidMesh(format!(
                "{} texture coordinates do not align with {} positions",
                self.texture_coordinates.len(),
                self.positions.len()
            )));
        }
        if !self.normals.is_empty() && self.normals.len() != self.positions.len() {
            return Err(Error::InvalidMesh(format!(
                "{} normals do not align with {} positions",
                self.normals.len(),
                self.positions.len()
            )));
        }

        Ok(())
    }
}
