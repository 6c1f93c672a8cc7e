//! Per-vertex error quadrics

use std::collections::HashMap;

use nalgebra::{Matrix4, Vector4};

use decimesh_core::{Error, Point3f, Result};

use crate::half_edge_mesh::HalfEdgeMesh;
use crate::vertex::VertexId;

/// Threshold below which the quadric system is treated as singular. The
/// geometry is 32-bit, so the 32-bit machine epsilon is the scale that
/// matters even though the solve runs in f64.
const EPSILON: f64 = f32::EPSILON as f64;

/// Per-vertex 4x4 symmetric error quadrics
///
/// The quadric of a vertex is the sum of outer products of the plane
/// equations of its incident faces, each plane written as the 4-vector
/// (n_x, n_y, n_z, -p·n). Collapsing an edge merges the endpoint quadrics
/// by addition; no re-integration over faces is needed.
#[derive(Debug, Default)]
pub struct QuadricStore {
    quadrics: HashMap<VertexId, Matrix4<f64>>,
}

impl QuadricStore {
    /// Compute the error quadric of every vertex in a mesh
    pub fn from_mesh(mesh: &HalfEdgeMesh) -> Result<Self> {
        let mut quadrics = HashMap::with_capacity(mesh.vertices().len());
        for vertex in mesh.vertices().values() {
            quadrics.insert(vertex.id(), vertex_quadric(mesh, vertex.id())?);
        }
        Ok(Self { quadrics })
    }

    /// Get the quadric of a vertex
    pub fn get(&self, id: VertexId) -> Result<&Matrix4<f64>> {
        self.quadrics.get(&id).ok_or(Error::MissingVertex(id))
    }

    /// Record the quadric of a replacement vertex as the sum of the
    /// quadrics of the two retired endpoints
    pub fn merge(&mut self, v0: VertexId, v1: VertexId, replacement: VertexId) -> Result<()> {
        let sum = self.get(v0)? + self.get(v1)?;
        self.quadrics.insert(replacement, sum);
        Ok(())
    }

    /// Get the number of stored quadrics
    pub fn len(&self) -> usize {
        self.quadrics.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.quadrics.is_empty()
    }
}

/// Sum the plane-equation outer products over a vertex star
fn vertex_quadric(mesh: &HalfEdgeMesh, id: VertexId) -> Result<Matrix4<f64>> {
    let position = mesh.vertex(id)?.position();
    let mut quadric = Matrix4::zeros();
    for edge in mesh.outgoing_edges(id)? {
        let normal = mesh.incident_face(edge)?.normal();
        let plane = Vector4::new(
            normal.x as f64,
            normal.y as f64,
            normal.z as f64,
            -position.coords.dot(&normal) as f64,
        );
        quadric += plane * plane.transpose();
    }
    Ok(quadric)
}

/// The optimal replacement position and cost for contracting an edge whose
/// endpoint quadrics sum to `quadric`
///
/// Solves `A p = -b` on the upper 3x3 block of the quadric. When that block
/// is singular, or the homogeneous scale vanishes, the midpoint of the two
/// endpoint positions is used and the cost reported as zero, which floats
/// near-planar regions to the front of the contraction queue.
pub fn optimal_contraction(quadric: &Matrix4<f64>, p0: Point3f, p1: Point3f) -> (Point3f, f64) {
    let a = quadric.fixed_view::<3, 3>(0, 0).into_owned();
    let b = quadric.fixed_view::<3, 1>(0, 3).into_owned();
    let d = quadric[(3, 3)];

    if a.determinant().abs() >= EPSILON && d.abs() >= EPSILON {
        if let Some(a_inverse) = a.try_inverse() {
            let p = -(a_inverse * b);
            let homogeneous = Vector4::new(p.x, p.y, p.z, 1.0);
            let cost = (homogeneous.transpose() * quadric * homogeneous)[(0, 0)].max(0.0);
            return (
                Point3f::new(p.x as f32, p.y as f32, p.z as f32),
                cost,
            );
        }
    }

    (Point3f::from((p0.coords + p1.coords) * 0.5), 0.0)
}
