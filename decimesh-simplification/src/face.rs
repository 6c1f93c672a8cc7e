//! Triangle faces with canonical vertex ordering

use decimesh_core::{Error, Result, Vector3f};

use crate::vertex::{vertex_triple_key, Vertex, VertexId};

/// Key of a face in the face map: the content hash of its canonical vertex
/// triple
pub type FaceKey = u64;

/// The content identity of a face: its vertex IDs in canonical rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceRef(pub [VertexId; 3]);

impl FaceRef {
    /// Canonicalize a CCW vertex triple by rotating the smallest ID first
    ///
    /// Rotation preserves the winding, so the reference names the same
    /// oriented face regardless of which vertex the triple started from.
    pub fn new(v0: VertexId, v1: VertexId, v2: VertexId) -> Self {
        let min_id = v0.min(v1).min(v2);
        if min_id == v0 {
            Self([v0, v1, v2])
        } else if min_id == v1 {
            Self([v1, v2, v0])
        } else {
            Self([v2, v0, v1])
        }
    }

    /// The face-map key of this face
    pub fn key(self) -> FaceKey {
        let [v0, v1, v2] = self.0;
        vertex_triple_key(v0, v1, v2)
    }
}

/// A triangle face of a half-edge mesh
///
/// Vertices are stored in canonical rotation (smallest ID first, winding
/// preserved) so equivalent faces hash identically. The unit normal and
/// surface area are cached at construction.
#[derive(Debug, Clone)]
pub struct Face {
    v0: VertexId,
    v1: VertexId,
    v2: VertexId,
    normal: Vector3f,
    area: f32,
}

impl Face {
    /// Build a face from three vertices in counter-clockwise order
    ///
    /// Fails with [`Error::DegenerateFace`] when the triangle has zero
    /// surface area.
    pub fn new(v0: &Vertex, v1: &Vertex, v2: &Vertex) -> Result<Self> {
        let (r0, r1, r2) = min_vertex_order(v0, v1, v2);

        let edge01 = r1.position() - r0.position();
        let edge02 = r2.position() - r0.position();
        let normal = edge01.cross(&edge02);
        let magnitude = normal.norm();

        if magnitude == 0.0 {
            return Err(Error::DegenerateFace {
                v0: v0.id(),
                v1: v1.id(),
                v2: v2.id(),
            });
        }

        Ok(Self {
            v0: r0.id(),
            v1: r1.id(),
            v2: r2.id(),
            normal: normal / magnitude,
            area: 0.5 * magnitude,
        })
    }

    /// First vertex of the canonical rotation (the smallest ID)
    pub fn v0(&self) -> VertexId {
        self.v0
    }

    /// Second vertex of the canonical rotation
    pub fn v1(&self) -> VertexId {
        self.v1
    }

    /// Third vertex of the canonical rotation
    pub fn v2(&self) -> VertexId {
        self.v2
    }

    /// The canonical vertex triple
    pub fn vertex_ids(&self) -> [VertexId; 3] {
        [self.v0, self.v1, self.v2]
    }

    /// This face's own content reference
    pub fn face_ref(&self) -> FaceRef {
        FaceRef(self.vertex_ids())
    }

    /// The face-map key of this face
    pub fn key(&self) -> FaceKey {
        self.face_ref().key()
    }

    /// The unit outward normal
    pub fn normal(&self) -> Vector3f {
        self.normal
    }

    /// The surface area, strictly positive
    pub fn area(&self) -> f32 {
        self.area
    }
}

/// Rotate a CCW triple so the vertex with the smallest ID comes first
fn min_vertex_order<'a>(
    v0: &'a Vertex,
    v1: &'a Vertex,
    v2: &'a Vertex,
) -> (&'a Vertex, &'a Vertex, &'a Vertex) {
    let min_id = v0.id().min(v1.id()).min(v2.id());
    if min_id == v0.id() {
        (v0, v1, v2)
    } else if min_id == v1.id() {
        (v1, v2, v0)
    } else {
        (v2, v0, v1)
    }
}
