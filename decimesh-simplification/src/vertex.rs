//! Half-edge mesh vertices and content hashing

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use decimesh_core::Point3f;

use crate::half_edge::EdgeRef;

/// Stable vertex identifier
///
/// IDs are assigned monotonically by the owning mesh and never reused within
/// a simplification run. They are the sole basis of vertex equality and
/// hashing.
pub type VertexId = u64;

/// A half-edge mesh vertex
#[derive(Debug, Clone)]
pub struct Vertex {
    id: VertexId,
    position: Point3f,
    edge: Option<EdgeRef>,
}

impl Vertex {
    /// Create a vertex with a given ID and position
    pub fn new(id: VertexId, position: Point3f) -> Self {
        Self {
            id,
            position,
            edge: None,
        }
    }

    /// Get the vertex ID
    pub fn id(&self) -> VertexId {
        self.id
    }

    /// Get the vertex position
    pub fn position(&self) -> Point3f {
        self.position
    }

    /// One currently-incident outgoing half-edge, if the vertex is wired
    /// into a mesh
    pub fn edge(&self) -> Option<EdgeRef> {
        self.edge
    }

    pub(crate) fn set_edge(&mut self, edge: EdgeRef) {
        self.edge = Some(edge);
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Vertex {}

impl Hash for Vertex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Order-sensitive content hash of a directed vertex pair
///
/// The two half-edges of one undirected edge hash differently because the
/// pair is ordered.
pub fn vertex_pair_key(v0: VertexId, v1: VertexId) -> u64 {
    let mut hasher = DefaultHasher::new();
    (v0, v1).hash(&mut hasher);
    hasher.finish()
}

/// Order-sensitive content hash of a vertex triple
pub fn vertex_triple_key(v0: VertexId, v1: VertexId, v2: VertexId) -> u64 {
    let mut hasher = DefaultHasher::new();
    (v0, v1, v2).hash(&mut hasher);
    hasher.finish()
}
