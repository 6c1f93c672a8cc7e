//! The half-edge mesh container and its local collapse primitive

use std::collections::{BTreeMap, HashMap, HashSet};

use decimesh_core::{Error, IndexedMesh, Result, Transform3D, Vector3f};

use crate::face::{Face, FaceKey, FaceRef};
use crate::half_edge::{EdgeKey, EdgeRef, HalfEdge};
use crate::vertex::{Vertex, VertexId};

/// An edge-centric data structure used to represent a triangle mesh
///
/// A half-edge mesh is made of directional half-edges that refer to the next
/// edge of their triangle in counter-clockwise order, to the vertex at their
/// head, and to their flip edge, which represents the same undirected edge
/// in the opposite direction. These references are enough to traverse and
/// locally mutate a triangle mesh in constant time per step.
///
/// Vertices are kept in an ID-ordered map so that iteration (and the vertex
/// order of converted meshes) is deterministic; half-edges and faces live in
/// hash maps keyed by their content hashes. Only closed 2-manifolds are
/// accepted: every half-edge has a real face on both sides.
#[derive(Debug)]
pub struct HalfEdgeMesh {
    vertices: BTreeMap<VertexId, Vertex>,
    edges: HashMap<EdgeKey, HalfEdge>,
    faces: HashMap<FaceKey, Face>,
    model_transform: Transform3D,
    next_vertex_id: VertexId,
}

impl HalfEdgeMesh {
    /// Build a half-edge mesh from an indexed triangle mesh
    ///
    /// One vertex is created per input position, carrying the position index
    /// as its ID. Meshes with boundary edges or unreferenced positions are
    /// rejected.
    pub fn from_indexed_mesh(mesh: &IndexedMesh) -> Result<Self> {
        mesh.validate()?;

        let mut half_edge_mesh = Self {
            vertices: BTreeMap::new(),
            edges: HashMap::new(),
            faces: HashMap::new(),
            model_transform: mesh.model_transform,
            next_vertex_id: mesh.positions.len() as VertexId,
        };

        for (i, position) in mesh.positions.iter().enumerate() {
            let id = i as VertexId;
            half_edge_mesh.vertices.insert(id, Vertex::new(id, *position));
        }

        for [i, j, k] in mesh.triangles() {
            half_edge_mesh.create_triangle(i as VertexId, j as VertexId, k as VertexId)?;
        }

        half_edge_mesh.require_closed()?;
        Ok(half_edge_mesh)
    }

    /// Convert back to an indexed triangle mesh
    ///
    /// Positions are emitted in ascending vertex-ID order and triangles in
    /// sorted canonical order, so the output depends only on the mesh
    /// content. Vertex normals are recomputed as the area-weighted average
    /// of incident face normals; texture coordinates are not carried over.
    pub fn to_indexed_mesh(&self) -> Result<IndexedMesh> {
        let mut positions = Vec::with_capacity(self.vertices.len());
        let mut normals = Vec::with_capacity(self.vertices.len());
        let mut index_map = HashMap::with_capacity(self.vertices.len());

        for (dense, vertex) in self.vertices.values().enumerate() {
            positions.push(vertex.position());
            normals.push(self.weighted_vertex_normal(vertex.id())?);
            index_map.insert(vertex.id(), dense as u32);
        }

        let mut triples: Vec<[VertexId; 3]> =
            self.faces.values().map(|face| face.vertex_ids()).collect();
        triples.sort_unstable();

        let mut indices = Vec::with_capacity(triples.len() * 3);
        for triple in triples {
            for id in triple {
                indices.push(*index_map.get(&id).ok_or(Error::MissingVertex(id))?);
            }
        }

        Ok(IndexedMesh::new(
            positions,
            Vec::new(),
            normals,
            indices,
            self.model_transform,
        ))
    }

    /// Get the mapping of mesh vertices by ID
    pub fn vertices(&self) -> &BTreeMap<VertexId, Vertex> {
        &self.vertices
    }

    /// Get the mapping of mesh half-edges by content hash
    pub fn edges(&self) -> &HashMap<EdgeKey, HalfEdge> {
        &self.edges
    }

    /// Get the mapping of mesh faces by content hash
    pub fn faces(&self) -> &HashMap<FaceKey, Face> {
        &self.faces
    }

    /// Get the number of faces currently in the mesh
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Allocate a fresh vertex ID
    ///
    /// IDs grow monotonically and are never reused, so a retired vertex can
    /// never be confused with a replacement.
    pub fn allocate_vertex_id(&mut self) -> VertexId {
        let id = self.next_vertex_id;
        self.next_vertex_id += 1;
        id
    }

    /// Look up a vertex by ID
    pub fn vertex(&self, id: VertexId) -> Result<&Vertex> {
        self.vertices.get(&id).ok_or(Error::MissingVertex(id))
    }

    fn vertex_mut(&mut self, id: VertexId) -> Result<&mut Vertex> {
        self.vertices.get_mut(&id).ok_or(Error::MissingVertex(id))
    }

    /// Look up a half-edge by content reference
    pub fn edge(&self, edge: EdgeRef) -> Result<&HalfEdge> {
        self.edges.get(&edge.key()).ok_or(Error::MissingEdge {
            tail: edge.tail,
            head: edge.head,
        })
    }

    fn edge_mut(&mut self, edge: EdgeRef) -> Result<&mut HalfEdge> {
        self.edges.get_mut(&edge.key()).ok_or(Error::MissingEdge {
            tail: edge.tail,
            head: edge.head,
        })
    }

    /// Look up a face by content reference
    pub fn face(&self, face: FaceRef) -> Result<&Face> {
        let FaceRef([v0, v1, v2]) = face;
        self.faces
            .get(&face.key())
            .ok_or(Error::MissingFace { v0, v1, v2 })
    }

    /// The face to the left of a half-edge
    pub fn incident_face(&self, edge: EdgeRef) -> Result<&Face> {
        let face_ref = face_of(self.edge(edge)?)?;
        self.face(face_ref)
    }

    /// Collect the outgoing half-edges of a vertex
    ///
    /// Rotates around the vertex star starting from the stored outgoing
    /// edge, following `next(flip(·))` until the walk returns to its start.
    pub fn outgoing_edges(&self, id: VertexId) -> Result<Vec<EdgeRef>> {
        let vertex = self.vertex(id)?;
        let Some(start) = vertex.edge() else {
            return Err(Error::InvalidMesh(format!(
                "vertex {id} has no incident edges"
            )));
        };

        let mut result = Vec::new();
        let mut current = start;
        loop {
            result.push(current);
            current = next_of(self.edge(current.reversed())?)?;
            if current == start {
                break;
            }
        }
        Ok(result)
    }

    /// The IDs of the vertices adjacent to a vertex
    pub fn one_ring(&self, id: VertexId) -> Result<Vec<VertexId>> {
        Ok(self
            .outgoing_edges(id)?
            .into_iter()
            .map(|edge| edge.head)
            .collect())
    }

    /// Determine whether collapsing an edge would produce a non-manifold
    ///
    /// The edge (v0, v1) is collapsible only if the 1-rings of its endpoints
    /// intersect in exactly the two wing apexes shared by the two adjacent
    /// triangles, and the wing apexes are not themselves joined to both
    /// endpoints by triangles of their own. The second half of the test
    /// rejects collapses that would fold the mesh onto a duplicated face,
    /// such as any edge of a 4-face tetrahedron.
    pub fn violates_link_condition(&self, edge01: EdgeRef) -> Result<bool> {
        let v0 = edge01.tail;
        let v1 = edge01.head;
        let v1_next = next_of(self.edge(edge01)?)?.head;
        let v0_next = next_of(self.edge(edge01.reversed())?)?.head;

        // Two adjacent triangles sharing their apex form a two-face pillow;
        // collapsing any of its edges strands the remaining vertex.
        if v1_next == v0_next {
            return Ok(true);
        }

        // Vertices of v1's ring beyond the wings, bounded away from v0.
        let mut neighborhood: HashSet<VertexId> = HashSet::new();
        let mut cursor = next_of(self.edge(edge01)?)?;
        while cursor != edge01.reversed() {
            let head = cursor.head;
            if head != v0 && head != v1_next && head != v0_next {
                neighborhood.insert(head);
            }
            cursor = next_of(self.edge(cursor.reversed())?)?;
        }

        // Walk v0's ring and reject on any vertex shared beyond the wings.
        let mut cursor = next_of(self.edge(edge01.reversed())?)?;
        while cursor != edge01 {
            if neighborhood.contains(&cursor.head) {
                return Ok(true);
            }
            cursor = next_of(self.edge(cursor.reversed())?)?;
        }

        // The wings may be joined by an edge of their own, but not by
        // triangles against both endpoints: the collapse would produce the
        // same face twice.
        let left = FaceRef::new(v0, v1_next, v0_next);
        let right = FaceRef::new(v1, v0_next, v1_next);
        Ok(self.faces.contains_key(&left.key()) && self.faces.contains_key(&right.key()))
    }

    /// Collapse an edge into a single vertex and reconnect all incident
    /// edges to that vertex
    ///
    /// `edge01` points from the vertex to be retired first (its tail) to the
    /// second (its head); `replacement` must carry a fresh ID allocated from
    /// this mesh. The caller is responsible for checking the link condition
    /// beforehand.
    pub fn collapse_edge(&mut self, edge01: EdgeRef, replacement: Vertex) -> Result<()> {
        let v0 = edge01.tail;
        let v1 = edge01.head;

        let (v1_next, left_face) = {
            let edge = self.edge(edge01)?;
            (next_of(edge)?.head, face_of(edge)?)
        };
        let (v0_next, right_face) = {
            let edge = self.edge(edge01.reversed())?;
            (next_of(edge)?.head, face_of(edge)?)
        };

        // The replacement must be resident before its triangles are wired.
        let replacement_id = replacement.id();
        self.vertices.insert(replacement_id, replacement);

        self.update_incident_triangles(v0, v1_next, v0_next, replacement_id)?;
        self.update_incident_triangles(v1, v0_next, v1_next, replacement_id)?;

        self.delete_face(left_face)?;
        self.delete_face(right_face)?;
        self.delete_edge(edge01)?;

        self.delete_vertex(v0)?;
        self.delete_vertex(v1)?;
        Ok(())
    }

    /// Create a half-edge pair connecting two vertices, or return the
    /// existing forward edge when the pair is already present
    fn create_half_edge(&mut self, v0: VertexId, v1: VertexId) -> EdgeRef {
        let edge01 = EdgeRef::new(v0, v1);
        if !self.edges.contains_key(&edge01.key()) {
            self.edges.insert(edge01.key(), HalfEdge::new(v0, v1));
            self.edges
                .insert(edge01.reversed().key(), HalfEdge::new(v1, v0));
        }
        edge01
    }

    /// Create a triangle from three vertices in counter-clockwise order
    fn create_triangle(&mut self, v0: VertexId, v1: VertexId, v2: VertexId) -> Result<FaceRef> {
        let edge01 = self.create_half_edge(v0, v1);
        let edge12 = self.create_half_edge(v1, v2);
        let edge20 = self.create_half_edge(v2, v0);

        let face = Face::new(self.vertex(v0)?, self.vertex(v1)?, self.vertex(v2)?)?;
        let face_ref = face.face_ref();

        self.vertex_mut(v0)?.set_edge(edge01);
        self.vertex_mut(v1)?.set_edge(edge12);
        self.vertex_mut(v2)?.set_edge(edge20);

        for (edge, next) in [(edge01, edge12), (edge12, edge20), (edge20, edge01)] {
            let half_edge = self.edge_mut(edge)?;
            half_edge.set_next(next);
            half_edge.set_face(face_ref);
        }

        self.faces.insert(face_ref.key(), face);
        Ok(face_ref)
    }

    /// Reattach the triangles incident to a doomed vertex to the
    /// replacement vertex, skipping the two triangles adjacent to the
    /// collapsing edge
    ///
    /// Walks the star of `target` from `target -> start` up to (exclusive)
    /// `target -> end`, replacing each triangle (target, vi, vj) with
    /// (replacement, vi, vj). The walk reads the next pointers of each
    /// doomed edge before its triangle is rewired, so it stays valid while
    /// the star is torn down.
    fn update_incident_triangles(
        &mut self,
        target: VertexId,
        start: VertexId,
        end: VertexId,
        replacement: VertexId,
    ) -> Result<()> {
        let edge_start = EdgeRef::new(target, start);
        let edge_end = EdgeRef::new(target, end);

        let mut cursor = edge_start;
        while cursor != edge_end {
            let edge_ti = self.edge(cursor)?;
            let old_face = face_of(edge_ti)?;
            let edge_ij = next_of(edge_ti)?;
            let edge_jt = next_of(self.edge(edge_ij)?)?;

            self.create_triangle(replacement, edge_ij.tail, edge_ij.head)?;
            self.delete_face(old_face)?;
            self.delete_edge(cursor)?;

            cursor = edge_jt.reversed();
        }

        self.delete_edge(edge_end)
    }

    fn delete_vertex(&mut self, id: VertexId) -> Result<()> {
        self.vertices
            .remove(&id)
            .map(|_| ())
            .ok_or(Error::MissingVertex(id))
    }

    /// Remove a half-edge pair from the edge map
    fn delete_edge(&mut self, edge: EdgeRef) -> Result<()> {
        for half in [edge, edge.reversed()] {
            if self.edges.remove(&half.key()).is_none() {
                return Err(Error::MissingEdge {
                    tail: half.tail,
                    head: half.head,
                });
            }
        }
        Ok(())
    }

    fn delete_face(&mut self, face: FaceRef) -> Result<()> {
        let FaceRef([v0, v1, v2]) = face;
        self.faces
            .remove(&face.key())
            .map(|_| ())
            .ok_or(Error::MissingFace { v0, v1, v2 })
    }

    /// Compute a vertex normal by averaging incident face normals weighted
    /// by surface area
    fn weighted_vertex_normal(&self, id: VertexId) -> Result<Vector3f> {
        let mut normal = Vector3f::zeros();
        for edge in self.outgoing_edges(id)? {
            let face = self.incident_face(edge)?;
            normal += face.normal() * face.area();
        }
        Ok(normal.normalize())
    }

    /// Reject meshes that are not closed 2-manifolds
    fn require_closed(&self) -> Result<()> {
        for edge in self.edges.values() {
            if edge.face().is_none() || edge.next().is_none() {
                return Err(Error::InvalidMesh(format!(
                    "edge ({},{}) borders a hole, only closed manifolds are supported",
                    edge.tail(),
                    edge.head()
                )));
            }
        }
        for vertex in self.vertices.values() {
            if vertex.edge().is_none() {
                return Err(Error::InvalidMesh(format!(
                    "position {} is not referenced by any triangle",
                    vertex.id()
                )));
            }
        }
        Ok(())
    }
}

/// The next half-edge of a wired triangle
fn next_of(edge: &HalfEdge) -> Result<EdgeRef> {
    edge.next().ok_or_else(|| {
        Error::InvalidMesh(format!(
            "edge ({},{}) has no next edge",
            edge.tail(),
            edge.head()
        ))
    })
}

/// The face of a wired half-edge
fn face_of(edge: &HalfEdge) -> Result<FaceRef> {
    edge.face().ok_or_else(|| {
        Error::InvalidMesh(format!(
            "edge ({},{}) has no incident face",
            edge.tail(),
            edge.head()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use decimesh_core::{IndexedMesh, Point3f};
    use nalgebra::Point3;

    fn tetrahedron() -> IndexedMesh {
        IndexedMesh::from_positions_and_indices(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
            ],
            vec![0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3],
        )
    }

    fn octahedron() -> IndexedMesh {
        IndexedMesh::from_positions_and_indices(
            vec![
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(-1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, -1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(0.0, 0.0, -1.0),
            ],
            vec![
                0, 2, 4, 2, 1, 4, 1, 3, 4, 3, 0, 4, 2, 0, 5, 1, 2, 5, 3, 1, 5, 0, 3, 5,
            ],
        )
    }

    fn assert_half_edge_laws(mesh: &HalfEdgeMesh) {
        for (key, edge) in mesh.edges() {
            // content-hash keying
            assert_eq!(*key, edge.edge_ref().key());
            assert_ne!(edge.edge_ref(), edge.flip_ref());

            // flip(flip(e)) == e and tail(flip(e)) == head(e)
            let flip = mesh.edge(edge.flip_ref()).unwrap();
            assert_eq!(flip.flip_ref(), edge.edge_ref());
            assert_eq!(flip.head(), edge.tail());

            // next-cycle of length 3 sharing one face
            let n1 = mesh.edge(edge.next().unwrap()).unwrap();
            let n2 = mesh.edge(n1.next().unwrap()).unwrap();
            assert_eq!(n2.next().unwrap(), edge.edge_ref());
            assert_eq!(n1.face(), edge.face());
            assert_eq!(n2.face(), edge.face());
            assert!(edge.face().is_some());
        }

        for (key, face) in mesh.faces() {
            assert_eq!(*key, face.key());
            let [v0, v1, v2] = face.vertex_ids();
            assert!(v0 < v1 && v0 < v2, "face ({v0},{v1},{v2}) is not canonical");
        }

        for vertex in mesh.vertices().values() {
            let edge = mesh.edge(vertex.edge().unwrap()).unwrap();
            assert_eq!(edge.tail(), vertex.id());
        }
    }

    #[test]
    fn test_build_tetrahedron() {
        let mesh = HalfEdgeMesh::from_indexed_mesh(&tetrahedron()).unwrap();
        assert_eq!(mesh.vertices().len(), 4);
        assert_eq!(mesh.edges().len(), 12);
        assert_eq!(mesh.faces().len(), 4);
        assert_half_edge_laws(&mesh);
    }

    #[test]
    fn test_one_ring_tetrahedron() {
        let mesh = HalfEdgeMesh::from_indexed_mesh(&tetrahedron()).unwrap();
        for id in 0..4 {
            let mut ring = mesh.one_ring(id).unwrap();
            ring.sort_unstable();
            let mut expected: Vec<VertexId> = (0..4).filter(|&other| other != id).collect();
            expected.sort_unstable();
            assert_eq!(ring, expected);
        }
    }

    #[test]
    fn test_open_mesh_is_rejected() {
        let triangle = IndexedMesh::from_positions_and_indices(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2],
        );
        assert!(matches!(
            HalfEdgeMesh::from_indexed_mesh(&triangle),
            Err(Error::InvalidMesh(_))
        ));
    }

    #[test]
    fn test_unreferenced_position_is_rejected() {
        let mut mesh = tetrahedron();
        mesh.positions.push(Point3::new(5.0, 5.0, 5.0));
        assert!(matches!(
            HalfEdgeMesh::from_indexed_mesh(&mesh),
            Err(Error::InvalidMesh(_))
        ));
    }

    #[test]
    fn test_degenerate_triangle_is_rejected() {
        let collinear = IndexedMesh::from_positions_and_indices(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
            ],
            vec![0, 1, 2],
        );
        assert!(matches!(
            HalfEdgeMesh::from_indexed_mesh(&collinear),
            Err(Error::DegenerateFace { .. })
        ));
    }

    #[test]
    fn test_round_trip_preserves_faces() {
        let input = tetrahedron();
        let mesh = HalfEdgeMesh::from_indexed_mesh(&input).unwrap();
        let output = mesh.to_indexed_mesh().unwrap();

        assert_eq!(output.positions, input.positions);
        assert_eq!(output.face_count(), 4);
        assert!(output.texture_coordinates.is_empty());
        assert_eq!(output.normals.len(), 4);
        for normal in &output.normals {
            assert_relative_eq!(normal.norm(), 1.0, epsilon = 1e-5);
        }

        let mut expected: Vec<[u32; 3]> = input
            .triangles()
            .map(|[i, j, k]| {
                let face = FaceRef::new(i as VertexId, j as VertexId, k as VertexId);
                let FaceRef([a, b, c]) = face;
                [a as u32, b as u32, c as u32]
            })
            .collect();
        expected.sort_unstable();
        let produced: Vec<[u32; 3]> = output.triangles().collect();
        assert_eq!(produced, expected);
    }

    #[test]
    fn test_octahedron_vertex_normal_points_outward() {
        let mesh = HalfEdgeMesh::from_indexed_mesh(&octahedron()).unwrap();
        let output = mesh.to_indexed_mesh().unwrap();
        assert_relative_eq!(
            output.normals[0],
            Vector3f::new(1.0, 0.0, 0.0),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_collapse_octahedron_edge() {
        let mut mesh = HalfEdgeMesh::from_indexed_mesh(&octahedron()).unwrap();
        let edge = EdgeRef::new(0, 2);
        assert!(!mesh.violates_link_condition(edge).unwrap());

        let id = mesh.allocate_vertex_id();
        let midpoint = Point3f::new(0.5, 0.5, 0.0);
        mesh.collapse_edge(edge, Vertex::new(id, midpoint)).unwrap();

        assert_eq!(mesh.face_count(), 6);
        assert_eq!(mesh.vertices().len(), 5);
        assert_eq!(mesh.edges().len(), 18);
        assert!(mesh.vertex(0).is_err());
        assert!(mesh.vertex(2).is_err());
        assert_relative_eq!(mesh.vertex(id).unwrap().position(), midpoint);
        assert_half_edge_laws(&mesh);

        let mut ring = mesh.one_ring(id).unwrap();
        ring.sort_unstable();
        assert_eq!(ring, vec![1, 3, 4, 5]);
    }

    #[test]
    fn test_laws_hold_across_successive_collapses() {
        let mut mesh = HalfEdgeMesh::from_indexed_mesh(&octahedron()).unwrap();
        while mesh.face_count() > 4 {
            let edge = mesh
                .edges()
                .values()
                .map(|edge| edge.edge_ref())
                .find(|&edge| !mesh.violates_link_condition(edge).unwrap())
                .expect("a closed mesh above four faces has a collapsible edge");

            let p0 = mesh.vertex(edge.tail).unwrap().position();
            let p1 = mesh.vertex(edge.head).unwrap().position();
            let midpoint = Point3f::from((p0.coords + p1.coords) * 0.5);
            let id = mesh.allocate_vertex_id();
            mesh.collapse_edge(edge, Vertex::new(id, midpoint)).unwrap();

            assert_half_edge_laws(&mesh);
            // each collapse removes one vertex, three undirected edges,
            // and two faces, so the Euler characteristic stays at 2
            let euler = mesh.vertices().len() as i64 - (mesh.edges().len() / 2) as i64
                + mesh.faces().len() as i64;
            assert_eq!(euler, 2);
        }
        assert_eq!(mesh.face_count(), 4);
    }

    #[test]
    fn test_tetrahedron_edges_violate_link_condition() {
        let mesh = HalfEdgeMesh::from_indexed_mesh(&tetrahedron()).unwrap();
        for v0 in 0..4u64 {
            for v1 in 0..4u64 {
                if v0 != v1 {
                    assert!(mesh.violates_link_condition(EdgeRef::new(v0, v1)).unwrap());
                }
            }
        }
    }

    #[test]
    fn test_missing_edge_lookup() {
        let mesh = HalfEdgeMesh::from_indexed_mesh(&tetrahedron()).unwrap();
        assert!(matches!(
            mesh.edge(EdgeRef::new(0, 17)),
            Err(Error::MissingEdge { tail: 0, head: 17 })
        ));
    }
}
