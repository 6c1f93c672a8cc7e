//! Best-first edge contraction scheduling

use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::rc::Rc;
use std::time::Instant;

use tracing::{debug, info, warn};

use decimesh_core::{Error, IndexedMesh, Result};

use crate::half_edge::{EdgeKey, EdgeRef};
use crate::half_edge_mesh::HalfEdgeMesh;
use crate::quadric::{optimal_contraction, QuadricStore};
use crate::report::SimplificationReport;
use crate::vertex::Vertex;

/// An edge contraction candidate
///
/// Holds the canonical edge to collapse, the replacement vertex that
/// minimizes the summed quadric error of the edge's endpoints, and the cost
/// of the collapse. The replacement vertex is created eagerly with a fresh
/// ID so a popped candidate can be applied without touching the mesh first.
///
/// The `valid` flag works around the heap not supporting priority updates:
/// superseded entries stay in the heap and are skipped when popped. The
/// scheduler's active-candidates map is the ground truth for which
/// candidate of an edge is live.
#[derive(Debug)]
pub struct ContractionCandidate {
    edge: EdgeRef,
    vertex: Vertex,
    cost: f64,
    valid: Cell<bool>,
}

impl ContractionCandidate {
    fn new(mesh: &mut HalfEdgeMesh, edge: EdgeRef, quadrics: &QuadricStore) -> Result<Self> {
        let quadric = quadrics.get(edge.tail)? + quadrics.get(edge.head)?;
        let p0 = mesh.vertex(edge.tail)?.position();
        let p1 = mesh.vertex(edge.head)?.position();
        let (position, cost) = optimal_contraction(&quadric, p0, p1);
        let vertex = Vertex::new(mesh.allocate_vertex_id(), position);
        Ok(Self {
            edge,
            vertex,
            cost,
            valid: Cell::new(true),
        })
    }

    /// The canonical edge this candidate would collapse
    pub fn edge(&self) -> EdgeRef {
        self.edge
    }

    /// The cost of collapsing the edge onto the replacement vertex
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Whether this candidate is still the live one for its edge
    pub fn is_valid(&self) -> bool {
        self.valid.get()
    }
}

/// Min-heap adapter over shared candidates
///
/// Orders by ascending cost; ties break on the canonical edge key so runs
/// over identical input pop in the same order.
#[derive(Debug, Clone)]
struct QueueEntry(Rc<ContractionCandidate>);

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .0
            .cost
            .total_cmp(&self.0.cost)
            .then_with(|| other.0.edge.key().cmp(&self.0.edge.key()))
    }
}

/// Drives best-first edge contraction until a target face count is reached
/// or the candidate queue runs dry
pub struct ContractionScheduler {
    mesh: HalfEdgeMesh,
    quadrics: QuadricStore,
    queue: BinaryHeap<QueueEntry>,
    active: HashMap<EdgeKey, Rc<ContractionCandidate>>,
    initial_faces: usize,
    collapses: usize,
    rejections: usize,
    exhausted: bool,
}

impl ContractionScheduler {
    /// Set up the scheduler: per-vertex quadrics plus one candidate per
    /// undirected edge
    pub fn new(mesh: HalfEdgeMesh) -> Result<Self> {
        let quadrics = QuadricStore::from_mesh(&mesh)?;
        let initial_faces = mesh.face_count();
        let mut scheduler = Self {
            mesh,
            quadrics,
            queue: BinaryHeap::new(),
            active: HashMap::new(),
            initial_faces,
            collapses: 0,
            rejections: 0,
            exhausted: false,
        };
        scheduler.seed_candidates()?;
        Ok(scheduler)
    }

    /// Get the mesh in its current state
    pub fn mesh(&self) -> &HalfEdgeMesh {
        &self.mesh
    }

    /// Get the number of collapses applied so far
    pub fn collapses(&self) -> usize {
        self.collapses
    }

    /// Get the number of candidates rejected by the manifold guard so far
    pub fn rejections(&self) -> usize {
        self.rejections
    }

    /// Summarize the run so far
    pub fn report(&self) -> SimplificationReport {
        SimplificationReport {
            initial_faces: self.initial_faces,
            final_faces: self.mesh.face_count(),
            collapses: self.collapses,
            guard_rejections: self.rejections,
            queue_exhausted: self.exhausted,
        }
    }

    /// Consume the scheduler and convert the mesh back to indexed form
    pub fn into_indexed_mesh(self) -> Result<IndexedMesh> {
        self.mesh.to_indexed_mesh()
    }

    /// Contract edges best-first until the face count drops below the
    /// target
    ///
    /// An exhausted queue terminates the run early; the mesh is left in the
    /// partially simplified state, which is consistent by construction.
    pub fn run(&mut self, target_face_count: f32) -> Result<()> {
        while self.mesh.face_count() as f32 >= target_face_count {
            let Some(QueueEntry(candidate)) = self.queue.pop() else {
                self.exhausted = true;
                warn!(
                    faces = self.mesh.face_count(),
                    target = f64::from(target_face_count),
                    "candidate queue exhausted before the target face count was reached"
                );
                break;
            };
            if !candidate.is_valid() {
                continue;
            }
            if self.mesh.violates_link_condition(candidate.edge)? {
                // Rejected candidates are dropped for good; a later nearby
                // collapse re-evaluates the edge.
                self.rejections += 1;
                continue;
            }
            self.apply(&candidate)?;
        }
        Ok(())
    }

    /// Create one candidate per undirected edge
    ///
    /// Vertices are visited in ID order so that candidate IDs and heap
    /// contents do not depend on hash-map iteration order.
    fn seed_candidates(&mut self) -> Result<()> {
        let vertex_ids: Vec<_> = self.mesh.vertices().keys().copied().collect();
        for id in vertex_ids {
            for edge in self.mesh.outgoing_edges(id)? {
                let canonical = edge.canonical();
                if !self.active.contains_key(&canonical.key()) {
                    self.push_candidate(canonical)?;
                }
            }
        }
        Ok(())
    }

    /// Evaluate an edge and enqueue the resulting candidate as the live
    /// entry for its canonical key
    fn push_candidate(&mut self, canonical: EdgeRef) -> Result<()> {
        let candidate = Rc::new(ContractionCandidate::new(
            &mut self.mesh,
            canonical,
            &self.quadrics,
        )?);
        self.queue.push(QueueEntry(Rc::clone(&candidate)));
        self.active.insert(canonical.key(), candidate);
        Ok(())
    }

    /// Mark the live candidate for an edge stale and forget it
    fn invalidate(&mut self, edge: EdgeRef) {
        if let Some(candidate) = self.active.remove(&edge.canonical().key()) {
            candidate.valid.set(false);
        }
    }

    /// Collapse a candidate's edge, then repair the quadric store, the
    /// active-candidates map, and the queue around the replacement vertex
    fn apply(&mut self, candidate: &ContractionCandidate) -> Result<()> {
        let v0 = candidate.edge.tail;
        let v1 = candidate.edge.head;
        let replacement = candidate.vertex.clone();
        let replacement_id = replacement.id();

        debug!(
            tail = v0,
            head = v1,
            cost = candidate.cost,
            "collapsing edge"
        );

        // The endpoint rings name every candidate destroyed by the
        // collapse; they must be captured while the endpoints still exist.
        let ring0 = self.mesh.one_ring(v0)?;
        let ring1 = self.mesh.one_ring(v1)?;

        self.mesh.collapse_edge(candidate.edge, replacement)?;
        self.quadrics.merge(v0, v1, replacement_id)?;

        for (vertex, ring) in [(v0, &ring0), (v1, &ring1)] {
            for &neighbor in ring {
                self.invalidate(EdgeRef::new(vertex, neighbor));
            }
        }

        // Re-evaluate every edge touching the replacement vertex's
        // neighborhood: the neighbors' quadrics still stand, but their
        // optimal pairings changed with the geometry.
        let mut visited: HashSet<EdgeKey> = HashSet::new();
        for neighbor in self.mesh.one_ring(replacement_id)? {
            for edge in self.mesh.outgoing_edges(neighbor)? {
                let canonical = edge.canonical();
                if visited.insert(canonical.key()) {
                    self.invalidate(canonical);
                    self.push_candidate(canonical)?;
                }
            }
        }

        self.collapses += 1;
        Ok(())
    }
}

/// Reduce the number of triangles in a mesh
///
/// `rate` is the fraction of triangles to remove: 0.0 keeps the mesh
/// unchanged (up to vertex renumbering and recomputed normals), 1.0 asks
/// for maximal reduction. The returned mesh has strictly fewer than
/// `(1 - rate) * faces` triangles unless the candidate queue runs dry
/// first. Output normals are recomputed from the simplified geometry;
/// texture coordinates are not preserved.
pub fn simplify(mesh: &IndexedMesh, rate: f32) -> Result<IndexedMesh> {
    simplify_with_report(mesh, rate).map(|(simplified, _)| simplified)
}

/// Reduce the number of triangles in a mesh, returning the run statistics
/// alongside the result
pub fn simplify_with_report(
    mesh: &IndexedMesh,
    rate: f32,
) -> Result<(IndexedMesh, SimplificationReport)> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(Error::InvalidRate(rate));
    }

    let start_time = Instant::now();
    let half_edge_mesh = HalfEdgeMesh::from_indexed_mesh(mesh)?;
    let initial_face_count = half_edge_mesh.face_count();

    let mut scheduler = ContractionScheduler::new(half_edge_mesh)?;
    if rate > 0.0 {
        scheduler.run(initial_face_count as f32 * (1.0 - rate))?;
    }

    let report = scheduler.report();
    info!(
        initial_faces = report.initial_faces,
        final_faces = report.final_faces,
        collapses = report.collapses,
        rejected = report.guard_rejections,
        elapsed = ?start_time.elapsed(),
        "mesh simplification finished"
    );

    Ok((scheduler.into_indexed_mesh()?, report))
}

#[cfg(test)]
mod tests {
    use super::*;
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

    #[test]
    fn test_rate_out_of_range() {
        let mesh = tetrahedron();
        assert!(matches!(
            simplify(&mesh, -0.1),
            Err(Error::InvalidRate(_))
        ));
        assert!(matches!(simplify(&mesh, 1.1), Err(Error::InvalidRate(_))));
    }

    #[test]
    fn test_empty_mesh_is_rejected() {
        let mesh = IndexedMesh::from_positions_and_indices(Vec::new(), Vec::new());
        assert!(matches!(simplify(&mesh, 0.5), Err(Error::InvalidMesh(_))));
    }

    #[test]
    fn test_rate_zero_keeps_the_face_count() {
        let result = simplify(&tetrahedron(), 0.0).unwrap();
        assert_eq!(result.face_count(), 4);
        assert_eq!(result.vertex_count(), 4);
    }

    #[test]
    fn test_tetrahedron_survives_aggressive_rate() {
        // every collapse would fold the tetrahedron onto itself, so the
        // queue drains without reaching the target
        let result = simplify(&tetrahedron(), 0.6).unwrap();
        assert_eq!(result.face_count(), 4);
    }

    #[test]
    fn test_octahedron_halves() {
        let result = simplify(&octahedron(), 0.5).unwrap();
        assert_eq!(result.face_count(), 4);
        assert_eq!(result.vertex_count(), 4);
    }

    #[test]
    fn test_scheduler_counts_rejections() {
        let mesh = HalfEdgeMesh::from_indexed_mesh(&tetrahedron()).unwrap();
        let mut scheduler = ContractionScheduler::new(mesh).unwrap();
        scheduler.run(0.0).unwrap();
        assert_eq!(scheduler.collapses(), 0);
        assert_eq!(scheduler.rejections(), 6);
        assert_eq!(scheduler.mesh().face_count(), 4);
    }

    #[test]
    fn test_candidate_bookkeeping() {
        let mesh = HalfEdgeMesh::from_indexed_mesh(&tetrahedron()).unwrap();
        let scheduler = ContractionScheduler::new(mesh).unwrap();
        // one live candidate per undirected edge
        assert_eq!(scheduler.active.len(), 6);
        assert_eq!(scheduler.queue.len(), 6);
        for candidate in scheduler.active.values() {
            assert!(candidate.is_valid());
            assert!(candidate.cost() >= 0.0);
            let edge = candidate.edge();
            assert_eq!(edge, edge.canonical());
        }
    }

    #[test]
    fn test_report_on_exhausted_queue() {
        let (result, report) = simplify_with_report(&tetrahedron(), 0.6).unwrap();
        assert_eq!(result.face_count(), 4);
        assert_eq!(report.initial_faces, 4);
        assert_eq!(report.final_faces, 4);
        assert_eq!(report.collapses, 0);
        assert_eq!(report.guard_rejections, 6);
        assert!(report.queue_exhausted);
        assert_eq!(report.reduction(), 0.0);
    }

    #[test]
    fn test_deterministic_output() {
        let mesh = octahedron();
        let first = simplify(&mesh, 0.5).unwrap();
        let second = simplify(&mesh, 0.5).unwrap();
        assert_eq!(first.positions, second.positions);
        assert_eq!(first.indices, second.indices);
    }
}
