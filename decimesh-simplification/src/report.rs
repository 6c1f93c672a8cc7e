//! Summary statistics for a simplification run

use std::fmt;

/// Statistics describing one simplification run
///
/// Under-reduction is not an error: when the candidate queue empties before
/// the target face count is reached, the partial result is returned and
/// `queue_exhausted` is set instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimplificationReport {
    /// Triangles in the input mesh
    pub initial_faces: usize,
    /// Triangles in the simplified mesh
    pub final_faces: usize,
    /// Edge collapses applied
    pub collapses: usize,
    /// Candidates discarded by the manifold guard
    pub guard_rejections: usize,
    /// Whether the candidate queue ran dry before the target face count
    /// was reached
    pub queue_exhausted: bool,
}

impl SimplificationReport {
    /// Fraction of input triangles removed
    pub fn reduction(&self) -> f32 {
        if self.initial_faces == 0 {
            0.0
        } else {
            1.0 - self.final_faces as f32 / self.initial_faces as f32
        }
    }
}

impl fmt::Display for SimplificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "simplified from {} to {} triangles ({} collapses, {} rejected by the manifold guard)",
            self.initial_faces, self.final_faces, self.collapses, self.guard_rejections
        )?;
        if self.queue_exhausted {
            write!(f, ", queue exhausted before the target")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduction_fraction() {
        let report = SimplificationReport {
            initial_faces: 200,
            final_faces: 50,
            collapses: 75,
            guard_rejections: 3,
            queue_exhausted: false,
        };
        assert!((report.reduction() - 0.75).abs() < 1e-6);

        let empty = SimplificationReport {
            initial_faces: 0,
            final_faces: 0,
            collapses: 0,
            guard_rejections: 0,
            queue_exhausted: false,
        };
        assert_eq!(empty.reduction(), 0.0);
    }

    #[test]
    fn test_display() {
        let report = SimplificationReport {
            initial_faces: 8,
            final_faces: 4,
            collapses: 2,
            guard_rejections: 5,
            queue_exhausted: true,
        };
        let text = format!("{report}");
        assert!(text.contains("from 8 to 4"));
        assert!(text.contains("queue exhausted"));
    }
}
