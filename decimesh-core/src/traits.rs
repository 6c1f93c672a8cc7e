//! Core traits for decimesh

use crate::mesh::IndexedMesh;
use crate::point::*;

/// Trait for objects with a spatial extent
pub trait Drawable {
    /// Get the bounding box of the object
    fn bounding_box(&self) -> (Point3f, Point3f);

    /// Get the center point of the object
    fn center(&self) -> Point3f;
}

impl Drawable for IndexedMesh {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        if self.positions.is_empty() {
            return (Point3f::origin(), Point3f::origin());
        }

        let mut min = self.positions[0];
        let mut max = self.positions[0];

        for position in &self.positions {
            min.x = min.x.min(position.x);
            min.y = min.y.min(position.y);
            min.z = min.z.min(position.z);

            max.x = max.x.max(position.x);
            max.y = max.y.max(position.y);
            max.z = max.z.max(position.z);
        }

        (min, max)
    }

    fn center(&self) -> Point3f {
        let (min, max) = self.bounding_box();
        Point3f::new(
            (min.x + max.x) / 2.0,
            (min.y + max.y) / 2.0,
            (min.z + max.z) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_bounding_box() {
        let mesh = IndexedMesh::from_positions_and_indices(
            vec![
                Point3::new(-1.0, 0.0, 2.0),
                Point3::new(1.0, -3.0, 0.0),
                Point3::new(0.0, 1.0, -2.0),
            ],
            vec![0, 1, 2],
        );
        let (min, max) = mesh.bounding_box();
        assert_eq!(min, Point3::new(-1.0, -3.0, -2.0));
        assert_eq!(max, Point3::new(1.0, 1.0, 2.0));
        assert_eq!(mesh.center(), Point3::new(0.0, -1.0, 0.0));
    }
}
