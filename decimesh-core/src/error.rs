//! Error types for decimesh

use thiserror::Error;

/// Main error type for decimesh operations
///
/// The `Missing*` variants signal a corrupted half-edge structure; the only
/// safe recovery is to abort the operation that produced them.
#[derive(Error, Debug)]
pub enum Error {
    /// Simplification rate outside the unit interval.
    #[error("invalid mesh simplification rate {0}, expected a value in [0.0, 1.0]")]
    InvalidRate(f32),

    /// Input mesh violates the indexed-mesh contract.
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    /// A triangle with zero surface area.
    #[error("({v0},{v1},{v2}) is not a triangle")]
    DegenerateFace { v0: u64, v1: u64, v2: u64 },

    /// A vertex lookup that was expected to succeed failed.
    #[error("attempted to access a nonexistent vertex: {0}")]
    MissingVertex(u64),

    /// An edge lookup that was expected to succeed failed.
    #[error("attempted to access a nonexistent edge: ({tail},{head})")]
    MissingEdge { tail: u64, head: u64 },

    /// A face lookup that was expected to succeed failed.
    #[error("attempted to access a nonexistent face: ({v0},{v1},{v2})")]
    MissingFace { v0: u64, v1: u64, v2: u64 },
}

/// Result type alias for decimesh operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidRate(1.5);
        assert!(format!("{err}").contains("1.5"));

        let err = Error::MissingEdge { tail: 3, head: 7 };
        assert_eq!(
            format!("{err}"),
            "attempted to access a nonexistent edge: (3,7)"
        );

        let err = Error::DegenerateFace { v0: 0, v1: 1, v2: 2 };
        assert_eq!(format!("{err}"), "(0,1,2) is not a triangle");
    }
}
