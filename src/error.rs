//! Error types for island map generation

use thiserror::Error;

/// Errors that can occur during map generation or queries
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    /// Configuration or sampler parameters are out of range
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Fewer than three points reached the triangulator
    ///
    /// Generation degrades to an empty graph in this case; the variant is
    /// used to report the condition.
    #[error("insufficient points: got {found}, need at least 3")]
    InsufficientPoints {
        /// Number of points that were available
        found: usize,
    },

    /// Co-linear or co-circular input beyond the circumcircle tolerance
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// The dual graph violates a structural invariant
    #[error("inconsistent graph: {0}")]
    InconsistentGraph(String),
}

/// Result type alias for map operations
pub type Result<T> = std::result::Result<T, MapError>;
