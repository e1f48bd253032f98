use std::path::PathBuf;

use thiserror::Error;

use crate::anatomy::Orientation;

// ---------------------------------------------------------------------------
// EngineError – every failure the core can report to a caller
// ---------------------------------------------------------------------------

/// Structured error for the mapping / projection engine.
///
/// Aggregation and rasterization never produce one of these; they reduce any
/// degenerate input to a defined zero state. Projection and input validation
/// fail fast instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid orientation '{0}': expected axial, coronal or sagittal")]
    InvalidOrientation(String),

    #[error(
        "slice position {position} is outside the {orientation} range [0, {dimension}]"
    )]
    SlicePositionOutOfRange {
        orientation: Orientation,
        position: i64,
        dimension: usize,
    },

    #[error("invalid volume dimensions {0:?}: every axis must be non-zero")]
    InvalidDimensions([usize; 3]),

    #[error("invalid score for '{label}': {value} (scores must be finite and non-negative)")]
    InvalidScore { label: String, value: f64 },

    #[error("emotion label '{0}' appears more than once in one score vector")]
    DuplicateLabel(String),

    #[error("invalid grid size {0}: must be at least 1")]
    InvalidGridSize(usize),

    #[error("voxel ({x}, {y}, {z}) lies outside a volume of dimensions {dimensions:?}")]
    VoxelOutOfBounds {
        x: usize,
        y: usize,
        z: usize,
        dimensions: [usize; 3],
    },

    #[error("region metadata store {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("region metadata document is malformed: {0}")]
    MetadataFormat(#[from] serde_json::Error),

    #[error("overlay encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

impl EngineError {
    /// True for the structurally-invalid-input family: bad orientation,
    /// out-of-range slice position, malformed score vector or shape.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidOrientation(_)
                | EngineError::SlicePositionOutOfRange { .. }
                | EngineError::InvalidDimensions(_)
                | EngineError::InvalidScore { .. }
                | EngineError::DuplicateLabel(_)
                | EngineError::InvalidGridSize(_)
                | EngineError::VoxelOutOfBounds { .. }
        )
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
