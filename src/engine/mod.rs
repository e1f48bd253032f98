/// The numeric core.
///
/// ```text
///  EmotionScoreVector
///        │  aggregate
///        ▼
///  RegionActivationMap ──build_series──► Vec<TimeSegment>
///        │  rasterize (DenseGrid → sparse)
///        ▼
///  ActivationVolume ──► DenseGrid::from_volume ──project──► OverlayImage
/// ```

pub mod aggregate;
pub mod grid;
pub mod project;
pub mod rasterize;
pub mod series;

pub use aggregate::aggregate;
pub use grid::{ActivationPlane, ActivationVolume, DenseGrid, SparseVoxel};
pub use project::{active_regions, project, project_grid, ActiveRegion, OverlayImage, OverlayStyle};
pub use rasterize::{rasterize, RasterSettings};
pub use series::{build_series, segment_windows, SegmentScores, TimeSegment};
