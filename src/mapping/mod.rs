/// Static lookup data: the closed emotion and region sets and the two tables
/// that connect them.
///
/// ```text
///  EmotionLabel ──► EmotionRegionWeights ──► (Region, intensity)*
///                                               │
///                                               ▼
///                                  RegionCoordinateAtlas ──► seed points
/// ```

pub mod emotion;
pub mod region;
pub mod tables;

pub use emotion::{EmotionLabel, EmotionScoreVector};
pub use region::{Region, RegionActivationMap};
pub use tables::{
    EmotionRegionWeights, MappingTables, RegionCoordinateAtlas, RegionCoordinates, RegionWeight,
};
