//! Emotion-to-volume mapping and slice projection.
//!
//! Emotion scores are aggregated into per-region activations, splatted into a
//! sparse voxel volume, and projected onto axial, coronal and sagittal planes
//! as RGBA overlays.

pub mod anatomy;
pub mod color;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod mapping;
pub mod metadata;
pub mod report;

pub use anatomy::{Orientation, SliceDescriptor};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use mapping::{EmotionLabel, EmotionScoreVector, MappingTables, Region, RegionActivationMap};
pub use metadata::RegionMetadataStore;
pub use report::{analyze, AnalysisContext, AnalysisReport};
