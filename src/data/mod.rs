/// Input layer: the records handed over by the audio-analysis step.
///
/// Architecture:
/// ```text
///  .json / .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → AnalysisInput
///   └──────────┘
///        │               features only?
///        ▼                     │
///   ┌───────────────┐     ┌──────────┐
///   │ AnalysisInput  │◄────│ features │  heuristic scores
///   └───────────────┘     └──────────┘
/// ```

pub mod features;
pub mod loader;
pub mod model;
