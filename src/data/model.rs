use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::engine::SegmentScores;
use crate::mapping::{EmotionLabel, EmotionScoreVector};

use super::features::{MusicalFeatures, score_features};

// ---------------------------------------------------------------------------
// AnalysisInput – everything the engine consumes for one track
// ---------------------------------------------------------------------------

/// Track-level and per-segment emotion scores handed over by the audio
/// analysis step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub overall_emotions: EmotionScoreVector,
    #[serde(default)]
    pub segments: Vec<SegmentScores>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<MusicalFeatures>,
}

impl AnalysisInput {
    /// Build an input from segments alone. The overall vector is the
    /// duration-weighted mean of the segment vectors (plain mean when every
    /// segment has zero length).
    pub fn from_segments(segments: Vec<SegmentScores>) -> Self {
        let durations: Vec<f64> = segments
            .iter()
            .map(|s| (s.end_time - s.start_time).max(0.0))
            .collect();
        let total: f64 = durations.iter().sum();
        let weights: Vec<f64> = if total > 0.0 {
            durations.iter().map(|d| d / total).collect()
        } else {
            vec![1.0 / segments.len().max(1) as f64; segments.len()]
        };

        let overall_emotions = if segments.is_empty() {
            EmotionScoreVector::new()
        } else {
            EmotionLabel::ALL
                .into_iter()
                .map(|label| {
                    let mean = segments
                        .iter()
                        .zip(&weights)
                        .map(|(s, w)| s.emotions.get(label) * w)
                        .sum::<f64>();
                    (label, mean)
                })
                .collect()
        };

        AnalysisInput {
            overall_emotions,
            segments,
            features: None,
        }
    }

    /// Input derived from a feature record when no scores were supplied.
    pub fn from_features(features: MusicalFeatures, segments: Vec<SegmentScores>) -> Self {
        AnalysisInput {
            overall_emotions: score_features(&features),
            segments,
            features: Some(features),
        }
    }

    /// Segments must have finite bounds, `start <= end`, and follow each
    /// other without overlap.
    pub fn validate(&self) -> Result<()> {
        let mut prev_end = f64::NEG_INFINITY;
        for (i, s) in self.segments.iter().enumerate() {
            if !s.start_time.is_finite() || !s.end_time.is_finite() {
                bail!("segment {i}: non-finite time bounds");
            }
            if s.end_time < s.start_time {
                bail!(
                    "segment {i}: end_time {} precedes start_time {}",
                    s.end_time,
                    s.start_time
                );
            }
            if s.start_time < prev_end - 1e-9 {
                bail!(
                    "segment {i}: starts at {} before the previous segment ends at {prev_end}",
                    s.start_time
                );
            }
            prev_end = s.end_time;
        }
        Ok(())
    }

    /// End time of the last segment, 0 without segments.
    pub fn duration(&self) -> f64 {
        self.segments.last().map(|s| s.end_time).unwrap_or(0.0)
    }
}
