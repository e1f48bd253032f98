use serde::{Deserialize, Serialize};

use crate::mapping::{EmotionRegionWeights, EmotionScoreVector, RegionActivationMap};

use super::aggregate::aggregate;

/// Emotion scores for one window of the source signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentScores {
    pub start_time: f64,
    pub end_time: f64,
    pub emotions: EmotionScoreVector,
}

/// Region activation snapshot for one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSegment {
    pub start_time: f64,
    pub end_time: f64,
    pub activations: RegionActivationMap,
}

/// Aggregate every segment independently. Order is preserved and nothing
/// is smoothed across neighbouring segments.
pub fn build_series(weights: &EmotionRegionWeights, segments: &[SegmentScores]) -> Vec<TimeSegment> {
    segments
        .iter()
        .map(|s| TimeSegment {
            start_time: s.start_time,
            end_time: s.end_time,
            activations: aggregate(weights, &s.emotions),
        })
        .collect()
}

/// Contiguous `(start, end)` windows of `window` seconds covering
/// `total_duration`. A shorter trailing window is kept when it is non-empty.
pub fn segment_windows(total_duration: f64, window: f64) -> Vec<(f64, f64)> {
    if !window.is_finite() || window <= 0.0 || !total_duration.is_finite() || total_duration <= 0.0 {
        return Vec::new();
    }
    let full = (total_duration / window).floor() as usize;
    let mut windows: Vec<(f64, f64)> = (0..full)
        .map(|i| (i as f64 * window, (i + 1) as f64 * window))
        .collect();
    let covered = full as f64 * window;
    if total_duration > covered {
        windows.push((covered, total_duration));
    }
    windows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::Region;

    fn segment(start: f64, end: f64, pairs: &[(&str, f64)]) -> SegmentScores {
        SegmentScores {
            start_time: start,
            end_time: end,
            emotions: EmotionScoreVector::from_pairs(pairs.iter().copied()).unwrap(),
        }
    }

    #[test]
    fn empty_input_gives_empty_series() {
        assert!(build_series(&EmotionRegionWeights::builtin(), &[]).is_empty());
    }

    #[test]
    fn each_segment_is_aggregated_on_its_own() {
        let weights = EmotionRegionWeights::builtin();
        let series = build_series(
            &weights,
            &[
                segment(0.0, 3.0, &[("energetic", 1.0)]),
                segment(3.0, 6.0, &[("tense", 0.2)]),
                segment(6.0, 9.0, &[]),
            ],
        );
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].activations.get(Region::MotorCortex), 1.0);
        assert_eq!(series[1].activations.get(Region::Amygdala), 1.0);
        assert_eq!(series[1].activations.get(Region::MotorCortex), 0.0);
        assert!(series[2].activations.is_all_zero());
        assert_eq!((series[1].start_time, series[1].end_time), (3.0, 6.0));
    }

    #[test]
    fn windows_keep_a_short_tail() {
        assert_eq!(
            segment_windows(7.5, 3.0),
            vec![(0.0, 3.0), (3.0, 6.0), (6.0, 7.5)]
        );
        assert_eq!(segment_windows(6.0, 3.0), vec![(0.0, 3.0), (3.0, 6.0)]);
        assert!(segment_windows(0.0, 3.0).is_empty());
        assert!(segment_windows(5.0, 0.0).is_empty());
        assert_eq!(segment_windows(1.0, 3.0), vec![(0.0, 1.0)]);
    }
}
