use crate::mapping::{EmotionRegionWeights, EmotionScoreVector, RegionActivationMap};

/// Combine emotion scores into normalized per-region activation.
///
/// Contributions are summed, both across emotions and across repeated
/// entries for one region inside a single emotion. The result is divided by
/// its maximum so the strongest region sits at exactly 1.0; an all-zero
/// accumulation stays all-zero.
///
/// Scores are divided by the largest score before accumulating. The final
/// normalization cancels that factor, and it keeps huge finite scores from
/// overflowing the sums.
pub fn aggregate(weights: &EmotionRegionWeights, scores: &EmotionScoreVector) -> RegionActivationMap {
    let mut activations = RegionActivationMap::zeros();

    let top_score = scores.iter().map(|(_, s)| s).fold(0.0, f64::max);
    if top_score <= 0.0 {
        return activations;
    }
    for (label, score) in scores.iter() {
        for w in weights.regions(label) {
            activations.add(w.region, score / top_score * w.intensity);
        }
    }

    let max = activations.max_value();
    if max > 0.0 {
        let raw = activations;
        for (region, value) in raw.iter() {
            activations.set(region, value / max);
        }
    }
    activations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{EmotionLabel, Region};

    fn weights() -> EmotionRegionWeights {
        EmotionRegionWeights::builtin()
    }

    #[test]
    fn happy_dominated_track_peaks_at_nucleus_accumbens() {
        let scores = EmotionScoreVector::from_pairs([
            ("happy", 0.8),
            ("sad", 0.1),
            ("calm", 0.05),
            ("energetic", 0.05),
            ("tense", 0.0),
        ])
        .unwrap();
        let map = aggregate(&weights(), &scores);

        assert_eq!(map.strongest(), Some(Region::NucleusAccumbens));
        assert_eq!(map.get(Region::NucleusAccumbens), 1.0);
        // Only `energetic` reaches motor cortex: 0.05 * 0.8 / 0.64.
        assert!((map.get(Region::MotorCortex) - 0.0625).abs() < 1e-12);
        assert!(map.get(Region::MotorCortex) < 0.1);
    }

    #[test]
    fn contributions_sum_across_emotions() {
        // amygdala: happy 0.3 + sad 0.7 + tense 0.9 = 1.9
        // anterior cingulate: sad 0.8
        let scores = EmotionScoreVector::from_pairs([("happy", 1.0), ("sad", 1.0), ("tense", 1.0)])
            .unwrap();
        let map = aggregate(&weights(), &scores);
        assert_eq!(map.get(Region::Amygdala), 1.0);
        assert!((map.get(Region::AnteriorCingulateCortex) - 0.8 / 1.9).abs() < 1e-12);
    }

    #[test]
    fn repeated_region_entries_add_up() {
        let weights: EmotionRegionWeights = serde_json::from_str(
            r#"{
                "sad": {
                    "regions": [
                        {"region": "amygdala", "intensity": 0.5},
                        {"region": "insula", "intensity": 0.4},
                        {"region": "amygdala", "intensity": 0.3}
                    ],
                    "color": [0, 0, 255]
                }
            }"#,
        )
        .unwrap();
        let scores = EmotionScoreVector::from_pairs([("sad", 1.0), ("happy", 1.0)]).unwrap();
        let map = aggregate(&weights, &scores);

        // amygdala 0.5 + 0.3 = 0.8 is the peak; insula 0.4 / 0.8.
        assert_eq!(map.strongest(), Some(Region::Amygdala));
        assert_eq!(map.get(Region::Amygdala), 1.0);
        assert!((map.get(Region::Insula) - 0.5).abs() < 1e-12);
        assert_eq!(map.get(Region::NucleusAccumbens), 0.0);
    }

    #[test]
    fn huge_scores_still_normalize() {
        let scores = EmotionScoreVector::from_pairs([
            ("happy", f64::MAX),
            ("sad", f64::MAX),
            ("tense", f64::MAX),
        ])
        .unwrap();
        let map = aggregate(&weights(), &scores);

        for (region, v) in map.iter() {
            assert!((0.0..=1.0).contains(&v), "{region} out of [0,1]: {v}");
        }
        assert_eq!(map.max_value(), 1.0);
        assert_eq!(map.strongest(), Some(Region::Amygdala));
        assert!((map.get(Region::AnteriorCingulateCortex) - 0.8 / 1.9).abs() < 1e-12);
    }

    #[test]
    fn empty_scores_yield_all_zero() {
        let map = aggregate(&weights(), &EmotionScoreVector::new());
        assert!(map.is_all_zero());
    }

    #[test]
    fn zero_scores_yield_all_zero() {
        let scores: EmotionScoreVector = EmotionLabel::ALL.into_iter().map(|l| (l, 0.0)).collect();
        assert!(aggregate(&weights(), &scores).is_all_zero());
    }

    #[test]
    fn scale_of_scores_does_not_matter() {
        let a = EmotionScoreVector::from_pairs([("calm", 0.2), ("sad", 0.4)]).unwrap();
        let b = EmotionScoreVector::from_pairs([("calm", 2.0), ("sad", 4.0)]).unwrap();
        let ma = aggregate(&weights(), &a);
        let mb = aggregate(&weights(), &b);
        for region in Region::ALL {
            assert!((ma.get(region) - mb.get(region)).abs() < 1e-12);
        }
    }
}
