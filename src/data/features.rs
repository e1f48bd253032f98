use serde::{Deserialize, Serialize};

use crate::mapping::{EmotionLabel, EmotionScoreVector};

// ---------------------------------------------------------------------------
// MusicalFeatures – summary record from the audio-analysis collaborator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Major,
    Minor,
}

/// Already-extracted features of a track or segment. Nothing here is
/// computed from audio; the record is taken as given.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MusicalFeatures {
    /// Beats per minute.
    pub tempo: f64,
    pub mode: Mode,
    /// Mean signal power.
    pub energy: f64,
    /// Mean spectral centroid in Hz.
    pub spectral_centroid: f64,
    /// Dominant pitch class, 0 = C.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<u8>,
}

/// Heuristic emotion scores for a feature record, normalized to sum to 1.
///
/// Tempo saturates at 180 BPM, energy at 0.01 and brightness at a 2 kHz
/// centroid. Degenerate records (all terms zero) give an empty vector.
pub fn score_features(f: &MusicalFeatures) -> EmotionScoreVector {
    let tempo = (f.tempo / 180.0).clamp(0.0, 1.0);
    let energy = (f.energy * 100.0).clamp(0.0, 1.0);
    let brightness = (f.spectral_centroid / 2000.0).clamp(0.0, 1.0);
    let major = match f.mode {
        Mode::Major => 1.0,
        Mode::Minor => 0.0,
    };

    let raw = [
        (EmotionLabel::Happy, 0.4 * tempo + 0.3 * major + 0.3 * energy),
        (
            EmotionLabel::Sad,
            0.3 * (1.0 - tempo) + 0.4 * (1.0 - major) + 0.3 * (1.0 - energy),
        ),
        (
            EmotionLabel::Calm,
            0.4 * (1.0 - tempo) + 0.2 * major + 0.4 * (1.0 - energy),
        ),
        (EmotionLabel::Energetic, 0.5 * tempo + 0.1 * major + 0.4 * energy),
        (
            EmotionLabel::Tense,
            0.2 * tempo + 0.5 * (1.0 - major) + 0.3 * brightness,
        ),
    ];

    let total: f64 = raw.iter().map(|(_, s)| s).sum();
    if !(total.is_finite() && total > 0.0) {
        return EmotionScoreVector::new();
    }
    raw.into_iter().map(|(l, s)| (l, s / total)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(tempo: f64, mode: Mode, energy: f64, centroid: f64) -> MusicalFeatures {
        MusicalFeatures {
            tempo,
            mode,
            energy,
            spectral_centroid: centroid,
            key: None,
        }
    }

    #[test]
    fn scores_sum_to_one() {
        let v = score_features(&features(120.0, Mode::Major, 0.004, 1500.0));
        let sum: f64 = v.iter().map(|(_, s)| s).sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn fast_loud_major_track_is_happy_or_energetic() {
        let v = score_features(&features(180.0, Mode::Major, 0.02, 1000.0));
        let top = v.dominant().unwrap();
        assert!(matches!(top, EmotionLabel::Happy | EmotionLabel::Energetic));
        assert!(v.get(EmotionLabel::Sad) < 1e-12);
    }

    #[test]
    fn slow_quiet_minor_track_is_sad() {
        let v = score_features(&features(50.0, Mode::Minor, 0.0001, 500.0));
        assert_eq!(v.dominant(), Some(EmotionLabel::Sad));
    }

    #[test]
    fn features_deserialize_with_lowercase_mode() {
        let f: MusicalFeatures = serde_json::from_str(
            r#"{"tempo": 96.0, "mode": "minor", "energy": 0.002, "spectral_centroid": 1800.0, "key": 9}"#,
        )
        .unwrap();
        assert_eq!(f.mode, Mode::Minor);
        assert_eq!(f.key, Some(9));
    }
}
