use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

// ---------------------------------------------------------------------------
// EmotionLabel – the closed set of emotions the mapping knows about
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Happy,
    Sad,
    Calm,
    Energetic,
    Tense,
}

impl EmotionLabel {
    pub const ALL: [EmotionLabel; 5] = [
        EmotionLabel::Happy,
        EmotionLabel::Sad,
        EmotionLabel::Calm,
        EmotionLabel::Energetic,
        EmotionLabel::Tense,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EmotionLabel::Happy => "happy",
            EmotionLabel::Sad => "sad",
            EmotionLabel::Calm => "calm",
            EmotionLabel::Energetic => "energetic",
            EmotionLabel::Tense => "tense",
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit error: the label is not part of the closed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEmotion;

impl FromStr for EmotionLabel {
    type Err = UnknownEmotion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EmotionLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or(UnknownEmotion)
    }
}

// ---------------------------------------------------------------------------
// EmotionScoreVector – relative weight per recognised emotion
// ---------------------------------------------------------------------------

/// Non-negative relative weight per emotion. Scores need not sum to 1.
///
/// Stored in a `BTreeMap` keyed by [`EmotionLabel`], so iteration order is
/// fixed by the label order and never by the order scores were supplied in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>")]
pub struct EmotionScoreVector(BTreeMap<EmotionLabel, f64>);

impl EmotionScoreVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a vector from raw `(label, score)` pairs.
    ///
    /// Unrecognised labels are dropped, even when repeated. A score that is
    /// negative or not finite, or a known label given twice, is malformed
    /// input.
    pub fn from_pairs<I, S>(pairs: I) -> EngineResult<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut scores = BTreeMap::new();
        let mut seen = BTreeSet::new();
        for (raw, value) in pairs {
            let raw = raw.as_ref();
            let Ok(label) = raw.parse::<EmotionLabel>() else {
                log::debug!("ignoring unrecognised emotion label '{raw}'");
                continue;
            };
            if !seen.insert(label) {
                return Err(EngineError::DuplicateLabel(raw.to_string()));
            }
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::InvalidScore {
                    label: raw.to_string(),
                    value,
                });
            }
            scores.insert(label, value);
        }
        Ok(EmotionScoreVector(scores))
    }

    /// Score for `label`, 0 when absent.
    pub fn get(&self, label: EmotionLabel) -> f64 {
        self.0.get(&label).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EmotionLabel, f64)> + '_ {
        self.0.iter().map(|(l, s)| (*l, *s))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The label with the largest score; ties resolve to the earlier label.
    pub fn dominant(&self) -> Option<EmotionLabel> {
        self.iter()
            .filter(|(_, s)| *s > 0.0)
            .fold(None, |best: Option<(EmotionLabel, f64)>, (l, s)| match best {
                Some((_, bs)) if bs >= s => best,
                _ => Some((l, s)),
            })
            .map(|(l, _)| l)
    }
}

impl TryFrom<BTreeMap<String, f64>> for EmotionScoreVector {
    type Error = EngineError;

    fn try_from(raw: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        EmotionScoreVector::from_pairs(raw)
    }
}

impl FromIterator<(EmotionLabel, f64)> for EmotionScoreVector {
    /// Collects already-validated pairs. Negative or non-finite scores are
    /// floored to zero.
    fn from_iter<T: IntoIterator<Item = (EmotionLabel, f64)>>(iter: T) -> Self {
        EmotionScoreVector(
            iter.into_iter()
                .map(|(l, s)| (l, if s.is_finite() { s.max(0.0) } else { 0.0 }))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_labels_are_dropped() {
        let v = EmotionScoreVector::from_pairs([("happy", 0.5), ("nostalgic", 0.9)]).unwrap();
        assert_eq!(v.get(EmotionLabel::Happy), 0.5);
        assert_eq!(v.iter().count(), 1);
    }

    #[test]
    fn negative_and_nan_scores_are_rejected() {
        let err = EmotionScoreVector::from_pairs([("sad", -0.1)]).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(EmotionScoreVector::from_pairs([("calm", f64::NAN)]).is_err());
    }

    #[test]
    fn duplicate_labels_are_rejected() {
        let err = EmotionScoreVector::from_pairs([("tense", 0.1), ("tense", 0.2)]).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateLabel(l) if l == "tense"));
    }

    #[test]
    fn repeated_unknown_labels_are_ignored() {
        let v = EmotionScoreVector::from_pairs([("note", 1.0), ("note", -3.0), ("happy", 0.5)])
            .unwrap();
        assert_eq!(v.iter().count(), 1);
        assert_eq!(v.get(EmotionLabel::Happy), 0.5);
    }

    #[test]
    fn deserializes_from_json_object() {
        let v: EmotionScoreVector =
            serde_json::from_str(r#"{"calm": 0.25, "energetic": 0.75, "bored": 1.0}"#).unwrap();
        assert_eq!(v.get(EmotionLabel::Energetic), 0.75);
        assert_eq!(v.get(EmotionLabel::Happy), 0.0);
        assert_eq!(v.dominant(), Some(EmotionLabel::Energetic));
    }

    #[test]
    fn empty_vector_has_no_dominant() {
        assert_eq!(EmotionScoreVector::new().dominant(), None);
    }
}
