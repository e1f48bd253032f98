use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use super::emotion::EmotionLabel;
use super::region::Region;

// ---------------------------------------------------------------------------
// EmotionRegionWeights – emotion → weighted regions + display colour
// ---------------------------------------------------------------------------

/// One `(region, intensity)` entry. Intensity is in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionWeight {
    pub region: Region,
    pub intensity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionProfile {
    pub regions: Vec<RegionWeight>,
    /// RGB display colour.
    pub color: [u8; 3],
}

/// The static emotion → region lookup. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmotionRegionWeights(BTreeMap<EmotionLabel, EmotionProfile>);

impl EmotionRegionWeights {
    pub fn builtin() -> Self {
        use Region::*;
        let profile = |regions: &[(Region, f64)], color: [u8; 3]| EmotionProfile {
            regions: regions
                .iter()
                .map(|&(region, intensity)| RegionWeight { region, intensity })
                .collect(),
            color,
        };

        let mut table = BTreeMap::new();
        table.insert(
            EmotionLabel::Happy,
            profile(
                &[
                    (NucleusAccumbens, 0.8),
                    (VentralTegmentalArea, 0.7),
                    (OrbitofrontalCortex, 0.6),
                    (Amygdala, 0.3),
                ],
                [255, 215, 0],
            ),
        );
        table.insert(
            EmotionLabel::Sad,
            profile(
                &[
                    (Amygdala, 0.7),
                    (Hippocampus, 0.5),
                    (AnteriorCingulateCortex, 0.8),
                    (PrefrontalCortex, 0.6),
                ],
                [0, 0, 139],
            ),
        );
        table.insert(
            EmotionLabel::Calm,
            profile(
                &[
                    (PrefrontalCortex, 0.7),
                    (AnteriorCingulateCortex, 0.4),
                    (Hippocampus, 0.3),
                    (Insula, 0.2),
                ],
                [0, 128, 128],
            ),
        );
        table.insert(
            EmotionLabel::Energetic,
            profile(
                &[
                    (MotorCortex, 0.8),
                    (SupplementaryMotorArea, 0.7),
                    (BasalGanglia, 0.6),
                    (Cerebellum, 0.7),
                ],
                [255, 69, 0],
            ),
        );
        table.insert(
            EmotionLabel::Tense,
            profile(
                &[
                    (Amygdala, 0.9),
                    (Hypothalamus, 0.7),
                    (PeriaqueductalGray, 0.6),
                    (AnteriorInsula, 0.7),
                ],
                [128, 0, 128],
            ),
        );
        EmotionRegionWeights(table)
    }

    /// Weighted regions for `label`; empty when the table has no entry.
    pub fn regions(&self, label: EmotionLabel) -> &[RegionWeight] {
        self.0
            .get(&label)
            .map(|p| p.regions.as_slice())
            .unwrap_or(&[])
    }

    pub fn color(&self, label: EmotionLabel) -> Option<[u8; 3]> {
        self.0.get(&label).map(|p| p.color)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EmotionLabel, &EmotionProfile)> {
        self.0.iter().map(|(l, p)| (*l, p))
    }
}

// ---------------------------------------------------------------------------
// RegionCoordinateAtlas – region → candidate anatomical coordinates
// ---------------------------------------------------------------------------

/// Candidate coordinates on each axis, in the anatomical range `[-50, 50]`.
/// Every x/y/z combination is a seed point; two x values model the two
/// hemispheres of a bilateral structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionCoordinates {
    pub x: Vec<i32>,
    pub y: Vec<i32>,
    pub z: Vec<i32>,
}

impl RegionCoordinates {
    /// Cartesian product of the candidate lists, x outer, z inner.
    pub fn seeds(&self) -> impl Iterator<Item = [i32; 3]> + '_ {
        self.x.iter().flat_map(move |&x| {
            self.y
                .iter()
                .flat_map(move |&y| self.z.iter().map(move |&z| [x, y, z]))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionCoordinateAtlas(BTreeMap<Region, RegionCoordinates>);

impl RegionCoordinateAtlas {
    pub fn builtin() -> Self {
        use Region::*;
        let c = |x: &[i32], y: &[i32], z: &[i32]| RegionCoordinates {
            x: x.to_vec(),
            y: y.to_vec(),
            z: z.to_vec(),
        };
        let atlas = [
            (NucleusAccumbens, c(&[10, -10], &[12], &[-8])),
            (VentralTegmentalArea, c(&[0], &[-16], &[-12])),
            (OrbitofrontalCortex, c(&[25, -25], &[30], &[-12])),
            (Amygdala, c(&[23, -23], &[-5], &[-15])),
            (Hippocampus, c(&[30, -30], &[-20], &[-10])),
            (AnteriorCingulateCortex, c(&[0], &[30], &[20])),
            (PrefrontalCortex, c(&[35, -35], &[45], &[25])),
            (Insula, c(&[40, -40], &[5], &[5])),
            (MotorCortex, c(&[30, -30], &[-15], &[55])),
            (SupplementaryMotorArea, c(&[5, -5], &[0], &[60])),
            (BasalGanglia, c(&[15, -15], &[5], &[5])),
            (Cerebellum, c(&[25, -25], &[-60], &[-30])),
            (Hypothalamus, c(&[0], &[-5], &[-10])),
            (PeriaqueductalGray, c(&[0], &[-30], &[-10])),
            (AnteriorInsula, c(&[35, -35], &[15], &[5])),
        ];
        RegionCoordinateAtlas(atlas.into_iter().collect())
    }

    pub fn coordinates(&self, region: Region) -> Option<&RegionCoordinates> {
        self.0.get(&region)
    }
}

// ---------------------------------------------------------------------------
// MappingTables – both tables, built once and shared by reference
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingTables {
    pub weights: EmotionRegionWeights,
    pub atlas: RegionCoordinateAtlas,
}

impl Default for MappingTables {
    fn default() -> Self {
        Self::builtin()
    }
}

impl MappingTables {
    pub fn builtin() -> Self {
        MappingTables {
            weights: EmotionRegionWeights::builtin(),
            atlas: RegionCoordinateAtlas::builtin(),
        }
    }

    /// Load replacement tables from a JSON document shaped like the
    /// serialized form of [`MappingTables`].
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading mapping tables {}", path.display()))?;
        let tables: MappingTables =
            serde_json::from_str(&text).context("parsing mapping tables")?;
        tables.validate()?;
        Ok(tables)
    }

    /// Every intensity lies in `[0, 1]` and every weighted region has atlas
    /// coordinates.
    pub fn validate(&self) -> Result<()> {
        for (label, profile) in self.weights.iter() {
            for w in &profile.regions {
                if !(0.0..=1.0).contains(&w.intensity) {
                    bail!(
                        "{label}: intensity {} for {} is outside [0, 1]",
                        w.intensity,
                        w.region
                    );
                }
                if self.atlas.coordinates(w.region).is_none() {
                    bail!("{label}: region {} has no atlas coordinates", w.region);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_are_consistent() {
        let tables = MappingTables::builtin();
        tables.validate().unwrap();
        for region in Region::ALL {
            assert!(tables.atlas.coordinates(region).is_some(), "{region} missing");
        }
    }

    #[test]
    fn bilateral_regions_have_two_seeds() {
        let atlas = RegionCoordinateAtlas::builtin();
        let amygdala: Vec<_> = atlas.coordinates(Region::Amygdala).unwrap().seeds().collect();
        assert_eq!(amygdala, vec![[23, -5, -15], [-23, -5, -15]]);
        let vta: Vec<_> = atlas
            .coordinates(Region::VentralTegmentalArea)
            .unwrap()
            .seeds()
            .collect();
        assert_eq!(vta.len(), 1);
    }

    #[test]
    fn out_of_range_intensity_fails_validation() {
        let mut tables = MappingTables::builtin();
        tables
            .weights
            .0
            .get_mut(&EmotionLabel::Calm)
            .unwrap()
            .regions[0]
            .intensity = 1.5;
        assert!(tables.validate().is_err());
    }

    #[test]
    fn tables_round_trip_through_json() {
        let tables = MappingTables::builtin();
        let json = serde_json::to_string(&tables).unwrap();
        let back: MappingTables = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tables);
    }
}
