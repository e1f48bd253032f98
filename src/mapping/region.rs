use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Region – the closed set of 15 anatomical zones
// ---------------------------------------------------------------------------

/// Named anatomical zone. Declaration order is the canonical region order
/// used by every map and report in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    NucleusAccumbens,
    VentralTegmentalArea,
    OrbitofrontalCortex,
    Amygdala,
    Hippocampus,
    AnteriorCingulateCortex,
    PrefrontalCortex,
    Insula,
    MotorCortex,
    SupplementaryMotorArea,
    BasalGanglia,
    Cerebellum,
    Hypothalamus,
    PeriaqueductalGray,
    AnteriorInsula,
}

impl Region {
    pub const COUNT: usize = 15;

    pub const ALL: [Region; Region::COUNT] = [
        Region::NucleusAccumbens,
        Region::VentralTegmentalArea,
        Region::OrbitofrontalCortex,
        Region::Amygdala,
        Region::Hippocampus,
        Region::AnteriorCingulateCortex,
        Region::PrefrontalCortex,
        Region::Insula,
        Region::MotorCortex,
        Region::SupplementaryMotorArea,
        Region::BasalGanglia,
        Region::Cerebellum,
        Region::Hypothalamus,
        Region::PeriaqueductalGray,
        Region::AnteriorInsula,
    ];

    /// Snake-case key, as used in metadata documents and JSON output.
    pub fn key(self) -> &'static str {
        match self {
            Region::NucleusAccumbens => "nucleus_accumbens",
            Region::VentralTegmentalArea => "ventral_tegmental_area",
            Region::OrbitofrontalCortex => "orbitofrontal_cortex",
            Region::Amygdala => "amygdala",
            Region::Hippocampus => "hippocampus",
            Region::AnteriorCingulateCortex => "anterior_cingulate_cortex",
            Region::PrefrontalCortex => "prefrontal_cortex",
            Region::Insula => "insula",
            Region::MotorCortex => "motor_cortex",
            Region::SupplementaryMotorArea => "supplementary_motor_area",
            Region::BasalGanglia => "basal_ganglia",
            Region::Cerebellum => "cerebellum",
            Region::Hypothalamus => "hypothalamus",
            Region::PeriaqueductalGray => "periaqueductal_gray",
            Region::AnteriorInsula => "anterior_insula",
        }
    }

    /// Human-readable name: `ventral_tegmental_area` → `Ventral Tegmental Area`.
    pub fn display_name(self) -> String {
        self.key()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Position in [`Region::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRegion(pub String);

impl fmt::Display for UnknownRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown region '{}'", self.0)
    }
}

impl std::error::Error for UnknownRegion {}

impl FromStr for Region {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::ALL
            .into_iter()
            .find(|r| r.key() == s)
            .ok_or_else(|| UnknownRegion(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// RegionActivationMap – one value per region, always all 15 present
// ---------------------------------------------------------------------------

/// Activation per region. Every region is always present, so lookups never
/// miss and serialization always emits all 15 keys in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RegionActivationMap([f64; Region::COUNT]);

impl RegionActivationMap {
    /// All regions at zero.
    pub fn zeros() -> Self {
        Self::default()
    }

    pub fn get(&self, region: Region) -> f64 {
        self.0[region.index()]
    }

    pub fn set(&mut self, region: Region, value: f64) {
        self.0[region.index()] = value;
    }

    pub fn add(&mut self, region: Region, value: f64) {
        self.0[region.index()] += value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Region, f64)> + '_ {
        Region::ALL.into_iter().map(move |r| (r, self.get(r)))
    }

    pub fn max_value(&self) -> f64 {
        self.0.iter().copied().fold(0.0, f64::max)
    }

    /// The region with the highest activation; ties resolve to the earlier
    /// region. `None` when every region is zero.
    pub fn strongest(&self) -> Option<Region> {
        let max = self.max_value();
        if max <= 0.0 {
            return None;
        }
        self.iter().find(|(_, v)| *v == max).map(|(r, _)| r)
    }

    pub fn is_all_zero(&self) -> bool {
        self.0.iter().all(|v| *v == 0.0)
    }

    /// Regions whose activation strictly exceeds `threshold`.
    pub fn above(&self, threshold: f64) -> impl Iterator<Item = (Region, f64)> + '_ {
        self.iter().filter(move |(_, v)| *v > threshold)
    }
}

impl Serialize for RegionActivationMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(Region::COUNT))?;
        for (region, value) in self.iter() {
            map.serialize_entry(region.key(), &value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RegionActivationMap {
    /// Unknown keys are rejected; missing regions default to zero.
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<Region, f64>::deserialize(deserializer)?;
        let mut map = RegionActivationMap::zeros();
        for (region, value) in raw {
            map.set(region, value);
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_from_str() {
        for region in Region::ALL {
            assert_eq!(region.key().parse::<Region>().unwrap(), region);
        }
        assert!("thalamus".parse::<Region>().is_err());
    }

    #[test]
    fn display_name_is_title_cased() {
        assert_eq!(Region::VentralTegmentalArea.display_name(), "Ventral Tegmental Area");
        assert_eq!(Region::Insula.display_name(), "Insula");
    }

    #[test]
    fn strongest_prefers_earlier_region_on_ties() {
        let mut map = RegionActivationMap::zeros();
        assert_eq!(map.strongest(), None);
        map.set(Region::Cerebellum, 1.0);
        map.set(Region::Amygdala, 1.0);
        assert_eq!(map.strongest(), Some(Region::Amygdala));
    }

    #[test]
    fn serializes_every_region() {
        let mut map = RegionActivationMap::zeros();
        map.set(Region::Hypothalamus, 0.5);
        let json = serde_json::to_value(map).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), Region::COUNT);
        assert_eq!(obj["hypothalamus"], 0.5);

        let back: RegionActivationMap = serde_json::from_value(json).unwrap();
        assert_eq!(back, map);
    }
}
