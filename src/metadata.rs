use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::mapping::Region;

// ---------------------------------------------------------------------------
// RegionInfo – descriptive record shown next to an active region
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub functions: Vec<String>,
    /// How the region relates to listening to music.
    #[serde(default)]
    pub music_relation: String,
}

impl RegionInfo {
    /// Minimal record for a region nobody has described yet.
    pub fn placeholder(region: Region) -> Self {
        RegionInfo {
            name: region.display_name(),
            description: String::new(),
            functions: Vec::new(),
            music_relation: String::new(),
        }
    }
}

fn seed_records() -> BTreeMap<Region, RegionInfo> {
    let info = |name: &str, description: &str, functions: &[&str], relation: &str| RegionInfo {
        name: name.to_string(),
        description: description.to_string(),
        functions: functions.iter().map(|f| f.to_string()).collect(),
        music_relation: relation.to_string(),
    };
    BTreeMap::from([
        (
            Region::NucleusAccumbens,
            info(
                "Nucleus Accumbens",
                "Part of the reward circuit, associated with pleasure, motivation, and emotional responses to music.",
                &["Reward processing", "Pleasure response", "Addiction mechanisms"],
                "Activates during pleasurable music listening, especially during musical chills or frisson.",
            ),
        ),
        (
            Region::Amygdala,
            info(
                "Amygdala",
                "Almond-shaped structure involved in emotional processing, particularly fear and other intense emotions.",
                &["Emotional processing", "Fear conditioning", "Emotional memory"],
                "Responds to emotionally intense music, particularly sad or scary passages.",
            ),
        ),
        (
            Region::Hippocampus,
            info(
                "Hippocampus",
                "Seahorse-shaped structure crucial for memory formation and spatial navigation.",
                &["Memory formation", "Spatial navigation", "Contextual associations"],
                "Involved in musical memory and recognition of familiar songs.",
            ),
        ),
        (
            Region::PrefrontalCortex,
            info(
                "Prefrontal Cortex",
                "Forward-most part of the frontal lobe, involved in complex cognitive functions.",
                &["Executive function", "Decision making", "Emotional regulation"],
                "Processes musical structure, anticipation, and complex musical patterns.",
            ),
        ),
    ])
}

// ---------------------------------------------------------------------------
// RegionMetadataStore – JSON key-value document, complete after opening
// ---------------------------------------------------------------------------

/// Region descriptions backed by a JSON document keyed by region name.
///
/// Population is eager: once a store is constructed every region has a
/// record, so [`RegionMetadataStore::get`] never misses. Regions absent from
/// the document receive a placeholder, and the document is rewritten so the
/// placeholders are reused next time.
#[derive(Debug, Clone)]
pub struct RegionMetadataStore {
    path: Option<PathBuf>,
    /// Indexed by [`Region::index`].
    records: Vec<RegionInfo>,
    /// Entries in the document that name no known region. Kept so a rewrite
    /// does not drop them.
    foreign: BTreeMap<String, RegionInfo>,
}

impl RegionMetadataStore {
    /// Seeded store that is never written anywhere.
    pub fn in_memory() -> Self {
        let (store, _) = Self::assemble(None, seed_records(), BTreeMap::new());
        store
    }

    /// Open (or create) the document at `path`.
    pub fn open(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref().to_path_buf();
        let (known, foreign, existed) = if path.exists() {
            let text = std::fs::read_to_string(&path).map_err(|source| EngineError::Metadata {
                path: path.clone(),
                source,
            })?;
            let raw: BTreeMap<String, RegionInfo> = serde_json::from_str(&text)?;
            let mut known = BTreeMap::new();
            let mut foreign = BTreeMap::new();
            for (key, info) in raw {
                match key.parse::<Region>() {
                    Ok(region) => {
                        known.insert(region, info);
                    }
                    Err(_) => {
                        foreign.insert(key, info);
                    }
                }
            }
            (known, foreign, true)
        } else {
            log::info!("region metadata {} not found; seeding a new document", path.display());
            (seed_records(), BTreeMap::new(), false)
        };

        let (store, synthesized) = Self::assemble(Some(path), known, foreign);
        if synthesized > 0 || !existed {
            store.persist()?;
        }
        Ok(store)
    }

    fn assemble(
        path: Option<PathBuf>,
        mut known: BTreeMap<Region, RegionInfo>,
        foreign: BTreeMap<String, RegionInfo>,
    ) -> (Self, usize) {
        let mut synthesized = 0;
        let records = Region::ALL
            .into_iter()
            .map(|region| {
                known.remove(&region).unwrap_or_else(|| {
                    synthesized += 1;
                    log::info!("synthesizing metadata record for {region}");
                    RegionInfo::placeholder(region)
                })
            })
            .collect();
        (
            RegionMetadataStore {
                path,
                records,
                foreign,
            },
            synthesized,
        )
    }

    pub fn get(&self, region: Region) -> &RegionInfo {
        &self.records[region.index()]
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Full document as it is persisted: known regions and foreign entries.
    pub fn document(&self) -> BTreeMap<String, RegionInfo> {
        let mut doc = self.foreign.clone();
        for region in Region::ALL {
            doc.insert(region.key().to_string(), self.get(region).clone());
        }
        doc
    }

    /// Write the document back to its path. No-op for in-memory stores.
    pub fn persist(&self) -> EngineResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let io_err = |source| EngineError::Metadata {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let text = serde_json::to_string_pretty(&self.document())?;
        std::fs::write(path, text).map_err(io_err)?;
        log::debug!("wrote region metadata to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_store_covers_every_region() {
        let store = RegionMetadataStore::in_memory();
        assert_eq!(store.get(Region::Amygdala).name, "Amygdala");
        assert_eq!(store.get(Region::Amygdala).functions.len(), 3);

        let insula = store.get(Region::Insula);
        assert_eq!(insula, &RegionInfo::placeholder(Region::Insula));
        assert!(store.path().is_none());
    }

    #[test]
    fn opening_a_missing_document_creates_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("brain_regions.json");

        let store = RegionMetadataStore::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.get(Region::Hippocampus).name, "Hippocampus");

        let doc: BTreeMap<String, RegionInfo> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc.len(), Region::COUNT);
    }

    #[test]
    fn partial_document_is_completed_and_foreign_keys_survive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.json");
        std::fs::write(
            &path,
            r#"{
                "insula": {"name": "Insula", "description": "Interoception hub"},
                "thalamus": {"name": "Thalamus"}
            }"#,
        )
        .unwrap();

        let store = RegionMetadataStore::open(&path).unwrap();
        assert_eq!(store.get(Region::Insula).description, "Interoception hub");
        // Not in the document and not seeded: placeholder.
        assert_eq!(store.get(Region::Amygdala).description, "");

        let doc: BTreeMap<String, RegionInfo> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc.len(), Region::COUNT + 1);
        assert_eq!(doc["thalamus"].name, "Thalamus");
    }

    #[test]
    fn malformed_document_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(matches!(
            RegionMetadataStore::open(&path),
            Err(EngineError::MetadataFormat(_))
        ));
    }
}
