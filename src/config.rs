use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::anatomy::DEFAULT_ANATOMY_DIMENSIONS;
use crate::color::{Rgb, DEFAULT_OVERLAY_TINT};
use crate::engine::{DenseGrid, OverlayStyle, RasterSettings};

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Side of the cubic activation grid.
    pub grid_size: usize,
    /// Regions at or below this activation are not rasterized.
    pub region_cutoff: f64,
    /// Voxels at or below this value are not stored.
    pub voxel_cutoff: f64,
    /// Splat radius in grid units at activation 1.0.
    pub splat_radius_scale: f64,
    pub overlay_tint: Rgb,
    /// Overlay alpha below this is cleared.
    pub alpha_cutoff: u8,
    /// Regions listed next to a slice must exceed this activation.
    pub slice_region_cutoff: f64,
    pub slices_per_view: usize,
    pub anatomy_dimensions: [usize; 3],
    pub metadata_path: PathBuf,
    /// Optional JSON replacement for the built-in mapping tables.
    pub mapping_path: Option<PathBuf>,
    /// Resample overlays to the anatomical slice extent.
    pub resample_overlays: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid_size: 100,
            region_cutoff: 0.1,
            voxel_cutoff: 0.1,
            splat_radius_scale: 5.0,
            overlay_tint: DEFAULT_OVERLAY_TINT,
            alpha_cutoff: 50,
            slice_region_cutoff: 0.3,
            slices_per_view: 50,
            anatomy_dimensions: DEFAULT_ANATOMY_DIMENSIONS,
            metadata_path: PathBuf::from("data/brain_regions.json"),
            mapping_path: None,
            resample_overlays: false,
        }
    }
}

impl EngineConfig {
    /// Load config from a TOML file, falling back to defaults for missing
    /// fields. Env var overrides are applied afterwards.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;
        let mut config: EngineConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given and present; otherwise defaults with env
    /// overrides. A file that exists but does not parse is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) if p.exists() => Self::load(p),
            other => {
                if let Some(p) = other {
                    log::info!("Config file {} not found, using defaults", p.display());
                }
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg.validate()?;
                Ok(cfg)
            }
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("EMOVOL_GRID_SIZE") {
            if let Ok(n) = v.parse() {
                self.grid_size = n;
            }
        }
        if let Ok(v) = std::env::var("EMOVOL_SLICES_PER_VIEW") {
            if let Ok(n) = v.parse() {
                self.slices_per_view = n;
            }
        }
        if let Ok(v) = std::env::var("EMOVOL_METADATA_PATH") {
            self.metadata_path = PathBuf::from(v);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid_size == 0 {
            bail!("grid_size must be at least 1");
        }
        if DenseGrid::cell_count([self.grid_size; 3]).is_none() {
            bail!("grid_size {} is too large for a dense grid", self.grid_size);
        }
        for (name, value) in [
            ("region_cutoff", self.region_cutoff),
            ("voxel_cutoff", self.voxel_cutoff),
            ("slice_region_cutoff", self.slice_region_cutoff),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{name} must lie in [0, 1], got {value}");
            }
        }
        if !(self.splat_radius_scale.is_finite() && self.splat_radius_scale >= 0.0) {
            bail!("splat_radius_scale must be a non-negative number");
        }
        if self.anatomy_dimensions.contains(&0) {
            bail!("anatomy_dimensions must all be non-zero");
        }
        Ok(())
    }

    pub fn raster_settings(&self) -> RasterSettings {
        RasterSettings {
            grid_size: self.grid_size,
            region_cutoff: self.region_cutoff,
            voxel_cutoff: self.voxel_cutoff,
            radius_scale: self.splat_radius_scale,
        }
    }

    pub fn overlay_style(&self) -> OverlayStyle {
        OverlayStyle {
            tint: self.overlay_tint,
            alpha_cutoff: self.alpha_cutoff,
        }
    }
}
