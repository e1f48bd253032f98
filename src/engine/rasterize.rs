use crate::error::EngineResult;
use crate::mapping::{RegionActivationMap, RegionCoordinateAtlas};

use super::grid::{ActivationVolume, DenseGrid};

/// Anatomical coordinates span `[-ANATOMICAL_HALF_RANGE, ANATOMICAL_HALF_RANGE]`.
const ANATOMICAL_HALF_RANGE: f64 = 50.0;

// ---------------------------------------------------------------------------
// RasterSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterSettings {
    /// Side of the cubic grid.
    pub grid_size: usize,
    /// Regions at or below this activation paint nothing.
    pub region_cutoff: f64,
    /// Cells at or below this value are left out of the sparse list.
    pub voxel_cutoff: f64,
    /// Sphere radius in grid units per unit of activation.
    pub radius_scale: f64,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            grid_size: 100,
            region_cutoff: 0.1,
            voxel_cutoff: 0.1,
            radius_scale: 5.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Rasterization
// ---------------------------------------------------------------------------

/// Splat every sufficiently active region into a fresh grid and return the
/// sparse voxel list.
pub fn rasterize(
    atlas: &RegionCoordinateAtlas,
    activations: &RegionActivationMap,
    settings: &RasterSettings,
) -> EngineResult<ActivationVolume> {
    let mut grid = DenseGrid::cube(settings.grid_size)?;
    paint_regions(&mut grid, atlas, activations, settings);
    let volume = grid.to_sparse(settings.voxel_cutoff);
    log::debug!(
        "rasterized {} regions into {} voxels (grid {})",
        activations.above(settings.region_cutoff).count(),
        volume.len(),
        settings.grid_size
    );
    Ok(volume)
}

/// Paint spheres for each region above the cutoff into `grid`. Existing
/// values are kept where they are larger, so a cleared grid can be reused.
pub fn paint_regions(
    grid: &mut DenseGrid,
    atlas: &RegionCoordinateAtlas,
    activations: &RegionActivationMap,
    settings: &RasterSettings,
) {
    let dims = grid.dimensions();
    for (region, activation) in activations.above(settings.region_cutoff) {
        let Some(coords) = atlas.coordinates(region) else {
            log::warn!("no atlas coordinates for {region}; skipping");
            continue;
        };
        for seed in coords.seeds() {
            let center = [
                anatomical_to_grid(seed[0], dims[0]),
                anatomical_to_grid(seed[1], dims[1]),
                anatomical_to_grid(seed[2], dims[2]),
            ];
            let inside = center
                .iter()
                .zip(dims.iter())
                .all(|(&c, &n)| c >= 0 && (c as usize) < n);
            if !inside {
                continue;
            }
            paint_sphere(grid, center, activation, settings.radius_scale);
        }
    }
}

/// Fill a sphere of radius `floor(radius_scale * activation)` around `center`
/// with a linear falloff from `activation` at the centre to zero at the
/// boundary. Overlaps keep the maximum.
pub fn paint_sphere(grid: &mut DenseGrid, center: [i64; 3], activation: f64, radius_scale: f64) {
    let radius = (radius_scale * activation).floor() as i64;
    if radius <= 0 {
        return;
    }
    let r = radius as f64;
    for dx in -radius..=radius {
        for dy in -radius..=radius {
            for dz in -radius..=radius {
                let distance = ((dx * dx + dy * dy + dz * dz) as f64).sqrt();
                if distance > r {
                    continue;
                }
                let value = activation * (1.0 - distance / r);
                grid.raise(center[0] + dx, center[1] + dy, center[2] + dz, value);
            }
        }
    }
}

/// `floor((c + 50) * size / 100)`: remaps `[-50, 50]` onto `[0, size)`.
/// Results outside that range are the caller's to discard.
pub fn anatomical_to_grid(coordinate: i32, size: usize) -> i64 {
    ((coordinate as f64 + ANATOMICAL_HALF_RANGE) * size as f64 / (2.0 * ANATOMICAL_HALF_RANGE))
        .floor() as i64
}
