use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};
use serde::{Serialize, Serializer};

use crate::anatomy::SliceDescriptor;
use crate::color::{Rgb, DEFAULT_OVERLAY_TINT};
use crate::error::{EngineError, EngineResult};
use crate::mapping::{Region, RegionActivationMap};
use crate::metadata::{RegionInfo, RegionMetadataStore};

use super::grid::{ActivationPlane, ActivationVolume, DenseGrid};

// ---------------------------------------------------------------------------
// OverlayStyle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub tint: Rgb,
    /// Alpha values below this are zeroed.
    pub alpha_cutoff: u8,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            tint: DEFAULT_OVERLAY_TINT,
            alpha_cutoff: 50,
        }
    }
}

// ---------------------------------------------------------------------------
// OverlayImage – RGBA raster for one slice
// ---------------------------------------------------------------------------

/// Row-major RGBA8 buffer. Serializes as a PNG data URL.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl OverlayImage {
    /// Render a plane with one constant tint. Alpha is
    /// `floor(value * 255)`, zeroed below the style's cutoff.
    pub fn render(plane: &ActivationPlane, style: &OverlayStyle) -> Self {
        let mut pixels = Vec::with_capacity(plane.values.len() * 4);
        for &value in &plane.values {
            let alpha = (value * 255.0).floor().clamp(0.0, 255.0) as u8;
            if alpha < style.alpha_cutoff || alpha == 0 {
                pixels.extend_from_slice(&[0, 0, 0, 0]);
            } else {
                let [r, g, b] = style.tint;
                pixels.extend_from_slice(&[r, g, b, alpha]);
            }
        }
        OverlayImage {
            width: plane.width as u32,
            height: plane.height as u32,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, col: u32, row: u32) -> [u8; 4] {
        let i = ((row * self.width + col) * 4) as usize;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Number of pixels with non-zero alpha.
    pub fn illuminated(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|p| p[3] > 0).count()
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| image::Rgba(self.pixel(x, y)))
    }

    /// Nearest-neighbour resample, e.g. to the anatomical slice's extent.
    pub fn resampled(&self, width: u32, height: u32) -> Self {
        if width == self.width && height == self.height {
            return self.clone();
        }
        let resized = imageops::resize(&self.to_rgba_image(), width, height, FilterType::Nearest);
        OverlayImage {
            width,
            height,
            pixels: resized.into_raw(),
        }
    }

    pub fn to_png(&self) -> EngineResult<Vec<u8>> {
        let mut bytes = Vec::new();
        self.to_rgba_image()
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    pub fn to_data_url(&self) -> EngineResult<String> {
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(self.to_png()?)))
    }
}

impl Serialize for OverlayImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let url = self.to_data_url().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&url)
    }
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Project a sparse volume onto one slice. Reconstructs the dense grid; use
/// [`project_grid`] to share one reconstruction across many slices.
pub fn project(
    volume: &ActivationVolume,
    slice: &SliceDescriptor,
    style: &OverlayStyle,
) -> EngineResult<OverlayImage> {
    let grid = DenseGrid::from_volume(volume)?;
    project_grid(&grid, slice, style)
}

pub fn project_grid(
    grid: &DenseGrid,
    slice: &SliceDescriptor,
    style: &OverlayStyle,
) -> EngineResult<OverlayImage> {
    let axis_size = grid.dimensions()[slice.orientation.fixed_axis()];
    let index = slice.grid_index(axis_size)?;
    let plane = grid
        .plane(slice.orientation, index)
        .ok_or(EngineError::SlicePositionOutOfRange {
            orientation: slice.orientation,
            position: slice.position,
            dimension: slice.axis_dimension(),
        })?;
    Ok(OverlayImage::render(&plane, style))
}

// ---------------------------------------------------------------------------
// Active regions
// ---------------------------------------------------------------------------

/// A region listed next to a slice, with its descriptive record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveRegion {
    pub region: Region,
    #[serde(flatten)]
    pub info: RegionInfo,
    pub activation: f64,
}

/// Regions whose activation exceeds `cutoff`, in canonical region order.
pub fn active_regions(
    activations: &RegionActivationMap,
    store: &RegionMetadataStore,
    cutoff: f64,
) -> Vec<ActiveRegion> {
    activations
        .above(cutoff)
        .map(|(region, activation)| ActiveRegion {
            region,
            info: store.get(region).clone(),
            activation,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anatomy::Orientation;
    use crate::engine::grid::SparseVoxel;

    fn volume() -> ActivationVolume {
        ActivationVolume {
            dimensions: [4, 4, 4],
            voxels: vec![
                SparseVoxel { x: 1, y: 2, z: 3, value: 1.0 },
                SparseVoxel { x: 2, y: 1, z: 3, value: 0.15 },
                SparseVoxel { x: 0, y: 0, z: 0, value: 0.5 },
            ],
        }
    }

    fn slice(orientation: Orientation, position: i64) -> SliceDescriptor {
        SliceDescriptor {
            orientation,
            index: 0,
            position,
            dimensions: [40, 40, 40],
        }
    }

    #[test]
    fn axial_projection_renders_tinted_alpha() {
        // position 40 / 40 → last plane (z = 3)
        let img = project(&volume(), &slice(Orientation::Axial, 40), &OverlayStyle::default()).unwrap();
        assert_eq!((img.width(), img.height()), (4, 4));
        assert_eq!(img.pixel(1, 2), [255, 0, 255, 255]);
        // floor(0.15 * 255) = 38 < 50 → cleared
        assert_eq!(img.pixel(2, 1), [0, 0, 0, 0]);
        assert_eq!(img.illuminated(), 1);
    }

    #[test]
    fn alpha_is_floor_of_scaled_value() {
        let img = project(&volume(), &slice(Orientation::Sagittal, 0), &OverlayStyle::default()).unwrap();
        // floor(0.5 * 255) = 127
        assert_eq!(img.pixel(0, 0)[3], 127);
    }

    #[test]
    fn out_of_range_slice_is_rejected() {
        let err = project(&volume(), &slice(Orientation::Coronal, 41), &OverlayStyle::default())
            .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn edge_positions_reach_the_last_plane_of_a_non_cubic_grid() {
        let mut grid = DenseGrid::with_dimensions([3, 5, 7]).unwrap();
        assert!(grid.raise(2, 4, 6, 1.0));

        for (orientation, extent) in [
            (Orientation::Sagittal, (5, 7)),
            (Orientation::Coronal, (3, 7)),
            (Orientation::Axial, (3, 5)),
        ] {
            let img = project_grid(&grid, &slice(orientation, 40), &OverlayStyle::default()).unwrap();
            assert_eq!((img.width(), img.height()), extent, "{orientation}");
            assert_eq!(img.illuminated(), 1, "{orientation}");
        }
    }

    #[test]
    fn custom_tint_and_cutoff_apply() {
        let style = OverlayStyle {
            tint: [10, 20, 30],
            alpha_cutoff: 0,
        };
        let img = project(&volume(), &slice(Orientation::Axial, 39), &style).unwrap();
        assert_eq!(img.pixel(2, 1), [10, 20, 30, 38]);
    }

    #[test]
    fn resample_and_png_encoding() {
        let img = project(&volume(), &slice(Orientation::Axial, 40), &OverlayStyle::default()).unwrap();
        let big = img.resampled(8, 8);
        assert_eq!((big.width(), big.height()), (8, 8));
        assert!(big.illuminated() >= 1);

        let png = img.to_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");
        assert!(img.to_data_url().unwrap().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn active_regions_filter_on_cutoff() {
        let mut map = RegionActivationMap::zeros();
        map.set(Region::Amygdala, 1.0);
        map.set(Region::Insula, 0.3);
        map.set(Region::Hippocampus, 0.31);
        let store = RegionMetadataStore::in_memory();

        let regions = active_regions(&map, &store, 0.3);
        let names: Vec<_> = regions.iter().map(|r| r.region).collect();
        assert_eq!(names, vec![Region::Amygdala, Region::Hippocampus]);
        assert_eq!(regions[0].info.name, "Amygdala");

        let json = serde_json::to_value(&regions[1]).unwrap();
        assert_eq!(json["region"], "hippocampus");
        assert_eq!(json["activation"], 0.31);
        assert!(json["functions"].is_array());
    }
}
