use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Dimensions of the MNI152 2009 template, the reference volume slices are
/// normally cut from.
pub const DEFAULT_ANATOMY_DIMENSIONS: [usize; 3] = [197, 233, 189];

// ---------------------------------------------------------------------------
// Orientation – which axis a slice holds fixed
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Axial,
    Coronal,
    Sagittal,
}

impl Orientation {
    pub const ALL: [Orientation; 3] = [
        Orientation::Axial,
        Orientation::Coronal,
        Orientation::Sagittal,
    ];

    /// Index of the fixed axis: axial → z, coronal → y, sagittal → x.
    pub fn fixed_axis(self) -> usize {
        match self {
            Orientation::Axial => 2,
            Orientation::Coronal => 1,
            Orientation::Sagittal => 0,
        }
    }

    /// The two varying axes, in `(first, second)` order.
    pub fn varying_axes(self) -> (usize, usize) {
        match self {
            Orientation::Axial => (0, 1),
            Orientation::Coronal => (0, 2),
            Orientation::Sagittal => (1, 2),
        }
    }

    /// Fraction of the fixed axis the anatomical module samples slices from.
    fn sampling_range(self) -> (f64, f64) {
        match self {
            Orientation::Axial => (0.3, 0.8),
            Orientation::Coronal => (0.2, 0.8),
            Orientation::Sagittal => (0.3, 0.7),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Axial => "axial",
            Orientation::Coronal => "coronal",
            Orientation::Sagittal => "sagittal",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "axial" => Ok(Orientation::Axial),
            "coronal" => Ok(Orientation::Coronal),
            "sagittal" => Ok(Orientation::Sagittal),
            _ => Err(EngineError::InvalidOrientation(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// SliceDescriptor – one 2-D plane of the anatomical volume
// ---------------------------------------------------------------------------

/// Describes a slice cut by the anatomical-volume module. `position` is in
/// anatomical voxel units along the orientation's fixed axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceDescriptor {
    pub orientation: Orientation,
    pub index: usize,
    pub position: i64,
    pub dimensions: [usize; 3],
}

impl SliceDescriptor {
    pub fn axis_dimension(&self) -> usize {
        self.dimensions[self.orientation.fixed_axis()]
    }

    /// Map the anatomical position onto a plane index of a `grid_size` cube.
    ///
    /// `position == axis_dimension` lands on the last plane. Positions outside
    /// `[0, axis_dimension]` are rejected rather than clamped.
    pub fn grid_index(&self, grid_size: usize) -> EngineResult<usize> {
        if grid_size == 0 {
            return Err(EngineError::InvalidGridSize(grid_size));
        }
        if self.dimensions.contains(&0) {
            return Err(EngineError::InvalidDimensions(self.dimensions));
        }
        let dimension = self.axis_dimension();
        if self.position < 0 || self.position as u64 > dimension as u64 {
            return Err(EngineError::SlicePositionOutOfRange {
                orientation: self.orientation,
                position: self.position,
                dimension,
            });
        }
        let ratio = self.position as f64 / dimension as f64;
        let index = (ratio * grid_size as f64).floor() as usize;
        Ok(index.min(grid_size - 1))
    }

    /// Pixel extent `(width, height)` of the anatomical slice image, after the
    /// same transpose the overlay receives.
    pub fn image_extent(&self) -> (u32, u32) {
        let (first, second) = self.orientation.varying_axes();
        (self.dimensions[first] as u32, self.dimensions[second] as u32)
    }
}

/// Evenly spaced slice descriptors across the orientation's sampling range,
/// truncated to integer positions.
pub fn plan_slices(
    orientation: Orientation,
    dimensions: [usize; 3],
    count: usize,
) -> Vec<SliceDescriptor> {
    let extent = dimensions[orientation.fixed_axis()] as f64;
    let (lo, hi) = orientation.sampling_range();
    linspace(lo * extent, hi * extent, count)
        .into_iter()
        .enumerate()
        .map(|(index, p)| SliceDescriptor {
            orientation,
            index,
            position: p as i64,
            dimensions,
        })
        .collect()
}

fn linspace(start: f64, stop: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (count - 1) as f64;
            let mut values: Vec<f64> = (0..count).map(|i| start + step * i as f64).collect();
            values[count - 1] = stop;
            values
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axial(position: i64) -> SliceDescriptor {
        SliceDescriptor {
            orientation: Orientation::Axial,
            index: 0,
            position,
            dimensions: DEFAULT_ANATOMY_DIMENSIONS,
        }
    }

    #[test]
    fn parses_orientation_case_insensitively() {
        assert_eq!("Coronal".parse::<Orientation>().unwrap(), Orientation::Coronal);
        let err = "oblique".parse::<Orientation>().unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn extreme_position_maps_to_last_plane() {
        assert_eq!(axial(189).grid_index(100).unwrap(), 99);
        assert_eq!(axial(0).grid_index(100).unwrap(), 0);
    }

    #[test]
    fn interior_position_uses_floor_ratio() {
        // 94 / 189 * 100 = 49.7
        assert_eq!(axial(94).grid_index(100).unwrap(), 49);
    }

    #[test]
    fn out_of_range_position_is_rejected() {
        assert!(matches!(
            axial(190).grid_index(100),
            Err(EngineError::SlicePositionOutOfRange { dimension: 189, .. })
        ));
        assert!(axial(-1).grid_index(100).is_err());
    }

    #[test]
    fn zero_dimension_is_rejected() {
        let mut s = axial(0);
        s.dimensions = [10, 0, 10];
        assert!(matches!(s.grid_index(100), Err(EngineError::InvalidDimensions(_))));
    }

    #[test]
    fn plan_follows_sampling_range() {
        let slices = plan_slices(Orientation::Axial, [100, 100, 100], 6);
        let positions: Vec<i64> = slices.iter().map(|s| s.position).collect();
        assert_eq!(positions.len(), 6);
        assert_eq!(positions[0], 30);
        assert_eq!(positions[5], 80);
        assert!(positions.windows(2).all(|w| w[1] - w[0] >= 9 && w[1] - w[0] <= 10));
        assert_eq!(slices[5].index, 5);

        let single = plan_slices(Orientation::Coronal, [100, 100, 100], 1);
        assert_eq!(single[0].position, 20);
        assert!(plan_slices(Orientation::Sagittal, [100, 100, 100], 0).is_empty());
    }

    #[test]
    fn image_extent_follows_varying_axes() {
        let s = SliceDescriptor {
            orientation: Orientation::Sagittal,
            index: 0,
            position: 10,
            dimensions: [197, 233, 189],
        };
        assert_eq!(s.image_extent(), (233, 189));
    }
}
