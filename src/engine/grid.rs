use serde::{Deserialize, Serialize};

use crate::anatomy::Orientation;
use crate::error::{EngineError, EngineResult};

// ---------------------------------------------------------------------------
// Sparse representation – what leaves the engine
// ---------------------------------------------------------------------------

/// One stored voxel. `value` always exceeds the cutoff it was extracted with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SparseVoxel {
    pub x: usize,
    pub y: usize,
    pub z: usize,
    pub value: f64,
}

/// Sparse activation volume: grid dimensions plus the above-cutoff voxels in
/// x-outer / y-middle / z-inner scan order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivationVolume {
    pub dimensions: [usize; 3],
    pub voxels: Vec<SparseVoxel>,
}

impl ActivationVolume {
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.voxels.len()
    }
}

// ---------------------------------------------------------------------------
// DenseGrid – transient working buffer
// ---------------------------------------------------------------------------

/// Dense row-major 3-D buffer, indexed `[x][y][z]`.
///
/// Only ever a working structure: built for painting or for slicing, then
/// dropped. [`DenseGrid::reset`] lets one allocation serve several passes.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseGrid {
    dimensions: [usize; 3],
    data: Vec<f64>,
}

impl DenseGrid {
    /// Zero-filled cube of side `size`.
    pub fn cube(size: usize) -> EngineResult<Self> {
        if size == 0 {
            return Err(EngineError::InvalidGridSize(size));
        }
        Self::with_dimensions([size, size, size])
    }

    pub fn with_dimensions(dimensions: [usize; 3]) -> EngineResult<Self> {
        let cells = Self::cell_count(dimensions)
            .filter(|&n| n > 0)
            .ok_or(EngineError::InvalidDimensions(dimensions))?;
        Ok(DenseGrid {
            dimensions,
            data: vec![0.0; cells],
        })
    }

    /// Number of cells for `dimensions`, or `None` when the buffer size in
    /// bytes would not fit in an `isize`.
    pub fn cell_count(dimensions: [usize; 3]) -> Option<usize> {
        let cells = dimensions
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))?;
        let bytes = cells.checked_mul(std::mem::size_of::<f64>())?;
        (bytes <= isize::MAX as usize).then_some(cells)
    }

    /// Reconstruct the dense grid a sparse volume was extracted from. Cells
    /// not listed are zero.
    pub fn from_volume(volume: &ActivationVolume) -> EngineResult<Self> {
        let mut grid = Self::with_dimensions(volume.dimensions)?;
        grid.load(volume)?;
        Ok(grid)
    }

    /// Overwrite this buffer with `volume`, reusing the allocation when the
    /// dimensions match.
    pub fn load(&mut self, volume: &ActivationVolume) -> EngineResult<()> {
        if volume.dimensions != self.dimensions {
            *self = Self::with_dimensions(volume.dimensions)?;
        } else {
            self.reset();
        }
        for v in &volume.voxels {
            let idx = self.checked_offset(v.x, v.y, v.z).ok_or(EngineError::VoxelOutOfBounds {
                x: v.x,
                y: v.y,
                z: v.z,
                dimensions: self.dimensions,
            })?;
            self.data[idx] = v.value;
        }
        Ok(())
    }

    pub fn dimensions(&self) -> [usize; 3] {
        self.dimensions
    }

    pub fn reset(&mut self) {
        self.data.iter_mut().for_each(|v| *v = 0.0);
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<f64> {
        self.checked_offset(x, y, z).map(|i| self.data[i])
    }

    /// Keep the larger of the current value and `value`. Returns `false`
    /// when the coordinate is outside the grid.
    pub fn raise(&mut self, x: i64, y: i64, z: i64, value: f64) -> bool {
        if x < 0 || y < 0 || z < 0 {
            return false;
        }
        match self.checked_offset(x as usize, y as usize, z as usize) {
            Some(i) => {
                if value > self.data[i] {
                    self.data[i] = value;
                }
                true
            }
            None => false,
        }
    }

    /// Every cell whose value strictly exceeds `cutoff`, in scan order.
    pub fn to_sparse(&self, cutoff: f64) -> ActivationVolume {
        let [nx, ny, nz] = self.dimensions;
        let mut voxels = Vec::new();
        for x in 0..nx {
            for y in 0..ny {
                for z in 0..nz {
                    let value = self.data[(x * ny + y) * nz + z];
                    if value > cutoff {
                        voxels.push(SparseVoxel { x, y, z, value });
                    }
                }
            }
        }
        ActivationVolume {
            dimensions: self.dimensions,
            voxels,
        }
    }

    /// The 2-D plane at `index` along `orientation`'s fixed axis, transposed
    /// so rows follow the second varying axis and columns the first.
    pub fn plane(&self, orientation: Orientation, index: usize) -> Option<ActivationPlane> {
        let fixed = orientation.fixed_axis();
        if index >= self.dimensions[fixed] {
            return None;
        }
        let (first, second) = orientation.varying_axes();
        let width = self.dimensions[first];
        let height = self.dimensions[second];

        let mut values = Vec::with_capacity(width * height);
        let mut coord = [0usize; 3];
        coord[fixed] = index;
        for row in 0..height {
            coord[second] = row;
            for col in 0..width {
                coord[first] = col;
                values.push(self.data[self.offset(coord)]);
            }
        }
        Some(ActivationPlane {
            width,
            height,
            values,
        })
    }

    fn offset(&self, [x, y, z]: [usize; 3]) -> usize {
        let [_, ny, nz] = self.dimensions;
        (x * ny + y) * nz + z
    }

    fn checked_offset(&self, x: usize, y: usize, z: usize) -> Option<usize> {
        let [nx, ny, nz] = self.dimensions;
        (x < nx && y < ny && z < nz).then(|| self.offset([x, y, z]))
    }
}

// ---------------------------------------------------------------------------
// ActivationPlane – one extracted 2-D cross-section
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ActivationPlane {
    pub width: usize,
    pub height: usize,
    /// Row-major, `height` rows of `width` values.
    pub values: Vec<f64>,
}

impl ActivationPlane {
    pub fn get(&self, col: usize, row: usize) -> f64 {
        self.values[row * self.width + col]
    }
}
