//! Heightfield ingestion and sampling

use std::path::Path;

use glam::Vec3;
use trailhead_core::{Result, TrailheadError};

/// World elevation spanned by the full `u16` code range
pub const HEIGHT_RANGE: f32 = 25.0;
/// Elevation subtracted so that code 0 sits below sea level
pub const HEIGHT_FLOOR: f32 = 5.0;
/// Default side length of the square world area, centered at origin
pub const DEFAULT_WORLD_EXTENT: f32 = 400.0;

/// Map a raw elevation code to world elevation.
pub fn elevation(code: u16) -> f32 {
    (code as f32 / 65535.0) * HEIGHT_RANGE - HEIGHT_FLOOR
}

/// A square grid of 16-bit elevation codes covering a fixed world area
#[derive(Debug, Clone)]
pub struct HeightField {
    /// Row-major codes; rows run along world Z
    codes: Vec<u16>,
    /// Samples per edge
    dimension: usize,
    /// World-space side length covered by the grid
    world_extent: f32,
}

/// Summary statistics over every sample, in world elevation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightStats {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
}

impl HeightField {
    /// Build a heightfield from decoded codes.
    ///
    /// Fails when the grid is degenerate or the buffer does not hold exactly
    /// `dimension * dimension` samples.
    pub fn load(samples: Vec<u16>, dimension: usize) -> Result<Self> {
        if dimension <= 1 {
            return Err(TrailheadError::MalformedAsset(format!(
                "heightmap dimension must be greater than 1, got {dimension}"
            )));
        }
        let expected = dimension.checked_mul(dimension).ok_or_else(|| {
            TrailheadError::MalformedAsset(format!("heightmap dimension {dimension} overflows"))
        })?;
        if samples.len() != expected {
            return Err(TrailheadError::MalformedAsset(format!(
                "heightmap has {} samples, expected {}x{} = {}",
                samples.len(),
                dimension,
                dimension,
                expected
            )));
        }

        Ok(Self {
            codes: samples,
            dimension,
            world_extent: DEFAULT_WORLD_EXTENT,
        })
    }

    /// Decode a `.raw` buffer of little-endian `u16` samples, row-major.
    pub fn from_raw_bytes(bytes: &[u8], dimension: usize) -> Result<Self> {
        if bytes.len() % 2 != 0 {
            return Err(TrailheadError::MalformedAsset(format!(
                "raw heightmap has odd byte length {}",
                bytes.len()
            )));
        }
        let samples = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Self::load(samples, dimension)
    }

    /// Read a `.raw` file. When `dimension` is `None` it is inferred from the sample count.
    pub fn from_raw_file(path: &Path, dimension: Option<usize>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let dimension = match dimension {
            Some(d) => d,
            None => Self::infer_dimension(bytes.len() / 2).ok_or_else(|| {
                TrailheadError::MalformedAsset(format!(
                    "cannot infer a square dimension for '{}' ({} bytes)",
                    path.display(),
                    bytes.len()
                ))
            })?,
        };
        log::debug!(
            "Decoding raw heightmap '{}' as {dimension}x{dimension}",
            path.display()
        );
        Self::from_raw_bytes(&bytes, dimension)
    }

    /// Load a grayscale PNG. Luma is widened to 16 bits and used as the elevation code.
    pub fn from_png(path: &Path) -> Result<Self> {
        let img = image::open(path).map_err(|e| {
            TrailheadError::AssetError(format!(
                "Failed to load heightmap '{}': {}",
                path.display(),
                e
            ))
        })?;

        let gray = img.into_luma16();
        if gray.width() != gray.height() {
            return Err(TrailheadError::MalformedAsset(format!(
                "heightmap '{}' is {}x{}, expected a square image",
                path.display(),
                gray.width(),
                gray.height()
            )));
        }

        let dimension = gray.width() as usize;
        let samples = gray.pixels().map(|p| p.0[0]).collect();
        Self::load(samples, dimension)
    }

    /// Square root of `sample_count` when it is a perfect square above 1.
    pub fn infer_dimension(sample_count: usize) -> Option<usize> {
        let root = (sample_count as f64).sqrt().round() as usize;
        (root > 1 && root * root == sample_count).then_some(root)
    }

    pub fn with_world_extent(mut self, world_extent: f32) -> Self {
        self.world_extent = world_extent;
        self
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn world_extent(&self) -> f32 {
        self.world_extent
    }

    pub fn codes(&self) -> &[u16] {
        &self.codes
    }

    /// Nearest-sample elevation at world `(x, z)`. Coordinates outside the
    /// modeled area clamp to the boundary sample.
    pub fn elevation_at(&self, x: f32, z: f32) -> f32 {
        let (ix, iz) = self.grid_index(x, z);
        elevation(self.codes[iz * self.dimension + ix])
    }

    /// Central-difference surface normal using `offset` world units in both axes.
    pub fn normal_at(&self, x: f32, z: f32, offset: f32) -> Vec3 {
        let dx = self.elevation_at(x - offset, z) - self.elevation_at(x + offset, z);
        let dz = self.elevation_at(x, z - offset) - self.elevation_at(x, z + offset);
        Vec3::new(dx, 2.0 * offset, dz)
            .try_normalize()
            .unwrap_or(Vec3::Y)
    }

    pub fn stats(&self) -> HeightStats {
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        let mut sum = 0.0f64;
        for &code in &self.codes {
            let h = elevation(code);
            min = min.min(h);
            max = max.max(h);
            sum += h as f64;
        }
        HeightStats {
            min,
            max,
            mean: (sum / self.codes.len() as f64) as f32,
        }
    }

    /// World `(x, z)` to clamped grid `(column, row)`
    fn grid_index(&self, x: f32, z: f32) -> (usize, usize) {
        let half = self.world_extent * 0.5;
        let u = ((x + half) / self.world_extent).clamp(0.0, 1.0);
        let v = ((z + half) / self.world_extent).clamp(0.0, 1.0);
        let last = self.dimension - 1;
        let scale = last as f32;
        // NaN casts to 0; min() guards float rounding at the far edge
        let ix = ((u * scale).round() as usize).min(last);
        let iz = ((v * scale).round() as usize).min(last);
        (ix, iz)
    }
}
