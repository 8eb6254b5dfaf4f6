//! Loaded-or-not terrain sampler consulted by the simulation every frame

use glam::Vec3;
use trailhead_core::config::TerrainSettings;

use crate::heightfield::HeightField;

/// The simulation's view of the ground.
///
/// Starts unloaded; a heightfield is published into it exactly once. Until
/// then every query answers as flat ground at elevation 0.
#[derive(Debug, Clone)]
pub struct Terrain {
    field: Option<HeightField>,
    /// Finite-difference offset for `normal_at`
    normal_offset: f32,
    /// Extent applied to the heightfield on publish
    world_extent: f32,
}

impl Terrain {
    pub fn new(settings: &TerrainSettings) -> Self {
        Self {
            field: None,
            normal_offset: settings.normal_offset,
            world_extent: settings.world_extent,
        }
    }

    /// Install the heightfield. Returns false (and keeps the first field) if one
    /// was already published.
    pub fn publish(&mut self, field: HeightField) -> bool {
        if self.field.is_some() {
            log::warn!("Terrain: heightfield already published, ignoring second delivery");
            return false;
        }
        let field = field.with_world_extent(self.world_extent);
        log::info!(
            "Terrain: heightfield published ({}x{}, extent {})",
            field.dimension(),
            field.dimension(),
            self.world_extent
        );
        self.field = Some(field);
        true
    }

    pub fn is_loaded(&self) -> bool {
        self.field.is_some()
    }

    pub fn field(&self) -> Option<&HeightField> {
        self.field.as_ref()
    }

    pub fn normal_offset(&self) -> f32 {
        self.normal_offset
    }

    pub fn world_extent(&self) -> f32 {
        self.world_extent
    }

    /// World elevation at `(x, z)`, 0 while unloaded.
    pub fn elevation_at(&self, x: f32, z: f32) -> f32 {
        self.field
            .as_ref()
            .map_or(0.0, |field| field.elevation_at(x, z))
    }

    /// Unit surface normal at `(x, z)`, straight up while unloaded.
    pub fn normal_at(&self, x: f32, z: f32) -> Vec3 {
        self.field
            .as_ref()
            .map_or(Vec3::Y, |field| field.normal_at(x, z, self.normal_offset))
    }
}
