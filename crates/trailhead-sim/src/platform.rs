//! Labeled platforms that act as navigation links

use glam::Vec3;
use trailhead_core::config::PlatformSettings;
use trailhead_runtime::{EventBus, SimEvent};
use trailhead_terrain::Terrain;

use crate::aligner::TerrainAligner;

/// A pad on the ground; driving onto it announces its link
#[derive(Debug, Clone)]
pub struct Platform {
    pub label: String,
    pub link: String,
    pub position: Vec3,
    /// Horizontal trigger radius
    pub radius: f32,
    /// Whether the rover was on the platform last frame
    occupied: bool,
}

impl Platform {
    pub fn from_settings(settings: &PlatformSettings) -> Self {
        Self {
            label: settings.label.clone(),
            link: settings.link.clone(),
            position: Vec3::new(settings.position[0], 0.0, settings.position[1]),
            radius: settings.radius,
            occupied: false,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    /// Horizontal containment test; height is ignored
    pub fn contains(&self, point: Vec3) -> bool {
        let dx = point.x - self.position.x;
        let dz = point.z - self.position.z;
        dx * dx + dz * dz < self.radius * self.radius
    }

    pub fn snap_to(&mut self, terrain: &Terrain) {
        TerrainAligner::snap(terrain, &mut self.position, 0.0);
    }

    /// Edge-triggered occupancy: one event when the rover arrives, one when it leaves
    pub fn update(&mut self, rover: Vec3, bus: &mut EventBus) {
        let inside = self.contains(rover);
        if inside == self.occupied {
            return;
        }
        self.occupied = inside;

        if inside {
            log::debug!("Platform '{}' entered", self.label);
            bus.push(SimEvent::PlatformEntered {
                label: self.label.clone(),
                link: self.link.clone(),
            });
        } else {
            bus.push(SimEvent::PlatformLeft {
                label: self.label.clone(),
            });
        }
    }
}
