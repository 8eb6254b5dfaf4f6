//! Resting objects on the terrain surface

use glam::{Quat, Vec3};
use trailhead_core::config::RoverSettings;
use trailhead_core::Pose;
use trailhead_terrain::Terrain;

/// Places objects on the sampled surface and tilts the rover to match it
#[derive(Debug, Clone, Copy)]
pub struct TerrainAligner {
    /// Slerp factor toward the surface orientation, per call
    blend: f32,
}

impl TerrainAligner {
    pub fn new(blend: f32) -> Self {
        Self {
            blend: blend.clamp(0.0, 1.0),
        }
    }

    pub fn from_settings(settings: &RoverSettings) -> Self {
        Self::new(settings.align_blend)
    }

    /// Rotation taking world-up onto the surface normal at `(x, z)`
    pub fn surface_orientation(terrain: &Terrain, x: f32, z: f32) -> Quat {
        Quat::from_rotation_arc(Vec3::Y, terrain.normal_at(x, z))
    }

    /// Rest the rover exactly `vertical_offset` above the surface and ease its
    /// orientation toward the surface tilt combined with its heading.
    pub fn align_rover(&self, terrain: &Terrain, pose: &mut Pose, yaw: f32, vertical_offset: f32) {
        let Vec3 { x, z, .. } = pose.position;
        pose.position.y = terrain.elevation_at(x, z) + vertical_offset;

        let target = Self::surface_orientation(terrain, x, z) * Quat::from_rotation_y(yaw);
        pose.rotation = pose.rotation.slerp(target, self.blend).normalize();
    }

    /// One-sided floor: lift a prop to the surface if it sank below it.
    ///
    /// Returns true when the prop is in ground contact afterwards. Orientation
    /// is left alone; props spin freely.
    pub fn align_prop(&self, terrain: &Terrain, position: &mut Vec3, vertical_offset: f32) -> bool {
        let target = terrain.elevation_at(position.x, position.z) + vertical_offset;
        if position.y <= target {
            position.y = target;
            true
        } else {
            false
        }
    }

    /// Unconditionally place a point on the surface (load-time snapping pass)
    pub fn snap(terrain: &Terrain, position: &mut Vec3, vertical_offset: f32) {
        position.y = terrain.elevation_at(position.x, position.z) + vertical_offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trailhead_core::config::TerrainSettings;
    use trailhead_terrain::HeightField;

    fn sloped_terrain() -> Terrain {
        let dim = 101;
        let codes: Vec<u16> = (0..dim * dim).map(|i| ((i % dim) * 600) as u16).collect();
        let mut terrain = Terrain::new(&TerrainSettings::default());
        terrain.publish(HeightField::load(codes, dim).unwrap());
        terrain
    }

    #[test]
    fn rover_height_is_set_unconditionally() {
        let terrain = sloped_terrain();
        let aligner = TerrainAligner::new(0.15);
        let surface = terrain.elevation_at(10.0, 5.0);

        for start_y in [-100.0, surface, 100.0] {
            let mut pose = Pose::from_position(Vec3::new(10.0, start_y, 5.0));
            aligner.align_rover(&terrain, &mut pose, 0.0, 1.5);
            assert!((pose.position.y - (surface + 1.5)).abs() < 1e-5);
        }
    }

    #[test]
    fn rover_orientation_eases_toward_surface() {
        let terrain = sloped_terrain();
        let aligner = TerrainAligner::new(0.15);
        let mut pose = Pose::from_position(Vec3::ZERO);
        let target = TerrainAligner::surface_orientation(&terrain, 0.0, 0.0)
            * Quat::from_rotation_y(0.7);

        aligner.align_rover(&terrain, &mut pose, 0.7, 1.5);
        let first_gap = pose.rotation.angle_between(target);
        assert!(first_gap > 1e-3, "one call must not snap");

        for _ in 0..200 {
            aligner.align_rover(&terrain, &mut pose, 0.7, 1.5);
        }
        assert!(pose.rotation.angle_between(target) < 1e-3);
        assert!((pose.rotation.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn rover_heading_survives_flat_ground() {
        let terrain = Terrain::new(&TerrainSettings::default());
        let aligner = TerrainAligner::new(1.0);
        let mut pose = Pose::default();
        aligner.align_rover(&terrain, &mut pose, std::f32::consts::FRAC_PI_2, 1.5);

        // Facing -Z rotated a quarter turn left about +Y is -X
        assert!((pose.forward() - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn prop_never_left_below_surface() {
        let terrain = sloped_terrain();
        let aligner = TerrainAligner::new(0.15);

        for &(x, y, z) in &[
            (0.0, -50.0, 0.0),
            (150.0, 0.0, -20.0),
            (-199.0, 3.0, 199.0),
            (900.0, -900.0, 900.0),
        ] {
            let surface = terrain.elevation_at(x, z);
            let mut p = Vec3::new(x, y, z);
            let grounded = aligner.align_prop(&terrain, &mut p, 0.0);
            assert_eq!(grounded, y <= surface, "({x}, {y}, {z}) over {surface}");
            assert!(p.y >= surface);
        }
    }

    #[test]
    fn prop_above_surface_is_untouched() {
        let terrain = sloped_terrain();
        let aligner = TerrainAligner::new(0.15);
        let surface = terrain.elevation_at(0.0, 0.0);
        let mut p = Vec3::new(0.0, surface + 3.0, 0.0);

        assert!(!aligner.align_prop(&terrain, &mut p, 0.0));
        assert_eq!(p.y, surface + 3.0);
    }

    #[test]
    fn snap_places_on_surface() {
        let terrain = sloped_terrain();
        let mut p = Vec3::new(40.0, 99.0, 0.0);
        TerrainAligner::snap(&terrain, &mut p, 0.0);
        assert_eq!(p.y, terrain.elevation_at(40.0, 0.0));
    }
}
