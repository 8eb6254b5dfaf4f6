//! Intro orbit and rover follow camera

use glam::{Quat, Vec3};
use trailhead_core::config::CameraSettings;
use trailhead_core::Pose;

use crate::context::SimulationContext;
use crate::rover::Rover;

/// The scene camera
#[derive(Debug, Clone)]
pub struct Camera {
    pub pose: Pose,
    /// Free-look rotation (radians about world-up) waiting to be applied.
    /// Zeroed every frame it is consumed.
    pub free_look_yaw_offset: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pose: Pose::from_position(Vec3::new(0.0, 6.0, 8.0)),
            free_look_yaw_offset: 0.0,
        }
    }
}

/// Computes the camera pose for each phase of the session
#[derive(Debug, Clone)]
pub struct CameraRig {
    settings: CameraSettings,
}

impl CameraRig {
    pub fn new(settings: CameraSettings) -> Self {
        Self { settings }
    }

    /// Intro: circle the origin at fixed radius and height, looking at it.
    /// Depends only on elapsed time.
    pub fn intro_orbit(&self, camera: &mut Camera, ctx: &SimulationContext) {
        let angle = ctx.elapsed * self.settings.orbit_rate;
        camera.pose.position = Vec3::new(
            self.settings.orbit_radius * angle.cos(),
            self.settings.orbit_height,
            self.settings.orbit_radius * angle.sin(),
        );
        camera.pose.look_at(Vec3::ZERO);
    }

    /// Queue a horizontal pointer drag (pixels) for the next follow update
    pub fn queue_free_look(&self, camera: &mut Camera, drag_dx: f32) {
        camera.free_look_yaw_offset -= drag_dx * self.settings.drag_sensitivity;
    }

    /// Where the follow camera is heading: behind and above the rover, turned with it
    pub fn follow_target(&self, rover: &Rover) -> Vec3 {
        rover.pose.position + Quat::from_rotation_y(rover.yaw) * self.settings.follow_offset
    }

    /// Active play: ease toward the follow target, apply any pending free-look
    /// swing around the rover, and look at the rover.
    pub fn follow(&self, camera: &mut Camera, rover: &Rover) {
        let target = self.follow_target(rover);
        camera.pose.position = camera.pose.position.lerp(target, self.settings.follow_blend);

        if camera.free_look_yaw_offset != 0.0 {
            let pivot = rover.pose.position;
            let swing = Quat::from_rotation_y(camera.free_look_yaw_offset);
            camera.pose.position = pivot + swing * (camera.pose.position - pivot);
            camera.free_look_yaw_offset = 0.0;
        }

        camera.pose.look_at(rover.pose.position);
    }
}
