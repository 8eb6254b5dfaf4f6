//! The player's rover and its kinematic drive

use glam::{Quat, Vec3};
use trailhead_core::config::RoverSettings;
use trailhead_core::Pose;
use trailhead_runtime::InputState;
use trailhead_terrain::Terrain;

use crate::aligner::TerrainAligner;

/// The rover asset as delivered by the loader
#[derive(Debug, Clone, PartialEq)]
pub struct RoverModel {
    pub name: String,
    /// Size of the loaded model in bytes (informational)
    pub byte_len: usize,
}

/// The rover in the world
#[derive(Debug, Clone)]
pub struct Rover {
    pub model: RoverModel,
    pub pose: Pose,
    /// Heading about world-up, radians, never wrapped. Kept apart from the
    /// pose so terrain tilt cannot disturb it.
    pub yaw: f32,
    /// Hidden during the intro
    pub visible: bool,
}

impl Rover {
    pub fn spawn(model: RoverModel, position: Vec3) -> Self {
        Self {
            model,
            pose: Pose::from_position(position),
            yaw: 0.0,
            visible: false,
        }
    }
}

/// Drive keys held this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl DriveInput {
    pub fn from_input(input: &InputState) -> Self {
        Self {
            forward: input.is_action_pressed("drive_forward"),
            backward: input.is_action_pressed("drive_backward"),
            left: input.is_action_pressed("turn_left"),
            right: input.is_action_pressed("turn_right"),
        }
    }

    pub fn is_driving(&self) -> bool {
        self.forward || self.backward
    }
}

/// Turns key state into rover motion, one fixed increment per frame
#[derive(Debug, Clone)]
pub struct RoverController {
    settings: RoverSettings,
    is_moving: bool,
}

impl RoverController {
    pub fn new(settings: RoverSettings) -> Self {
        Self {
            settings,
            is_moving: false,
        }
    }

    pub fn settings(&self) -> &RoverSettings {
        &self.settings
    }

    /// World-forward (-Z) rotated by `yaw` about world-up
    pub fn heading(yaw: f32) -> Vec3 {
        Quat::from_rotation_y(yaw) * Vec3::NEG_Z
    }

    /// Whether a drive key was held on the last update (feeds the engine sound)
    pub fn is_moving(&self) -> bool {
        self.is_moving
    }

    /// Apply one frame of input, then settle the rover onto the terrain.
    ///
    /// Both drive keys move along the heading derived from this frame's yaw;
    /// backward subtracts the same vector forward adds.
    pub fn update(
        &mut self,
        rover: &mut Rover,
        drive: DriveInput,
        terrain: &Terrain,
        aligner: &TerrainAligner,
    ) {
        if drive.left {
            rover.yaw += self.settings.turn_rate;
        }
        if drive.right {
            rover.yaw -= self.settings.turn_rate;
        }

        let step = Self::heading(rover.yaw) * self.settings.speed;
        if drive.forward {
            rover.pose.position += step;
        }
        if drive.backward {
            rover.pose.position -= step;
        }
        self.is_moving = drive.is_driving();

        aligner.align_rover(terrain, &mut rover.pose, rover.yaw, self.settings.vertical_offset);
    }
}
