//! Spatial and presentation types

use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position and orientation carried by every dynamic entity
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    /// Unit quaternion
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Direction the pose faces (local -Z)
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Turn the pose so that its forward axis points at `target`.
    pub fn look_at(&mut self, target: Vec3) {
        if let Some(rotation) = look_rotation(self.position, target) {
            self.rotation = rotation;
        }
    }
}

/// Orientation whose local -Z points from `eye` toward `target` with world-up as the up hint.
///
/// Returns `None` when the two points coincide.
pub fn look_rotation(eye: Vec3, target: Vec3) -> Option<Quat> {
    let forward = (target - eye).try_normalize()?;
    // Looking straight up or down: any horizontal right axis will do
    let right = forward
        .cross(Vec3::Y)
        .try_normalize()
        .unwrap_or(Vec3::X);
    let up = right.cross(forward);
    Some(Quat::from_mat3(&Mat3::from_cols(right, up, -forward)).normalize())
}

/// RGBA color
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
            a: 1.0,
        }
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pose_default_faces_negative_z() {
        let pose = Pose::default();
        let f = pose.forward();
        assert!((f - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_look_at_points_forward_at_target() {
        let mut pose = Pose::from_position(Vec3::new(8.0, 6.0, 0.0));
        pose.look_at(Vec3::ZERO);

        let expected = (Vec3::ZERO - pose.position).normalize();
        assert!((pose.forward() - expected).length() < 1e-5);
        assert!((pose.rotation.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_look_at_same_point_keeps_rotation() {
        let mut pose = Pose::from_position(Vec3::ONE).with_rotation(Quat::from_rotation_y(0.5));
        let before = pose.rotation;
        pose.look_at(Vec3::ONE);
        assert_eq!(pose.rotation, before);
    }

    #[test]
    fn test_look_straight_down() {
        let q = look_rotation(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO).unwrap();
        let f = q * Vec3::NEG_Z;
        assert!((f - Vec3::NEG_Y).length() < 1e-5);
    }

    #[test]
    fn test_color_from_hex() {
        let c = Color::from_hex(0xFF8844);
        assert!((c.r - 1.0).abs() < 0.01);
        assert!((c.g - 0.533).abs() < 0.01);
        assert!((c.b - 0.267).abs() < 0.01);
    }
}
