//! Pushable props and their impulse/damping integrator

use glam::{EulerRot, Quat, Vec3};
use rand::Rng;
use trailhead_core::config::PropSettings;
use trailhead_core::{Pose, Result, TrailheadError};
use trailhead_runtime::{EventBus, SimEvent};
use trailhead_terrain::Terrain;

use crate::aligner::TerrainAligner;

/// What a prop is, with the data only that variant carries
#[derive(Debug, Clone, PartialEq)]
pub enum PropKind {
    /// One letter of the name, built from unit blocks
    NameBlock {
        glyph: char,
        /// Block centers relative to the cluster origin
        blocks: Vec<Vec3>,
        /// Where a reset puts the cluster back
        rest_position: Vec3,
    },
    /// A scattered rock
    Rock { size: f32 },
}

/// A movable object the rover can shove around
#[derive(Debug, Clone)]
pub struct Prop {
    pub kind: PropKind,
    pub position: Vec3,
    /// Euler angles (XYZ, radians), advanced directly by `angular_velocity`
    pub rotation: Vec3,
    /// World units per frame
    pub velocity: Vec3,
    /// Radians per frame, per axis
    pub angular_velocity: Vec3,
    mass: f32,
    collision_radius: f32,
}

impl Prop {
    fn new(kind: PropKind, position: Vec3, mass: f32, collision_radius: f32) -> Result<Self> {
        if !(mass > 0.0) || !(collision_radius > 0.0) {
            return Err(TrailheadError::Config(format!(
                "prop mass and collision radius must be positive (mass {mass}, radius {collision_radius})"
            )));
        }
        Ok(Self {
            kind,
            position,
            rotation: Vec3::ZERO,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass,
            collision_radius,
        })
    }

    /// A letter cluster resting at `position`
    pub fn name_block(
        glyph: char,
        blocks: Vec<Vec3>,
        position: Vec3,
        mass: f32,
        collision_radius: f32,
    ) -> Result<Self> {
        let kind = PropKind::NameBlock {
            glyph,
            blocks,
            rest_position: position,
        };
        Self::new(kind, position, mass, collision_radius)
    }

    /// A rock whose mass and collision radius both follow its size
    pub fn rock(size: f32, position: Vec3) -> Result<Self> {
        Self::new(PropKind::Rock { size }, position, size, size)
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn collision_radius(&self) -> f32 {
        self.collision_radius
    }

    pub fn is_name_block(&self) -> bool {
        matches!(self.kind, PropKind::NameBlock { .. })
    }

    pub fn rest_position(&self) -> Option<Vec3> {
        match &self.kind {
            PropKind::NameBlock { rest_position, .. } => Some(*rest_position),
            PropKind::Rock { .. } => None,
        }
    }

    pub fn pose(&self) -> Pose {
        Pose {
            position: self.position,
            rotation: Quat::from_euler(
                EulerRot::XYZ,
                self.rotation.x,
                self.rotation.y,
                self.rotation.z,
            ),
        }
    }

    /// Put a name block back where it started, motionless. Rocks are not resettable.
    pub fn reset(&mut self) -> bool {
        let Some(rest) = self.rest_position() else {
            return false;
        };
        self.position = rest;
        self.rotation = Vec3::ZERO;
        self.velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
        true
    }

    /// Snap the prop (and its rest position) onto the surface. Load-time only.
    pub fn snap_to(&mut self, terrain: &Terrain) {
        TerrainAligner::snap(terrain, &mut self.position, 0.0);
        if let PropKind::NameBlock { rest_position, .. } = &mut self.kind {
            TerrainAligner::snap(terrain, rest_position, 0.0);
        }
    }
}

/// Per-frame push physics.
///
/// Every prop is tested against the single rover collider and integrated
/// independently: props never collide with each other, and there is no
/// spatial index. The full scan is sized for the few dozen props a scene
/// holds; a much larger prop count would need a broad phase.
#[derive(Debug, Clone)]
pub struct PropPhysics {
    settings: PropSettings,
}

impl PropPhysics {
    pub fn new(settings: PropSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &PropSettings {
        &self.settings
    }

    /// Advance every prop one frame. Returns how many were pushed by the rover.
    pub fn step<R: Rng + ?Sized>(
        &self,
        props: &mut [Prop],
        rover_position: Option<Vec3>,
        terrain: &Terrain,
        aligner: &TerrainAligner,
        rng: &mut R,
        bus: &mut EventBus,
    ) -> usize {
        let mut pushed = 0;
        for prop in props.iter_mut() {
            if let Some(rover) = rover_position {
                if self.collide(prop, rover, rng, bus) {
                    pushed += 1;
                }
            }
            self.integrate(prop);

            let grounded = aligner.align_prop(terrain, &mut prop.position, 0.0);
            // Resting contact absorbs downward motion
            if grounded && prop.velocity.y < 0.0 {
                prop.velocity.y = 0.0;
            }
        }
        pushed
    }

    /// Proximity test against the rover; applies the push impulse on contact.
    pub fn collide<R: Rng + ?Sized>(
        &self,
        prop: &mut Prop,
        rover: Vec3,
        rng: &mut R,
        bus: &mut EventBus,
    ) -> bool {
        let separation = prop.position - rover;
        if separation.length() >= prop.collision_radius + self.settings.collision_margin {
            return false;
        }

        prop.velocity += self.push_impulse(separation, prop.mass);

        let spin = self.settings.spin;
        prop.angular_velocity = Vec3::new(
            rng.gen_range(-spin..=spin),
            rng.gen_range(-spin..=spin),
            rng.gen_range(-spin..=spin),
        );

        if prop.velocity.length() > self.settings.sound_threshold {
            let frequency = rng.gen_range(self.settings.tone_min_hz..=self.settings.tone_max_hz);
            bus.push(SimEvent::CollisionTone { frequency });
        }

        log::debug!(
            "Prop pushed at ({:.2}, {:.2}, {:.2}), speed {:.3}",
            prop.position.x,
            prop.position.y,
            prop.position.z,
            prop.velocity.length()
        );
        true
    }

    /// Velocity change for a push along `separation` (rover to prop).
    ///
    /// The vertical component of the direction is replaced with the fixed
    /// bias so pushed props pop upward instead of sliding.
    pub fn push_impulse(&self, separation: Vec3, mass: f32) -> Vec3 {
        let mut direction = separation.normalize_or_zero();
        direction.y = self.settings.push_bias;
        direction * (self.settings.base_impulse / mass)
    }

    /// Explicit Euler step with gravity and damping
    pub fn integrate(&self, prop: &mut Prop) {
        prop.position += prop.velocity;
        prop.rotation += prop.angular_velocity;
        prop.velocity.y -= self.settings.gravity;
        prop.velocity *= self.settings.damping;
        prop.angular_velocity *= self.settings.damping;
    }
}
