//! Layered simulation configuration
//!
//! Config is loaded with four layers of precedence (highest wins):
//! 1. Environment variables: `TRAILHEAD_SEED`, `TRAILHEAD_NAME`
//! 2. An explicit file passed by the caller
//! 3. Working-directory `trailhead.toml`
//! 4. Built-in defaults (the tuned constants of the simulation)
//!
//! Every field is optional in TOML; missing fields fall back to defaults.

use crate::error::{Result, TrailheadError};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Name of the project-local config file picked up from the working directory
pub const LOCAL_CONFIG_FILE: &str = "trailhead.toml";

/// Largest accepted `terrain.mesh_segments`; keeps vertex and index counts inside `u32`
pub const MAX_MESH_SEGMENTS: u32 = 4096;

/// Terrain sampling parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainSettings {
    /// Side length of the square world area covered by the heightfield, centered at origin
    pub world_extent: f32,
    /// Finite-difference offset (world units) for normal estimation
    pub normal_offset: f32,
    /// Quads per edge of the generated terrain mesh
    pub mesh_segments: u32,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            world_extent: 400.0,
            normal_offset: 1.0,
            mesh_segments: 128,
        }
    }
}

/// Rover drive parameters (per fixed frame)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoverSettings {
    pub speed: f32,
    /// Radians per frame while a turn key is held
    pub turn_rate: f32,
    /// Height of the rover origin above the sampled surface
    pub vertical_offset: f32,
    /// Slerp factor toward the terrain-aligned orientation
    pub align_blend: f32,
}

impl Default for RoverSettings {
    fn default() -> Self {
        Self {
            speed: 0.15,
            turn_rate: 0.03,
            vertical_offset: 1.5,
            align_blend: 0.15,
        }
    }
}

/// Push-physics parameters for props
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PropSettings {
    /// Added to each prop's collision radius for the rover proximity test
    pub collision_margin: f32,
    pub base_impulse: f32,
    /// Vertical component forced onto every push direction
    pub push_bias: f32,
    pub gravity: f32,
    pub damping: f32,
    /// Speed above which a collision emits a tone
    pub sound_threshold: f32,
    /// Half-range of each axis of a freshly randomized spin
    pub spin: f32,
    pub tone_min_hz: f32,
    pub tone_max_hz: f32,
}

impl Default for PropSettings {
    fn default() -> Self {
        Self {
            collision_margin: 2.0,
            base_impulse: 0.2,
            push_bias: 0.5,
            gravity: 0.01,
            damping: 0.95,
            sound_threshold: 0.05,
            spin: 0.1,
            tone_min_hz: 200.0,
            tone_max_hz: 400.0,
        }
    }
}

/// Camera rig parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub orbit_radius: f32,
    pub orbit_height: f32,
    /// Radians per second of elapsed intro time
    pub orbit_rate: f32,
    /// Rover-local offset of the follow target, rotated by rover yaw
    pub follow_offset: Vec3,
    /// Lerp factor toward the follow target per frame
    pub follow_blend: f32,
    /// Radians per pixel of free-look drag
    pub drag_sensitivity: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            orbit_radius: 8.0,
            orbit_height: 6.0,
            orbit_rate: 0.1,
            follow_offset: Vec3::new(0.0, 12.0, 20.0),
            follow_blend: 0.1,
            drag_sensitivity: 0.003,
        }
    }
}

/// A navigation platform placed in the world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformSettings {
    pub label: String,
    pub link: String,
    /// World (x, z); height comes from the terrain
    pub position: [f32; 2],
    #[serde(default = "default_platform_radius")]
    pub radius: f32,
}

fn default_platform_radius() -> f32 {
    4.0
}

/// Scene layout: the name spelled in blocks, scattered rocks, platforms
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub name: String,
    /// World (x, z) of the center of the name
    pub name_origin: [f32; 2],
    pub rock_count: usize,
    pub rock_min_distance: f32,
    pub rock_max_distance: f32,
    pub rock_min_size: f32,
    pub rock_max_size: f32,
    pub seed: u64,
    pub platforms: Vec<PlatformSettings>,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            name: "TRAILHEAD".to_string(),
            name_origin: [0.0, -25.0],
            rock_count: 49,
            rock_min_distance: 15.0,
            rock_max_distance: 120.0,
            rock_min_size: 0.5,
            rock_max_size: 2.0,
            seed: 7,
            platforms: vec![
                PlatformSettings {
                    label: "Projects".to_string(),
                    link: "/projects".to_string(),
                    position: [35.0, -35.0],
                    radius: default_platform_radius(),
                },
                PlatformSettings {
                    label: "Writing".to_string(),
                    link: "/writing".to_string(),
                    position: [-35.0, -35.0],
                    radius: default_platform_radius(),
                },
                PlatformSettings {
                    label: "About".to_string(),
                    link: "/about".to_string(),
                    position: [0.0, 45.0],
                    radius: default_platform_radius(),
                },
            ],
        }
    }
}

/// Audio assets and levels
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Short sample pitched to the requested tone frequency
    pub tone_sample: Option<PathBuf>,
    /// Pitch of the tone sample when played at rate 1.0
    pub tone_base_hz: f32,
    pub tone_volume: f64,
    /// Looping engine sound
    pub engine_loop: Option<PathBuf>,
    /// Engine loop amplitude while driving; idle plays at a tenth of this
    pub engine_volume: f64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            tone_sample: None,
            tone_base_hz: 440.0,
            tone_volume: 0.3,
            engine_loop: None,
            engine_volume: 0.5,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub terrain: TerrainSettings,
    pub rover: RoverSettings,
    pub props: PropSettings,
    pub camera: CameraSettings,
    pub layout: LayoutSettings,
    pub audio: AudioSettings,
    /// Action name -> key names (e.g. `drive_forward = ["KeyW", "ArrowUp"]`)
    pub input: HashMap<String, Vec<String>>,
}

impl SimConfig {
    /// Load config with layered precedence: defaults < local file < explicit file < env vars
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut merged = toml::Table::new();

        let local_path = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_path.exists() {
            merge_tables(&mut merged, Self::read_table(&local_path)?);
        }

        if let Some(path) = explicit {
            merge_tables(&mut merged, Self::read_table(path)?);
        }

        let mut config: SimConfig = toml::Value::Table(merged).try_into()?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse a single TOML document over the defaults (no env overrides)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.terrain.world_extent <= 0.0 {
            return Err(TrailheadError::Config(
                "terrain.world_extent must be positive".into(),
            ));
        }
        if self.terrain.normal_offset <= 0.0 {
            return Err(TrailheadError::Config(
                "terrain.normal_offset must be positive".into(),
            ));
        }
        if self.terrain.mesh_segments == 0 || self.terrain.mesh_segments > MAX_MESH_SEGMENTS {
            return Err(TrailheadError::Config(format!(
                "terrain.mesh_segments must be in 1..={MAX_MESH_SEGMENTS}, got {}",
                self.terrain.mesh_segments
            )));
        }
        if !(self.props.damping > 0.0 && self.props.damping <= 1.0) {
            return Err(TrailheadError::Config(format!(
                "props.damping must be in (0, 1], got {}",
                self.props.damping
            )));
        }
        // Spin and tone are sampled every collision; the ranges must be non-empty
        if !(self.props.spin >= 0.0 && self.props.spin.is_finite()) {
            return Err(TrailheadError::Config(format!(
                "props.spin must be finite and non-negative, got {}",
                self.props.spin
            )));
        }
        if !(self.props.tone_min_hz <= self.props.tone_max_hz) {
            return Err(TrailheadError::Config(
                "props.tone_min_hz exceeds props.tone_max_hz".into(),
            ));
        }
        let layout = &self.layout;
        if !(layout.rock_min_distance <= layout.rock_max_distance)
            || !(layout.rock_min_size <= layout.rock_max_size)
        {
            return Err(TrailheadError::Config("layout rock ranges are inverted".into()));
        }
        if layout.rock_min_size <= 0.0 {
            return Err(TrailheadError::Config(
                "layout.rock_min_size must be positive".into(),
            ));
        }
        if layout.platforms.iter().any(|p| p.radius <= 0.0) {
            return Err(TrailheadError::Config("platform radius must be positive".into()));
        }
        Ok(())
    }

    fn read_table(path: &Path) -> Result<toml::Table> {
        let content = std::fs::read_to_string(path)?;
        let table: toml::Table = toml::from_str(&content)?;
        Ok(table)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(seed) = std::env::var("TRAILHEAD_SEED") {
            if let Ok(seed) = seed.trim().parse() {
                self.layout.seed = seed;
            }
        }
        if let Ok(name) = std::env::var("TRAILHEAD_NAME") {
            if !name.trim().is_empty() {
                self.layout.name = name.trim().to_string();
            }
        }
    }
}

/// Deep-merge `overlay` into `base`; nested tables merge, everything else replaces.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
