//! Trailhead Sim - The per-frame simulation
//!
//! One `Session::step` per fixed frame runs, in order:
//! input → `RoverController` → `TerrainAligner` → `PropPhysics` (colliding
//! against the current-frame rover pose) → platforms → `CameraRig`.
//! `SimulationClock` selects between the intro orbit and the active game.

pub mod aligner;
pub mod audio;
pub mod camera;
pub mod context;
pub mod layout;
pub mod platform;
pub mod props;
pub mod rover;
pub mod scene;
pub mod session;

pub use aligner::TerrainAligner;
pub use audio::{AudioSink, SilentAudio};
pub use camera::{Camera, CameraRig};
pub use context::{SimulationContext, SimulationState};
pub use platform::Platform;
pub use props::{Prop, PropKind, PropPhysics};
pub use rover::{DriveInput, Rover, RoverController, RoverModel};
pub use scene::{SceneGroups, SceneMood};
pub use session::{
    FrameSnapshot, PropSnapshot, RoverSnapshot, Session, SessionAssets, SimulationClock,
    StartOutcome,
};
