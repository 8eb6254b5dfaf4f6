//! Trailhead Core - Foundational types shared by every Trailhead crate
//!
//! - `Pose`, `Color` - Spatial and presentation types
//! - `SimConfig` - Layered TOML configuration with tuned defaults
//! - Error types and Result alias

pub mod config;
mod error;
mod types;

pub use config::SimConfig;
pub use error::{Result, TrailheadError};
pub use types::{look_rotation, Color, Pose};
