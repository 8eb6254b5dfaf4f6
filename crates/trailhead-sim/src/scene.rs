//! Scene-level presentation state switched by the session phase

use serde::Serialize;
use trailhead_core::Color;

/// Visibility of the intro-only and game-only scene groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SceneGroups {
    pub intro_visible: bool,
    pub game_visible: bool,
}

impl SceneGroups {
    pub fn intro() -> Self {
        Self {
            intro_visible: true,
            game_visible: false,
        }
    }

    pub fn game() -> Self {
        Self {
            intro_visible: false,
            game_visible: true,
        }
    }
}

/// Background and fog settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SceneMood {
    pub background: Color,
    pub fog_color: Color,
    pub fog_near: f32,
    pub fog_far: f32,
}

impl SceneMood {
    /// Night sky for the orbital preview
    pub fn intro() -> Self {
        Self {
            background: Color::from_hex(0x05060f),
            fog_color: Color::from_hex(0x05060f),
            fog_near: 60.0,
            fog_far: 400.0,
        }
    }

    /// Dusty daylight for driving
    pub fn game() -> Self {
        Self {
            background: Color::from_hex(0xd8a07a),
            fog_color: Color::from_hex(0xd8a07a),
            fog_near: 20.0,
            fog_far: 160.0,
        }
    }
}
