//! Per-session state handed to every component each frame

use serde::Serialize;

/// Lifecycle phase of a session. Moves from `Intro` to `Active` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SimulationState {
    /// Passive orbital preview
    Intro,
    /// Player-controlled simulation
    Active,
}

/// Session-wide values that used to live in ambient globals
#[derive(Debug, Clone)]
pub struct SimulationContext {
    pub state: SimulationState,
    /// Frames stepped so far
    pub frame: u64,
    /// Seconds of simulated time since the session began
    pub elapsed: f32,
    /// Set by the start gesture; gates every sound trigger
    pub audio_enabled: bool,
}

impl Default for SimulationContext {
    fn default() -> Self {
        Self {
            state: SimulationState::Intro,
            frame: 0,
            elapsed: 0.0,
            audio_enabled: false,
        }
    }
}

impl SimulationContext {
    pub fn is_active(&self) -> bool {
        self.state == SimulationState::Active
    }
}
