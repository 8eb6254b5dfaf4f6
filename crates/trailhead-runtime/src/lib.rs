//! Trailhead Runtime - Frame loop infrastructure
//!
//! Provides the building blocks the simulation is driven by:
//! - `GameClock` - fixed-timestep accumulator for deterministic physics
//! - `InputState` - keyboard and pointer tracking with action bindings
//! - `SimEvent` / `EventBus` - typed event queue drained once per frame
//! - `AssetSlot` / `AssetPublisher` - one-shot hand-off from loader threads

mod asset_slot;
mod clock;
mod event;
mod event_bus;
mod input;

pub use asset_slot::{asset_channel, AssetPublisher, AssetSlot};
pub use clock::GameClock;
pub use event::SimEvent;
pub use event_bus::EventBus;
pub use input::{parse_key_code, InputState, FREE_LOOK_BUTTON};
