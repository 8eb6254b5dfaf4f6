//! Events produced by the simulation during a frame

/// Something the simulation wants the outer layers (audio, UI, navigation) to know about
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// The heightfield arrived and the scene was snapped to it
    TerrainReady,
    /// The rover asset arrived
    RoverReady,
    /// The session moved from intro to active play
    Started,
    /// A pushed prop should click at this pitch
    CollisionTone { frequency: f32 },
    /// Every name block went back to its rest position
    PropsReset,
    /// The rover drove onto a navigation platform
    PlatformEntered { label: String, link: String },
    /// The rover drove off a navigation platform
    PlatformLeft { label: String },
}
