//! Sound output consumed by the simulation

/// Where the simulation sends sound.
///
/// Implementations swallow their own failures: sound is feedback, never an
/// input to the simulation. The session only calls these after the start
/// gesture has enabled audio.
pub trait AudioSink {
    /// Fire-and-forget click at `frequency` Hz
    fn play_tone(&mut self, frequency: f32);

    /// Begin the looping background and engine sounds
    fn start_loops(&mut self);

    /// Engine loop amplitude (0.0 silences it)
    fn set_engine_volume(&mut self, volume: f64);

    /// Stop everything and release the device
    fn shutdown(&mut self);
}

/// A sink that plays nothing (headless runs, no device)
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play_tone(&mut self, _frequency: f32) {}

    fn start_loops(&mut self) {}

    fn set_engine_volume(&mut self, _volume: f64) {}

    fn shutdown(&mut self) {}
}
