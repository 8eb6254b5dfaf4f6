//! Trailhead Audio - Kira-backed `AudioSink`
//!
//! Plays the collision click (one sample, pitched to the requested frequency)
//! and the looping engine sound whose level follows the rover. Every failure
//! is logged and swallowed; with no device the sink is silent.

pub mod engine;

use engine::{amplitude_to_db, AudioEngine, PARAM_TWEEN};
use kira::sound::static_sound::StaticSoundHandle;
use trailhead_core::config::AudioSettings;
use trailhead_sim::AudioSink;

const TONE: &str = "tone";
const ENGINE: &str = "engine";

/// Sound output for a session
pub struct KiraAudio {
    engine: AudioEngine,
    settings: AudioSettings,
    engine_loop: Option<StaticSoundHandle>,
    closed: bool,
}

impl KiraAudio {
    /// Open the default device and decode the configured samples
    pub fn new(settings: AudioSettings) -> Self {
        Self::with_engine(AudioEngine::new(), settings)
    }

    /// Build around an existing engine (e.g. `AudioEngine::silent()`)
    pub fn with_engine(mut engine: AudioEngine, settings: AudioSettings) -> Self {
        for (name, path) in [(TONE, &settings.tone_sample), (ENGINE, &settings.engine_loop)] {
            if let Some(path) = path {
                if let Err(e) = engine.load_sound(name, path) {
                    log::warn!("Audio: {e}");
                }
            }
        }

        Self {
            engine,
            settings,
            engine_loop: None,
            closed: false,
        }
    }

    pub fn is_available(&self) -> bool {
        !self.closed && self.engine.is_available()
    }

    pub fn is_engine_running(&self) -> bool {
        self.engine_loop.is_some()
    }
}

impl AudioSink for KiraAudio {
    fn play_tone(&mut self, frequency: f32) {
        if self.closed || !self.engine.has_sound(TONE) {
            return;
        }
        let rate = f64::from(frequency / self.settings.tone_base_hz);
        if let Err(e) = self.engine.play(TONE, self.settings.tone_volume, rate, false) {
            log::warn!("Audio: {e}");
        }
    }

    fn start_loops(&mut self) {
        if self.closed || self.engine_loop.is_some() || !self.engine.has_sound(ENGINE) {
            return;
        }
        // Starts at the idle level; the session raises it while driving
        match self.engine.play(ENGINE, 0.0, 1.0, true) {
            Ok(handle) => self.engine_loop = handle,
            Err(e) => log::warn!("Audio: {e}"),
        }
    }

    fn set_engine_volume(&mut self, volume: f64) {
        if let Some(handle) = &mut self.engine_loop {
            handle.set_volume(amplitude_to_db(volume), PARAM_TWEEN);
        }
    }

    fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        if let Some(mut handle) = self.engine_loop.take() {
            handle.stop(PARAM_TWEEN);
        }
        self.engine.close();
        self.closed = true;
        log::debug!("Audio: device released");
    }
}
