//! Audio engine wrapping Kira's AudioManager
//!
//! Handles sound loading and playback on the main track.
//! Degrades gracefully when no audio device is available.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use kira::sound::static_sound::{StaticSoundData, StaticSoundHandle};
use kira::{AudioManager, AudioManagerSettings, DefaultBackend, Tween};
use trailhead_core::{Result, TrailheadError};

/// Smooth tween for volume changes (avoids clicks)
pub(crate) const PARAM_TWEEN: Tween = Tween {
    duration: Duration::from_millis(16),
    easing: kira::Easing::Linear,
    start_time: kira::StartTime::Immediate,
};

/// Kira's AudioManager with a cache of decoded sounds
pub struct AudioEngine {
    manager: Option<AudioManager<DefaultBackend>>,
    sound_cache: HashMap<String, StaticSoundData>,
}

impl Default for AudioEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioEngine {
    pub fn new() -> Self {
        let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())
            .map_err(|e| log::warn!("Audio: no device available ({e}), running silent"))
            .ok();

        Self {
            manager,
            sound_cache: HashMap::new(),
        }
    }

    /// An engine that never opens a device
    pub fn silent() -> Self {
        Self {
            manager: None,
            sound_cache: HashMap::new(),
        }
    }

    /// Whether audio is actually available
    pub fn is_available(&self) -> bool {
        self.manager.is_some()
    }

    /// Decode a sound file into the cache under `name`
    pub fn load_sound(&mut self, name: &str, path: &Path) -> Result<()> {
        if self.sound_cache.contains_key(name) {
            return Ok(());
        }

        let sound_data = StaticSoundData::from_file(path).map_err(|e| {
            TrailheadError::AudioError(format!("Failed to load '{}': {}", path.display(), e))
        })?;

        self.sound_cache.insert(name.to_string(), sound_data);
        Ok(())
    }

    pub fn has_sound(&self, name: &str) -> bool {
        self.sound_cache.contains_key(name)
    }

    /// Play a cached sound. Returns the handle, or `None` when running silent.
    pub fn play(
        &mut self,
        sound_name: &str,
        volume: f64,
        playback_rate: f64,
        looping: bool,
    ) -> Result<Option<StaticSoundHandle>> {
        let Some(manager) = &mut self.manager else {
            return Ok(None);
        };

        let sound_data = self
            .sound_cache
            .get(sound_name)
            .ok_or_else(|| TrailheadError::AudioError(format!("Sound not cached: {sound_name}")))?
            .clone();

        let mut data = sound_data
            .volume(amplitude_to_db(volume))
            .playback_rate(kira::PlaybackRate(playback_rate));
        if looping {
            data = data.loop_region(..);
        }

        let handle = manager
            .play(data)
            .map_err(|e| TrailheadError::AudioError(format!("Failed to play '{sound_name}': {e}")))?;
        Ok(Some(handle))
    }

    /// Release the device
    pub fn close(&mut self) {
        self.manager = None;
    }
}

/// Convert linear amplitude (0.0–2.0) to decibels
pub(crate) fn amplitude_to_db(amplitude: f64) -> kira::Decibels {
    if amplitude <= 0.0 {
        kira::Decibels(-60.0) // silence
    } else {
        kira::Decibels((20.0 * (amplitude as f32).log10()).max(-60.0))
    }
}
