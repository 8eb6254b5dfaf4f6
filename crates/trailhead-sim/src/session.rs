//! Session orchestration: asset hand-off, phase selection and the per-frame update order

use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use trailhead_core::{Pose, Result, SimConfig};
use trailhead_runtime::{AssetSlot, EventBus, InputState, SimEvent};
use trailhead_terrain::{HeightField, Terrain, TerrainMesh};

use crate::aligner::TerrainAligner;
use crate::audio::AudioSink;
use crate::camera::{Camera, CameraRig};
use crate::context::{SimulationContext, SimulationState};
use crate::layout;
use crate::platform::Platform;
use crate::props::{Prop, PropKind, PropPhysics};
use crate::rover::{DriveInput, Rover, RoverController, RoverModel};
use crate::scene::{SceneGroups, SceneMood};

/// Engine loop level while idling, relative to the driving level
const IDLE_ENGINE_FACTOR: f64 = 0.1;

/// Result of asking the clock to leave the intro
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The transition happened on this call
    Started,
    /// Already active; nothing changed
    AlreadyActive,
    /// Assets still missing; nothing changed
    NotReady { rover: bool, terrain: bool },
}

/// Two-state phase machine. The only way out of `Intro` is `try_start`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulationClock {
    active: bool,
}

impl SimulationClock {
    pub fn state(&self) -> SimulationState {
        if self.active {
            SimulationState::Active
        } else {
            SimulationState::Intro
        }
    }

    /// Guarded, one-way transition to `Active`
    pub fn try_start(&mut self, rover_loaded: bool, terrain_loaded: bool) -> StartOutcome {
        if self.active {
            return StartOutcome::AlreadyActive;
        }
        if !(rover_loaded && terrain_loaded) {
            return StartOutcome::NotReady {
                rover: rover_loaded,
                terrain: terrain_loaded,
            };
        }
        self.active = true;
        StartOutcome::Started
    }
}

/// Slots the loaders publish into
pub struct SessionAssets {
    pub terrain: AssetSlot<HeightField>,
    pub rover: AssetSlot<RoverModel>,
}

impl SessionAssets {
    /// Assets that never arrive (fully degraded session)
    pub fn none() -> Self {
        Self {
            terrain: AssetSlot::empty(),
            rover: AssetSlot::empty(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoverSnapshot {
    pub pose: Pose,
    pub yaw: f32,
    pub visible: bool,
    pub moving: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropSnapshot {
    /// Letter for name blocks, `None` for rocks
    pub glyph: Option<char>,
    pub pose: Pose,
    pub speed: f32,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub state: SimulationState,
    pub terrain_loaded: bool,
    pub camera: Pose,
    pub rover: Option<RoverSnapshot>,
    pub props: Vec<PropSnapshot>,
    pub groups: SceneGroups,
    pub mood: SceneMood,
}

/// One running scene
pub struct Session {
    config: SimConfig,
    ctx: SimulationContext,
    clock: SimulationClock,
    terrain: Terrain,
    terrain_mesh: TerrainMesh,
    assets: SessionAssets,
    rover: Option<Rover>,
    controller: RoverController,
    aligner: TerrainAligner,
    physics: PropPhysics,
    props: Vec<Prop>,
    platforms: Vec<Platform>,
    camera: Camera,
    rig: CameraRig,
    groups: SceneGroups,
    mood: SceneMood,
    audio: Box<dyn AudioSink>,
    bus: EventBus,
    rng: StdRng,
    torn_down: bool,
}

impl Session {
    /// Build the scene from config. Terrain and rover arrive later through `assets`.
    pub fn new(config: SimConfig, assets: SessionAssets, audio: Box<dyn AudioSink>) -> Result<Self> {
        config.validate()?;

        let mut rng = StdRng::seed_from_u64(config.layout.seed);
        let props = layout::build_props(&config.layout, &mut rng)?;
        let platforms = layout::build_platforms(&config.layout);

        let terrain = Terrain::new(&config.terrain);
        let terrain_mesh = TerrainMesh::generate(&terrain, config.terrain.mesh_segments);

        Ok(Self {
            ctx: SimulationContext::default(),
            clock: SimulationClock::default(),
            terrain,
            terrain_mesh,
            assets,
            rover: None,
            controller: RoverController::new(config.rover.clone()),
            aligner: TerrainAligner::from_settings(&config.rover),
            physics: PropPhysics::new(config.props.clone()),
            props,
            platforms,
            camera: Camera::default(),
            rig: CameraRig::new(config.camera.clone()),
            groups: SceneGroups::intro(),
            mood: SceneMood::intro(),
            audio,
            bus: EventBus::new(),
            rng,
            torn_down: false,
            config,
        })
    }

    /// Advance one frame. Never fails; missing assets degrade the frame instead.
    pub fn step(&mut self, input: &InputState, dt: f32) -> Vec<SimEvent> {
        if self.torn_down {
            return Vec::new();
        }

        self.poll_assets();
        self.ctx.frame += 1;
        self.ctx.elapsed += dt;

        if input.is_action_just_pressed("start") {
            self.request_start();
        }

        match self.ctx.state {
            SimulationState::Intro => self.rig.intro_orbit(&mut self.camera, &self.ctx),
            SimulationState::Active => self.active_frame(input),
        }

        let events = self.bus.drain();
        if self.ctx.audio_enabled {
            for event in &events {
                if let SimEvent::CollisionTone { frequency } = event {
                    self.audio.play_tone(*frequency);
                }
            }
        }
        events
    }

    fn poll_assets(&mut self) {
        if let Some(field) = self.assets.terrain.poll() {
            if self.terrain.publish(field) {
                self.terrain_mesh.snap_to(&self.terrain);
                for prop in &mut self.props {
                    prop.snap_to(&self.terrain);
                }
                for platform in &mut self.platforms {
                    platform.snap_to(&self.terrain);
                }
                if let Some(rover) = &mut self.rover {
                    self.aligner.align_rover(
                        &self.terrain,
                        &mut rover.pose,
                        rover.yaw,
                        self.config.rover.vertical_offset,
                    );
                }
                self.bus.push(SimEvent::TerrainReady);
            }
        }

        if let Some(model) = self.assets.rover.poll() {
            log::info!("Session: rover '{}' loaded ({} bytes)", model.name, model.byte_len);
            let mut rover = Rover::spawn(model, Vec3::ZERO);
            TerrainAligner::snap(&self.terrain, &mut rover.pose.position, self.config.rover.vertical_offset);
            self.rover = Some(rover);
            self.bus.push(SimEvent::RoverReady);
        }
    }

    fn active_frame(&mut self, input: &InputState) {
        if input.is_action_just_pressed("reset_props") {
            self.reset_props();
        }
        if let Some(dx) = input.free_look_delta() {
            self.rig.queue_free_look(&mut self.camera, dx as f32);
        }

        if let Some(rover) = &mut self.rover {
            self.controller
                .update(rover, DriveInput::from_input(input), &self.terrain, &self.aligner);
        }

        // Props collide against this frame's rover pose
        let rover_position = self.rover.as_ref().map(|r| r.pose.position);
        self.physics.step(
            &mut self.props,
            rover_position,
            &self.terrain,
            &self.aligner,
            &mut self.rng,
            &mut self.bus,
        );

        if let Some(position) = rover_position {
            for platform in &mut self.platforms {
                platform.update(position, &mut self.bus);
            }
        }

        if let Some(rover) = &self.rover {
            self.rig.follow(&mut self.camera, rover);
        }

        if self.ctx.audio_enabled {
            let level = self.config.audio.engine_volume;
            let volume = if self.controller.is_moving() {
                level
            } else {
                level * IDLE_ENGINE_FACTOR
            };
            self.audio.set_engine_volume(volume);
        }
    }

    /// The start gesture. Switches the scene to active play once both assets are in.
    pub fn request_start(&mut self) -> StartOutcome {
        let outcome = self
            .clock
            .try_start(self.rover.is_some(), self.terrain.is_loaded());

        match outcome {
            StartOutcome::Started => {
                self.ctx.state = self.clock.state();
                self.groups = SceneGroups::game();
                self.mood = SceneMood::game();
                if let Some(rover) = &mut self.rover {
                    rover.visible = true;
                }
                self.ctx.audio_enabled = true;
                self.audio.start_loops();
                self.bus.push(SimEvent::Started);
                log::info!("Session: started at frame {}", self.ctx.frame);
            }
            StartOutcome::AlreadyActive => {}
            StartOutcome::NotReady { rover, terrain } => {
                log::debug!("Session: start refused (rover loaded: {rover}, terrain loaded: {terrain})");
            }
        }
        outcome
    }

    /// Put every name block back at its rest position. Returns how many moved.
    pub fn reset_props(&mut self) -> usize {
        let count = self.props.iter_mut().map(Prop::reset).filter(|&moved| moved).count();
        self.bus.push(SimEvent::PropsReset);
        count
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            frame: self.ctx.frame,
            state: self.ctx.state,
            terrain_loaded: self.terrain.is_loaded(),
            camera: self.camera.pose,
            rover: self.rover.as_ref().map(|r| RoverSnapshot {
                pose: r.pose,
                yaw: r.yaw,
                visible: r.visible,
                moving: self.controller.is_moving(),
            }),
            props: self
                .props
                .iter()
                .map(|p| PropSnapshot {
                    glyph: match &p.kind {
                        PropKind::NameBlock { glyph, .. } => Some(*glyph),
                        PropKind::Rock { .. } => None,
                    },
                    pose: p.pose(),
                    speed: p.velocity.length(),
                })
                .collect(),
            groups: self.groups,
            mood: self.mood,
        }
    }

    pub fn context(&self) -> &SimulationContext {
        &self.ctx
    }

    pub fn state(&self) -> SimulationState {
        self.ctx.state
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    pub fn terrain_mesh(&self) -> &TerrainMesh {
        &self.terrain_mesh
    }

    pub fn rover(&self) -> Option<&Rover> {
        self.rover.as_ref()
    }

    pub fn props(&self) -> &[Prop] {
        &self.props
    }

    pub fn props_mut(&mut self) -> &mut [Prop] {
        &mut self.props
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn groups(&self) -> SceneGroups {
        self.groups
    }

    pub fn mood(&self) -> SceneMood {
        self.mood
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Release audio and stop stepping. Safe to call any number of times;
    /// only the first call does anything.
    pub fn shutdown(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        self.torn_down = true;
        self.audio.shutdown();
        log::info!("Session: shut down after {} frames", self.ctx.frame);
        true
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use trailhead_runtime::asset_channel;
    use winit::keyboard::KeyCode;

    #[derive(Clone, Default)]
    struct RecordingAudio {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingAudio {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl AudioSink for RecordingAudio {
        fn play_tone(&mut self, frequency: f32) {
            self.calls.lock().unwrap().push(format!("tone {frequency:.0}"));
        }

        fn start_loops(&mut self) {
            self.calls.lock().unwrap().push("start".into());
        }

        fn set_engine_volume(&mut self, volume: f64) {
            self.calls.lock().unwrap().push(format!("engine {volume:.2}"));
        }

        fn shutdown(&mut self) {
            self.calls.lock().unwrap().push("shutdown".into());
        }
    }

    fn rover_model() -> RoverModel {
        RoverModel {
            name: "rover".into(),
            byte_len: 128,
        }
    }

    /// Session whose assets are both already published
    fn loaded_session(audio: RecordingAudio) -> Session {
        let (terrain_tx, terrain) = asset_channel();
        let (rover_tx, rover) = asset_channel();
        assert!(terrain_tx.publish(HeightField::load(vec![32767; 16], 4).unwrap()));
        assert!(rover_tx.publish(rover_model()));

        let mut session = Session::new(
            SimConfig::default(),
            SessionAssets { terrain, rover },
            Box::new(audio),
        )
        .unwrap();
        let events = session.step(&InputState::new(), 1.0 / 60.0);
        assert!(events.contains(&SimEvent::TerrainReady));
        assert!(events.contains(&SimEvent::RoverReady));
        session
    }

    #[test]
    fn clock_transitions_once_and_only_when_ready() {
        let mut clock = SimulationClock::default();
        assert_eq!(clock.state(), SimulationState::Intro);
        assert_eq!(
            clock.try_start(true, false),
            StartOutcome::NotReady {
                rover: true,
                terrain: false
            }
        );
        assert_eq!(clock.state(), SimulationState::Intro);
        assert_eq!(clock.try_start(true, true), StartOutcome::Started);
        assert_eq!(clock.try_start(true, true), StartOutcome::AlreadyActive);
        assert_eq!(clock.state(), SimulationState::Active);
    }

    #[test]
    fn start_flips_scene_exactly_once() {
        let mut session = loaded_session(RecordingAudio::default());
        assert_eq!(session.groups(), SceneGroups::intro());
        assert!(!session.rover().unwrap().visible);

        assert_eq!(session.request_start(), StartOutcome::Started);
        assert_eq!(session.groups(), SceneGroups::game());
        assert_eq!(session.mood(), SceneMood::game());
        assert!(session.rover().unwrap().visible);

        assert_eq!(session.request_start(), StartOutcome::AlreadyActive);
        assert_eq!(session.groups(), SceneGroups::game());

        let events = session.step(&InputState::new(), 1.0 / 60.0);
        let started = events.iter().filter(|e| **e == SimEvent::Started).count();
        assert_eq!(started, 1);
        assert_eq!(session.state(), SimulationState::Active);
    }

    #[test]
    fn start_key_triggers_transition() {
        let mut session = loaded_session(RecordingAudio::default());
        let mut input = InputState::new();
        input.process_key_down(KeyCode::Enter);

        let events = session.step(&input, 1.0 / 60.0);
        assert!(events.contains(&SimEvent::Started));
        assert!(session.context().is_active());
    }

    #[test]
    fn reset_restores_every_name_block() {
        let mut session = loaded_session(RecordingAudio::default());
        let rests: Vec<Option<Vec3>> = session.props().iter().map(|p| p.rest_position()).collect();

        for (i, prop) in session.props_mut().iter_mut().enumerate() {
            prop.position += Vec3::new(i as f32, 7.0, -3.0 * i as f32);
            prop.velocity = Vec3::new(0.3, 0.2, -0.1);
            prop.angular_velocity = Vec3::splat(0.05);
        }

        let restored = session.reset_props();
        assert_eq!(restored, 9);
        for (prop, rest) in session.props().iter().zip(rests) {
            if let Some(rest) = rest {
                assert_eq!(prop.position, rest);
                assert_eq!(prop.velocity, Vec3::ZERO);
                assert_eq!(prop.angular_velocity, Vec3::ZERO);
            } else {
                // Rocks are left where they are
                assert_ne!(prop.velocity, Vec3::ZERO);
            }
        }
    }

    #[test]
    fn missing_assets_degrade_without_failing() {
        let mut session =
            Session::new(SimConfig::default(), SessionAssets::none(), Box::new(RecordingAudio::default()))
                .unwrap();
        let mut input = InputState::new();
        input.process_key_down(KeyCode::KeyW);
        input.process_key_down(KeyCode::Space);

        for _ in 0..120 {
            assert!(session.step(&input, 1.0 / 60.0).is_empty());
            input.end_frame();
        }
        assert_eq!(session.state(), SimulationState::Intro);
        assert!(session.rover().is_none());
        assert_eq!(session.terrain().elevation_at(10.0, 10.0), 0.0);
        assert_eq!(
            session.request_start(),
            StartOutcome::NotReady {
                rover: false,
                terrain: false
            }
        );
    }

    #[test]
    fn abandoned_loader_reads_as_never_delivered() {
        let (terrain_tx, terrain) = asset_channel::<HeightField>();
        let (rover_tx, rover) = asset_channel();
        drop(terrain_tx);
        assert!(rover_tx.publish(rover_model()));

        let mut session = Session::new(
            SimConfig::default(),
            SessionAssets { terrain, rover },
            Box::new(RecordingAudio::default()),
        )
        .unwrap();
        session.step(&InputState::new(), 1.0 / 60.0);
        assert!(session.rover().is_some());
        assert!(!session.terrain().is_loaded());
        assert!(matches!(
            session.request_start(),
            StartOutcome::NotReady { terrain: false, .. }
        ));
    }

    #[test]
    fn terrain_arrival_snaps_scene() {
        let session = loaded_session(RecordingAudio::default());
        let surface = session.terrain().elevation_at(0.0, 0.0);
        assert!((surface - 7.5).abs() < 1e-3);

        assert!(session.props().iter().all(|p| (p.position.y - surface).abs() < 1e-5));
        assert!(session.platforms().iter().all(|p| (p.position.y - surface).abs() < 1e-5));
        let rover = session.rover().unwrap();
        assert!((rover.pose.position.y - (surface + 1.5)).abs() < 1e-5);
        assert!((session.terrain_mesh().aabb_max[1] - surface).abs() < 1e-5);
    }

    #[test]
    fn audio_is_silent_until_started() {
        let audio = RecordingAudio::default();
        let mut session = loaded_session(audio.clone());
        for _ in 0..30 {
            session.step(&InputState::new(), 1.0 / 60.0);
        }
        assert!(audio.calls().is_empty());

        session.request_start();
        let mut input = InputState::new();
        session.step(&input, 1.0 / 60.0);
        input.process_key_down(KeyCode::KeyW);
        session.step(&input, 1.0 / 60.0);

        let calls = audio.calls();
        assert_eq!(calls[0], "start");
        assert_eq!(calls[1], "engine 0.05");
        assert_eq!(calls[2], "engine 0.50");
    }

    #[test]
    fn pushing_a_letter_plays_a_tone() {
        let audio = RecordingAudio::default();
        let mut session = loaded_session(audio.clone());
        session.request_start();

        // Park a letter right next to the rover
        let rover = session.rover().unwrap().pose.position;
        session.props_mut()[0].position = rover + Vec3::new(1.0, 0.0, 0.0);

        let events = session.step(&InputState::new(), 1.0 / 60.0);
        let tones: Vec<f32> = events
            .iter()
            .filter_map(|e| match e {
                SimEvent::CollisionTone { frequency } => Some(*frequency),
                _ => None,
            })
            .collect();
        assert!(!tones.is_empty());
        assert!(tones.iter().all(|f| (200.0..=400.0).contains(f)));
        assert!(audio.calls().iter().any(|c| c.starts_with("tone ")));
        assert!(session.props()[0].velocity.y > 0.0);
    }

    #[test]
    fn intro_and_active_frames_never_mix() {
        let mut session = loaded_session(RecordingAudio::default());
        session.step(&InputState::new(), 1.0);
        // Intro orbit keeps the camera on the fixed circle
        let p = session.camera().pose.position;
        assert!((p.y - 6.0).abs() < 1e-5);

        session.request_start();
        let mut input = InputState::new();
        input.process_key_down(KeyCode::KeyW);
        session.step(&input, 1.0 / 60.0);

        // Follow camera moved off the orbit toward the rover's offset
        assert!(session.camera().pose.position.y > 6.0);
        assert!(session.rover().unwrap().pose.position.z < 0.0);
    }

    #[test]
    fn unusable_spin_is_refused_before_any_frame() {
        let config = SimConfig::default();
        let mut bad = config.clone();
        bad.props.spin = -0.1;

        let result = Session::new(bad, SessionAssets::none(), Box::new(RecordingAudio::default()));
        assert!(result.is_err());
        assert!(Session::new(config, SessionAssets::none(), Box::new(RecordingAudio::default())).is_ok());
    }

    #[test]
    fn zero_spin_still_pushes() {
        let mut config = SimConfig::default();
        config.props.spin = 0.0;
        let (terrain_tx, terrain) = asset_channel();
        let (rover_tx, rover) = asset_channel();
        terrain_tx.publish(HeightField::load(vec![32767; 16], 4).unwrap());
        rover_tx.publish(rover_model());
        let mut session =
            Session::new(config, SessionAssets { terrain, rover }, Box::new(RecordingAudio::default()))
                .unwrap();
        session.step(&InputState::new(), 1.0 / 60.0);
        session.request_start();

        let rover = session.rover().unwrap().pose.position;
        session.props_mut()[0].position = rover + Vec3::new(1.0, 0.0, 0.0);
        session.step(&InputState::new(), 1.0 / 60.0);
        assert!(session.props()[0].velocity.x > 0.0);
        assert_eq!(session.props()[0].angular_velocity, Vec3::ZERO);
    }

    #[test]
    fn shutdown_runs_once() {
        let audio = RecordingAudio::default();
        let mut session = loaded_session(audio.clone());
        assert!(session.shutdown());
        assert!(!session.shutdown());
        assert!(session.step(&InputState::new(), 1.0 / 60.0).is_empty());
        drop(session);

        let shutdowns = audio.calls().iter().filter(|c| *c == "shutdown").count();
        assert_eq!(shutdowns, 1);
    }

    #[test]
    fn snapshot_serializes() {
        let session = loaded_session(RecordingAudio::default());
        let snapshot = session.snapshot();
        assert_eq!(snapshot.props.len(), 58);
        assert_eq!(snapshot.props[0].glyph, Some('T'));
        assert!(snapshot.rover.is_some());
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"state\":\"Intro\""));
    }
}
