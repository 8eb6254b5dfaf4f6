//! Headless simulation command

use std::path::PathBuf;
use std::thread;

use anyhow::{anyhow, bail, Context, Result};
use trailhead_audio::KiraAudio;
use trailhead_core::SimConfig;
use trailhead_runtime::{asset_channel, GameClock, InputState, SimEvent, FREE_LOOK_BUTTON};
use trailhead_sim::{AudioSink, RoverModel, Session, SessionAssets, SilentAudio};
use winit::keyboard::KeyCode;

use super::load_heightmap;

pub struct SimulateArgs {
    pub heightmap: PathBuf,
    pub dimension: Option<usize>,
    pub config: Option<PathBuf>,
    pub rover: Option<PathBuf>,
    pub frames: u64,
    pub drive: Option<String>,
    pub start_at: u64,
    pub audio: bool,
    pub json: bool,
}

/// What the scripted player does on one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriveAction {
    Forward,
    Back,
    Left,
    Right,
    Idle,
    Reset,
    /// Free-look drag of this many pixels per frame
    Drag(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveSegment {
    pub action: DriveAction,
    pub frames: u64,
}

/// Parse `action:frames` segments separated by commas.
/// `drag` takes its pixel delta before the frame count (`drag:-40:10`).
pub fn parse_drive_script(script: &str) -> Result<Vec<DriveSegment>> {
    let mut segments = Vec::new();
    for raw in script.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (action, frames) = raw
            .rsplit_once(':')
            .ok_or_else(|| anyhow!("segment '{raw}' must look like action:frames"))?;
        let frames: u64 = frames
            .trim()
            .parse()
            .with_context(|| format!("invalid frame count in '{raw}'"))?;

        let action = match action.trim() {
            "forward" => DriveAction::Forward,
            "back" => DriveAction::Back,
            "left" => DriveAction::Left,
            "right" => DriveAction::Right,
            "idle" => DriveAction::Idle,
            "reset" => DriveAction::Reset,
            other => match other.strip_prefix("drag:") {
                Some(dx) => DriveAction::Drag(
                    dx.trim()
                        .parse()
                        .with_context(|| format!("invalid drag delta in '{raw}'"))?,
                ),
                None => bail!("unknown drive action '{other}'"),
            },
        };
        segments.push(DriveSegment { action, frames });
    }
    Ok(segments)
}

/// Plays a drive script into an `InputState`, one frame at a time
pub struct ScriptedPlayer {
    segments: Vec<DriveSegment>,
    index: usize,
    remaining: u64,
    cursor_x: f64,
}

impl ScriptedPlayer {
    pub fn new(segments: Vec<DriveSegment>) -> Self {
        let remaining = segments.first().map_or(0, |s| s.frames);
        Self {
            segments,
            index: 0,
            remaining,
            cursor_x: 0.0,
        }
    }

    /// The action for the next frame; `Idle` once the script runs out
    pub fn next_action(&mut self) -> DriveAction {
        while self.remaining == 0 {
            self.index += 1;
            match self.segments.get(self.index) {
                Some(segment) => self.remaining = segment.frames,
                None => return DriveAction::Idle,
            }
        }
        self.remaining -= 1;
        self.segments[self.index].action
    }

    /// Press and release keys so `input` reflects `action` for this frame
    pub fn apply(&mut self, action: DriveAction, input: &mut InputState) {
        let held = |key: KeyCode| match (action, key) {
            (DriveAction::Forward, KeyCode::KeyW)
            | (DriveAction::Back, KeyCode::KeyS)
            | (DriveAction::Left, KeyCode::KeyA)
            | (DriveAction::Right, KeyCode::KeyD)
            | (DriveAction::Reset, KeyCode::KeyR) => true,
            _ => false,
        };
        for key in [KeyCode::KeyW, KeyCode::KeyS, KeyCode::KeyA, KeyCode::KeyD, KeyCode::KeyR] {
            if held(key) {
                input.process_key_down(key);
            } else {
                input.process_key_up(key);
            }
        }

        match action {
            DriveAction::Drag(dx) => {
                if !input.is_mouse_button_down(FREE_LOOK_BUTTON) {
                    input.process_mouse_move(self.cursor_x, 0.0);
                    input.process_mouse_button_down(FREE_LOOK_BUTTON);
                }
                self.cursor_x += dx;
                input.process_mouse_move(self.cursor_x, 0.0);
            }
            _ => input.process_mouse_button_up(FREE_LOOK_BUTTON),
        }
    }
}

pub fn run(args: SimulateArgs) -> Result<()> {
    let config = SimConfig::load(args.config.as_deref()).context("Failed to load config")?;
    let segments = match &args.drive {
        Some(script) => parse_drive_script(script)?,
        None => Vec::new(),
    };

    let (terrain_tx, terrain_slot) = asset_channel();
    let (rover_tx, rover_slot) = asset_channel();

    // Terrain decodes off the frame loop; a bad file leaves the session on flat ground
    let heightmap = args.heightmap.clone();
    let dimension = args.dimension;
    let loader = thread::spawn(move || match load_heightmap(&heightmap, dimension) {
        Ok(field) => {
            if !terrain_tx.publish(field) {
                log::debug!("Loader: session gone before terrain arrived");
            }
        }
        Err(e) => log::error!("Loader: {e}; continuing on flat ground"),
    });

    let model = match &args.rover {
        Some(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read rover model '{}'", path.display()))?;
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "rover".to_string());
            RoverModel {
                name,
                byte_len: bytes.len(),
            }
        }
        None => RoverModel {
            name: "rover".to_string(),
            byte_len: 0,
        },
    };
    rover_tx.publish(model);

    let audio: Box<dyn AudioSink> = if args.audio {
        Box::new(KiraAudio::new(config.audio.clone()))
    } else {
        Box::new(SilentAudio)
    };

    let mut input = InputState::new();
    input.apply_bindings(&config.input);
    let mut session = Session::new(
        config,
        SessionAssets {
            terrain: terrain_slot,
            rover: rover_slot,
        },
        audio,
    )?;
    let mut player = ScriptedPlayer::new(segments);
    let mut clock = GameClock::new();
    let dt = clock.fixed_timestep();

    let mut frame = 0u64;
    while frame < args.frames {
        let due = clock.advance(dt);
        for _ in 0..due {
            if frame >= args.frames {
                break;
            }
            frame += 1;

            // Keep tapping start until the session accepts it
            if frame >= args.start_at && !session.context().is_active() {
                input.process_key_up(KeyCode::Enter);
                input.process_key_down(KeyCode::Enter);
            } else {
                input.process_key_up(KeyCode::Enter);
            }
            if session.context().is_active() {
                let action = player.next_action();
                player.apply(action, &mut input);
            }

            let events = session.step(&input, dt as f32);
            input.end_frame();
            if !args.json {
                for event in &events {
                    print_event(frame, event);
                }
            }
        }
    }

    if loader.join().is_err() {
        log::warn!("Loader thread panicked");
    }

    let snapshot = session.snapshot();
    session.shutdown();
    input.clear();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!("After {} frames ({:?}):", snapshot.frame, snapshot.state);
        match &snapshot.rover {
            Some(rover) => println!(
                "  Rover at ({:.2}, {:.2}, {:.2}), yaw {:.3}",
                rover.pose.position.x, rover.pose.position.y, rover.pose.position.z, rover.yaw
            ),
            None => println!("  Rover not loaded"),
        }
        let moving = snapshot.props.iter().filter(|p| p.speed > 1e-3).count();
        println!("  Props: {} ({} still moving)", snapshot.props.len(), moving);
        println!("  Terrain loaded: {}", snapshot.terrain_loaded);
    }
    Ok(())
}

fn print_event(frame: u64, event: &SimEvent) {
    match event {
        SimEvent::TerrainReady => println!("[{frame:>5}] terrain ready"),
        SimEvent::RoverReady => println!("[{frame:>5}] rover ready"),
        SimEvent::Started => println!("[{frame:>5}] started"),
        SimEvent::CollisionTone { frequency } => {
            println!("[{frame:>5}] bump ({frequency:.0} Hz)")
        }
        SimEvent::PropsReset => println!("[{frame:>5}] name blocks reset"),
        SimEvent::PlatformEntered { label, link } => {
            println!("[{frame:>5}] entered {label} -> {link}")
        }
        SimEvent::PlatformLeft { label } => println!("[{frame:>5}] left {label}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_drive_script() {
        let segments = parse_drive_script("forward:120, left:30,drag:-40.5:10,reset:1,idle:5").unwrap();
        assert_eq!(
            segments,
            vec![
                DriveSegment { action: DriveAction::Forward, frames: 120 },
                DriveSegment { action: DriveAction::Left, frames: 30 },
                DriveSegment { action: DriveAction::Drag(-40.5), frames: 10 },
                DriveSegment { action: DriveAction::Reset, frames: 1 },
                DriveSegment { action: DriveAction::Idle, frames: 5 },
            ]
        );
        assert!(parse_drive_script("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_drive_script_errors() {
        assert!(parse_drive_script("forward").is_err());
        assert!(parse_drive_script("jump:3").is_err());
        assert!(parse_drive_script("left:x").is_err());
        assert!(parse_drive_script("drag:far:2").is_err());
    }

    #[test]
    fn test_player_walks_segments_then_idles() {
        let mut player = ScriptedPlayer::new(parse_drive_script("forward:2,idle:0,back:1").unwrap());
        assert_eq!(player.next_action(), DriveAction::Forward);
        assert_eq!(player.next_action(), DriveAction::Forward);
        assert_eq!(player.next_action(), DriveAction::Back);
        assert_eq!(player.next_action(), DriveAction::Idle);
        assert_eq!(player.next_action(), DriveAction::Idle);
    }

    #[test]
    fn test_player_drives_input_state() {
        let mut player = ScriptedPlayer::new(Vec::new());
        let mut input = InputState::new();

        player.apply(DriveAction::Forward, &mut input);
        assert!(input.is_action_pressed("drive_forward"));

        player.apply(DriveAction::Left, &mut input);
        assert!(!input.is_action_pressed("drive_forward"));
        assert!(input.is_action_pressed("turn_left"));
        input.end_frame();

        player.apply(DriveAction::Drag(25.0), &mut input);
        assert_eq!(input.free_look_delta(), Some(25.0));
        input.end_frame();

        player.apply(DriveAction::Reset, &mut input);
        assert!(input.is_action_just_pressed("reset_props"));
        assert_eq!(input.free_look_delta(), None);
    }
}
