//! Input state management

use std::collections::{HashMap, HashSet};
use winit::keyboard::KeyCode;

/// Mouse button that enables free-look dragging (right button)
pub const FREE_LOOK_BUTTON: u32 = 2;

/// Key names accepted in `[input]` config tables
const KEY_NAMES: &[(&str, KeyCode)] = &[
    ("KeyA", KeyCode::KeyA),
    ("KeyB", KeyCode::KeyB),
    ("KeyC", KeyCode::KeyC),
    ("KeyD", KeyCode::KeyD),
    ("KeyE", KeyCode::KeyE),
    ("KeyF", KeyCode::KeyF),
    ("KeyG", KeyCode::KeyG),
    ("KeyH", KeyCode::KeyH),
    ("KeyI", KeyCode::KeyI),
    ("KeyJ", KeyCode::KeyJ),
    ("KeyK", KeyCode::KeyK),
    ("KeyL", KeyCode::KeyL),
    ("KeyM", KeyCode::KeyM),
    ("KeyN", KeyCode::KeyN),
    ("KeyO", KeyCode::KeyO),
    ("KeyP", KeyCode::KeyP),
    ("KeyQ", KeyCode::KeyQ),
    ("KeyR", KeyCode::KeyR),
    ("KeyS", KeyCode::KeyS),
    ("KeyT", KeyCode::KeyT),
    ("KeyU", KeyCode::KeyU),
    ("KeyV", KeyCode::KeyV),
    ("KeyW", KeyCode::KeyW),
    ("KeyX", KeyCode::KeyX),
    ("KeyY", KeyCode::KeyY),
    ("KeyZ", KeyCode::KeyZ),
    ("ArrowUp", KeyCode::ArrowUp),
    ("ArrowDown", KeyCode::ArrowDown),
    ("ArrowLeft", KeyCode::ArrowLeft),
    ("ArrowRight", KeyCode::ArrowRight),
    ("Space", KeyCode::Space),
    ("Enter", KeyCode::Enter),
    ("Escape", KeyCode::Escape),
    ("Tab", KeyCode::Tab),
    ("ShiftLeft", KeyCode::ShiftLeft),
    ("ShiftRight", KeyCode::ShiftRight),
    ("ControlLeft", KeyCode::ControlLeft),
    ("ControlRight", KeyCode::ControlRight),
];

/// Resolve a key name such as `"KeyW"` or `"ArrowUp"`
pub fn parse_key_code(name: &str) -> Option<KeyCode> {
    KEY_NAMES
        .iter()
        .find(|(key_name, _)| key_name.eq_ignore_ascii_case(name))
        .map(|(_, code)| *code)
}

/// Tracks keyboard and pointer state between frames.
///
/// The window layer feeds events in; the simulation polls it once per frame
/// and calls `end_frame` afterwards.
pub struct InputState {
    /// Keys currently held down
    keys_down: HashSet<KeyCode>,
    /// Keys pressed this frame
    keys_just_pressed: HashSet<KeyCode>,

    /// Mouse buttons currently held
    mouse_buttons_down: HashSet<u32>,

    /// Last known cursor position in window pixels
    mouse_position: Option<(f64, f64)>,
    /// Cursor movement accumulated while the free-look button was held
    drag_delta: (f64, f64),

    /// Action map: action name -> list of key bindings
    action_map: HashMap<String, Vec<KeyCode>>,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    pub fn new() -> Self {
        Self {
            keys_down: HashSet::new(),
            keys_just_pressed: HashSet::new(),
            mouse_buttons_down: HashSet::new(),
            mouse_position: None,
            drag_delta: (0.0, 0.0),
            action_map: Self::default_action_map(),
        }
    }

    fn default_action_map() -> HashMap<String, Vec<KeyCode>> {
        let mut map = HashMap::new();
        map.insert("drive_forward".into(), vec![KeyCode::KeyW, KeyCode::ArrowUp]);
        map.insert("drive_backward".into(), vec![KeyCode::KeyS, KeyCode::ArrowDown]);
        map.insert("turn_left".into(), vec![KeyCode::KeyA, KeyCode::ArrowLeft]);
        map.insert("turn_right".into(), vec![KeyCode::KeyD, KeyCode::ArrowRight]);
        map.insert("reset_props".into(), vec![KeyCode::KeyR]);
        map.insert("start".into(), vec![KeyCode::Enter, KeyCode::Space]);
        map
    }

    /// Bind an action to one or more keys
    pub fn bind_action(&mut self, action: impl Into<String>, keys: Vec<KeyCode>) {
        self.action_map.insert(action.into(), keys);
    }

    /// Override bindings from config (action -> key names). Unknown key names are skipped.
    pub fn apply_bindings(&mut self, bindings: &HashMap<String, Vec<String>>) {
        for (action, names) in bindings {
            let keys: Vec<KeyCode> = names
                .iter()
                .filter_map(|name| {
                    let code = parse_key_code(name);
                    if code.is_none() {
                        log::warn!("Input: unknown key '{name}' for action '{action}'");
                    }
                    code
                })
                .collect();
            if !keys.is_empty() {
                self.bind_action(action.clone(), keys);
            }
        }
    }

    /// Process a key press event
    pub fn process_key_down(&mut self, key: KeyCode) {
        if !self.keys_down.contains(&key) {
            self.keys_just_pressed.insert(key);
        }
        self.keys_down.insert(key);
    }

    /// Process a key release event
    pub fn process_key_up(&mut self, key: KeyCode) {
        self.keys_down.remove(&key);
    }

    /// Process mouse button press
    pub fn process_mouse_button_down(&mut self, button: u32) {
        self.mouse_buttons_down.insert(button);
    }

    /// Process mouse button release
    pub fn process_mouse_button_up(&mut self, button: u32) {
        self.mouse_buttons_down.remove(&button);
    }

    /// Process cursor movement. Movement only counts as drag while the
    /// free-look button is held; the first event just records the position.
    pub fn process_mouse_move(&mut self, x: f64, y: f64) {
        if let Some((last_x, last_y)) = self.mouse_position {
            if self.is_mouse_button_down(FREE_LOOK_BUTTON) {
                self.drag_delta.0 += x - last_x;
                self.drag_delta.1 += y - last_y;
            }
        }
        self.mouse_position = Some((x, y));
    }

    /// Call at end of frame to clear per-frame state
    pub fn end_frame(&mut self) {
        self.keys_just_pressed.clear();
        self.drag_delta = (0.0, 0.0);
    }

    /// Drop all held state (listeners detached on teardown)
    pub fn clear(&mut self) {
        self.keys_down.clear();
        self.keys_just_pressed.clear();
        self.mouse_buttons_down.clear();
        self.mouse_position = None;
        self.drag_delta = (0.0, 0.0);
    }

    // --- Query methods ---

    /// Is a key currently held down?
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Is an action currently held? (any bound key is down)
    pub fn is_action_pressed(&self, action: &str) -> bool {
        self.action_map
            .get(action)
            .map(|keys| keys.iter().any(|k| self.keys_down.contains(k)))
            .unwrap_or(false)
    }

    /// Was an action just pressed this frame?
    pub fn is_action_just_pressed(&self, action: &str) -> bool {
        self.action_map
            .get(action)
            .map(|keys| keys.iter().any(|k| self.keys_just_pressed.contains(k)))
            .unwrap_or(false)
    }

    /// Is a mouse button currently held?
    pub fn is_mouse_button_down(&self, button: u32) -> bool {
        self.mouse_buttons_down.contains(&button)
    }

    /// Horizontal free-look drag accumulated this frame, if the free-look button is held
    pub fn free_look_delta(&self) -> Option<f64> {
        self.is_mouse_button_down(FREE_LOOK_BUTTON)
            .then_some(self.drag_delta.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_transitions() {
        let mut input = InputState::new();

        input.process_key_down(KeyCode::KeyW);
        assert!(input.is_key_down(KeyCode::KeyW));
        assert!(input.is_action_just_pressed("drive_forward"));

        // End frame clears just_pressed
        input.end_frame();
        assert!(input.is_key_down(KeyCode::KeyW));
        assert!(input.is_action_pressed("drive_forward"));
        assert!(!input.is_action_just_pressed("drive_forward"));

        input.process_key_up(KeyCode::KeyW);
        assert!(!input.is_action_pressed("drive_forward"));
    }

    #[test]
    fn test_arrow_keys_alias_wasd() {
        let mut input = InputState::new();
        input.process_key_down(KeyCode::ArrowLeft);
        assert!(input.is_action_pressed("turn_left"));
        assert!(!input.is_action_pressed("turn_right"));
    }

    #[test]
    fn test_config_bindings_override() {
        let mut input = InputState::new();
        let mut bindings = HashMap::new();
        bindings.insert(
            "drive_forward".to_string(),
            vec!["KeyI".to_string(), "NotAKey".to_string()],
        );
        input.apply_bindings(&bindings);

        input.process_key_down(KeyCode::KeyW);
        assert!(!input.is_action_pressed("drive_forward"));
        input.process_key_down(KeyCode::KeyI);
        assert!(input.is_action_pressed("drive_forward"));
    }

    #[test]
    fn test_drag_requires_free_look_button() {
        let mut input = InputState::new();
        input.process_mouse_move(100.0, 100.0);
        input.process_mouse_move(130.0, 100.0);
        assert_eq!(input.free_look_delta(), None);

        input.process_mouse_button_down(FREE_LOOK_BUTTON);
        input.process_mouse_move(150.0, 90.0);
        input.process_mouse_move(155.0, 90.0);
        assert_eq!(input.free_look_delta(), Some(25.0));

        input.end_frame();
        assert_eq!(input.free_look_delta(), Some(0.0));

        input.process_mouse_button_up(FREE_LOOK_BUTTON);
        assert_eq!(input.free_look_delta(), None);
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut input = InputState::new();
        input.process_key_down(KeyCode::KeyD);
        input.process_mouse_button_down(FREE_LOOK_BUTTON);
        input.clear();
        assert!(!input.is_action_pressed("turn_right"));
        assert!(!input.is_mouse_button_down(FREE_LOOK_BUTTON));
    }

    #[test]
    fn test_parse_key_code() {
        assert_eq!(parse_key_code("KeyW"), Some(KeyCode::KeyW));
        assert_eq!(parse_key_code("arrowup"), Some(KeyCode::ArrowUp));
        assert_eq!(parse_key_code("Hyper"), None);
    }
}
